use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Round progress as seen by the collaborator.
///
/// Valid transitions:
/// - Idle -> InProgress (first level starts)
/// - InProgress -> Win (last pair found)
/// - Win -> InProgress (next level starts)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Progress {
    Idle,
    InProgress,
    Win,
}

impl Progress {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Win)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::Idle
    }
}

/// How many cells each level adds on top of the previous one.
pub const LEVEL_STEP: CellCount = 4;

/// The whole game state: board, guess buffer, and progression counters.
///
/// A clone is an immutable snapshot; every mutation happens through `&mut`
/// methods, so an observer holding a clone never sees a half-applied turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    board: Array2<Cell>,
    first_guess: Option<Coord2>,
    second_guess: Option<Coord2>,
    found_count: Saturating<CellCount>,
    score: i32,
    level: u32,
    preview_mode: bool,
    progress: Progress,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    pub fn new() -> Self {
        Self {
            board: Array2::default((0, 0)),
            first_guess: None,
            second_guess: None,
            found_count: Saturating(0),
            score: 0,
            level: 0,
            preview_mode: false,
            progress: Default::default(),
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn found_count(&self) -> CellCount {
        self.found_count.0
    }

    /// Board dimensions as `(column_count, row_count)`.
    pub fn size(&self) -> Coord2 {
        let dim = self.board.dim();
        (dim.1.try_into().unwrap(), dim.0.try_into().unwrap())
    }

    pub fn column_count(&self) -> Coord {
        self.size().0
    }

    pub fn row_count(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.board.len().try_into().unwrap()
    }

    pub fn total_pairs(&self) -> CellCount {
        self.total_cells() / 2
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board[coords.to_nd_index()]
    }

    /// Coordinates of the pending first pick, if any.
    pub fn first_guess(&self) -> Option<Coord2> {
        self.first_guess
    }

    /// Coordinates of the second pick of a resolved turn, if any.
    pub fn second_guess(&self) -> Option<Coord2> {
        self.second_guess
    }

    /// Cell count the next level should be generated with.
    pub fn next_cell_count(&self) -> CellCount {
        self.total_cells().saturating_add(LEVEL_STEP)
    }

    /// Install a freshly generated layout face up and enter the preview
    /// phase. The score carries over; everything else about the previous
    /// level resets.
    pub fn start_level(&mut self, layout: PairLayout) {
        self.board = layout.into_board(CellStatus::Opened);
        self.first_guess = None;
        self.second_guess = None;
        self.found_count = Saturating(0);
        self.level += 1;
        self.preview_mode = true;
        self.progress = Progress::InProgress;
        log::debug!(
            "level {} started with {} cells",
            self.level,
            self.total_cells()
        );
    }

    /// Close every cell after the memorize phase. Applies at most once per
    /// level; a stale call after the preview already ended does nothing.
    /// Returns whether the board changed.
    pub fn end_preview(&mut self) -> bool {
        if !self.preview_mode || self.progress != Progress::InProgress {
            return false;
        }

        for cell in self.board.iter_mut() {
            *cell = cell.with_status(CellStatus::Closed);
        }
        self.preview_mode = false;
        log::debug!("preview ended on level {}", self.level);
        true
    }

    /// Apply a cell selection to the guess buffer.
    ///
    /// Input is ignored (`NoChange`) while the preview is showing or when
    /// the target is already matched; the post-win locked board falls under
    /// the preview guard. Out-of-range coordinates and calls before the
    /// first level are rejected outright.
    pub fn guess(&mut self, coords: Coord2) -> Result<GuessOutcome> {
        use GuessOutcome::*;

        if self.progress.is_idle() {
            return Err(GameError::NotStarted);
        }
        let coords = self.validate_coords(coords)?;

        if self.preview_mode {
            return Ok(NoChange);
        }
        if self.cell_at(coords).status.is_matched() {
            return Ok(NoChange);
        }

        Ok(match (self.first_guess, self.second_guess) {
            (None, _) => {
                self.set_status(coords, CellStatus::Opened);
                self.first_guess = Some(coords);
                self.second_guess = None;
                Opened
            }
            (Some(first), None) => {
                if first == coords {
                    return Ok(NoChange);
                }
                self.resolve_pair(first, coords)
            }
            (Some(first), Some(second)) => {
                self.close_unmatched(first);
                self.close_unmatched(second);
                self.set_status(coords, CellStatus::Opened);
                self.first_guess = Some(coords);
                self.second_guess = None;
                Opened
            }
        })
    }

    /// Resolve the second pick of a turn against the pending first pick.
    fn resolve_pair(&mut self, first: Coord2, second: Coord2) -> GuessOutcome {
        // value comparison re-reads the current board; stored guesses are
        // coordinates, never captured cell copies
        let matched = self.cell_at(first).value == self.cell_at(second).value;
        self.second_guess = Some(second);

        if matched {
            self.set_status(first, CellStatus::Match);
            self.set_status(second, CellStatus::Match);
            self.found_count += 1;
            self.score += 1;

            if self.found_count == Saturating(self.total_pairs()) {
                self.progress = Progress::Win;
                self.preview_mode = true;
                log::debug!("level {} won with score {}", self.level, self.score);
                return GuessOutcome::Won;
            }
            GuessOutcome::Matched
        } else {
            self.set_status(first, CellStatus::Opened);
            self.set_status(second, CellStatus::Opened);
            self.score -= 1;
            GuessOutcome::Mismatched
        }
    }

    fn close_unmatched(&mut self, coords: Coord2) {
        if !self.cell_at(coords).status.is_matched() {
            self.set_status(coords, CellStatus::Closed);
        }
    }

    fn set_status(&mut self, coords: Coord2, status: CellStatus) {
        let slot = &mut self.board[coords.to_nd_index()];
        *slot = slot.with_status(status);
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (columns, rows) = self.size();
        if coords.0 < columns && coords.1 < rows {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}
