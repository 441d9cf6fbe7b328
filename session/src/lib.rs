//! Async shell around the [`mnemo_core`] engine.
//!
//! The core crate is a pure state machine; this crate gives it the boundary
//! a UI collaborator talks to: serialized mutation behind a single writer,
//! a latest-value snapshot stream, a one-shot event stream, and the
//! preview-delay timer that hides the board after the memorize phase.

pub use mnemo_core::{
    Cell, CellStatus, Coord, Coord2, GameEngine, GameError, GuessOutcome, Progress, Result,
};
pub use session::{GameEvent, GameSession, SessionConfig};

mod session;
