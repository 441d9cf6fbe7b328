use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cell count must be a positive even number")]
    InvalidCellCount,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Every value must occupy exactly two cells")]
    UnbalancedPairs,
    #[error("No level has been started")]
    NotStarted,
}

pub type Result<T> = core::result::Result<T, GameError>;
