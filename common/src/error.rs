use crate::board::Point;

/// Everything that can go wrong while playing a board.
///
/// `InconsistentBoard` and `NoCandidate` are internal invariant violations: they cannot happen on
/// a legally played board and abort the current game instead of being guessed around.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the clue constraints are unsatisfiable; the board state is inconsistent")]
    InconsistentBoard,
    #[error("no covered cell is left to reveal but the board is not solved")]
    NoCandidate,
    #[error("the game has already ended")]
    GameOver,
    #[error("cell ({}, {}) is already revealed", .0.x, .0.y)]
    AlreadyRevealed(Point),
    #[error("cell ({}, {}) was proven to be a mine", .0.x, .0.y)]
    Flagged(Point),
    #[error("cell ({}, {}) is outside the board", .0.x, .0.y)]
    OutOfBounds(Point),
    #[error("sat solver failure: {0}")]
    Oracle(String),
    #[error("invalid minefield layout: {0}")]
    InvalidLayout(String),
    #[error("serialization failure: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
