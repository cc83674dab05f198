//! Error types for the emotional chess core.
//!
//! Every core operation either succeeds with a consistent result or fails
//! with one of these errors, leaving the caller's position untouched.

use shakmaty::Square;
use thiserror::Error;

/// Errors surfaced by core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Move is not in the affect-filtered legal set (base-illegal or suppressed)
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// emFEN text could not be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// emFEN parsed but describes an inconsistent position
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Semantic invariants an affect-augmented position can violate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no piece on {0}")]
    UnoccupiedSquare(Square),

    #[error("queen on {0} cannot be in love")]
    QueenInLove(Square),

    #[error("{0} and {1} hold pieces of the same color")]
    SameColorPair(Square, Square),

    #[error("kings on {0} and {1} cannot pair")]
    KingsInLove(Square, Square),

    #[error("{0} and {1} are too far apart to pair")]
    PairTooFar(Square, Square),

    #[error("{0} belongs to more than one pairing")]
    SquareInTwoPairs(Square),

    #[error("king on {0} cannot be sad")]
    SadKing(Square),

    #[error("king on {0} is in check but its side is not to move")]
    OppositeCheck(Square),

    #[error("illegal base position: {0}")]
    IllegalBasePosition(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
