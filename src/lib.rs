//! Emotional chess: a chess variant where pieces fall in love, get angry
//! and grieve.
//!
//! The [`domain`] layer is the synchronous affect engine layered over a
//! standard rules authority ([`shakmaty`]). [`models`] wraps it in a game
//! record with variations.

pub mod config;
pub mod domain;
pub mod error;
pub mod models;

pub use domain::{
    EmotionEvent, EmotionImpact, EmotionState, EmotionSummary, Evaluation, GameStatus, Position,
    RulesAuthority, Weights,
};
pub use error::{Error, Result, ValidationError};
pub use models::EmotionalGame;
