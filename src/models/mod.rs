pub mod game;

pub use game::{EmotionalGame, MoveDisplay};
