pub mod chess;
pub mod emfen;
pub mod emotion;
pub mod evaluation;
pub mod legality;
pub mod move_tree;
pub mod notation;
pub mod position;
pub mod rules;
pub mod tracker;

pub use emotion::{EmotionState, EmotionSummary, LovePair, Timers};
pub use evaluation::{EmotionImpact, Evaluation, SideImpact, Weights, emotion_impact, evaluate};
pub use legality::GameStatus;
pub use move_tree::{MoveNode, MoveNodeId, MoveTree, PlayedMove};
pub use position::Position;
pub use rules::RulesAuthority;
pub use tracker::{DissolveReason, EmotionEvent, MoveDelta, Transition};
