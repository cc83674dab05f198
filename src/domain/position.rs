//! Affect-augmented position: base rules state plus [`EmotionState`].
//!
//! This is the unit every core operation takes and returns. Committing a
//! move produces a fresh position; the original is never mutated.

use shakmaty::{Board, Chess, Color, Move, Square};
use tracing::debug;

use crate::domain::emotion::{EmotionState, EmotionSummary};
use crate::domain::legality::{self, GameStatus};
use crate::domain::rules::RulesAuthority;
use crate::domain::tracker::{self, EmotionEvent, MoveDelta};
use crate::error::{Error, Result};

/// Base position plus affect state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position<R: RulesAuthority = Chess> {
    rules: R,
    emotions: EmotionState,
}

impl Default for Position<Chess> {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl<R: RulesAuthority> Position<R> {
    /// Wrap a base position with no affect
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            emotions: EmotionState::new(),
        }
    }

    /// Combine a base position with an affect state, rejecting inconsistent pairs
    pub fn from_parts(rules: R, emotions: EmotionState) -> Result<Self> {
        emotions.check_consistency(rules.board(), rules.turn())?;
        Ok(Self { rules, emotions })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn emotions(&self) -> &EmotionState {
        &self.emotions
    }

    pub fn board(&self) -> &Board {
        self.rules.board()
    }

    pub fn turn(&self) -> Color {
        self.rules.turn()
    }

    /// Full move number, starting at 1 and incremented after black moves
    pub fn fullmoves(&self) -> u32 {
        self.rules.fullmoves()
    }

    /// Affect-filtered legal moves, optionally only those starting on `origin`
    pub fn legal_moves(&self, origin: Option<Square>) -> Vec<Move> {
        let mut moves = legality::legal_moves(&self.rules, &self.emotions);
        if let Some(origin) = origin {
            moves.retain(|m| m.from() == Some(origin));
        }
        moves
    }

    pub fn is_legal(&self, m: Move) -> bool {
        self.legal_moves(m.from()).contains(&m)
    }

    /// Play `m` and recompute affect
    pub fn commit(&self, m: Move) -> Result<Self> {
        self.commit_with_events(m).map(|(position, _)| position)
    }

    /// Play `m`, returning the new position and what changed emotionally
    pub fn commit_with_events(&self, m: Move) -> Result<(Self, Vec<EmotionEvent>)> {
        if !self.is_legal(m) {
            return Err(Error::InvalidMove(format!("{m:?}")));
        }

        let mut rules = self.rules.clone();
        rules.apply(m);
        let delta = MoveDelta::new(self.board().clone(), rules.board().clone(), self.turn());
        let transition = tracker::advance(&self.emotions, &delta);

        debug!(
            mover = ?self.turn(),
            fen = %rules.to_fen(),
            summary = %transition.state.summary(),
            "move committed"
        );
        for event in &transition.events {
            debug!(%event, "emotion event");
        }

        let position = Self {
            rules,
            emotions: transition.state,
        };
        Ok((position, transition.events))
    }

    pub fn emotion_summary(&self) -> EmotionSummary {
        self.emotions.summary()
    }

    pub fn in_love(&self, sq: Square) -> bool {
        self.emotions.in_love(sq)
    }

    pub fn love_partner(&self, sq: Square) -> Option<Square> {
        self.emotions.partner(sq)
    }

    pub fn is_angry(&self, sq: Square) -> bool {
        self.emotions.is_angry(sq)
    }

    pub fn is_sad(&self, sq: Square) -> bool {
        self.emotions.is_sad(sq)
    }

    /// Whether the side to move is in check, ignoring its king's partner
    pub fn in_check(&self) -> bool {
        legality::in_check(&self.rules, &self.emotions, self.turn())
    }

    pub fn status(&self) -> GameStatus {
        legality::status(&self.rules, &self.emotions)
    }
}
