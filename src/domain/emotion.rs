//! Affect state: love pairings plus anger and sadness timers.
//!
//! [`EmotionState`] is an immutable-per-ply value. It is replaced wholesale
//! at every commit by [`crate::domain::tracker::advance`] and never edited in
//! place by callers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shakmaty::{Bitboard, Board, Color, Role, Square};

use crate::domain::chess::distance;
use crate::error::ValidationError;

/// Maximum Chebyshev distance between partners
pub const LOVE_RADIUS: u32 = 3;

/// Reach of an anger trigger around the affected square
pub const ANGER_RADIUS: u32 = 3;

/// Timers never stack past this value
pub const TIMER_CEILING: u8 = 1;

/// An unordered pairing of two squares, stored with `a < b`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LovePair {
    a: Square,
    b: Square,
}

impl LovePair {
    pub fn new(x: Square, y: Square) -> Self {
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    /// Lower square index
    pub fn a(&self) -> Square {
        self.a
    }

    /// Higher square index
    pub fn b(&self) -> Square {
        self.b
    }

    pub fn contains(&self, sq: Square) -> bool {
        self.a == sq || self.b == sq
    }

    /// The other member, if `sq` is one of them
    pub fn other(&self, sq: Square) -> Option<Square> {
        if sq == self.a {
            Some(self.b)
        } else if sq == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn distance(&self) -> u32 {
        distance(self.a, self.b)
    }

    pub fn members(&self) -> Bitboard {
        Bitboard::from_square(self.a) | Bitboard::from_square(self.b)
    }
}

impl fmt::Display for LovePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// Sparse one-ply timers keyed by occupied square
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers(BTreeMap<Square, u8>);

impl Timers {
    /// Set the timer on `sq` to the ceiling. Repeated arming does not stack
    pub fn arm(&mut self, sq: Square) {
        self.0.insert(sq, TIMER_CEILING);
    }

    /// Decrement timers accepted by `owned`, dropping the ones that reach 0
    pub fn tick_where(&mut self, owned: impl Fn(Square) -> bool) {
        self.0.retain(|&sq, value| {
            if owned(sq) {
                *value = value.saturating_sub(1);
            }
            *value > 0
        });
    }

    /// Drop every timer on a square in `squares`
    pub fn clear(&mut self, squares: Bitboard) {
        self.0.retain(|&sq, _| !squares.contains(sq));
    }

    pub fn get(&self, sq: Square) -> u8 {
        self.0.get(&sq).copied().unwrap_or(0)
    }

    pub fn is_set(&self, sq: Square) -> bool {
        self.get(sq) > 0
    }

    /// Squares with a live timer, in ascending square order
    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of live timers on pieces of `color`
    pub fn count_for(&self, board: &Board, color: Color) -> usize {
        self.squares()
            .filter(|&sq| board.color_at(sq) == Some(color))
            .count()
    }
}

/// Counts of each affect channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionSummary {
    pub love_pairs: usize,
    pub angry: usize,
    pub sad: usize,
}

impl fmt::Display for EmotionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "love {} / anger {} / sad {}",
            self.love_pairs, self.angry, self.sad
        )
    }
}

/// Love pairings, anger timers and sad timers for one position
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmotionState {
    pairs: BTreeSet<LovePair>,
    anger: Timers,
    sadness: Timers,
}

impl EmotionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(pairs: BTreeSet<LovePair>, anger: Timers, sadness: Timers) -> Self {
        Self {
            pairs,
            anger,
            sadness,
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = &LovePair> + '_ {
        self.pairs.iter()
    }

    pub fn anger(&self) -> &Timers {
        &self.anger
    }

    pub fn sadness(&self) -> &Timers {
        &self.sadness
    }

    /// The square `sq` is paired with
    pub fn partner(&self, sq: Square) -> Option<Square> {
        self.pairs.iter().find_map(|pair| pair.other(sq))
    }

    pub fn in_love(&self, sq: Square) -> bool {
        self.partner(sq).is_some()
    }

    pub fn is_angry(&self, sq: Square) -> bool {
        self.anger.is_set(sq)
    }

    pub fn is_sad(&self, sq: Square) -> bool {
        self.sadness.is_set(sq)
    }

    /// Every square that belongs to a pairing
    pub fn paired_squares(&self) -> Bitboard {
        self.pairs
            .iter()
            .fold(Bitboard::EMPTY, |acc, pair| acc | pair.members())
    }

    pub fn summary(&self) -> EmotionSummary {
        EmotionSummary {
            love_pairs: self.pairs.len(),
            angry: self.anger.len(),
            sad: self.sadness.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.anger.is_empty() && self.sadness.is_empty()
    }

    /// Check the state against `board` with `turn` to move, reporting the
    /// first broken invariant
    pub fn check_consistency(&self, board: &Board, turn: Color) -> Result<(), ValidationError> {
        let mut seen = Bitboard::EMPTY;
        for pair in &self.pairs {
            for sq in [pair.a, pair.b] {
                if !seen.insert(sq) {
                    return Err(ValidationError::SquareInTwoPairs(sq));
                }
            }
            let (x, y) = match (board.piece_at(pair.a), board.piece_at(pair.b)) {
                (Some(x), Some(y)) => (x, y),
                (None, _) => return Err(ValidationError::UnoccupiedSquare(pair.a)),
                (_, None) => return Err(ValidationError::UnoccupiedSquare(pair.b)),
            };
            if x.role == Role::Queen {
                return Err(ValidationError::QueenInLove(pair.a));
            }
            if y.role == Role::Queen {
                return Err(ValidationError::QueenInLove(pair.b));
            }
            if x.color == y.color {
                return Err(ValidationError::SameColorPair(pair.a, pair.b));
            }
            if x.role == Role::King && y.role == Role::King {
                return Err(ValidationError::KingsInLove(pair.a, pair.b));
            }
            if pair.distance() > LOVE_RADIUS {
                return Err(ValidationError::PairTooFar(pair.a, pair.b));
            }
        }

        for sq in self.anger.squares() {
            if board.piece_at(sq).is_none() {
                return Err(ValidationError::UnoccupiedSquare(sq));
            }
        }

        for sq in self.sadness.squares() {
            match board.role_at(sq) {
                None => return Err(ValidationError::UnoccupiedSquare(sq)),
                Some(Role::King) => return Err(ValidationError::SadKing(sq)),
                Some(_) => {}
            }
        }

        // the side that just moved may only leave its king facing its partner
        if let Some(king) = board.king_of(!turn) {
            let mut attackers = board.attacks_to(king, turn, board.occupied());
            if let Some(partner) = self.partner(king) {
                attackers.discard(partner);
            }
            if attackers.any() {
                return Err(ValidationError::OppositeCheck(king));
            }
        }

        Ok(())
    }
}
