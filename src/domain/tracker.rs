//! Per-ply affect transition.
//!
//! [`advance`] is a pure function of the previous [`EmotionState`] and the
//! [`MoveDelta`] of the move just played. It runs the fixed update order:
//! dissolve pairings, form pairings, age then trigger anger, age then
//! trigger sadness. Timers age only on their owner's commit, so a timer
//! armed on a piece lives through exactly one move of that piece's side.

use std::collections::BTreeSet;
use std::fmt;

use shakmaty::{Bitboard, Board, Color, Role, Square};
use tracing::trace;

use crate::domain::chess::{king_attacked, within};
use crate::domain::emotion::{ANGER_RADIUS, EmotionState, LOVE_RADIUS, LovePair};

/// Why a pairing ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DissolveReason {
    /// One member was captured
    Captured,
    /// One member left its square
    Vacated,
    /// A member king came under check
    Check,
    /// Members stand further apart than the love radius. Only a guard:
    /// a member that moves always dissolves the pair as vacated first.
    Distance,
}

/// Something the tracker changed during one commit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmotionEvent {
    LoveFormed(LovePair),
    LoveDissolved {
        pair: LovePair,
        reason: DissolveReason,
    },
    AngerArmed(Square),
    SadnessArmed(Square),
}

impl fmt::Display for EmotionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmotionEvent::LoveFormed(pair) => write!(f, "love formed {pair}"),
            EmotionEvent::LoveDissolved { pair, reason } => {
                write!(f, "love dissolved {pair} ({reason:?})")
            }
            EmotionEvent::AngerArmed(sq) => write!(f, "anger on {sq}"),
            EmotionEvent::SadnessArmed(sq) => write!(f, "sadness on {sq}"),
        }
    }
}

/// Board before and after a move, and who made it
#[derive(Clone, Debug)]
pub struct MoveDelta {
    before: Board,
    after: Board,
    mover: Color,
}

impl MoveDelta {
    pub fn new(before: Board, after: Board, mover: Color) -> Self {
        Self {
            before,
            after,
            mover,
        }
    }

    pub fn before(&self) -> &Board {
        &self.before
    }

    pub fn after(&self) -> &Board {
        &self.after
    }

    pub fn mover(&self) -> Color {
        self.mover
    }

    /// Squares whose occupant changed: origins, destinations, en passant
    /// victims and castling rooks
    pub fn changed(&self) -> Bitboard {
        (self.before.occupied() | self.after.occupied())
            .into_iter()
            .filter(|&sq| self.before.piece_at(sq) != self.after.piece_at(sq))
            .collect()
    }

    /// Squares that lost a piece of the side not moving
    pub fn captured(&self) -> Bitboard {
        let victim = !self.mover;
        self.before.by_color(victim) & !self.after.by_color(victim)
    }
}

/// Result of one tracker step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: EmotionState,
    pub events: Vec<EmotionEvent>,
}

fn partner_in(pairs: &BTreeSet<LovePair>, sq: Square) -> Option<Square> {
    pairs.iter().find_map(|pair| pair.other(sq))
}

fn attacked_by(board: &Board, sq: Square, by: Color, ignoring: Option<Square>) -> bool {
    let mut attackers = board.attacks_to(sq, by, board.occupied());
    if let Some(partner) = ignoring {
        attackers.discard(partner);
    }
    attackers.any()
}

/// Compute the affect state after the move described by `delta`
pub fn advance(prev: &EmotionState, delta: &MoveDelta) -> Transition {
    let board = delta.after();
    let mover = delta.mover();
    let victim = !mover;
    let changed = delta.changed();
    let captured = delta.captured();
    let mut events = Vec::new();

    // 1. dissolve: captures and vacancies first, then check
    let mut bereaved = Vec::new();
    let mut kept = BTreeSet::new();
    for &pair in prev.pairs() {
        if let Some(lost) = [pair.a(), pair.b()]
            .into_iter()
            .find(|&sq| captured.contains(sq))
        {
            if let Some(survivor) = pair.other(lost).filter(|&sq| !changed.contains(sq)) {
                bereaved.push(survivor);
            }
            events.push(EmotionEvent::LoveDissolved {
                pair,
                reason: DissolveReason::Captured,
            });
        } else if pair.members().intersects(changed) {
            events.push(EmotionEvent::LoveDissolved {
                pair,
                reason: DissolveReason::Vacated,
            });
        } else {
            kept.insert(pair);
        }
    }

    let mut pairs = BTreeSet::new();
    for &pair in &kept {
        // guard only: members of a kept pair have not moved since it formed
        let reason = if pair.distance() > LOVE_RADIUS {
            Some(DissolveReason::Distance)
        } else if [pair.a(), pair.b()]
            .into_iter()
            .any(|sq| king_attacked(board, sq, partner_in(&kept, sq)))
        {
            Some(DissolveReason::Check)
        } else {
            None
        };
        match reason {
            Some(reason) => events.push(EmotionEvent::LoveDissolved { pair, reason }),
            None => {
                pairs.insert(pair);
            }
        }
    }

    // 2. form: nearest first, ties by lower square then higher square
    let mut paired = pairs
        .iter()
        .fold(Bitboard::EMPTY, |acc, pair| acc | pair.members());
    let eligible = |sq: Square| {
        board
            .piece_at(sq)
            .filter(|piece| piece.role != Role::Queen && !king_attacked(board, sq, None))
    };
    let mut candidates = Vec::new();
    for a in board.occupied() & !paired {
        let Some(first) = eligible(a) else {
            continue;
        };
        for b in within(a, LOVE_RADIUS) & board.by_color(!first.color) & !paired {
            if b <= a {
                continue;
            }
            let Some(second) = eligible(b) else {
                continue;
            };
            if first.role == Role::King && second.role == Role::King {
                continue;
            }
            candidates.push(LovePair::new(a, b));
        }
    }
    candidates.sort_by_key(|pair| (pair.distance(), pair.a(), pair.b()));
    for pair in candidates {
        if paired.is_disjoint(pair.members()) {
            paired.add(pair.members());
            pairs.insert(pair);
            events.push(EmotionEvent::LoveFormed(pair));
        }
    }

    // 3. age the mover's anger
    let mut anger = prev.anger().clone();
    anger.clear(changed);
    anger.tick_where(|sq| board.color_at(sq) == Some(mover));

    // 4. trigger anger around captures and newly attacked pieces
    let mut affected = captured;
    for sq in board.by_color(victim) {
        let now = attacked_by(board, sq, mover, partner_in(&pairs, sq));
        let before = attacked_by(delta.before(), sq, mover, prev.partner(sq));
        if now && !before {
            affected.add(sq);
        }
    }
    let mut enraged = Bitboard::EMPTY;
    for sq in affected {
        enraged.add(within(sq, ANGER_RADIUS) & board.by_color(victim));
    }
    for sq in enraged {
        anger.arm(sq);
        events.push(EmotionEvent::AngerArmed(sq));
    }

    // 5. age the mover's sadness
    let mut sadness = prev.sadness().clone();
    sadness.clear(changed);
    sadness.tick_where(|sq| board.color_at(sq) == Some(mover));

    // 6. grieve for captured partners
    for survivor in bereaved {
        if board.role_at(survivor).is_some_and(|role| role != Role::King) {
            sadness.arm(survivor);
            events.push(EmotionEvent::SadnessArmed(survivor));
        }
    }

    trace!(
        pairs = pairs.len(),
        angry = anger.len(),
        sad = sadness.len(),
        events = events.len(),
        "affect recomputed"
    );

    Transition {
        state: EmotionState::from_parts(pairs, anger, sadness),
        events,
    }
}
