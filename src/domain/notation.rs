//! Move text: UCI coordinates and SAN, resolved against the affect-filtered
//! move set so suppressed moves never parse and granted moves always do.

use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move, Role, Square};

use crate::domain::chess::castle_king_target;
use crate::domain::legality::GameStatus;
use crate::domain::position::Position;
use crate::error::{Error, Result};

/// Resolve UCI (`e2e4`, `e7e8q`) or SAN (`Nf3`, `O-O`, `exd5+`) text
pub fn parse_move(position: &Position<Chess>, text: &str) -> Result<Move> {
    let text = text.trim();
    let moves = position.legal_moves(None);

    if let Ok(uci) = UciMove::from_ascii(text.as_bytes()) {
        let matching: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|&m| UciMove::from_standard(m) == uci)
            .collect();
        // e1g1 names both castling and an angry king's double step
        if let Some(m) = matching
            .iter()
            .find(|m| m.is_castle())
            .or_else(|| matching.first())
        {
            return Ok(*m);
        }
    }

    let san = SanPlus::from_ascii(text.as_bytes())
        .map_err(|_| Error::InvalidMove(format!("'{text}' is not UCI or SAN")))?
        .san;
    let mut matching = moves.iter().copied().filter(|&m| san.matches(m));
    match (matching.next(), matching.next()) {
        (Some(m), None) => Ok(m),
        (None, _) => Err(Error::InvalidMove(format!("'{text}' is not legal here"))),
        (Some(_), Some(_)) => Err(Error::InvalidMove(format!("'{text}' is ambiguous"))),
    }
}

pub fn uci(m: Move) -> String {
    UciMove::from_standard(m).to_string()
}

/// SAN for `m`, fully qualified when the affect-filtered set needs it
pub fn san(position: &Position<Chess>, m: Move) -> String {
    let plain = San::from_move(position.rules(), m);
    let moves = position.legal_moves(None);
    if moves.iter().filter(|&&other| plain.matches(other)).count() <= 1 {
        return plain.to_string();
    }
    match m {
        Move::Normal {
            role,
            from,
            capture,
            to,
            promotion,
        } => San::Normal {
            role,
            file: Some(from.file()),
            rank: Some(from.rank()),
            capture: capture.is_some(),
            to,
            promotion,
        }
        .to_string(),
        _ => plain.to_string(),
    }
}

/// `+` or `#` for the position reached after a move
pub fn check_suffix(after: &Position<Chess>) -> &'static str {
    match after.status() {
        GameStatus::Checkmate { .. } => "#",
        _ if after.in_check() => "+",
        _ => "",
    }
}

/// The filtered move dragged from `from` to `to`.
///
/// Castling is found by dragging the king to its destination, and pawns
/// reaching the last rank promote to a queen.
pub fn move_between(position: &Position<Chess>, from: Square, to: Square) -> Option<Move> {
    let moves = position.legal_moves(Some(from));
    let target = |m: Move| match m {
        Move::Castle { king, rook } => castle_king_target(king, rook),
        other => other.to(),
    };
    moves
        .iter()
        .filter(|&&m| target(m) == to)
        .filter(|m| !matches!(m.promotion(), Some(role) if role != Role::Queen))
        .min_by_key(|m| !m.is_castle())
        .copied()
}
