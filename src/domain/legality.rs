//! Affect-adjusted move legality.
//!
//! The base rules authority supplies standard legal moves. This module adds
//! moves granted by anger, then removes moves forbidden by love and sadness.

use std::fmt;

use shakmaty::attacks::between;
use shakmaty::{Color, Move, Role, Square};
use tracing::trace;

use crate::domain::chess::{
    castle_king_target, castle_rook_target, directions, king_attacked, pawn_home_rank,
    promotion_rank, step,
};
use crate::domain::emotion::EmotionState;
use crate::domain::rules::RulesAuthority;

/// Outcome of a position under the affect-adjusted rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => f.write_str("stalemate"),
        }
    }
}

/// Affect-filtered legal moves for the side to move
pub fn legal_moves<R: RulesAuthority>(rules: &R, emotions: &EmotionState) -> Vec<Move> {
    let turn = rules.turn();
    let mut moves = rules.base_moves();
    let base_count = moves.len();

    // the base rules count a paired king's partner as an attacker
    let mut candidates = anger_extensions(rules, emotions);
    if rules
        .board()
        .king_of(turn)
        .is_some_and(|king| emotions.in_love(king))
    {
        candidates.extend(rules.pseudo_moves());
    }
    for m in candidates {
        if !moves.contains(&m) && leaves_king_safe(rules, emotions, m) {
            moves.push(m);
        }
    }
    let extended_count = moves.len();

    moves.retain(|&m| respects_love(rules, emotions, m));

    if !in_check(rules, emotions, turn) {
        moves.retain(|&m| !moves_sad_piece(emotions, m));
    }

    trace!(
        base = base_count,
        granted = extended_count - base_count,
        legal = moves.len(),
        "legal moves filtered"
    );
    moves
}

/// Whether `color`'s king is attacked by anything other than its partner
pub fn in_check<R: RulesAuthority>(rules: &R, emotions: &EmotionState, color: Color) -> bool {
    rules
        .board()
        .king_of(color)
        .is_some_and(|king| king_attacked(rules.board(), king, emotions.partner(king)))
}

/// Checkmate and stalemate judged on the filtered move set
pub fn status<R: RulesAuthority>(rules: &R, emotions: &EmotionState) -> GameStatus {
    if !legal_moves(rules, emotions).is_empty() {
        GameStatus::Ongoing
    } else if in_check(rules, emotions, rules.turn()) {
        GameStatus::Checkmate {
            winner: !rules.turn(),
        }
    } else {
        GameStatus::Stalemate
    }
}

/// Extra moves for angry pieces of the side to move.
///
/// Along each movement direction, a piece whose whole base reach is empty
/// may go one square further onto an empty square or an enemy piece. Pawns
/// only push and never capture this way. Sliders always reach the edge or a
/// blocker, so they never gain anything. Knights never extend. Kings cannot
/// be captured. The returned moves are not yet checked for king safety.
pub fn anger_extensions<R: RulesAuthority>(rules: &R, emotions: &EmotionState) -> Vec<Move> {
    let board = rules.board();
    let turn = rules.turn();
    let mut moves = Vec::new();

    for from in emotions.anger().squares() {
        let Some(piece) = board.piece_at(from) else {
            continue;
        };
        if piece.color != turn {
            continue;
        }
        let reach = match piece.role {
            Role::Knight => continue,
            Role::King => 1,
            Role::Pawn if from.rank() == pawn_home_rank(turn) => 2,
            Role::Pawn => 1,
            Role::Bishop | Role::Rook | Role::Queen => 7,
        };

        for &(df, dr) in directions(piece.role, turn) {
            let mut cursor = Some(from);
            for _ in 0..reach {
                cursor = cursor
                    .and_then(|sq| step(sq, df, dr))
                    .filter(|&sq| !board.occupied().contains(sq));
            }
            let Some(to) = cursor.and_then(|sq| step(sq, df, dr)) else {
                continue;
            };
            let capture = match board.piece_at(to) {
                None => None,
                Some(target)
                    if piece.role != Role::Pawn
                        && target.color != turn
                        && target.role != Role::King =>
                {
                    Some(target.role)
                }
                Some(_) => continue,
            };

            if piece.role == Role::Pawn && to.rank() == promotion_rank(turn) {
                for promotion in [Role::Queen, Role::Rook, Role::Bishop, Role::Knight] {
                    moves.push(Move::Normal {
                        role: Role::Pawn,
                        from,
                        capture,
                        to,
                        promotion: Some(promotion),
                    });
                }
            } else {
                moves.push(Move::Normal {
                    role: piece.role,
                    from,
                    capture,
                    to,
                    promotion: None,
                });
            }
        }
    }

    moves
}

/// Square a piece on `sq` ends up on after `m`
pub fn landing(m: Move, sq: Square) -> Square {
    match m {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } if from == sq => to,
        Move::Castle { king, rook } if king == sq => castle_king_target(king, rook),
        Move::Castle { king, rook } if rook == sq => castle_rook_target(king, rook),
        _ => sq,
    }
}

/// Square of the piece `m` captures, if any
pub fn captured_square(m: Move) -> Option<Square> {
    match m {
        Move::Normal {
            capture: Some(_),
            to,
            ..
        } => Some(to),
        Move::EnPassant { from, to } => Some(Square::from_coords(to.file(), from.rank())),
        _ => None,
    }
}

/// Whether the mover's king is safe after `m`. A king that stays on its
/// square keeps its pairing, so its partner does not count as an attacker.
fn leaves_king_safe<R: RulesAuthority>(rules: &R, emotions: &EmotionState, m: Move) -> bool {
    let turn = rules.turn();
    let Some(king) = rules.board().king_of(turn) else {
        return false;
    };

    if let Move::Castle { rook, .. } = m {
        let partner = emotions.partner(king);
        let crossed = between(king, castle_king_target(king, rook));
        if in_check(rules, emotions, turn)
            || crossed
                .into_iter()
                .any(|sq| king_square_attacked(rules, sq, turn, partner))
        {
            return false;
        }
    }

    let landed = landing(m, king);
    let partner = emotions.partner(king).filter(|_| landed == king);
    let mut after = rules.clone();
    after.apply(m);
    !king_square_attacked(&after, landed, turn, partner)
}

fn king_square_attacked<R: RulesAuthority>(
    rules: &R,
    sq: Square,
    color: Color,
    ignoring: Option<Square>,
) -> bool {
    let mut attackers = rules.attackers(sq, !color);
    if let Some(partner) = ignoring {
        attackers.discard(partner);
    }
    attackers.any()
}

/// Lovers never capture each other and never bring each other into check
fn respects_love<R: RulesAuthority>(rules: &R, emotions: &EmotionState, m: Move) -> bool {
    if let (Some(from), Some(victim)) = (m.from(), captured_square(m)) {
        if emotions.partner(from) == Some(victim) {
            return false;
        }
    }

    let turn = rules.turn();
    let Some(king) = rules.board().king_of(!turn) else {
        return true;
    };
    let Some(lover) = emotions.partner(king) else {
        return true;
    };
    let mut after = rules.clone();
    after.apply(m);
    let lover_to = landing(m, lover);
    if !after.attackers(king, turn).contains(lover_to) {
        return true;
    }
    // a standing attack the partner already had is not delivered by this move
    lover_to == lover && rules.attackers(king, turn).contains(lover)
}

fn moves_sad_piece(emotions: &EmotionState, m: Move) -> bool {
    match m {
        Move::Castle { king, rook } => emotions.is_sad(king) || emotions.is_sad(rook),
        _ => m.from().is_some_and(|from| emotions.is_sad(from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::emotion::{LovePair, Timers};
    use shakmaty::Chess;

    fn rules(fen: &str) -> Chess {
        <Chess as RulesAuthority>::from_fen(fen).unwrap()
    }

    fn emotions(pairs: &[(Square, Square)], angry: &[Square], sad: &[Square]) -> EmotionState {
        let mut anger = Timers::default();
        angry.iter().for_each(|&sq| anger.arm(sq));
        let mut sadness = Timers::default();
        sad.iter().for_each(|&sq| sadness.arm(sq));
        EmotionState::from_parts(
            pairs.iter().map(|&(x, y)| LovePair::new(x, y)).collect(),
            anger,
            sadness,
        )
    }

    fn has(moves: &[Move], from: Square, to: Square) -> bool {
        moves.iter().any(|m| m.from() == Some(from) && m.to() == to)
    }

    #[test]
    fn test_no_affect_means_base_moves() {
        let pos = Chess::default();
        let moves = legal_moves(&pos, &EmotionState::new());
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_lovers_cannot_capture_each_other() {
        let pos = rules("k7/8/8/8/3n4/2B5/8/7K w - - 0 1");
        assert!(has(&pos.base_moves(), Square::C3, Square::D4));
        let moves = legal_moves(&pos, &emotions(&[(Square::C3, Square::D4)], &[], &[]));
        assert!(!has(&moves, Square::C3, Square::D4));
        assert!(has(&moves, Square::C3, Square::B2));
    }

    #[test]
    fn test_partner_may_not_give_check() {
        let pos = rules("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[(Square::D5, Square::E8)], &[], &[]));
        assert!(!has(&moves, Square::D5, Square::C7));
        assert!(!has(&moves, Square::D5, Square::F6));
        assert!(has(&moves, Square::D5, Square::B4));
    }

    #[test]
    fn test_uncovering_partner_check_is_removed() {
        let pos = rules("4k3/8/2N5/1B6/8/8/8/4K3 w - - 0 1");
        assert!(has(&pos.base_moves(), Square::C6, Square::A5));
        let moves = legal_moves(&pos, &emotions(&[(Square::B5, Square::E8)], &[], &[]));
        assert!(!moves.iter().any(|m| m.from() == Some(Square::C6)));
        assert!(has(&moves, Square::E1, Square::E2));
    }

    #[test]
    fn test_piece_pinned_by_partner_may_move() {
        let pos = rules("k7/8/8/8/8/6b1/5N2/4K3 w - - 0 1");
        assert!(!pos.base_moves().iter().any(|m| m.from() == Some(Square::F2)));
        let lovers = emotions(&[(Square::E1, Square::G3)], &[], &[]);
        let moves = legal_moves(&pos, &lovers);
        for to in [Square::D1, Square::D3, Square::E4, Square::G4, Square::H1, Square::H3] {
            assert!(has(&moves, Square::F2, to), "missing f2{to}");
        }
        assert!(!in_check(&pos, &lovers, Color::White));
    }

    #[test]
    fn test_pinned_piece_may_capture_the_checker() {
        let pos = rules("k7/8/8/8/7r/5b2/5pN1/7K w - - 0 1");
        assert_eq!(
            status(&pos, &EmotionState::new()),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        let lovers = emotions(&[(Square::F3, Square::H1)], &[], &[]);
        let moves = legal_moves(&pos, &lovers);
        assert!(has(&moves, Square::G2, Square::H4));
        assert!(!has(&moves, Square::G2, Square::E3));
        assert_eq!(status(&pos, &lovers), GameStatus::Ongoing);
    }

    #[test]
    fn test_king_leaving_its_square_faces_its_partner() {
        let pos = rules("k7/8/8/8/8/3n4/8/4K3 w - - 0 1");
        let angry_lover = emotions(&[(Square::D3, Square::E1)], &[Square::E1], &[]);
        let moves = legal_moves(&pos, &angry_lover);
        assert!(!has(&moves, Square::E1, Square::F2));
        assert!(!has(&moves, Square::E1, Square::C1));
        for to in [Square::E3, Square::G1, Square::G3, Square::D2] {
            assert!(has(&moves, Square::E1, to), "missing e1{to}");
        }
    }

    #[test]
    fn test_standing_partner_attack_allows_other_moves() {
        let pos = rules("k7/8/8/8/3N4/6b1/8/4K3 b - - 1 1");
        let moves = legal_moves(&pos, &emotions(&[(Square::E1, Square::G3)], &[], &[]));
        assert!(has(&moves, Square::A8, Square::B7));
        assert!(has(&moves, Square::G3, Square::H2));
        assert!(!has(&moves, Square::G3, Square::H4));
        assert!(!has(&moves, Square::G3, Square::F2));
        assert!(!moves.iter().any(|m| m.to() == Square::E1));
    }

    #[test]
    fn test_angry_king_steps_two() {
        let pos = rules("k7/8/8/8/8/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[Square::E1], &[]));
        assert_eq!(moves.len(), 10);
        for to in [Square::E3, Square::C1, Square::G1, Square::G3, Square::C3] {
            assert!(has(&moves, Square::E1, to), "missing e1{to}");
        }
    }

    #[test]
    fn test_extension_must_keep_king_safe() {
        let pos = rules("k7/8/8/8/8/r7/8/4K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[Square::E1], &[]));
        assert!(!has(&moves, Square::E1, Square::E3));
        assert!(!has(&moves, Square::E1, Square::C3));
        assert!(has(&moves, Square::E1, Square::G1));
    }

    #[test]
    fn test_sliders_and_knights_gain_nothing() {
        let pos = rules("k7/8/8/8/8/8/8/RN2K2B w - - 0 1");
        let calm = legal_moves(&pos, &EmotionState::new());
        let angry = legal_moves(
            &pos,
            &emotions(&[], &[Square::A1, Square::B1, Square::H1], &[]),
        );
        assert_eq!(calm.len(), angry.len());
    }

    #[test]
    fn test_angry_pawn_pushes_further() {
        let pos = rules("k7/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[Square::E2], &[]));
        assert!(has(&moves, Square::E2, Square::E5));

        let blocked = rules("k7/8/8/8/4p3/8/4P3/4K3 w - - 0 1");
        let moves = legal_moves(&blocked, &emotions(&[], &[Square::E2], &[]));
        assert!(!has(&moves, Square::E2, Square::E5));
        assert!(has(&moves, Square::E2, Square::E3));
    }

    #[test]
    fn test_angry_pawn_promotes_on_extension() {
        let pos = rules("k7/8/4P3/8/8/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[Square::E6], &[]));
        let promotions = moves
            .iter()
            .filter(|m| m.from() == Some(Square::E6) && m.to() == Square::E8)
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn test_extension_never_captures_king() {
        let pos = rules("8/8/8/8/8/4k3/8/4K3 w - - 0 1");
        let moves = anger_extensions(&pos, &emotions(&[], &[Square::E1], &[]));
        assert!(!moves.iter().any(|m| m.to() == Square::E3));
    }

    #[test]
    fn test_sad_piece_is_frozen() {
        let pos = rules("k7/8/8/8/8/8/8/1N2K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[], &[Square::B1]));
        assert!(!moves.iter().any(|m| m.from() == Some(Square::B1)));
        assert!(has(&moves, Square::E1, Square::E2));
    }

    #[test]
    fn test_sad_piece_may_resolve_check() {
        let pos = rules("k3r3/8/8/8/8/8/8/2N1K3 w - - 0 1");
        let moves = legal_moves(&pos, &emotions(&[], &[], &[Square::C1]));
        assert!(has(&moves, Square::C1, Square::E2));
    }

    #[test]
    fn test_status() {
        let mate = rules("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(
            status(&mate, &EmotionState::new()),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        let stale = rules("k7/8/1Q6/8/8/8/8/7K b - - 0 1");
        assert_eq!(status(&stale, &EmotionState::new()), GameStatus::Stalemate);
        assert_eq!(
            status(&Chess::default(), &EmotionState::new()),
            GameStatus::Ongoing
        );
    }

    #[test]
    fn test_landing_follows_castling() {
        let castle = Move::Castle {
            king: Square::E1,
            rook: Square::H1,
        };
        assert_eq!(landing(castle, Square::E1), Square::G1);
        assert_eq!(landing(castle, Square::H1), Square::F1);
        assert_eq!(landing(castle, Square::A1), Square::A1);
    }
}
