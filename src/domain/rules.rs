//! Narrow capability interface onto the standard chess rules.
//!
//! The affect engine never generates base moves or decides base legality
//! itself; it asks a [`RulesAuthority`] and layers its own rules on top.
//! [`shakmaty::Chess`] is the stock implementation.

use std::fmt;
use std::num::NonZeroU32;

use shakmaty::fen::Fen;
use shakmaty::{
    Bitboard, Board, CastlingMode, CastlingSide, Chess, Color, EnPassantMode, Move, Position,
    PositionError, PositionErrorKinds, Role, Setup, Square, attacks,
};

use crate::domain::chess::{forward, pawn_home_rank, promotion_rank, step};
use crate::error::{Error, Result, ValidationError};

/// Standard chess rules as consumed by the affect engine
pub trait RulesAuthority: Clone + fmt::Debug + Sized {
    /// Parse a base FEN string
    fn from_fen(fen: &str) -> Result<Self>;

    /// Render the base FEN string
    fn to_fen(&self) -> String;

    fn board(&self) -> &Board;

    fn turn(&self) -> Color;

    fn halfmoves(&self) -> u32;

    fn fullmoves(&self) -> u32;

    /// Standard legal moves for the side to move
    fn base_moves(&self) -> Vec<Move>;

    /// Moves that follow piece movement and castling rights but ignore
    /// whether the mover's king is left attacked. Kings are never captured.
    fn pseudo_moves(&self) -> Vec<Move>;

    /// Play a move the caller has already validated. No legality re-check
    /// happens here, so moves granted by affect can be applied too.
    fn apply(&mut self, m: Move);

    /// Pieces of `by` attacking `square` on the current board
    fn attackers(&self, square: Square, by: Color) -> Bitboard {
        let board = self.board();
        board.attacks_to(square, by, board.occupied())
    }
}

impl RulesAuthority for Chess {
    fn from_fen(fen: &str) -> Result<Self> {
        let setup = Fen::from_ascii(fen.as_bytes())
            .map_err(|e| Error::MalformedInput(format!("bad base FEN '{fen}': {e}")))?
            .into_setup();
        match setup
            .clone()
            .position::<Chess>(CastlingMode::Standard)
            .or_else(PositionError::ignore_impossible_check)
        {
            Ok(pos) => Ok(pos),
            Err(err)
                if err.kinds().difference(PositionErrorKinds::IMPOSSIBLE_CHECK)
                    == PositionErrorKinds::OPPOSITE_CHECK =>
            {
                replay_last_move(&setup)
                    .ok_or_else(|| ValidationError::IllegalBasePosition(err.to_string()).into())
            }
            Err(err) => Err(ValidationError::IllegalBasePosition(err.to_string()).into()),
        }
    }

    fn to_fen(&self) -> String {
        Fen::from_position(self, EnPassantMode::Legal).to_string()
    }

    fn board(&self) -> &Board {
        Position::board(self)
    }

    fn turn(&self) -> Color {
        Position::turn(self)
    }

    fn halfmoves(&self) -> u32 {
        Position::halfmoves(self)
    }

    fn fullmoves(&self) -> u32 {
        Position::fullmoves(self).get()
    }

    fn base_moves(&self) -> Vec<Move> {
        self.legal_moves().into_iter().collect()
    }

    fn pseudo_moves(&self) -> Vec<Move> {
        let board = Position::board(self);
        let turn = Position::turn(self);
        let occupied = board.occupied();
        let ours = board.by_color(turn);
        let targets = !ours & !board.kings();
        let mut moves = Vec::new();

        for from in ours & !board.pawns() {
            let Some(role) = board.role_at(from) else {
                continue;
            };
            for to in board.attacks_from(from) & targets {
                moves.push(Move::Normal {
                    role,
                    from,
                    capture: board.role_at(to),
                    to,
                    promotion: None,
                });
            }
        }

        for from in ours & board.pawns() {
            let mut destinations = attacks::pawn_attacks(turn, from) & targets & occupied;
            if let Some(one) = step(from, 0, forward(turn)).filter(|&sq| !occupied.contains(sq)) {
                destinations.add(one);
                if from.rank() == pawn_home_rank(turn) {
                    if let Some(two) =
                        step(one, 0, forward(turn)).filter(|&sq| !occupied.contains(sq))
                    {
                        destinations.add(two);
                    }
                }
            }
            for to in destinations {
                let capture = board.role_at(to);
                if to.rank() == promotion_rank(turn) {
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
                        role: Role::Pawn,
                        from,
                        capture,
                        to,
                        promotion: None,
                    });
                }
            }
        }

        if let Some(to) = self.ep_square(EnPassantMode::PseudoLegal) {
            for from in attacks::pawn_attacks(!turn, to) & ours & board.pawns() {
                moves.push(Move::EnPassant { from, to });
            }
        }

        if let Some(king) = board.king_of(turn) {
            let castles = self.castles();
            for side in CastlingSide::ALL {
                if let Some(rook) = castles.rook(turn, side) {
                    if (castles.path(turn, side) & occupied).is_empty() {
                        moves.push(Move::Castle { king, rook });
                    }
                }
            }
        }

        moves
    }

    fn apply(&mut self, m: Move) {
        self.play_unchecked(m);
    }
}

/// Build a position in which the side that just moved left its own king
/// attacked. The base rules refuse such a setup outright, so the position
/// before the last move is rebuilt and that move replayed: the double pawn
/// push when an en passant square is given, otherwise a piece dropped back
/// onto its square.
fn replay_last_move(setup: &Setup) -> Option<Chess> {
    let mover = !setup.turn;
    let mut before = setup.clone();
    before.turn = mover;
    before.ep_square = None;
    if mover.is_black() {
        before.fullmoves = NonZeroU32::new(setup.fullmoves.get() - 1)?;
    }

    if let Some(ep) = setup.ep_square {
        let from = step(ep, 0, -forward(mover))?;
        let to = step(ep, 0, forward(mover))?;
        if before.board.occupied().contains(from) {
            return None;
        }
        let pawn = before
            .board
            .remove_piece_at(to)
            .filter(|&piece| piece == mover.pawn())?;
        before.board.set_piece_at(from, pawn);
        let mut pos = rebuild(before)?;
        pos.play_unchecked(Move::Normal {
            role: Role::Pawn,
            from,
            capture: None,
            to,
            promotion: None,
        });
        return Some(pos);
    }

    // dropping a pawn resets the halfmove clock, any other piece advances it
    let zeroing = setup.halfmoves == 0;
    before.halfmoves = setup.halfmoves.saturating_sub(1);
    let candidates = setup.board.by_color(mover) & !setup.board.kings() & !setup.castling_rights;
    candidates
        .into_iter()
        .filter(|&sq| (setup.board.role_at(sq) == Some(Role::Pawn)) == zeroing)
        .find_map(|sq| {
            let role = setup.board.role_at(sq)?;
            let mut before = before.clone();
            before.board.discard_piece_at(sq);
            let mut pos = rebuild(before)?;
            pos.play_unchecked(Move::Put { role, to: sq });
            Some(pos)
        })
}

fn rebuild(setup: Setup) -> Option<Chess> {
    setup
        .position::<Chess>(CastlingMode::Standard)
        .or_else(PositionError::ignore_impossible_check)
        .ok()
}
