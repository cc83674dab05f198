//! Board geometry helpers shared by the affect tracker and move filter.
//! Pure functions over shakmaty vocabulary types.

use shakmaty::{Bitboard, Board, Color, File, Rank, Role, Square};

use crate::error::{Error, Result};

/// Chebyshev distance between two squares
pub fn distance(a: Square, b: Square) -> u32 {
    a.distance(b)
}

/// All squares within Chebyshev distance `radius` of `center`, center included
pub fn within(center: Square, radius: u32) -> Bitboard {
    let r = radius as i32;
    let mut area = Bitboard::EMPTY;
    for df in -r..=r {
        for dr in -r..=r {
            if let Some(sq) = step(center, df, dr) {
                area.add(sq);
            }
        }
    }
    area
}

/// Shift a square by file/rank deltas, `None` when it leaves the board
pub fn step(sq: Square, df: i32, dr: i32) -> Option<Square> {
    let file = sq.file().offset(df)?;
    let rank = sq.rank().offset(dr)?;
    Some(Square::from_coords(file, rank))
}

/// Rank direction pawns of `color` advance in
pub fn forward(color: Color) -> i32 {
    color.fold_wb(1, -1)
}

/// Rank pawns of `color` start on
pub fn pawn_home_rank(color: Color) -> Rank {
    color.fold_wb(Rank::Second, Rank::Seventh)
}

/// Rank on which pawns of `color` promote
pub fn promotion_rank(color: Color) -> Rank {
    color.fold_wb(Rank::Eighth, Rank::First)
}

/// Unit directions a piece moves along. Pawns report their push direction only
pub fn directions(role: Role, color: Color) -> &'static [(i32, i32)] {
    const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    const ALL: [(i32, i32); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    const WHITE_PAWN: [(i32, i32); 1] = [(0, 1)];
    const BLACK_PAWN: [(i32, i32); 1] = [(0, -1)];
    match role {
        Role::Pawn if color.is_white() => &WHITE_PAWN,
        Role::Pawn => &BLACK_PAWN,
        Role::Rook => &ORTHOGONAL,
        Role::Bishop => &DIAGONAL,
        Role::Queen | Role::King => &ALL,
        Role::Knight => &[],
    }
}

/// Whether the king on `sq` is attacked by an enemy other than `ignoring`.
/// Non-king squares are never in check.
pub fn king_attacked(board: &Board, sq: Square, ignoring: Option<Square>) -> bool {
    let Some(piece) = board.piece_at(sq) else {
        return false;
    };
    if piece.role != Role::King {
        return false;
    }
    let mut attackers = board.attacks_to(sq, !piece.color, board.occupied());
    if let Some(partner) = ignoring {
        attackers.discard(partner);
    }
    attackers.any()
}

/// Parse a lowercase algebraic square such as "e4"
pub fn parse_square(text: &str) -> Result<Square> {
    text.parse::<Square>()
        .map_err(|_| Error::MalformedInput(format!("bad square '{text}'")))
}

/// Destination of the king when castling with the rook on `rook`
pub fn castle_king_target(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() { File::G } else { File::C };
    Square::from_coords(file, king.rank())
}

/// Destination of the rook when castling with the rook on `rook`
pub fn castle_rook_target(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() { File::F } else { File::D };
    Square::from_coords(file, king.rank())
}
