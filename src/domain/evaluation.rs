//! Static evaluation: material balance plus affect bonuses and penalties.
//! Positive scores favor white.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shakmaty::{Color, Role};

use crate::domain::position::Position;
use crate::domain::rules::RulesAuthority;

/// Piece values and affect weights
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Weights {
    pub pawn: i32,
    pub knight: i32,
    pub bishop: i32,
    pub rook: i32,
    pub queen: i32,
    pub king: i32,
    /// Per pairing, regardless of side
    pub love_bonus: i32,
    /// Per angry piece, white minus black
    pub anger_bonus: i32,
    /// Per sad piece, white minus black, subtracted
    pub sad_penalty: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
            king: 20000,
            love_bonus: 30,
            anger_bonus: 10,
            sad_penalty: 25,
        }
    }
}

impl Weights {
    pub fn piece_value(&self, role: Role) -> i32 {
        match role {
            Role::Pawn => self.pawn,
            Role::Knight => self.knight,
            Role::Bishop => self.bishop,
            Role::Rook => self.rook,
            Role::Queen => self.queen,
            Role::King => self.king,
        }
    }
}

/// Score with its components; `total = material + love_bonus + anger_bonus - sad_penalty`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Evaluation {
    pub total: i32,
    pub material: i32,
    pub love_bonus: i32,
    pub anger_bonus: i32,
    pub sad_penalty: i32,
}

/// Affect counts for one side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SideImpact {
    /// Pieces of this side in a pairing
    pub love: usize,
    pub anger: usize,
    pub sad: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionImpact {
    pub white: SideImpact,
    pub black: SideImpact,
}

impl EmotionImpact {
    pub fn side(&self, color: Color) -> &SideImpact {
        color.fold_wb(&self.white, &self.black)
    }
}

/// Evaluate with the default weights
pub fn evaluate<R: RulesAuthority>(position: &Position<R>) -> Evaluation {
    evaluate_with(position, &Weights::default())
}

pub fn evaluate_with<R: RulesAuthority>(position: &Position<R>, weights: &Weights) -> Evaluation {
    let material: i32 = position
        .board()
        .iter()
        .map(|(_, piece)| {
            let value = weights.piece_value(piece.role);
            piece.color.fold_wb(value, -value)
        })
        .sum();

    let impact = emotion_impact(position);
    let pairs = position.emotion_summary().love_pairs as i32;
    let love_bonus = weights.love_bonus * pairs;
    let anger_bonus =
        weights.anger_bonus * (impact.white.anger as i32 - impact.black.anger as i32);
    let sad_penalty = weights.sad_penalty * (impact.white.sad as i32 - impact.black.sad as i32);

    Evaluation {
        total: material + love_bonus + anger_bonus - sad_penalty,
        material,
        love_bonus,
        anger_bonus,
        sad_penalty,
    }
}

/// Per-side breakdown of who is in love, angry or sad
pub fn emotion_impact<R: RulesAuthority>(position: &Position<R>) -> EmotionImpact {
    let board = position.board();
    let emotions = position.emotions();
    let side = |color: Color| SideImpact {
        love: (emotions.paired_squares() & board.by_color(color)).count(),
        anger: emotions.anger().count_for(board, color),
        sad: emotions.sadness().count_for(board, color),
    };
    EmotionImpact {
        white: side(Color::White),
        black: side(Color::Black),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::emfen::decode;

    #[test]
    fn test_start_position_is_balanced() {
        let position: Position = Position::default();
        let eval = evaluate(&position);
        assert_eq!(
            eval,
            Evaluation {
                total: 0,
                material: 0,
                love_bonus: 0,
                anger_bonus: 0,
                sad_penalty: 0
            }
        );
    }

    #[test]
    fn test_affect_terms() {
        // white: K, B(c3, sad), N(b2, angry); black: k(angry), b(e5)
        let position =
            decode("k7/8/8/4b3/8/2B5/1N6/6K1 b - - 1 1 | L: c3-e5 | A: a8,b2,g1 | S: c3")
                .unwrap();
        let eval = evaluate(&position);
        assert_eq!(eval.material, 320);
        assert_eq!(eval.love_bonus, 30);
        assert_eq!(eval.anger_bonus, 10);
        assert_eq!(eval.sad_penalty, 25);
        assert_eq!(eval.total, 320 + 30 + 10 - 25);

        let impact = emotion_impact(&position);
        assert_eq!(
            impact.white,
            SideImpact {
                love: 1,
                anger: 2,
                sad: 1
            }
        );
        assert_eq!(impact.side(Color::Black).anger, 1);
        assert_eq!(impact.side(Color::Black).love, 1);
    }

    #[test]
    fn test_custom_weights() {
        let position = decode("k7/8/8/4b3/8/2B5/8/6K1 b - - 1 1 | L: c3-e5").unwrap();
        let weights = Weights {
            love_bonus: 100,
            ..Weights::default()
        };
        assert_eq!(evaluate_with(&position, &weights).total, 100);
    }

    #[test]
    fn test_evaluation_serializes() {
        let position: Position = Position::default();
        let json = serde_json::to_value(evaluate(&position)).unwrap();
        assert_eq!(json["total"], 0);
        assert!(json.get("sad_penalty").is_some());
    }
}
