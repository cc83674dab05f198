//! Game state model - the application layer over the emotional chess core.

use shakmaty::{Move, Square};
use tracing::info;

use crate::domain::notation::{self, check_suffix};
use crate::domain::{
    EmotionImpact, EmotionSummary, Evaluation, GameStatus, MoveNodeId, MoveTree, PlayedMove,
    Position, Weights, emfen, evaluation,
};
use crate::error::Result;

/// The main game model: a move tree of affect-augmented positions
pub struct EmotionalGame {
    tree: MoveTree,
    weights: Weights,
}

impl EmotionalGame {
    pub fn new() -> Self {
        Self::with_weights(Weights::default())
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self {
            tree: MoveTree::new(),
            weights,
        }
    }

    /// Start from an emFEN position instead of the initial one
    pub fn from_emfen(text: &str, weights: Weights) -> Result<Self> {
        let position = emfen::decode(text)?;
        Ok(Self {
            tree: MoveTree::from_position(position),
            weights,
        })
    }

    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    /// Get the currently viewed position
    pub fn current_position(&self) -> &Position {
        &self.tree.current().position
    }

    pub fn current_node_id(&self) -> MoveNodeId {
        self.tree.current_id()
    }

    /// Check if we're at a leaf node (can add new moves freely)
    pub fn is_at_leaf(&self) -> bool {
        self.tree.is_at_leaf()
    }

    pub fn is_at_root(&self) -> bool {
        self.tree.is_at_root()
    }

    pub fn go_to_node(&mut self, id: MoveNodeId) -> bool {
        self.tree.go_to(id)
    }

    pub fn go_to_start(&mut self) {
        self.tree.go_to_root();
    }

    pub fn go_to_end(&mut self) {
        self.tree.go_to_end();
    }

    pub fn go_back(&mut self) -> bool {
        self.tree.go_back()
    }

    pub fn go_forward(&mut self) -> bool {
        self.tree.go_forward()
    }

    /// Affect-filtered moves of the piece on `square`
    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.current_position().legal_moves(Some(square))
    }

    /// Play a move given as UCI or SAN text
    pub fn play(&mut self, text: &str) -> Result<MoveNodeId> {
        let m = notation::parse_move(self.current_position(), text)?;
        self.commit(m)
    }

    /// Try to move the piece on `from` to `to`. Returns true if successful.
    ///
    /// If the move already exists as a child of the current node, navigates
    /// to it. Otherwise, creates a new variation and navigates to it.
    pub fn try_move(&mut self, from: Square, to: Square) -> bool {
        match notation::move_between(self.current_position(), from, to) {
            Some(m) => self.commit(m).is_ok(),
            None => false,
        }
    }

    fn commit(&mut self, m: Move) -> Result<MoveNodeId> {
        let position = self.current_position();
        let san = notation::san(position, m);
        let uci = notation::uci(m);
        let (next, events) = position.commit_with_events(m)?;
        let san = format!("{san}{}", check_suffix(&next));

        info!(%uci, %san, summary = %next.emotion_summary(), "move played");
        let played = PlayedMove { uci, san, events };
        Ok(self.tree.add_move(next, played))
    }

    pub fn status(&self) -> GameStatus {
        self.current_position().status()
    }

    pub fn emotion_summary(&self) -> EmotionSummary {
        self.current_position().emotion_summary()
    }

    pub fn evaluation(&self) -> Evaluation {
        evaluation::evaluate_with(self.current_position(), &self.weights)
    }

    pub fn emotion_impact(&self) -> EmotionImpact {
        evaluation::emotion_impact(self.current_position())
    }

    pub fn to_emfen(&self) -> String {
        emfen::encode(self.current_position())
    }

    /// Moves of the main line with the affect they left behind
    pub fn main_line_display(&self) -> Vec<MoveDisplay> {
        self.tree
            .main_line()
            .into_iter()
            .filter_map(|id| self.move_display(id))
            .collect()
    }

    /// Moves from the start to the currently viewed node
    pub fn history(&self) -> Vec<MoveDisplay> {
        self.tree
            .path_to_current()
            .into_iter()
            .filter_map(|id| self.move_display(id))
            .collect()
    }

    /// Alternatives to the move at `node_id`, each followed to its end
    pub fn sibling_variations(&self, node_id: MoveNodeId) -> Vec<Vec<MoveDisplay>> {
        let Some(parent) = self
            .tree
            .get(node_id)
            .and_then(|node| node.parent_id)
            .and_then(|id| self.tree.get(id))
        else {
            return Vec::new();
        };

        parent
            .variation_children()
            .iter()
            .map(|&start| self.collect_variation_line(start))
            .collect()
    }

    /// Follow main-line continuations from `start_id`
    fn collect_variation_line(&self, start_id: MoveNodeId) -> Vec<MoveDisplay> {
        let mut moves = Vec::new();
        let mut current = Some(start_id);
        while let Some(id) = current {
            moves.extend(self.move_display(id));
            current = self.tree.get(id).and_then(|node| node.main_line_child());
        }
        moves
    }

    fn move_display(&self, node_id: MoveNodeId) -> Option<MoveDisplay> {
        let node = self.tree.get(node_id)?;
        let played = node.played.as_ref()?;
        let (move_num, is_black) = node.move_number(&self.tree);
        let has_sibling_variations = node
            .parent_id
            .and_then(|id| self.tree.get(id))
            .is_some_and(|parent| parent.has_variations());
        let status = node.position.status();

        Some(MoveDisplay {
            node_id,
            move_num,
            is_black,
            san: played.san.clone(),
            uci: played.uci.clone(),
            has_sibling_variations,
            is_check: node.position.in_check(),
            is_checkmate: matches!(status, GameStatus::Checkmate { .. }),
            summary: node.position.emotion_summary(),
            events: played.events.iter().map(ToString::to_string).collect(),
        })
    }
}

impl Default for EmotionalGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Display data for one played move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveDisplay {
    pub node_id: MoveNodeId,
    pub move_num: u32,
    pub is_black: bool,
    pub san: String,
    pub uci: String,
    /// Whether there are alternative moves (siblings) to this move
    pub has_sibling_variations: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    /// Affect counts after the move
    pub summary: EmotionSummary,
    pub events: Vec<String>,
}
