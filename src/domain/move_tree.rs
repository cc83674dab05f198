//! Move tree for emotional chess games with variations.
//!
//! Every node owns the full affect-augmented position reached after its
//! move, so navigating never has to replay the tracker.

use crate::domain::position::Position;
use crate::domain::tracker::EmotionEvent;

/// Unique identifier for a node in the move tree
pub type MoveNodeId = usize;

/// The move that led to a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    /// Coordinate notation, unique among siblings
    pub uci: String,
    /// SAN with check suffix
    pub san: String,
    /// Affect changes caused by the move
    pub events: Vec<EmotionEvent>,
}

/// A node in the move tree representing a position after a move
#[derive(Clone, Debug)]
pub struct MoveNode {
    pub id: MoveNodeId,
    /// Parent node ID (None for root)
    pub parent_id: Option<MoveNodeId>,
    pub position: Position,
    /// None for root
    pub played: Option<PlayedMove>,
    /// First child is the main line continuation, rest are variations
    pub children: Vec<MoveNodeId>,
}

impl MoveNode {
    fn root(position: Position) -> Self {
        Self {
            id: 0,
            parent_id: None,
            position,
            played: None,
            children: Vec::new(),
        }
    }

    fn new(id: MoveNodeId, parent_id: MoveNodeId, position: Position, played: PlayedMove) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            position,
            played: Some(played),
            children: Vec::new(),
        }
    }

    pub fn has_variations(&self) -> bool {
        self.children.len() > 1
    }

    /// Get the main line continuation (first child), if any
    pub fn main_line_child(&self) -> Option<MoveNodeId> {
        self.children.first().copied()
    }

    /// Get variation children (all children except the first)
    pub fn variation_children(&self) -> &[MoveNodeId] {
        self.children.get(1..).unwrap_or(&[])
    }

    /// Half-move count from the root. Root is ply 0
    pub fn ply(&self, tree: &MoveTree) -> usize {
        let mut count = 0;
        let mut current_id = self.id;
        while let Some(parent_id) = tree.get(current_id).and_then(|n| n.parent_id) {
            count += 1;
            current_id = parent_id;
        }
        count
    }

    /// Move number for display and whether black made the move.
    /// Taken from the position itself so games starting mid-way number correctly.
    pub fn move_number(&self, tree: &MoveTree) -> (u32, bool) {
        let Some(parent) = self.parent_id.and_then(|id| tree.get(id)) else {
            return (0, false);
        };
        (
            parent.position.fullmoves(),
            parent.position.turn().is_black(),
        )
    }
}

/// A tree of positions; the root is the starting position
#[derive(Clone, Debug)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
    /// The currently viewed node
    current_id: MoveNodeId,
}

impl MoveTree {
    /// Tree rooted at the standard starting position
    pub fn new() -> Self {
        Self::from_position(Position::default())
    }

    /// Tree rooted at an arbitrary position
    pub fn from_position(position: Position) -> Self {
        Self {
            nodes: vec![MoveNode::root(position)],
            current_id: 0,
        }
    }

    pub fn get(&self, id: MoveNodeId) -> Option<&MoveNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &MoveNode {
        &self.nodes[0]
    }

    /// Get the currently viewed node
    pub fn current(&self) -> &MoveNode {
        &self.nodes[self.current_id]
    }

    pub fn current_id(&self) -> MoveNodeId {
        self.current_id
    }

    /// Navigate to a specific node
    pub fn go_to(&mut self, id: MoveNodeId) -> bool {
        if id < self.nodes.len() {
            self.current_id = id;
            true
        } else {
            false
        }
    }

    pub fn go_to_root(&mut self) {
        self.current_id = 0;
    }

    /// Navigate to parent (go back one move)
    pub fn go_back(&mut self) -> bool {
        if let Some(parent_id) = self.current().parent_id {
            self.current_id = parent_id;
            true
        } else {
            false
        }
    }

    /// Navigate to main line child (go forward one move)
    pub fn go_forward(&mut self) -> bool {
        if let Some(child_id) = self.current().main_line_child() {
            self.current_id = child_id;
            true
        } else {
            false
        }
    }

    /// Navigate to the end of the main line from current position
    pub fn go_to_end(&mut self) {
        while self.go_forward() {}
    }

    pub fn is_at_root(&self) -> bool {
        self.current_id == 0
    }

    pub fn is_at_leaf(&self) -> bool {
        self.current().children.is_empty()
    }

    /// Add a move from the current node and navigate to it.
    ///
    /// A child reached by the same move already exists → navigate there
    /// instead of duplicating it.
    pub fn add_move(&mut self, position: Position, played: PlayedMove) -> MoveNodeId {
        let existing = self.nodes[self.current_id].children.iter().copied().find(|&id| {
            self.nodes
                .get(id)
                .and_then(|child| child.played.as_ref())
                .is_some_and(|p| p.uci == played.uci)
        });
        if let Some(child_id) = existing {
            self.current_id = child_id;
            return child_id;
        }

        let new_id = self.nodes.len();
        self.nodes
            .push(MoveNode::new(new_id, self.current_id, position, played));
        self.nodes[self.current_id].children.push(new_id);
        self.current_id = new_id;
        new_id
    }

    /// Node IDs of the main line, root first
    pub fn main_line(&self) -> Vec<MoveNodeId> {
        let mut line = vec![0];
        let mut current = &self.nodes[0];
        while let Some(child_id) = current.main_line_child() {
            line.push(child_id);
            current = &self.nodes[child_id];
        }
        line
    }

    /// Node IDs from the root to the current node
    pub fn path_to_current(&self) -> Vec<MoveNodeId> {
        let mut path = Vec::new();
        let mut id = Some(self.current_id);
        while let Some(node_id) = id {
            path.push(node_id);
            id = self.nodes[node_id].parent_id;
        }
        path.reverse();
        path
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}
