//! Decision tree arena, builder and structural validation.

use serde::{Deserialize, Serialize};

use crate::domain::FeatureId;

use super::node::{ClassLabel, Node, SplitCondition};
use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`DecisionTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node} has {side} child {child}, but the tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },
    #[error("node {node} is not reachable from the root")]
    UnreachableNode { node: NodeId },
}

// ============================================================================
// DecisionTree
// ============================================================================

/// Validated decision tree stored as an arena of nodes.
///
/// Node 0 is the root. Every split node owns exactly two children and every
/// node except the root has exactly one parent, so the arena is a strict
/// binary tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTree", into = "RawTree")]
pub struct DecisionTree {
    nodes: Box<[Node]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTree {
    nodes: Vec<Node>,
}

impl TryFrom<RawTree> for DecisionTree {
    type Error = TreeValidationError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        Self::from_nodes(raw.nodes)
    }
}

impl From<DecisionTree> for RawTree {
    fn from(tree: DecisionTree) -> Self {
        Self {
            nodes: tree.nodes.into_vec(),
        }
    }
}

impl DecisionTree {
    /// Build a tree from its nodes, validating the structure.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, TreeValidationError> {
        let tree = Self {
            nodes: nodes.into_boxed_slice(),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match self.node(node).children() {
                Some((left, right)) => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
                None => max_depth = max_depth.max(depth),
            }
        }
        max_depth
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Iterate split nodes with their ids.
    pub fn splits(&self) -> impl Iterator<Item = (NodeId, &SplitCondition)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.split_condition().map(|c| (i as NodeId, c)))
    }

    /// Leaf reached by `point`, or `None` if a tested feature is missing from it.
    pub fn leaf_for(&self, point: &[u64]) -> Option<NodeId> {
        let mut idx = self.root();
        while let Node::Split {
            condition,
            left,
            right,
        } = self.node(idx)
        {
            let value = *point.get(condition.feature as usize)?;
            idx = if condition.go_left(value) { *left } else { *right };
        }
        Some(idx)
    }

    /// Classify `point` by walking the tree.
    pub fn evaluate(&self, point: &[u64]) -> Option<ClassLabel> {
        self.leaf_for(point).and_then(|leaf| self.node(leaf).label())
    }

    /// Validate basic structural invariants for this tree.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(self.root(), 0)];

        while let Some((node, phase)) = stack.pop() {
            let node_usize = node as usize;

            if phase == 1 {
                color[node_usize] = 2;
                continue;
            }

            match color[node_usize] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }

            color[node_usize] = 1;
            stack.push((node, 1));

            if let Some((left, right)) = self.nodes[node_usize].children() {
                if left == node || right == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                for (side, child) in [("left", left), ("right", right)] {
                    if child as usize >= n_nodes {
                        return Err(TreeValidationError::ChildOutOfBounds {
                            node,
                            side,
                            child,
                            n_nodes,
                        });
                    }
                }

                // Visit children
                stack.push((right, 0));
                stack.push((left, 0));
            }
        }

        match color.iter().position(|&c| c == 0) {
            Some(i) => Err(TreeValidationError::UnreachableNode { node: i as NodeId }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Builder for constructing a [`DecisionTree`] node by node.
///
/// Nodes get consecutive ids in insertion order; the first node added is the
/// root. Children may be referenced before they are added, or reserved up
/// front with [`reserve`](Self::reserve) and filled in later.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a split node. Returns the node index.
    pub fn add_split(
        &mut self,
        feature: FeatureId,
        threshold: u64,
        left: NodeId,
        right: NodeId,
    ) -> NodeId {
        self.push(Node::split(SplitCondition::new(feature, threshold), left, right))
    }

    /// Add a leaf node. Returns the node index.
    pub fn add_leaf(&mut self, label: ClassLabel) -> NodeId {
        self.push(Node::Leaf(label))
    }

    /// Reserve a node id to be filled by [`set_split`](Self::set_split) or
    /// [`set_leaf`](Self::set_leaf).
    pub fn reserve(&mut self) -> NodeId {
        self.push(Node::Leaf(ClassLabel::default()))
    }

    /// Turn a previously added node into a split.
    pub fn set_split(
        &mut self,
        node: NodeId,
        feature: FeatureId,
        threshold: u64,
        left: NodeId,
        right: NodeId,
    ) {
        self.nodes[node as usize] = Node::split(SplitCondition::new(feature, threshold), left, right);
    }

    /// Turn a previously added node into a leaf.
    pub fn set_leaf(&mut self, node: NodeId, label: ClassLabel) {
        self.nodes[node as usize] = Node::Leaf(label);
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let idx = self.nodes.len() as NodeId;
        self.nodes.push(node);
        idx
    }

    /// Validate and freeze the tree.
    pub fn build(self) -> Result<DecisionTree, TreeValidationError> {
        DecisionTree::from_nodes(self.nodes)
    }
}
