//! Decision tree data structures.
//!
//! Trees are arenas of [`Node`]s indexed by [`NodeId`], rooted at node 0.
//! Splits send `feature <= threshold` left and `feature > threshold` right.

/// Index of a node in a [`DecisionTree`].
pub type NodeId = u32;

pub mod node;
pub mod tree;

pub use node::{ClassLabel, Node, SplitCondition};
pub use tree::{DecisionTree, TreeBuilder, TreeValidationError};
