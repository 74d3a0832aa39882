//! Tree node types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureId;

use super::NodeId;

/// Classification result stored in leaves and carried by rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(pub u32);

impl From<u32> for ClassLabel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ClassLabel> for u32 {
    fn from(label: ClassLabel) -> Self {
        label.0
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split condition for a decision node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCondition {
    /// Feature the split tests
    pub feature: FeatureId,
    /// Go left if `feature <= threshold`, right otherwise
    pub threshold: u64,
}

impl SplitCondition {
    pub fn new(feature: FeatureId, threshold: u64) -> Self {
        Self { feature, threshold }
    }

    /// Returns true for left, false for right.
    #[inline]
    pub fn go_left(&self, value: u64) -> bool {
        value <= self.threshold
    }
}

/// A node in a decision tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Internal split node
    Split {
        condition: SplitCondition,
        left: NodeId,
        right: NodeId,
    },
    /// Leaf node with a class
    Leaf(ClassLabel),
}

impl Node {
    pub fn split(condition: SplitCondition, left: NodeId, right: NodeId) -> Self {
        Self::Split {
            condition,
            left,
            right,
        }
    }

    pub fn leaf(label: ClassLabel) -> Self {
        Self::Leaf(label)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Get the class, if this is a leaf.
    #[inline]
    pub fn label(&self) -> Option<ClassLabel> {
        match self {
            Self::Leaf(label) => Some(*label),
            Self::Split { .. } => None,
        }
    }

    /// Get the split condition, if this is a split node.
    #[inline]
    pub fn split_condition(&self) -> Option<&SplitCondition> {
        match self {
            Self::Split { condition, .. } => Some(condition),
            Self::Leaf(_) => None,
        }
    }

    /// Get child indices, if this is a split node.
    #[inline]
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Self::Split { left, right, .. } => Some((*left, *right)),
            Self::Leaf(_) => None,
        }
    }
}
