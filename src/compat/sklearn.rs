//! scikit-learn `DecisionTreeClassifier` import.
//!
//! Reads the parallel arrays of a fitted classifier's `tree_` attribute,
//! exported as JSON alongside `classes_`:
//!
//! ```json
//! {
//!   "children_left":  [1, -1, -1],
//!   "children_right": [2, -1, -1],
//!   "feature":        [0, -2, -2],
//!   "threshold":      [10.5, -2.0, -2.0],
//!   "value":          [[[3, 2]], [[3, 0]], [[0, 2]]],
//!   "classes":        [0, 1]
//! }
//! ```
//!
//! scikit-learn compares `x <= t` on real thresholds. On integer features
//! this is the same as `x <= floor(t)`, which is the threshold stored in the
//! converted tree.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::trees::{ClassLabel, DecisionTree, NodeId, TreeBuilder, TreeValidationError};

/// Error type for scikit-learn model conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("model has no nodes")]
    EmptyTree,
    #[error("array `{array}` has {len} entries, expected {expected}")]
    LengthMismatch {
        array: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("invalid node index: node {node} references child {child} but tree has {num_nodes} nodes")]
    InvalidNodeIndex {
        node: usize,
        child: i64,
        num_nodes: usize,
    },
    #[error("node {node} splits on invalid feature index {feature}")]
    InvalidFeature { node: usize, feature: i64 },
    #[error("node {node} has threshold {threshold}, which is not a non-negative integer-domain value")]
    InvalidThreshold { node: usize, threshold: f64 },
    #[error("leaf {node} has no class counts")]
    EmptyLeafValue { node: usize },
    #[error("leaf {node} has {n_counts} class counts but the model has {n_classes} classes")]
    ClassCountMismatch {
        node: usize,
        n_counts: usize,
        n_classes: usize,
    },
    #[error("class value {0} is not a label in 0..=u32::MAX")]
    InvalidClass(f64),
    #[error(transparent)]
    Structure(#[from] TreeValidationError),
    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The `tree_` arrays of a fitted `DecisionTreeClassifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SklearnTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per node: `[n_outputs][n_classes]` class weights. Only output 0 is used.
    pub value: Vec<Vec<Vec<f64>>>,
    /// `classes_` of the estimator, indexed by the class axis of `value`.
    pub classes: Vec<f64>,
}

impl SklearnTree {
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConversionError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn num_nodes(&self) -> usize {
        self.children_left.len()
    }

    /// Convert to a validated [`DecisionTree`] with the same node ids.
    pub fn to_tree(&self) -> Result<DecisionTree, ConversionError> {
        let num_nodes = self.num_nodes();
        if num_nodes == 0 {
            return Err(ConversionError::EmptyTree);
        }
        self.check_lengths()?;
        let classes = self
            .classes
            .iter()
            .map(|&c| class_label(c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = TreeBuilder::with_capacity(num_nodes);
        for node_idx in 0..num_nodes {
            let left = self.children_left[node_idx];
            let right = self.children_right[node_idx];

            // scikit-learn marks leaves with TREE_LEAF (-1) on both sides
            if left == right {
                builder.add_leaf(leaf_label(&self.value[node_idx], &classes, node_idx)?);
                continue;
            }

            let left = child_index(node_idx, left, num_nodes)?;
            let right = child_index(node_idx, right, num_nodes)?;
            let feature = u32::try_from(self.feature[node_idx]).map_err(|_| {
                ConversionError::InvalidFeature {
                    node: node_idx,
                    feature: self.feature[node_idx],
                }
            })?;
            let threshold = integer_threshold(node_idx, self.threshold[node_idx])?;
            builder.add_split(feature, threshold, left, right);
        }

        Ok(builder.build()?)
    }

    fn check_lengths(&self) -> Result<(), ConversionError> {
        let expected = self.num_nodes();
        let lengths = [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ];
        for (array, len) in lengths {
            if len != expected {
                return Err(ConversionError::LengthMismatch {
                    array,
                    len,
                    expected,
                });
            }
        }
        Ok(())
    }
}

fn child_index(node: usize, child: i64, num_nodes: usize) -> Result<NodeId, ConversionError> {
    match usize::try_from(child) {
        Ok(idx) if idx < num_nodes => Ok(idx as NodeId),
        _ => Err(ConversionError::InvalidNodeIndex {
            node,
            child,
            num_nodes,
        }),
    }
}

/// `x <= t` for integer `x` is `x <= floor(t)`.
fn integer_threshold(node: usize, threshold: f64) -> Result<u64, ConversionError> {
    // 2^64 is the first value past u64::MAX that f64 can represent
    const U64_END: f64 = 18_446_744_073_709_551_616.0;
    if !threshold.is_finite() || threshold < 0.0 || threshold >= U64_END {
        return Err(ConversionError::InvalidThreshold { node, threshold });
    }
    Ok(threshold.floor() as u64)
}

fn class_label(class: f64) -> Result<ClassLabel, ConversionError> {
    if class.fract() != 0.0 || class < 0.0 || class > u32::MAX as f64 {
        return Err(ConversionError::InvalidClass(class));
    }
    Ok(ClassLabel(class as u32))
}

/// Majority class of output 0; the first maximum wins ties.
fn leaf_label(
    value: &[Vec<f64>],
    classes: &[ClassLabel],
    node: usize,
) -> Result<ClassLabel, ConversionError> {
    let counts = value
        .first()
        .filter(|counts| !counts.is_empty())
        .ok_or(ConversionError::EmptyLeafValue { node })?;
    if counts.len() != classes.len() {
        return Err(ConversionError::ClassCountMismatch {
            node,
            n_counts: counts.len(),
            n_classes: classes.len(),
        });
    }
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = idx;
        }
    }
    Ok(classes[best])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::Node;

    fn stump() -> SklearnTree {
        SklearnTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![10.5, -2.0, -2.0],
            value: vec![vec![vec![3.0, 2.0]], vec![vec![3.0, 0.0]], vec![vec![0.0, 2.0]]],
            classes: vec![4.0, 7.0],
        }
    }

    #[test]
    fn converts_stump() {
        let tree = stump().to_tree().unwrap();
        assert_eq!(tree.n_nodes(), 3);
        let split = tree.node(0).split_condition().unwrap();
        assert_eq!(split.feature, 0);
        assert_eq!(split.threshold, 10);
        assert_eq!(tree.node(1), &Node::Leaf(ClassLabel(4)));
        assert_eq!(tree.node(2), &Node::Leaf(ClassLabel(7)));
        assert_eq!(tree.evaluate(&[10]), Some(ClassLabel(4)));
        assert_eq!(tree.evaluate(&[11]), Some(ClassLabel(7)));
    }

    #[test]
    fn first_maximum_wins_ties() {
        let mut model = stump();
        model.value[1] = vec![vec![2.0, 2.0]];
        let tree = model.to_tree().unwrap();
        assert_eq!(tree.node(1).label(), Some(ClassLabel(4)));
    }

    #[test]
    fn rejects_out_of_range_child() {
        let mut model = stump();
        model.children_right[0] = 3;
        assert!(matches!(
            model.to_tree(),
            Err(ConversionError::InvalidNodeIndex { node: 0, child: 3, .. })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut model = stump();
        model.threshold.pop();
        assert!(matches!(
            model.to_tree(),
            Err(ConversionError::LengthMismatch { array: "threshold", .. })
        ));
    }

    #[test]
    fn rejects_bad_thresholds_and_classes() {
        let mut model = stump();
        model.threshold[0] = -0.5;
        assert!(matches!(model.to_tree(), Err(ConversionError::InvalidThreshold { .. })));

        let mut model = stump();
        model.threshold[0] = f64::NAN;
        assert!(matches!(model.to_tree(), Err(ConversionError::InvalidThreshold { .. })));

        let mut model = stump();
        model.classes[1] = 1.5;
        assert!(matches!(model.to_tree(), Err(ConversionError::InvalidClass(_))));
    }

    #[test]
    fn structural_errors_are_reported() {
        let mut model = stump();
        model.children_left[0] = 0;
        assert!(matches!(
            model.to_tree(),
            Err(ConversionError::Structure(TreeValidationError::SelfLoop { node: 0 }))
        ));
    }

    #[test]
    fn parses_json() {
        let json = r#"{
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [1, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [[[1, 1]], [[1, 0]], [[0, 1]]],
            "classes": [0, 1]
        }"#;
        let tree = SklearnTree::from_json_reader(json.as_bytes())
            .unwrap()
            .to_tree()
            .unwrap();
        assert_eq!(tree.node(0).split_condition().unwrap().threshold, 0);
    }
}
