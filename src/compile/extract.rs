//! Leaf region extraction.
//!
//! Walks the tree depth-first, `<=` branch before `>` branch, tightening one
//! feature bound per split. Each branch gets its own copy of the bounds, so
//! sibling subtrees never see each other's constraints. At a leaf the bounds
//! are intersected with the declared feature domains.

use crate::domain::{FeatureDomains, Interval};
use crate::error::CompileError;
use crate::trees::{ClassLabel, DecisionTree, Node, NodeId, SplitCondition};

/// The hyper-rectangle of feature values that reaches one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRegion {
    leaf: NodeId,
    label: ClassLabel,
    /// One interval per feature, in domain table order
    intervals: Vec<Interval>,
}

impl LeafRegion {
    #[inline]
    pub fn leaf(&self) -> NodeId {
        self.leaf
    }

    #[inline]
    pub fn label(&self) -> ClassLabel {
        self.label
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Whether `point` lies in the region.
    pub fn contains(&self, point: &[u64]) -> bool {
        point.len() == self.intervals.len()
            && self.intervals.iter().zip(point).all(|(iv, &v)| iv.contains(v))
    }
}

/// Result of [`extract_regions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Regions of reachable leaves, in depth-first order.
    pub regions: Vec<LeafRegion>,
    /// Leaves whose path constraints (or the feature domains) leave no value.
    pub unreachable: Vec<NodeId>,
}

/// Per-feature bounds accumulated along a path. `None` once a branch empties a feature.
type PathBounds = Option<Vec<Interval>>;

/// Derive the region of every leaf of `tree`.
///
/// # Errors
///
/// [`CompileError::UndeclaredFeature`] if any split, reachable or not,
/// tests a feature outside `domains`.
pub fn extract_regions(
    tree: &DecisionTree,
    domains: &FeatureDomains,
) -> Result<Extraction, CompileError> {
    check_features(tree, domains)?;

    let initial: Vec<Interval> = domains.iter().map(|d| d.field().full_interval()).collect();
    let mut extraction = Extraction::default();

    // Right is pushed first so the left subtree is finished before it.
    let mut stack: Vec<(NodeId, PathBounds)> = vec![(tree.root(), Some(initial))];
    while let Some((node, bounds)) = stack.pop() {
        match tree.node(node) {
            Node::Leaf(label) => match bounds.and_then(|b| close_region(b, domains)) {
                Some(intervals) => extraction.regions.push(LeafRegion {
                    leaf: node,
                    label: *label,
                    intervals,
                }),
                None => extraction.unreachable.push(node),
            },
            Node::Split {
                condition,
                left,
                right,
            } => {
                let (left_bounds, right_bounds) = match bounds {
                    Some(b) => split_bounds(b, condition),
                    None => (None, None),
                };
                stack.push((*right, right_bounds));
                stack.push((*left, left_bounds));
            }
        }
    }

    Ok(extraction)
}

fn check_features(tree: &DecisionTree, domains: &FeatureDomains) -> Result<(), CompileError> {
    match tree
        .splits()
        .find(|(_, c)| domains.get(c.feature).is_none())
    {
        Some((node, condition)) => Err(CompileError::UndeclaredFeature {
            node,
            feature: condition.feature,
            n_features: domains.len(),
        }),
        None => Ok(()),
    }
}

/// Bounds for the `<=` and `>` children of a split.
fn split_bounds(bounds: Vec<Interval>, condition: &SplitCondition) -> (PathBounds, PathBounds) {
    let feature = condition.feature as usize;
    let current = bounds[feature];

    let left = Interval::new(current.lo(), current.hi().min(condition.threshold))
        .ok()
        .map(|tightened| {
            let mut b = bounds.clone();
            b[feature] = tightened;
            b
        });

    // `threshold + 1` overflowing means nothing is greater than the threshold.
    let right = condition
        .threshold
        .checked_add(1)
        .and_then(|above| Interval::new(current.lo().max(above), current.hi()).ok())
        .map(|tightened| {
            let mut b = bounds;
            b[feature] = tightened;
            b
        });

    (left, right)
}

fn close_region(bounds: Vec<Interval>, domains: &FeatureDomains) -> Option<Vec<Interval>> {
    bounds
        .into_iter()
        .zip(domains)
        .map(|(b, d)| b.intersect(d.range()))
        .collect()
}
