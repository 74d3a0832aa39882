//! Testing utilities for dtree-tcam.
//!
//! Assertion helpers for rule sets and block decompositions, usable from
//! unit tests, integration tests and benchmarks.
//!
//! ```
//! use dtree_tcam::compile::compile;
//! use dtree_tcam::domain::{FeatureDomain, FeatureDomains};
//! use dtree_tcam::testing::assert_single_match;
//! use dtree_tcam::trees::{ClassLabel, TreeBuilder};
//!
//! let domains = FeatureDomains::new(vec![FeatureDomain::full("x", 3).unwrap()]);
//! let mut builder = TreeBuilder::new();
//! builder.add_split(0, 2, 1, 2);
//! builder.add_leaf(ClassLabel(0));
//! builder.add_leaf(ClassLabel(1));
//! let tree = builder.build().unwrap();
//!
//! let output = compile(&tree, &domains).unwrap();
//! assert_eq!(assert_single_match(&output.rules, &[5]).label(), ClassLabel(1));
//! ```

use crate::compile::Rule;
use crate::domain::{FeatureDomains, Field};
use crate::ternary::TernaryBlock;

// =============================================================================
// Rule set assertions
// =============================================================================

/// All rules matching `point`, in sequence order.
pub fn matching_rules<'a>(rules: &'a [Rule], point: &[u64]) -> Vec<&'a Rule> {
    rules.iter().filter(|rule| rule.matches(point)).collect()
}

/// Assert that exactly one rule matches `point` and return it.
///
/// # Panics
///
/// Panics if zero or several rules match.
#[track_caller]
pub fn assert_single_match<'a>(rules: &'a [Rule], point: &[u64]) -> &'a Rule {
    let matches = matching_rules(rules, point);
    match matches.as_slice() {
        [rule] => *rule,
        [] => panic!("no rule matches point {point:?}"),
        many => panic!(
            "{} rules match point {point:?}; priorities {:?}",
            many.len(),
            many.iter().map(|r| r.priority()).collect::<Vec<_>>()
        ),
    }
}

/// Assert that every point of a small domain is matched by exactly one rule.
///
/// Enumerates the full Cartesian product of the domain ranges, so only use it
/// on domains of a few thousand points.
#[track_caller]
pub fn assert_partitions_domain(rules: &[Rule], domains: &FeatureDomains) {
    let ranges: Vec<_> = domains.iter().map(|d| d.range()).collect();
    let mut point: Vec<u64> = ranges.iter().map(|r| r.lo()).collect();
    loop {
        assert_single_match(rules, &point);

        // Odometer step, last feature fastest.
        let mut i = ranges.len();
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if point[i] < ranges[i].hi() {
                point[i] += 1;
                break;
            }
            point[i] = ranges[i].lo();
        }
    }
}

/// Assert that priorities strictly increase along the sequence.
#[track_caller]
pub fn assert_priorities_increasing(rules: &[Rule]) {
    for pair in rules.windows(2) {
        assert!(
            pair[0].priority() < pair[1].priority(),
            "priority {} followed by {}",
            pair[0].priority(),
            pair[1].priority()
        );
    }
}

// =============================================================================
// Block assertions
// =============================================================================

/// Assert that `blocks` are aligned, ascending, and cover exactly `[lo, hi]`.
#[track_caller]
pub fn assert_exact_cover(blocks: &[TernaryBlock], field: Field, lo: u64, hi: u64) {
    assert!(!blocks.is_empty(), "no blocks for [{lo}, {hi}]");
    assert_eq!(blocks[0].first(), lo, "cover starts at {}", blocks[0].first());
    let mut expected = lo;
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.bits(), field.bits(), "block {i} has width {}", block.bits());
        assert_eq!(block.value() & !block.mask(), 0, "block {i} ({block}) is not aligned");
        assert_eq!(block.first(), expected, "gap or overlap before block {i} ({block})");
        if i + 1 < blocks.len() {
            expected = block.last() + 1;
        } else {
            assert_eq!(block.last(), hi, "cover ends at {}", block.last());
        }
    }
}
