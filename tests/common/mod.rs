//! Shared helpers for integration tests.
//!
//! Random trees and domains for property tests, and fixture loading. For
//! assertion helpers, use `dtree_tcam::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;

use dtree_tcam::domain::{FeatureDomain, FeatureDomains};
use dtree_tcam::trees::{ClassLabel, DecisionTree, NodeId, TreeBuilder};

// Re-export testing utilities for convenience
#[allow(unused_imports)]
pub use dtree_tcam::testing::{
    assert_exact_cover, assert_partitions_domain, assert_priorities_increasing,
    assert_single_match, matching_rules,
};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Base directory for test cases.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// Directory for scikit-learn test cases.
pub fn sklearn_test_cases_dir() -> PathBuf {
    test_cases_dir().join("sklearn")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

// =============================================================================
// Random Trees
// =============================================================================

/// Random domain table: `n_features` features of 1 to `max_bits` bits with a
/// random `[min, max]` sub-range.
pub fn random_domains(rng: &mut StdRng, n_features: usize, max_bits: u8) -> FeatureDomains {
    let features = (0..n_features)
        .map(|i| {
            let bits = rng.gen_range(1..=max_bits);
            let top = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
            let a = rng.gen_range(0..=top);
            let b = rng.gen_range(0..=top);
            FeatureDomain::new(format!("f{i}"), bits, a.min(b), a.max(b)).unwrap()
        })
        .collect();
    FeatureDomains::new(features)
}

/// Random tree over `domains` with depth at most `max_depth`.
///
/// Thresholds are drawn from the whole field, not the current region, so
/// contradictory paths (unreachable leaves) show up regularly.
pub fn random_tree(
    rng: &mut StdRng,
    domains: &FeatureDomains,
    max_depth: usize,
    n_classes: u32,
) -> DecisionTree {
    let mut builder = TreeBuilder::new();
    let root = builder.reserve();
    let mut pending: Vec<(NodeId, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = pending.pop() {
        let split = !domains.is_empty() && depth < max_depth && (depth == 0 || rng.gen_bool(0.7));
        if !split {
            builder.set_leaf(node, ClassLabel(rng.gen_range(0..n_classes)));
            continue;
        }
        let feature = rng.gen_range(0..domains.len() as u32);
        let field = domains.get(feature).unwrap().field();
        let threshold = rng.gen_range(0..=field.max_value());
        let left = builder.reserve();
        let right = builder.reserve();
        builder.set_split(node, feature, threshold, left, right);
        pending.push((right, depth + 1));
        pending.push((left, depth + 1));
    }

    builder.build().unwrap()
}

/// Random point inside `domains`.
pub fn random_point(rng: &mut StdRng, domains: &FeatureDomains) -> Vec<u64> {
    domains
        .iter()
        .map(|d| rng.gen_range(d.min()..=d.max()))
        .collect()
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
