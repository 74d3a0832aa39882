//! Rule expansion.
//!
//! Each feature interval of a [`LeafRegion`] is decomposed on its own; the
//! cross product of the per-feature block lists gives the region's rules.
//! The number of rules per leaf is the product of the per-feature block
//! counts, so it is computed up front by [`count_rules`] and reported to the
//! caller instead of being discovered during expansion.

use crate::domain::{FeatureDomains, Interval};
use crate::error::CompileError;
use crate::ternary::{block_count, decompose, TernaryBlock};
use crate::trees::ClassLabel;

use super::extract::LeafRegion;

/// A rule before priority assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBody {
    pub blocks: Vec<TernaryBlock>,
    pub label: ClassLabel,
}

/// Number of rules [`expand_region`] produces for `region`.
///
/// Saturates at `u64::MAX`.
pub fn count_rules(region: &LeafRegion, domains: &FeatureDomains) -> Result<u64, CompileError> {
    region
        .intervals()
        .iter()
        .zip(domains)
        .try_fold(1u64, |acc, (iv, d)| -> Result<u64, CompileError> {
            let n = block_count(d.field(), iv.lo(), iv.hi())?;
            Ok(acc.saturating_mul(n as u64))
        })
}

/// Decompose every feature interval of `region`, checking each cover is exact.
pub fn decompose_region(
    region: &LeafRegion,
    domains: &FeatureDomains,
) -> Result<Vec<Vec<TernaryBlock>>, CompileError> {
    region
        .intervals()
        .iter()
        .zip(domains)
        .enumerate()
        .map(|(feature, (iv, d))| -> Result<Vec<TernaryBlock>, CompileError> {
            let blocks = decompose(d.field(), iv.lo(), iv.hi())?;
            check_cover(feature, *iv, &blocks)?;
            Ok(blocks)
        })
        .collect()
}

/// Expand `region` into one rule body per tuple of the per-feature cross product.
///
/// The first feature varies slowest.
pub fn expand_region(
    region: &LeafRegion,
    domains: &FeatureDomains,
) -> Result<Vec<RuleBody>, CompileError> {
    let per_feature = decompose_region(region, domains)?;
    let label = region.label();
    Ok(CartesianProduct::new(&per_feature)
        .map(|blocks| RuleBody { blocks, label })
        .collect())
}

/// Blocks must be ordered, contiguous and span `interval` exactly.
fn check_cover(
    feature: usize,
    interval: Interval,
    blocks: &[TernaryBlock],
) -> Result<(), CompileError> {
    let mut expected = Some(interval.lo());
    for block in blocks {
        if expected != Some(block.first()) {
            return Err(CompileError::InvariantViolation(format!(
                "feature {feature}: block {block} does not continue the cover of {interval}"
            )));
        }
        expected = block.last().checked_add(1);
    }
    let covered_to = blocks.last().map(|b| b.last());
    if covered_to != Some(interval.hi()) {
        return Err(CompileError::InvariantViolation(format!(
            "feature {feature}: blocks end at {covered_to:?}, interval {interval} is not covered exactly"
        )));
    }
    Ok(())
}

/// Odometer over the cross product of block lists, last list fastest.
struct CartesianProduct<'a> {
    lists: &'a [Vec<TernaryBlock>],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> CartesianProduct<'a> {
    fn new(lists: &'a [Vec<TernaryBlock>]) -> Self {
        Self {
            lists,
            indices: vec![0; lists.len()],
            done: lists.iter().any(|l| l.is_empty()),
        }
    }
}

impl Iterator for CartesianProduct<'_> {
    type Item = Vec<TernaryBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .indices
            .iter()
            .zip(self.lists)
            .map(|(&i, list)| list[i])
            .collect();

        // Advance; when every digit wraps the product is exhausted.
        self.done = true;
        for pos in (0..self.lists.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.lists[pos].len() {
                self.done = false;
                break;
            }
            self.indices[pos] = 0;
        }
        Some(item)
    }
}
