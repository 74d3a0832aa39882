//! Compilation driver: validate, extract, count, expand, number.

use crate::config::{CompileConfig, LimitAction, PriorityOrder};
use crate::domain::FeatureDomains;
use crate::error::CompileError;
use crate::logger::CompileLogger;
use crate::trees::{DecisionTree, NodeId};
use crate::utils::run_with_threads;

use super::expand::{count_rules, expand_region, RuleBody};
use super::extract::{extract_regions, Extraction, LeafRegion};
use super::rule::Rule;

// =============================================================================
// Stats and outputs
// =============================================================================

/// Size summary of a compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Leaves in the tree.
    pub n_leaves: usize,
    /// Leaves with a non-empty region.
    pub n_regions: usize,
    /// Leaves whose region is empty.
    pub n_unreachable: usize,
    /// Total rules, saturating at `u64::MAX`.
    pub n_rules: u64,
    /// Largest rule count of a single leaf.
    pub max_rules_per_leaf: u64,
    /// Whether `n_rules` exceeds the configured limit.
    pub over_limit: bool,
}

/// Regions and rule counts, computed before any rule is expanded.
#[derive(Debug, Clone)]
pub struct CompilePlan {
    extraction: Extraction,
    rule_counts: Vec<u64>,
    stats: CompileStats,
}

impl CompilePlan {
    /// Regions in depth-first order.
    pub fn regions(&self) -> &[LeafRegion] {
        &self.extraction.regions
    }

    /// Rule count per region, aligned with [`regions`](Self::regions).
    pub fn rule_counts(&self) -> &[u64] {
        &self.rule_counts
    }

    pub fn unreachable(&self) -> &[NodeId] {
        &self.extraction.unreachable
    }

    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }
}

/// Rules of a compilation in emission order, with their stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub rules: Vec<Rule>,
    pub stats: CompileStats,
    /// Leaves that produced no rules.
    pub unreachable: Vec<NodeId>,
}

// =============================================================================
// Priority numbering
// =============================================================================

/// Explicit priority counter over the whole rule sequence.
#[derive(Debug)]
struct PriorityCounter {
    base: u64,
    total: u64,
    index: u64,
    order: PriorityOrder,
}

impl PriorityCounter {
    fn new(config: &CompileConfig, total: u64) -> Result<Self, CompileError> {
        if total > 0 && config.priority_base.checked_add(total - 1).is_none() {
            return Err(CompileError::PriorityOverflow {
                rules: total,
                base: config.priority_base,
            });
        }
        Ok(Self {
            base: config.priority_base,
            total,
            index: 0,
            order: config.priority_order,
        })
    }

    fn next(&mut self) -> u64 {
        let offset = match self.order {
            PriorityOrder::Ascending => self.index,
            PriorityOrder::Descending => self.total - 1 - self.index,
        };
        self.index += 1;
        self.base + offset
    }
}

// =============================================================================
// Compiler
// =============================================================================

/// Compiles a [`DecisionTree`] into ternary [`Rule`]s.
///
/// # Example
///
/// ```
/// use dtree_tcam::compile::Compiler;
/// use dtree_tcam::config::CompileConfig;
/// use dtree_tcam::domain::{FeatureDomain, FeatureDomains};
/// use dtree_tcam::trees::{ClassLabel, TreeBuilder};
///
/// let domains = FeatureDomains::new(vec![FeatureDomain::full("len", 4).unwrap()]);
/// let mut builder = TreeBuilder::new();
/// builder.add_split(0, 10, 1, 2);
/// builder.add_leaf(ClassLabel(0));
/// builder.add_leaf(ClassLabel(1));
/// let tree = builder.build().unwrap();
///
/// let output = Compiler::new(CompileConfig::default()).compile(&tree, &domains).unwrap();
/// // [0, 10] -> 0-7, 8-9, 10; [11, 15] -> 11, 12-15
/// assert_eq!(output.stats.n_rules, 5);
/// assert_eq!(output.rules[0].priority(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Validate the tree, extract leaf regions and count rules without expanding them.
    pub fn plan(
        &self,
        tree: &DecisionTree,
        domains: &FeatureDomains,
    ) -> Result<CompilePlan, CompileError> {
        tree.validate()?;
        let extraction = extract_regions(tree, domains)?;
        let rule_counts = extraction
            .regions
            .iter()
            .map(|region| count_rules(region, domains))
            .collect::<Result<Vec<_>, _>>()?;

        let n_rules = rule_counts.iter().fold(0u64, |acc, &n| acc.saturating_add(n));
        let stats = CompileStats {
            n_leaves: tree.n_leaves(),
            n_regions: extraction.regions.len(),
            n_unreachable: extraction.unreachable.len(),
            n_rules,
            max_rules_per_leaf: rule_counts.iter().copied().max().unwrap_or(0),
            over_limit: self.config.rule_limit.is_some_and(|limit| n_rules > limit),
        };

        Ok(CompilePlan {
            extraction,
            rule_counts,
            stats,
        })
    }

    /// Compile `tree` into rules ordered by leaf (depth-first) then cross-product tuple.
    pub fn compile(
        &self,
        tree: &DecisionTree,
        domains: &FeatureDomains,
    ) -> Result<CompileOutput, CompileError> {
        let mut logger = CompileLogger::new(self.config.verbosity);
        logger.start_compile(tree.n_nodes(), domains.len());

        let plan = self.plan(tree, domains)?;
        logger.log_unreachable(plan.unreachable());
        self.check_limit(&plan.stats, &logger)?;
        let mut priorities = PriorityCounter::new(&self.config, plan.stats.n_rules)?;

        // Leaves expand independently; numbering happens afterwards in leaf order.
        let expanded: Vec<Result<Vec<RuleBody>, CompileError>> =
            run_with_threads(self.config.thread_count(), |parallelism| {
                parallelism.maybe_par_map(plan.regions(), |region| expand_region(region, domains))
            });

        let mut rules = Vec::new();
        for ((region, &expected), bodies) in plan
            .regions()
            .iter()
            .zip(plan.rule_counts())
            .zip(expanded)
        {
            let bodies = bodies?;
            if bodies.len() as u64 != expected {
                return Err(CompileError::InvariantViolation(format!(
                    "leaf {} expanded to {} rules, expected {expected}",
                    region.leaf(),
                    bodies.len()
                )));
            }
            logger.log_leaf(region.leaf(), expected);
            rules.extend(
                bodies
                    .into_iter()
                    .map(|body| Rule::new(body.blocks, body.label, priorities.next())),
            );
        }

        let CompilePlan {
            extraction, stats, ..
        } = plan;
        logger.finish_compile(&stats);

        Ok(CompileOutput {
            rules,
            stats,
            unreachable: extraction.unreachable,
        })
    }

    fn check_limit(&self, stats: &CompileStats, logger: &CompileLogger) -> Result<(), CompileError> {
        let Some(limit) = self.config.rule_limit else {
            return Ok(());
        };
        if !stats.over_limit {
            return Ok(());
        }
        match self.config.limit_action {
            LimitAction::Warn => {
                logger.warn(&format!(
                    "{} rules exceed the configured limit of {limit}",
                    stats.n_rules
                ));
                Ok(())
            }
            LimitAction::Reject => Err(CompileError::RuleLimitExceeded {
                rules: stats.n_rules,
                limit,
            }),
        }
    }
}

/// Compile with the default configuration.
pub fn compile(tree: &DecisionTree, domains: &FeatureDomains) -> Result<CompileOutput, CompileError> {
    Compiler::default().compile(tree, domains)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::domain::FeatureDomain;
    use crate::trees::{ClassLabel, TreeBuilder};

    fn domains() -> FeatureDomains {
        FeatureDomains::new(vec![
            FeatureDomain::full("a", 4).unwrap(),
            FeatureDomain::full("b", 4).unwrap(),
        ])
    }

    /// a <= 3 ? 0 : (b <= 10 ? 1 : 2)
    fn tree() -> DecisionTree {
        let mut builder = TreeBuilder::new();
        builder.add_split(0, 3, 1, 2);
        builder.add_leaf(ClassLabel(0));
        builder.add_split(1, 10, 3, 4);
        builder.add_leaf(ClassLabel(1));
        builder.add_leaf(ClassLabel(2));
        builder.build().unwrap()
    }

    #[test]
    fn stats_before_expansion() {
        let plan = Compiler::default().plan(&tree(), &domains()).unwrap();
        // leaf 1: 1 rule; leaf 3: 2 x 3; leaf 4: a 4-7, 8-15 x b 11, 12-15
        assert_eq!(plan.rule_counts(), &[1, 6, 4]);
        assert_eq!(plan.stats().n_rules, 11);
        assert_eq!(plan.stats().max_rules_per_leaf, 6);
        assert_eq!(plan.stats().n_leaves, 3);
        assert!(!plan.stats().over_limit);
    }

    #[test]
    fn priorities_ascend_from_base() {
        let config = CompileConfig::builder().priority_base(100).build().unwrap();
        let output = Compiler::new(config).compile(&tree(), &domains()).unwrap();
        let priorities: Vec<u64> = output.rules.iter().map(Rule::priority).collect();
        assert_eq!(priorities, (100..111).collect::<Vec<_>>());
    }

    #[test]
    fn descending_priorities_end_at_base() {
        let config = CompileConfig::builder()
            .priority_order(PriorityOrder::Descending)
            .build()
            .unwrap();
        let output = Compiler::new(config).compile(&tree(), &domains()).unwrap();
        let priorities: Vec<u64> = output.rules.iter().map(Rule::priority).collect();
        assert_eq!(priorities, (1..=11).rev().collect::<Vec<_>>());
    }

    #[test]
    fn labels_follow_leaf_order() {
        let output = compile(&tree(), &domains()).unwrap();
        let labels: Vec<u32> = output.rules.iter().map(|r| r.label().0).collect();
        assert_eq!(labels, vec![0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn limit_reject_fails_before_expansion() {
        let config = CompileConfig::builder()
            .rule_limit(10)
            .limit_action(LimitAction::Reject)
            .build()
            .unwrap();
        assert_eq!(
            Compiler::new(config).compile(&tree(), &domains()),
            Err(CompileError::RuleLimitExceeded { rules: 11, limit: 10 })
        );
    }

    #[test]
    fn limit_warn_still_compiles() {
        let config = CompileConfig::builder().rule_limit(10).build().unwrap();
        let output = Compiler::new(config).compile(&tree(), &domains()).unwrap();
        assert!(output.stats.over_limit);
        assert_eq!(output.rules.len(), 11);
    }

    #[test]
    fn priority_overflow_is_reported() {
        let config = CompileConfig::builder()
            .priority_base(u64::MAX - 5)
            .build()
            .unwrap();
        assert_eq!(
            Compiler::new(config).compile(&tree(), &domains()),
            Err(CompileError::PriorityOverflow {
                rules: 11,
                base: u64::MAX - 5,
            })
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = CompileConfig::builder()
            .n_threads(NonZeroUsize::MIN)
            .build()
            .unwrap();
        let parallel = CompileConfig::builder()
            .n_threads(NonZeroUsize::new(4).unwrap())
            .build()
            .unwrap();
        let a = Compiler::new(sequential).compile(&tree(), &domains()).unwrap();
        let b = Compiler::new(parallel).compile(&tree(), &domains()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_tree_is_a_structure_error() {
        // DecisionTree can only be built validated; the plan re-checks anyway.
        let err = TreeBuilder::new().build().unwrap_err();
        assert_eq!(
            CompileError::from(err),
            CompileError::Structure(crate::trees::TreeValidationError::EmptyTree)
        );
    }
}
