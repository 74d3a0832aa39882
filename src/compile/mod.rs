//! Decision tree to ternary rule compilation.
//!
//! The pipeline runs in one direction:
//!
//! 1. [`extract_regions`]: depth-first walk, one [`LeafRegion`] per reachable leaf
//! 2. [`count_rules`]: per-leaf rule counts, known before expansion
//! 3. [`expand_region`]: per-feature decomposition and cross product
//! 4. [`Compiler::compile`]: priority numbering over the whole sequence
//!
//! Regions partition the domain and each feature decomposition is exact, so
//! the resulting rules are pairwise disjoint and cover the domain once.

mod compiler;
mod expand;
mod extract;
mod rule;

pub use compiler::{compile, CompileOutput, CompilePlan, CompileStats, Compiler};
pub use expand::{count_rules, decompose_region, expand_region, RuleBody};
pub use extract::{extract_regions, Extraction, LeafRegion};
pub use rule::Rule;
