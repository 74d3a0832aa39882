//! dtree-tcam: compile decision trees into ternary match rules.
//!
//! This crate turns a trained axis-aligned decision tree over fixed-width
//! unsigned integer features into a minimal, pairwise disjoint set of
//! value/mask rules that a TCAM match-action table can evaluate at line rate.
//! Each leaf's feature ranges are decomposed into aligned power-of-two blocks
//! and combined across features; every point of the feature domain matches
//! exactly one rule, labelled with the class the tree assigns to it.

pub mod compat;
pub mod compile;
pub mod config;
pub mod domain;
pub mod emit;
pub mod error;
pub mod logger;
pub mod ternary;
pub mod testing;
pub mod trees;
pub mod utils;

pub use compile::{compile, CompileOutput, CompileStats, Compiler, Rule};
pub use config::CompileConfig;
pub use domain::{FeatureDomain, FeatureDomains, Field, Interval};
pub use error::CompileError;
pub use ternary::{decompose, TernaryBlock};
pub use trees::{ClassLabel, DecisionTree, TreeBuilder};
