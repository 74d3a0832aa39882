//! Error types shared by the compilation pipeline.

use crate::domain::FeatureId;
use crate::trees::{NodeId, TreeValidationError};

/// Errors that abort a compilation.
///
/// Invalid input (bad intervals, out-of-domain values, undeclared features)
/// and malformed trees are reported as soon as they are seen. A compilation
/// is deterministic, so none of these are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("invalid field width {bits}: expected 1 to 64 bits")]
    InvalidField { bits: u8 },

    #[error("invalid interval [{lo}, {hi}]: lower bound exceeds upper bound")]
    InvalidInterval { lo: u64, hi: u64 },

    #[error("value {value} is outside the {bits}-bit field domain")]
    OutOfDomain { value: u64, bits: u8 },

    #[error("invalid domain for feature `{name}`: [{min}, {max}] does not fit a {bits}-bit field")]
    InvalidFeatureDomain {
        name: String,
        bits: u8,
        min: u64,
        max: u64,
    },

    #[error("node {node} splits on feature {feature}, but only {n_features} features are declared")]
    UndeclaredFeature {
        node: NodeId,
        feature: FeatureId,
        n_features: usize,
    },

    #[error("malformed tree: {0}")]
    Structure(#[from] TreeValidationError),

    /// The region partition or a block decomposition is not exact.
    ///
    /// This is a defect in the compiler itself, never a property of the input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("compilation produces {rules} rules, above the configured limit of {limit}")]
    RuleLimitExceeded { rules: u64, limit: u64 },

    #[error("priority range overflows: {rules} rules starting at priority {base}")]
    PriorityOverflow { rules: u64, base: u64 },
}
