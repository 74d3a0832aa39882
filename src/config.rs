//! Compilation configuration with builder pattern.
//!
//! [`CompileConfig`] controls priority numbering, the rule-count ceiling,
//! threading and logging. It uses the `bon` crate for builder generation and
//! validates on `build()`.
//!
//! # Example
//!
//! ```
//! use dtree_tcam::config::{CompileConfig, LimitAction, PriorityOrder};
//!
//! // All defaults
//! let config = CompileConfig::builder().build().unwrap();
//! assert_eq!(config.priority_base, 1);
//!
//! // Fail instead of warning above 4096 rules
//! let config = CompileConfig::builder()
//!     .rule_limit(4096)
//!     .limit_action(LimitAction::Reject)
//!     .priority_order(PriorityOrder::Descending)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.rule_limit, Some(4096));
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use crate::logger::Verbosity;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("rule_limit must be at least 1")]
    ZeroRuleLimit,
}

// =============================================================================
// Enums
// =============================================================================

/// How priorities are numbered along the rule sequence.
///
/// Rules never overlap, so the direction only matters to the target matcher's
/// notion of precedence, not to correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityOrder {
    /// First rule gets `priority_base`, then increasing by one.
    #[default]
    Ascending,
    /// First rule gets the highest value, last rule gets `priority_base`.
    Descending,
}

/// What to do when the rule count exceeds `rule_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitAction {
    /// Log a warning, flag the stats and continue.
    #[default]
    Warn,
    /// Fail with [`CompileError::RuleLimitExceeded`](crate::CompileError::RuleLimitExceeded)
    /// before expanding any rule.
    Reject,
}

// =============================================================================
// CompileConfig
// =============================================================================

/// Configuration for [`Compiler`](crate::compile::Compiler).
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct CompileConfig {
    /// Priority of the first rule in numbering order. Default: 1.
    #[builder(default = 1)]
    pub priority_base: u64,

    /// Priority numbering direction. Default: `Ascending`.
    #[builder(default)]
    pub priority_order: PriorityOrder,

    /// Ceiling on the total number of rules. `None` disables the check.
    pub rule_limit: Option<u64>,

    /// Behavior above `rule_limit`. Default: `Warn`.
    #[builder(default)]
    pub limit_action: LimitAction,

    /// Number of threads for per-leaf expansion. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: compile_config_builder::IsComplete> CompileConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroRuleLimit`] if `rule_limit == 0`.
    pub fn build(self) -> Result<CompileConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl CompileConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rule_limit == Some(0) {
            return Err(ConfigError::ZeroRuleLimit);
        }
        Ok(())
    }

    /// Thread count in `run_with_threads` terms (0 = auto).
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            priority_base: 1,
            priority_order: PriorityOrder::default(),
            rule_limit: None,
            limit_action: LimitAction::default(),
            n_threads: None,
            verbosity: Verbosity::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builder() {
        let built = CompileConfig::builder().build().unwrap();
        let default = CompileConfig::default();
        assert_eq!(built.priority_base, default.priority_base);
        assert_eq!(built.priority_order, default.priority_order);
        assert_eq!(built.rule_limit, default.rule_limit);
        assert_eq!(built.limit_action, default.limit_action);
        assert_eq!(built.n_threads, default.n_threads);
        assert_eq!(built.verbosity, default.verbosity);
    }

    #[test]
    fn zero_rule_limit_is_rejected() {
        let err = CompileConfig::builder().rule_limit(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroRuleLimit);
    }

    #[test]
    fn thread_count_maps_none_to_auto() {
        assert_eq!(CompileConfig::default().thread_count(), 0);
        let config = CompileConfig::builder()
            .n_threads(NonZeroUsize::new(3).unwrap())
            .build()
            .unwrap();
        assert_eq!(config.thread_count(), 3);
    }
}
