//! Verbosity-levelled logging for compilation runs.

use std::time::Instant;

use crate::compile::CompileStats;
use crate::trees::NodeId;

/// Logging verbosity, ordered from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Capacity warnings only.
    Warning,
    /// Start and finish summaries.
    Info,
    /// Per-leaf details.
    Debug,
}

/// Writes compilation progress to stderr according to a [`Verbosity`].
#[derive(Debug)]
pub struct CompileLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl CompileLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
        }
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn warn(&self, msg: &str) {
        if self.enabled(Verbosity::Warning) {
            eprintln!("[dtree-tcam] warning: {msg}");
        }
    }

    pub fn info(&self, msg: &str) {
        if self.enabled(Verbosity::Info) {
            eprintln!("[dtree-tcam] {msg}");
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.enabled(Verbosity::Debug) {
            eprintln!("[dtree-tcam] debug: {msg}");
        }
    }

    pub fn start_compile(&mut self, n_nodes: usize, n_features: usize) {
        self.started = Some(Instant::now());
        self.info(&format!(
            "compiling tree with {n_nodes} nodes over {n_features} features"
        ));
    }

    pub fn log_leaf(&self, leaf: NodeId, n_rules: u64) {
        self.debug(&format!("leaf {leaf}: {n_rules} rules"));
    }

    pub fn log_unreachable(&self, leaves: &[NodeId]) {
        if !leaves.is_empty() {
            self.debug(&format!("unreachable leaves (no rules): {leaves:?}"));
        }
    }

    pub fn finish_compile(&self, stats: &CompileStats) {
        let elapsed = self
            .started
            .map(|t| format!(" in {:.2?}", t.elapsed()))
            .unwrap_or_default();
        self.info(&format!(
            "emitted {} rules for {} leaves ({} unreachable){elapsed}",
            stats.n_rules, stats.n_regions, stats.n_unreachable
        ));
    }
}
