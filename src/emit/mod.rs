//! Rule emission to external table configuration.
//!
//! A [`RuleSink`] receives compiled rules in sequence order. Sinks format or
//! store rules; they never reorder them or change priorities.
//!
//! - [`WriterSink`] + [`TableAddFormat`] / [`MatchFormat`]: text output
//! - [`VecSink`]: in-memory collection

mod format;
mod sink;

pub use format::{MatchFormat, RuleFormat, TableAddFormat};
pub use sink::{EmitError, VecSink, WriterSink};

use crate::compile::Rule;

/// Destination for compiled rules.
pub trait RuleSink {
    type Error;

    /// Accept the next rule of the sequence.
    fn emit(&mut self, rule: &Rule) -> Result<(), Self::Error>;

    /// Called once after the last rule.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Emit `rules` in order into `sink`, then finish it. Returns the rule count.
pub fn emit_rules<S: RuleSink + ?Sized>(rules: &[Rule], sink: &mut S) -> Result<usize, S::Error> {
    for rule in rules {
        sink.emit(rule)?;
    }
    sink.finish()?;
    Ok(rules.len())
}
