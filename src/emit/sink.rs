//! Rule sinks: writers and in-memory collection.

use std::convert::Infallible;
use std::io::{self, Write};

use crate::compile::Rule;

use super::format::RuleFormat;
use super::RuleSink;

/// Errors that can occur while emitting rules.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Writes one formatted line per rule.
#[derive(Debug)]
pub struct WriterSink<W: Write, F: RuleFormat> {
    writer: W,
    format: F,
    written: usize,
}

impl<W: Write, F: RuleFormat> WriterSink<W, F> {
    pub fn new(writer: W, format: F) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write, F: RuleFormat> RuleSink for WriterSink<W, F> {
    type Error = EmitError;

    fn emit(&mut self, rule: &Rule) -> Result<(), EmitError> {
        writeln!(self.writer, "{}", self.format.format_rule(rule))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects emitted rules in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    pub rules: Vec<Rule>,
}

impl RuleSink for VecSink {
    type Error = Infallible;

    fn emit(&mut self, rule: &Rule) -> Result<(), Infallible> {
        self.rules.push(rule.clone());
        Ok(())
    }
}
