//! Compiled match rules.

use crate::ternary::TernaryBlock;
use crate::trees::ClassLabel;

/// One ternary match rule: a block per feature, the class and a priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    blocks: Vec<TernaryBlock>,
    label: ClassLabel,
    priority: u64,
}

impl Rule {
    pub(crate) fn new(blocks: Vec<TernaryBlock>, label: ClassLabel, priority: u64) -> Self {
        Self {
            blocks,
            label,
            priority,
        }
    }

    /// Blocks in domain table order.
    #[inline]
    pub fn blocks(&self) -> &[TernaryBlock] {
        &self.blocks
    }

    #[inline]
    pub fn label(&self) -> ClassLabel {
        self.label
    }

    #[inline]
    pub fn priority(&self) -> u64 {
        self.priority
    }

    /// `(value, mask)` per feature.
    pub fn value_masks(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.blocks.iter().map(|b| (b.value(), b.mask()))
    }

    /// Whether every feature of `point` matches its block.
    pub fn matches(&self, point: &[u64]) -> bool {
        point.len() == self.blocks.len()
            && self.blocks.iter().zip(point).all(|(b, &v)| b.matches(v))
    }
}
