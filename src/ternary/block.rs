//! Ternary (value/mask) match blocks.

use std::fmt;

use crate::domain::{low_mask, Field, Interval};
use crate::error::CompileError;

/// Aligned power-of-two block of a field, expressed as a `(value, mask)` pair.
///
/// A key bit is don't-care where the mask bit is 0; elsewhere it must equal
/// the value bit. The mask is always a prefix mask (ones above, zeros below),
/// so the block covers `2^wildcard_bits` consecutive values starting at
/// `value`, and `value` is a multiple of that size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TernaryBlock {
    value: u64,
    mask: u64,
    bits: u8,
}

impl TernaryBlock {
    /// Block of `2^wildcard_bits` values starting at `start`.
    ///
    /// `start` must fit in the field and be aligned to the block size.
    pub fn aligned(field: Field, start: u64, wildcard_bits: u32) -> Result<Self, CompileError> {
        field.check(start)?;
        let wildcard_bits = wildcard_bits.min(u32::from(field.bits()));
        if start & low_mask(wildcard_bits) != 0 {
            return Err(CompileError::InvariantViolation(format!(
                "block start {start} is not aligned to 2^{wildcard_bits}"
            )));
        }
        Ok(Self::aligned_unchecked(field, start, wildcard_bits))
    }

    /// Fully specified block matching exactly `value`.
    pub fn exact(field: Field, value: u64) -> Result<Self, CompileError> {
        Self::aligned(field, value, 0)
    }

    #[inline]
    pub(crate) fn aligned_unchecked(field: Field, start: u64, wildcard_bits: u32) -> Self {
        debug_assert!(field.contains(start));
        debug_assert_eq!(start & low_mask(wildcard_bits), 0);
        Self {
            value: start,
            mask: !low_mask(wildcard_bits) & field.full_mask(),
            bits: field.bits(),
        }
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Width of the field the block lives in.
    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of don't-care bits.
    #[inline]
    pub fn wildcard_bits(&self) -> u32 {
        u32::from(self.bits) - self.mask.count_ones()
    }

    /// Number of values covered.
    #[inline]
    pub fn len(&self) -> u128 {
        1u128 << self.wildcard_bits()
    }

    #[inline]
    pub fn first(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn last(&self) -> u64 {
        self.value | low_mask(self.wildcard_bits())
    }

    /// The covered values as an interval.
    pub fn interval(&self) -> Interval {
        Interval {
            lo: self.first(),
            hi: self.last(),
        }
    }

    /// Whether `key` is matched by this block.
    #[inline]
    pub fn matches(&self, key: u64) -> bool {
        key <= low_mask(u32::from(self.bits)) && key & self.mask == self.value
    }

    /// Whether the two blocks share at least one key.
    pub fn overlaps(&self, other: &TernaryBlock) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }
}

impl fmt::Display for TernaryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}/{:#x}", self.value, self.mask)
    }
}
