//! Range-to-prefix decomposition.
//!
//! Covers an inclusive integer interval with the fewest aligned power-of-two
//! blocks. Each step takes the largest block that is aligned at the current
//! start and does not run past the upper bound, then advances past it. The
//! resulting blocks are ordered, disjoint and cover the interval exactly.

use std::iter::FusedIterator;

use crate::domain::{low_mask, Field};
use crate::error::CompileError;

use super::TernaryBlock;

/// Iterator over the aligned blocks covering `[lo, hi]`, in increasing order.
///
/// Created by [`Decomposition::new`]; [`decompose`] collects it.
#[derive(Debug, Clone)]
pub struct Decomposition {
    field: Field,
    /// Start of the next block, `None` once `hi` has been covered.
    next: Option<u64>,
    hi: u64,
}

impl Decomposition {
    /// Validate `lo <= hi <= 2^W - 1` and prepare the iteration.
    pub fn new(field: Field, lo: u64, hi: u64) -> Result<Self, CompileError> {
        if lo > hi {
            return Err(CompileError::InvalidInterval { lo, hi });
        }
        field.check(hi)?;
        Ok(Self {
            field,
            next: Some(lo),
            hi,
        })
    }
}

impl Iterator for Decomposition {
    type Item = TernaryBlock;

    fn next(&mut self) -> Option<TernaryBlock> {
        let start = self.next?;
        let remaining = self.hi - start;

        // Grow: the largest power of two dividing `start`, capped by the field
        // width (trailing_zeros(0) is 64, so zero takes the whole field).
        let mut wildcard = start.trailing_zeros().min(u32::from(self.field.bits()));
        // Shrink until the block ends at or before `hi`.
        while low_mask(wildcard) > remaining {
            wildcard -= 1;
        }

        let block = TernaryBlock::aligned_unchecked(self.field, start, wildcard);
        let last = block.last();
        self.next = if last == self.hi { None } else { Some(last + 1) };
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            // At most two blocks per bit level.
            Some(_) => (1, Some(2 * usize::from(self.field.bits()))),
        }
    }
}

impl FusedIterator for Decomposition {}

/// Decompose `[lo, hi]` within `field` into ordered, disjoint aligned blocks.
///
/// # Errors
///
/// [`CompileError::InvalidInterval`] if `lo > hi`, and
/// [`CompileError::OutOfDomain`] if `hi` does not fit in the field.
///
/// # Example
///
/// ```
/// use dtree_tcam::domain::Field;
/// use dtree_tcam::ternary::decompose;
///
/// let field = Field::new(4).unwrap();
/// let blocks = decompose(field, 4, 11).unwrap();
/// let pairs: Vec<_> = blocks.iter().map(|b| (b.value(), b.mask())).collect();
/// assert_eq!(pairs, vec![(4, 0b1100), (8, 0b1100)]);
/// ```
pub fn decompose(field: Field, lo: u64, hi: u64) -> Result<Vec<TernaryBlock>, CompileError> {
    Ok(Decomposition::new(field, lo, hi)?.collect())
}

/// Number of blocks [`decompose`] would produce, without allocating them.
pub fn block_count(field: Field, lo: u64, hi: u64) -> Result<usize, CompileError> {
    Ok(Decomposition::new(field, lo, hi)?.count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(bits: u8, lo: u64, hi: u64) -> Vec<(u64, u64)> {
        decompose(Field::new(bits).unwrap(), lo, hi)
            .unwrap()
            .iter()
            .map(|b| (b.value(), b.mask()))
            .collect()
    }

    #[test]
    fn single_value() {
        assert_eq!(pairs(4, 5, 5), vec![(5, 0b1111)]);
    }

    #[test]
    fn two_aligned_halves() {
        assert_eq!(pairs(4, 4, 11), vec![(4, 0b1100), (8, 0b1100)]);
    }

    #[test]
    fn whole_field_is_one_wildcard() {
        assert_eq!(pairs(4, 0, 15), vec![(0, 0)]);
        assert_eq!(pairs(64, 0, u64::MAX), vec![(0, 0)]);
    }

    #[test]
    fn worst_case_uses_two_blocks_per_level() {
        // [1, 14] in 4 bits: 1, 2-3, 4-7, 8-11, 12-13, 14
        assert_eq!(
            pairs(4, 1, 14),
            vec![
                (1, 0b1111),
                (2, 0b1110),
                (4, 0b1100),
                (8, 0b1100),
                (12, 0b1110),
                (14, 0b1111),
            ]
        );
    }

    #[test]
    fn top_of_64_bit_field_does_not_overflow() {
        let field = Field::new(64).unwrap();
        let blocks = decompose(field, u64::MAX - 2, u64::MAX).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].first(), u64::MAX - 2);
        assert_eq!(blocks[0].last(), u64::MAX - 2);
        assert_eq!(blocks[1].first(), u64::MAX - 1);
        assert_eq!(blocks[1].last(), u64::MAX);
    }

    #[test]
    fn invalid_inputs() {
        let field = Field::new(4).unwrap();
        assert_eq!(
            decompose(field, 6, 5),
            Err(CompileError::InvalidInterval { lo: 6, hi: 5 })
        );
        assert_eq!(
            decompose(field, 3, 16),
            Err(CompileError::OutOfDomain { value: 16, bits: 4 })
        );
    }

    #[test]
    fn count_matches_decomposition() {
        let field = Field::new(16).unwrap();
        assert_eq!(block_count(field, 1, 0xFFFF).unwrap(), 16);
        assert_eq!(decompose(field, 1, 0xFFFF).unwrap().len(), 16);
    }

    #[test]
    fn exhaustive_cover_in_six_bits() {
        let field = Field::new(6).unwrap();
        for lo in 0..64u64 {
            for hi in lo..64u64 {
                let blocks = decompose(field, lo, hi).unwrap();
                let mut expected = lo;
                for b in &blocks {
                    assert_eq!(b.first(), expected, "gap or overlap in [{lo}, {hi}]");
                    assert_eq!(b.first() as u128 % b.len(), 0, "misaligned block");
                    expected = b.last() + 1;
                }
                assert_eq!(expected, hi + 1);
                for key in 0..64u64 {
                    let hits = blocks.iter().filter(|b| b.matches(key)).count();
                    assert_eq!(hits, usize::from((lo..=hi).contains(&key)));
                }
            }
        }
    }
}
