//! Feature domains: fixed-width fields, inclusive intervals and the domain table.
//!
//! Every classifier feature is an unsigned integer of a fixed bit width. The
//! [`FeatureDomains`] table declares, per feature id, the field width and the
//! global `[min, max]` range the feature can take. Its order is the order of
//! the ternary blocks inside every compiled rule.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::ternary::{decompose, TernaryBlock};

/// Index of a feature in the [`FeatureDomains`] table.
pub type FeatureId = u32;

/// Mask with the lowest `k` bits set.
#[inline]
pub(crate) fn low_mask(k: u32) -> u64 {
    if k >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << k) - 1
    }
}

// =============================================================================
// Field
// =============================================================================

/// Fixed-width unsigned integer field with domain `[0, 2^bits - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Field {
    bits: u8,
}

impl Field {
    /// Widest supported field.
    pub const MAX_BITS: u8 = 64;

    /// Create a field of the given width (1 to 64 bits).
    pub fn new(bits: u8) -> Result<Self, CompileError> {
        if bits == 0 || bits > Self::MAX_BITS {
            return Err(CompileError::InvalidField { bits });
        }
        Ok(Self { bits })
    }

    /// Width in bits.
    #[inline]
    pub fn bits(self) -> u8 {
        self.bits
    }

    /// All-ones mask over the field width.
    #[inline]
    pub fn full_mask(self) -> u64 {
        low_mask(u32::from(self.bits))
    }

    /// Largest representable value, `2^bits - 1`.
    #[inline]
    pub fn max_value(self) -> u64 {
        self.full_mask()
    }

    /// Whether `value` fits in the field.
    #[inline]
    pub fn contains(self, value: u64) -> bool {
        value <= self.max_value()
    }

    /// The whole field domain as an interval.
    #[inline]
    pub fn full_interval(self) -> Interval {
        Interval {
            lo: 0,
            hi: self.max_value(),
        }
    }

    /// Reject values that do not fit in the field.
    pub fn check(self, value: u64) -> Result<u64, CompileError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(CompileError::OutOfDomain {
                value,
                bits: self.bits,
            })
        }
    }
}

impl TryFrom<u8> for Field {
    type Error = CompileError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<Field> for u8 {
    fn from(field: Field) -> Self {
        field.bits
    }
}

// =============================================================================
// Interval
// =============================================================================

/// Inclusive integer interval `[lo, hi]` with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub(crate) lo: u64,
    pub(crate) hi: u64,
}

impl Interval {
    /// Create an interval, rejecting `lo > hi`.
    pub fn new(lo: u64, hi: u64) -> Result<Self, CompileError> {
        if lo > hi {
            return Err(CompileError::InvalidInterval { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Single-value interval.
    #[inline]
    pub fn point(value: u64) -> Self {
        Self { lo: value, hi: value }
    }

    #[inline]
    pub fn lo(self) -> u64 {
        self.lo
    }

    #[inline]
    pub fn hi(self) -> u64 {
        self.hi
    }

    /// Number of values in the interval.
    #[inline]
    pub fn len(self) -> u128 {
        u128::from(self.hi - self.lo) + 1
    }

    #[inline]
    pub fn contains(self, value: u64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Intersection, or `None` if the intervals are disjoint.
    pub fn intersect(self, other: Interval) -> Option<Interval> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        (lo <= hi).then_some(Interval { lo, hi })
    }

    /// Minimal aligned ternary cover of this interval within `field`.
    pub fn to_blocks(self, field: Field) -> Result<Vec<TernaryBlock>, CompileError> {
        decompose(field, self.lo, self.hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

// =============================================================================
// FeatureDomain
// =============================================================================

/// One declared feature: name, field width and global `[min, max]` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureDomain", into = "RawFeatureDomain")]
pub struct FeatureDomain {
    name: String,
    field: Field,
    range: Interval,
}

/// Serialized form; `min` and `max` default to the field range.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFeatureDomain {
    name: String,
    bits: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<u64>,
}

impl FeatureDomain {
    /// Declare a feature with an explicit `[min, max]` range.
    pub fn new(name: impl Into<String>, bits: u8, min: u64, max: u64) -> Result<Self, CompileError> {
        let name = name.into();
        let field = Field::new(bits)?;
        if min > max || !field.contains(max) {
            return Err(CompileError::InvalidFeatureDomain {
                name,
                bits,
                min,
                max,
            });
        }
        Ok(Self {
            name,
            field,
            range: Interval { lo: min, hi: max },
        })
    }

    /// Declare a feature spanning its whole field.
    pub fn full(name: impl Into<String>, bits: u8) -> Result<Self, CompileError> {
        let field = Field::new(bits)?;
        Self::new(name, bits, 0, field.max_value())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Global domain of the feature.
    pub fn range(&self) -> Interval {
        self.range
    }

    pub fn min(&self) -> u64 {
        self.range.lo
    }

    pub fn max(&self) -> u64 {
        self.range.hi
    }
}

impl TryFrom<RawFeatureDomain> for FeatureDomain {
    type Error = CompileError;

    fn try_from(raw: RawFeatureDomain) -> Result<Self, Self::Error> {
        let field = Field::new(raw.bits)?;
        let min = raw.min.unwrap_or(0);
        let max = raw.max.unwrap_or_else(|| field.max_value());
        Self::new(raw.name, raw.bits, min, max)
    }
}

impl From<FeatureDomain> for RawFeatureDomain {
    fn from(domain: FeatureDomain) -> Self {
        Self {
            bits: domain.field.bits(),
            min: Some(domain.min()),
            max: Some(domain.max()),
            name: domain.name,
        }
    }
}

// =============================================================================
// FeatureDomains
// =============================================================================

/// Ordered domain table, indexed by [`FeatureId`].
///
/// # Example
///
/// ```
/// use dtree_tcam::domain::{FeatureDomain, FeatureDomains};
///
/// let domains = FeatureDomains::new(vec![
///     FeatureDomain::full("len", 16).unwrap(),
///     FeatureDomain::new("diffLen", 17, 0, 2 * 0xFFFF).unwrap(),
/// ]);
/// assert_eq!(domains.len(), 2);
/// assert_eq!(domains.position("diffLen"), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDomains {
    features: Vec<FeatureDomain>,
}

impl FeatureDomains {
    pub fn new(features: Vec<FeatureDomain>) -> Self {
        Self { features }
    }

    /// Append a feature, returning its id.
    pub fn push(&mut self, feature: FeatureDomain) -> FeatureId {
        self.features.push(feature);
        (self.features.len() - 1) as FeatureId
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn get(&self, feature: FeatureId) -> Option<&FeatureDomain> {
        self.features.get(feature as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureDomain> {
        self.features.iter()
    }

    /// Feature id for a name.
    pub fn position(&self, name: &str) -> Option<FeatureId> {
        self.features
            .iter()
            .position(|f| f.name == name)
            .map(|i| i as FeatureId)
    }

    /// Whether every coordinate of `point` lies in its feature's global range.
    pub fn contains_point(&self, point: &[u64]) -> bool {
        point.len() == self.features.len()
            && self
                .features
                .iter()
                .zip(point)
                .all(|(f, &v)| f.range.contains(v))
    }

    /// Read a table from JSON: `{"features": [{"name", "bits", "min", "max"}]}`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

impl<'a> IntoIterator for &'a FeatureDomains {
    type Item = &'a FeatureDomain;
    type IntoIter = std::slice::Iter<'a, FeatureDomain>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
