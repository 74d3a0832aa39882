//! External model format compatibility.
//!
//! Converts trees trained in other frameworks into native [`DecisionTree`]s.
//! Each loader is feature-gated to avoid pulling in unnecessary code.
//!
//! [`DecisionTree`]: crate::trees::DecisionTree

#[cfg(feature = "sklearn-compat")]
pub mod sklearn;

#[cfg(feature = "sklearn-compat")]
pub use sklearn::{ConversionError, SklearnTree};
