//! Ternary match blocks and the range decomposer.
//!
//! - [`TernaryBlock`]: an aligned power-of-two block as a `(value, mask)` pair
//! - [`decompose`]: minimal ordered block cover of an inclusive interval
//! - [`Decomposition`]: the lazy form of [`decompose`]

mod block;
mod decompose;

pub use block::TernaryBlock;
pub use decompose::{block_count, decompose, Decomposition};
