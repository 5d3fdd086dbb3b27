//! Result normalization and verdict classification
//!
//! Derives correctness as pure functions over result sets.

pub mod normalize;
pub mod verdict;

pub use normalize::{normalize, primary_result};
pub use verdict::{Verdict, VerdictCause, VerdictClassifier};
