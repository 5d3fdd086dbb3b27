//! Utilities
//!
//! Stable output contracts.

pub mod json_schema;
