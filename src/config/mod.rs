//! Configuration and question model
//!
//! Shared types, configuration loading, question document validation and
//! the built-in exercise set.

pub mod presets;
pub mod settings;
pub mod types;
pub mod validator;
