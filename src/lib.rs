//! sqlbox: A SQL practice judge
//! Loads exercises, gives each one a disposable database and judges learner queries
//!
//! # Architecture
//!
//! This crate is organized along the path a submission takes:
//!
//! ## Question Catalog ([`catalog`])
//! - [`catalog::source`]: Question source seam (list + fetch raw documents)
//! - [`catalog::github`]: Remote repository contents listing over HTTP
//! - [`catalog::directory`]: Local folder of question documents
//! - [`catalog::aggregator`]: Ordered aggregation with skip-and-continue and fallback
//!
//! ## SQL Engine ([`engine`])
//! - [`engine::sqlite`]: Embedded SQLite backend (one in-memory database per sandbox)
//!
//! ## Execution Control ([`exec`])
//! - [`exec::sandbox`]: Single active sandbox, reprovisioned on every selection change
//! - [`exec::executor`]: Query validation and execution
//!
//! ## Session ([`core`])
//! - [`core::session`]: Explicit session state machine driven by discrete events
//!
//! ## Verdict ([`verdict`])
//! - [`verdict::normalize`]: Column-case and numeric-precision canonicalization
//! - [`verdict::verdict`]: Order-insensitive result equivalence
//!
//! ## Observability ([`observability`])
//! - [`observability::metrics`]: Prometheus metrics export
//!
//! ## Configuration ([`config`])
//! - [`config::settings`]: Configuration loading and validation
//! - [`config::validator`]: Question document validation
//! - [`config::types`]: Shared type definitions and error taxonomy
//! - [`config::presets`]: Built-in fallback questions and authoring template
//!
//! ## Utilities ([`utils`])
//! - [`utils::json_schema`]: Stable JSON run report
//!
//! ## Testing Infrastructure ([`testing`])
//! - [`testing::stub_engine`]: Scripted engine for tests without SQLite
//!
//! # Design Principles
//!
//! 1. **Loading never fails** - Bad documents are skipped, empty harvests fall back
//! 2. **No leakage between exercises** - Every selection gets a brand-new database
//! 3. **One canonical form** - Both sides of a comparison pass the same normalizer
//! 4. **Errors become state** - Nothing below the CLI terminates the session

// Question Catalog
pub mod catalog;

// SQL Engine
pub mod engine;

// Execution Control
pub mod exec;

// Session
pub mod core;

// Verdict
pub mod verdict;

// Observability
pub mod observability;

// Configuration
pub mod config;

// Utilities
pub mod utils;

// Testing Infrastructure
pub mod testing;

// CLI entrypoint wiring for the sqlbox binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::types::*;
pub use crate::core::session::{RunOutcome, Session, SessionState};
pub use verdict::{Verdict, VerdictCause, VerdictClassifier};
