//! Testing infrastructure
//!
//! Engine doubles for exercising sandboxes, execution and sessions without SQLite.

pub mod stub_engine;

pub use stub_engine::StubEngine;
