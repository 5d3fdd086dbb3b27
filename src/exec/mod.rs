//! Execution control
//!
//! Sandbox provisioning and learner query execution.

pub mod executor;
pub mod sandbox;

pub use executor::ExecutionService;
pub use sandbox::{Sandbox, SandboxManager};
