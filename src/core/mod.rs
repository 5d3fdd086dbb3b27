//! Practice session core.
//!
//! The session ties the question list, the single active sandbox and the
//! verdict pipeline together behind an explicit state value.

pub mod session;

pub use session::{RunOutcome, Session, SessionState};
