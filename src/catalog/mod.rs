//! Question catalog
//!
//! Sources list and fetch raw question documents; the aggregator turns them
//! into the ordered, id-numbered list the session works from.

pub mod aggregator;
pub mod directory;
pub mod github;
pub mod source;

pub use aggregator::{ListOrigin, QuestionAggregator};
pub use directory::DirectorySource;
pub use github::GithubSource;
pub use source::{QuestionSource, SourceEntry};
