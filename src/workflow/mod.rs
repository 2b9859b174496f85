//! Release workflows built on top of [crate::git::ReleaseRepository] and
//! [crate::analyzer::CommitAnalyzer]

pub mod bump;
pub mod check;
pub mod release;

pub use bump::{bump, BumpOutcome};
pub use check::check;
pub use release::{release, ReleaseOutcome};
