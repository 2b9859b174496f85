//! Commit analysis collaborator: decides the next version, renders the
//! changelog and validates commit messages

pub mod conventional;

pub use conventional::ConventionalAnalyzer;

use crate::changelog::ChangelogTemplate;
use crate::domain::Version;
use crate::error::Result;
use std::path::Path;

/// Outcome of analysing the history checked out in a working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// The commits since the last release warrant this version
    Increment(Version),
    /// Nothing since the last release triggers a new version
    NoIncrement,
}

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The commit message
    pub message: String,
}

/// External commit-analysis boundary used by the workflows
///
/// Implementations read the repository found at `workdir` as it is checked
/// out; they must not switch branches or modify the working tree.
pub trait CommitAnalyzer {
    /// Determine whether the checked-out history warrants a new version
    fn analyze(&self, workdir: &Path) -> Result<Analysis>;

    /// Render the changelog section for `version`
    fn render_changelog(
        &self,
        workdir: &Path,
        remote_url: &str,
        version: &Version,
        template: Option<ChangelogTemplate>,
    ) -> Result<String>;

    /// Validate commit messages reachable from `to` but not from `from`
    fn check(&self, workdir: &Path, from: &str, to: &str) -> Result<()>;
}
