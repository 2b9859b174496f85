//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the repository
//! operations the release workflows need, allowing a real `git2`-backed
//! implementation and an in-memory mock for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [ReleaseRepository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for workflow tests
//!
//! # Usage
//!
//! Workflows depend on the [ReleaseRepository] trait rather than concrete
//! implementations.
//!
//! ```ignore
//! # use releaser::git::ReleaseRepository;
//! # fn example<R: ReleaseRepository>(repo: &R) -> releaser::Result<()> {
//! let branches = repo.find_release_branches()?;
//! if let Some(current) = branches.first() {
//!     repo.checkout("preview", &current.name)?;
//!     repo.merge("main", "preview", None)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Preconditions
//!
//! Every operation mutates one working tree. A single release invocation per
//! clone is assumed; running two merges against the same clone concurrently is
//! unsupported.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::ReleaseBranch;
use crate::error::Result;
use git2::Oid;
use std::path::{Path, PathBuf};

/// Name that always resolves to the currently checked-out head.
pub const HEAD: &str = "HEAD";

/// A resolved, named pointer to a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Whatever is checked out; `branch` is `None` when the head is detached
    Head { target: Oid, branch: Option<String> },
    /// A local branch under `refs/heads`
    Local { name: String, target: Oid },
    /// A remote-tracking branch under `refs/remotes/<remote>`
    Remote {
        remote: String,
        name: String,
        target: Oid,
    },
}

impl Reference {
    /// Commit the reference points at
    pub fn target(&self) -> Oid {
        match self {
            Reference::Head { target, .. }
            | Reference::Local { target, .. }
            | Reference::Remote { target, .. } => *target,
        }
    }

    /// Name usable as a revision: `HEAD`, `<branch>` or `<remote>/<branch>`
    pub fn qualified_name(&self) -> String {
        match self {
            Reference::Head { .. } => HEAD.to_string(),
            Reference::Local { name, .. } => name.clone(),
            Reference::Remote { remote, name, .. } => format!("{}/{}", remote, name),
        }
    }
}

/// Repository operations driving the release state machine
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. An absent branch is only an
/// error where an operation cannot proceed without it; [find_reference] reports
/// absence as `Ok(None)`.
///
/// ## Working tree discipline
///
/// Every checkout, including the ones performed inside [merge], leaves the
/// index and working tree exactly at the checked-out commit with no untracked
/// files left behind.
///
/// [find_reference]: ReleaseRepository::find_reference
/// [merge]: ReleaseRepository::merge
pub trait ReleaseRepository {
    /// The primary development branch (`main` or `master`)
    fn default_branch(&self) -> &str;

    /// Root of the working tree
    fn workdir(&self) -> Result<PathBuf>;

    /// URL of the configured remote
    fn remote_url(&self) -> Result<String>;

    /// Resolve `HEAD`, a local branch, or a remote-tracking branch, in that order
    ///
    /// # Returns
    /// * `Ok(Some(Reference))` - The resolved reference
    /// * `Ok(None)` - If nothing by that name exists
    /// * `Err` - If there's a Git error
    fn find_reference(&self, name: &str) -> Result<Option<Reference>>;

    /// Check out `branch`, creating it from `base` when it does not exist
    ///
    /// A remote-tracking branch becomes a local branch tracking it. When
    /// `base` does not resolve to a reference it is rev-parsed as a commit-ish,
    /// which allows branching from a raw commit id.
    fn checkout(&self, branch: &str, base: &str) -> Result<()>;

    /// Force-delete a local branch after checking out the default branch
    ///
    /// Does nothing if the local branch does not exist.
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Release branches on the remote, highest major version first
    fn find_release_branches(&self) -> Result<Vec<ReleaseBranch>>;

    /// Root commit reachable from the remote default branch
    fn find_first_commit(&self) -> Result<Oid>;

    /// Merge `source` into `target` with a three-way tree merge
    ///
    /// Creates a merge commit with parents `[target_tip, source_tip]`. Fails
    /// with a reference error naming the missing side, or a merge conflict
    /// error; conflicts are never resolved automatically.
    ///
    /// # Example
    /// ```ignore
    /// # use releaser::git::ReleaseRepository;
    /// # fn example<R: ReleaseRepository>(repo: &R) -> releaser::Result<()> {
    /// let merge_commit = repo.merge("main", "v0", None)?;
    /// println!("v0 now at {}", merge_commit);
    /// # Ok(())
    /// # }
    /// ```
    fn merge(&self, source: &str, target: &str, message: Option<&str>) -> Result<Oid>;

    /// Commit the given paths (relative to the working tree) on the current branch
    fn commit(&self, files: &[&Path], message: &str) -> Result<Oid>;

    /// Create an annotated tag on `commit`
    fn tag(&self, name: &str, message: &str, commit: Oid) -> Result<Oid>;

    /// Push branches and tags by short name; `dry_run` validates without transferring
    fn push(&self, ref_names: &[&str], dry_run: bool) -> Result<()>;
}
