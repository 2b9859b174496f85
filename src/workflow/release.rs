use crate::changelog;
use crate::domain::Version;
use crate::error::Result;
use crate::git::{ReleaseRepository, HEAD};
use git2::Oid;
use std::fs;
use std::path::Path;
use tracing::info;

/// What a release created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub branch: String,
    pub tag: String,
    /// The changelog commit the tag points at
    pub commit: Oid,
}

/// Check out `branch`, creating it if this is the first release of its line.
///
/// A new line starts from the highest existing release branch, or from the
/// root commit when there is none so the first line carries the full history.
pub fn prepare_release_branch<R: ReleaseRepository>(repo: &R, branch: &str) -> Result<()> {
    let release_branches = repo.find_release_branches()?;

    if release_branches.iter().any(|b| b.name == branch) {
        info!("Release branch '{}' exists", branch);
        return repo.checkout(branch, HEAD);
    }

    match release_branches.first() {
        Some(latest) => {
            info!("Creating release branch '{}' on '{}'", branch, latest);
            repo.checkout(branch, &latest.name)
        }
        None => {
            let root = repo.find_first_commit()?;
            info!("Creating release branch '{}' on root commit {}", branch, root);
            repo.checkout(branch, &root.to_string())
        }
    }
}

/// Prepend `changelog` to the file at `path`, creating it if needed
pub fn write_changelog(path: &Path, changelog: &str) -> Result<()> {
    let previous = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, changelog::prepend(changelog, &previous))?;
    Ok(())
}

/// Merge `source` into the release branch of `version`, then commit the
/// changelog, tag and push.
///
/// `changelog_file` is relative to the working tree root. With `dry_run` every
/// local change is still made; only the network push is skipped.
pub fn release<R: ReleaseRepository>(
    repo: &R,
    source: &str,
    version: &Version,
    changelog: &str,
    changelog_file: &Path,
    dry_run: bool,
) -> Result<ReleaseOutcome> {
    let branch = version.release_branch();
    let tag = version.release_tag();

    prepare_release_branch(repo, &branch)?;

    info!("Merging '{}' into '{}'", source, branch);
    repo.merge(source, &branch, None)?;

    write_changelog(&repo.workdir()?.join(changelog_file), changelog)?;
    let commit = repo.commit(&[changelog_file], &format!("Update CHANGELOG for {}", tag))?;

    repo.tag(&tag, &format!("Automated release of {}", tag), commit)?;
    info!("Tagged {} as {}", commit, tag);

    repo.push(&[branch.as_str(), tag.as_str()], dry_run)?;
    if !dry_run {
        info!("Pushed '{}' and '{}'", branch, tag);
    }

    Ok(ReleaseOutcome {
        branch,
        tag,
        commit,
    })
}
