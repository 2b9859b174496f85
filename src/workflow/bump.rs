use crate::analyzer::{Analysis, CommitAnalyzer};
use crate::changelog::ChangelogTemplate;
use crate::domain::Version;
use crate::error::Result;
use crate::git::ReleaseRepository;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of previewing a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpOutcome {
    /// A new version is due, with its rendered changelog section
    Bumped { version: Version, changelog: String },
    /// Nothing since the last release warrants a new version
    NoBump,
}

/// Throwaway local branch that is deleted when dropped
struct TemporaryBranch<'a, R: ReleaseRepository> {
    repo: &'a R,
    name: String,
}

impl<'a, R: ReleaseRepository> TemporaryBranch<'a, R> {
    fn new(repo: &'a R) -> Self {
        TemporaryBranch {
            repo,
            name: Uuid::new_v4().to_string(),
        }
    }
}

impl<R: ReleaseRepository> Drop for TemporaryBranch<'_, R> {
    fn drop(&mut self) {
        info!("Delete temporary branch '{}'", self.name);
        if let Err(e) = self.repo.delete_branch(&self.name) {
            warn!("Could not delete temporary branch '{}': {}", self.name, e);
        }
    }
}

/// Preview the release of `source` and ask `analyzer` for the next version.
///
/// The preview happens on a temporary branch: based on the highest release
/// branch with `source` merged in, or on `source` itself when no release
/// branch exists yet. The temporary branch is removed on every return path.
pub fn bump<R, A>(
    repo: &R,
    analyzer: &A,
    source: &str,
    template: Option<ChangelogTemplate>,
) -> Result<BumpOutcome>
where
    R: ReleaseRepository,
    A: CommitAnalyzer,
{
    let temporary = TemporaryBranch::new(repo);
    let release_branches = repo.find_release_branches()?;

    match release_branches.first() {
        Some(latest) => {
            info!("Release branches found, previewing on '{}'", latest);
            repo.checkout(&temporary.name, &latest.name)?;
            info!("Merging '{}' into '{}'", source, temporary.name);
            repo.merge(source, &temporary.name, None)?;
        }
        None => {
            info!("No release branch found, analysing '{}' directly", source);
            repo.checkout(&temporary.name, source)?;
        }
    }

    let workdir = repo.workdir()?;
    let version = match analyzer.analyze(&workdir)? {
        Analysis::Increment(version) => version,
        Analysis::NoIncrement => {
            info!("No commits warrant a new release");
            return Ok(BumpOutcome::NoBump);
        }
    };

    debug!("Rendering changelog for {}", version);
    let changelog = analyzer.render_changelog(&workdir, &repo.remote_url()?, &version, template)?;

    info!("Next release is {}", version.release_tag());
    Ok(BumpOutcome::Bumped { version, changelog })
}
