use crate::analyzer::CommitAnalyzer;
use crate::error::{ReferenceRole, ReleaserError, Result};
use crate::git::{Reference, ReleaseRepository, HEAD};
use tracing::info;

/// Validate the messages of every commit on `HEAD` that is not on `from`
pub fn check<R, A>(repo: &R, analyzer: &A, from: &str) -> Result<()>
where
    R: ReleaseRepository,
    A: CommitAnalyzer,
{
    let revision = match repo.find_reference(from)? {
        Some(Reference::Head { .. }) => HEAD.to_string(),
        Some(Reference::Local { name, .. }) => name,
        Some(reference @ Reference::Remote { .. }) => reference.qualified_name(),
        None => return Err(ReleaserError::not_found(ReferenceRole::CheckFrom, from)),
    };

    info!("Checking commit messages from '{}' to {}", revision, HEAD);
    analyzer.check(&repo.workdir()?, &revision, HEAD)
}
