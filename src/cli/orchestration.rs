//! Action dispatch
//!
//! Turns parsed command line arguments into calls to the workflows, keeping
//! clap types out of the workflow layer so the actions can be driven
//! programmatically.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzer::{CommitAnalyzer, ConventionalAnalyzer};
use crate::changelog::ChangelogTemplate;
use crate::cli::output::ReleaseEnvironment;
use crate::cli::{Action, Cli};
use crate::config::{load_config, Config};
use crate::error::ReleaserError;
use crate::git::Git2Repository;
use crate::workflow::{self, BumpOutcome, ReleaseOutcome};

/// Arguments for the release action
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseArgs {
    /// Clone to release from
    pub repository: PathBuf,

    /// Branch whose content is released
    pub source: String,

    /// Make every local change but skip the push
    pub dry_run: bool,

    /// Changelog layout; the default template when `None`
    pub changelog_template: Option<ChangelogTemplate>,
}

/// Run the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.action.repository())
        .context("Failed to load configuration")?;
    let analyzer = ConventionalAnalyzer::new(config.commits.clone());

    match cli.action {
        Action::Release {
            source,
            dry_run,
            changelog_template,
            repository,
        } => {
            let env = ReleaseEnvironment::from_env()?;
            let changelog_template = changelog_template
                .as_deref()
                .map(|name| {
                    ChangelogTemplate::from_name(name).ok_or_else(|| {
                        ReleaserError::config(format!("Unknown changelog template '{}'", name))
                    })
                })
                .transpose()?;

            let args = ReleaseArgs {
                repository,
                source,
                dry_run,
                changelog_template,
            };
            run_release(&args, &config, &analyzer, &env)?;
        }
        Action::Check {
            check_from,
            repository,
        } => run_check(&repository, &check_from, &config, &analyzer)?,
    }

    Ok(())
}

/// Preview the release and, when a version is due, perform it and report
/// the outcome to the CI environment
///
/// Returns `None` when nothing warrants a release.
pub fn run_release<A: CommitAnalyzer>(
    args: &ReleaseArgs,
    config: &Config,
    analyzer: &A,
    env: &ReleaseEnvironment,
) -> crate::Result<Option<ReleaseOutcome>> {
    let repo = Git2Repository::open(&args.repository, config)?;

    let outcome = workflow::bump(&repo, analyzer, &args.source, args.changelog_template)?;
    let BumpOutcome::Bumped { version, changelog } = outcome else {
        env.output_ready(false)?;
        return Ok(None);
    };
    env.output_ready(true)?;

    let released = workflow::release(
        &repo,
        &args.source,
        &version,
        &changelog,
        Path::new(&config.changelog_file),
        args.dry_run,
    )?;

    let changelog_copy = env.write_changelog_copy(&changelog)?;
    env.output_release(&version, &changelog_copy)?;

    info!("Released {} on '{}'", released.tag, released.branch);
    Ok(Some(released))
}

/// Validate commit messages made on `HEAD` since `check_from`
pub fn run_check<A: CommitAnalyzer>(
    repository: &Path,
    check_from: &str,
    config: &Config,
    analyzer: &A,
) -> crate::Result<()> {
    let repo = Git2Repository::open(repository, config)?;

    workflow::check(&repo, analyzer, check_from)
}
