use crate::domain::Version;
use crate::error::{ReleaserError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const RUNNER_TEMP: &str = "RUNNER_TEMP";

/// Read an environment variable that must be set
pub fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ReleaserError::MissingEnvironment(name.to_string()))
}

/// CI locations the release action reports to
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseEnvironment {
    /// File receiving `key=value` step outputs
    pub github_output: PathBuf,
    /// Scratch directory for the changelog copy
    pub runner_temp: PathBuf,
}

impl ReleaseEnvironment {
    pub fn from_env() -> Result<Self> {
        Ok(ReleaseEnvironment {
            github_output: PathBuf::from(required_env(GITHUB_OUTPUT)?),
            runner_temp: PathBuf::from(required_env(RUNNER_TEMP)?),
        })
    }

    /// Append `ready=true` or `ready=false`
    pub fn output_ready(&self, ready: bool) -> Result<()> {
        append_outputs(&self.github_output, &[("ready", ready.to_string())])
    }

    /// Append the released tag and the path of its changelog copy
    pub fn output_release(&self, version: &Version, changelog_copy: &Path) -> Result<()> {
        append_outputs(
            &self.github_output,
            &[
                ("tag", version.release_tag()),
                ("changelog", changelog_copy.display().to_string()),
            ],
        )
    }

    /// Write `changelog` to a fresh `<uuid>.md` in the runner temp directory
    pub fn write_changelog_copy(&self, changelog: &str) -> Result<PathBuf> {
        let path = self.runner_temp.join(format!("{}.md", Uuid::new_v4()));
        fs::write(&path, changelog)?;
        Ok(path)
    }
}

fn append_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (key, value) in outputs {
        writeln!(file, "{}={}", key, value)?;
    }
    Ok(())
}
