use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaserError, Result};

/// Name of the configuration file looked up in the repository and the user config directory.
pub const CONFIG_FILE_NAME: &str = "releaser.toml";

/// Represents the complete configuration for releaser.
///
/// Contains the remote to release against, default branch candidates, the changelog
/// location, commit rules for the built-in analyzer and the fallback committer identity.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branches")]
    pub default_branches: Vec<String>,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    #[serde(default)]
    pub committer: CommitterConfig,

    #[serde(default)]
    pub commits: CommitRulesConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Candidates for the default branch, in order of preference.
fn default_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            remote: default_remote(),
            default_branches: default_branches(),
            changelog_file: default_changelog_file(),
            committer: CommitterConfig::default(),
            commits: CommitRulesConfig::default(),
        }
    }
}

/// Identity used for release commits and tags when the repository has no `user.name`/`user.email`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitterConfig {
    #[serde(default = "default_committer_name")]
    pub name: String,

    #[serde(default = "default_committer_email")]
    pub email: String,
}

fn default_committer_name() -> String {
    "releaser".to_string()
}

fn default_committer_email() -> String {
    "releaser@localhost".to_string()
}

impl Default for CommitterConfig {
    fn default() -> Self {
        CommitterConfig {
            name: default_committer_name(),
            email: default_committer_email(),
        }
    }
}

fn default_minor_types() -> Vec<String> {
    vec!["feat".to_string()]
}

fn default_patch_types() -> Vec<String> {
    vec!["fix".to_string(), "refactor".to_string(), "perf".to_string()]
}

/// Returns the commit types accepted by `check`.
fn default_allowed_types() -> Vec<String> {
    [
        "build", "ci", "docs", "feat", "fix", "perf", "refactor", "style", "test", "chore",
        "revert", "bump",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

/// Returns the message prefixes that `check` skips entirely.
fn default_allowed_prefixes() -> Vec<String> {
    ["Merge", "Revert", "Pull request", "fixup!", "squash!"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Rules the built-in conventional commit analyzer applies.
///
/// Breaking changes always bump major (or minor while on `0.x` when
/// `major_version_zero` is set). Types outside both lists never trigger a release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitRulesConfig {
    #[serde(default = "default_minor_types")]
    pub minor_types: Vec<String>,

    #[serde(default = "default_patch_types")]
    pub patch_types: Vec<String>,

    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,

    #[serde(default = "default_allowed_prefixes")]
    pub allowed_prefixes: Vec<String>,

    #[serde(default)]
    pub major_version_zero: bool,
}

impl Default for CommitRulesConfig {
    fn default() -> Self {
        CommitRulesConfig {
            minor_types: default_minor_types(),
            patch_types: default_patch_types(),
            allowed_types: default_allowed_types(),
            allowed_prefixes: default_allowed_prefixes(),
            major_version_zero: false,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releaser.toml` in the repository directory
/// 3. `releaser.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `repository` - Repository directory searched before the user config directory
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repository: &Path) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if repository.join(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(repository.join(CONFIG_FILE_NAME))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| ReleaserError::config(e.to_string()))
}
