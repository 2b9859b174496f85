use std::fmt;

use thiserror::Error;

/// Which side of an operation a branch name was supplied for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    Source,
    Target,
    Default,
    CheckFrom,
    Push,
}

impl fmt::Display for ReferenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            ReferenceRole::Source => "source",
            ReferenceRole::Target => "target",
            ReferenceRole::Default => "default",
            ReferenceRole::CheckFrom => "starting",
            ReferenceRole::Push => "push",
        };
        f.write_str(role)
    }
}

/// Unified error type for releaser operations
#[derive(Error, Debug)]
pub enum ReleaserError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Could not find {role} branch '{name}'.")]
    ReferenceNotFound { role: ReferenceRole, name: String },

    #[error("Default branch not found.")]
    DefaultBranchNotFound,

    #[error(
        "Merging '{source_branch}' into '{target_branch}' produced conflicts in: {}",
        .paths.join(", ")
    )]
    MergeConflict {
        source_branch: String,
        target_branch: String,
        paths: Vec<String>,
    },

    #[error("Commit validation failed: {0}")]
    Validation(String),

    #[error("The environment variable '{0}' is not set.")]
    MissingEnvironment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in releaser
pub type Result<T> = std::result::Result<T, ReleaserError>;

impl ReleaserError {
    pub fn not_found(role: ReferenceRole, name: impl Into<String>) -> Self {
        ReleaserError::ReferenceNotFound {
            role,
            name: name.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ReleaserError::Config(msg.into())
    }

    pub fn version(msg: impl Into<String>) -> Self {
        ReleaserError::Version(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ReleaserError::Validation(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaserError::Remote(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_not_found_names_role() {
        let err = ReleaserError::not_found(ReferenceRole::Source, "doesnt_exist");
        assert_eq!(
            err.to_string(),
            "Could not find source branch 'doesnt_exist'."
        );

        let err = ReleaserError::not_found(ReferenceRole::Target, "v0");
        assert_eq!(err.to_string(), "Could not find target branch 'v0'.");
    }

    #[test]
    fn test_merge_conflict_lists_paths() {
        let err = ReleaserError::MergeConflict {
            source_branch: "main".to_string(),
            target_branch: "v0".to_string(),
            paths: vec!["README.md".to_string(), "src/lib.rs".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Merging 'main' into 'v0' produced conflicts in: README.md, src/lib.rs"
        );
    }

    #[test]
    fn test_missing_environment_message() {
        let err = ReleaserError::MissingEnvironment("missing".to_string());
        assert_eq!(
            err.to_string(),
            "The environment variable 'missing' is not set."
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaserError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaserError::config("x"), "Configuration error"),
            (ReleaserError::version("x"), "Version parsing error"),
            (ReleaserError::validation("x"), "Commit validation failed"),
            (ReleaserError::remote("x"), "Remote operation failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
