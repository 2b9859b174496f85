// tests/config_test.rs
use releaser::config::{load_config, Config, CONFIG_FILE_NAME};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
remote = "upstream"
default_branches = ["trunk"]
changelog_file = "docs/CHANGES.md"

[committer]
name = "Release Bot"

[commits]
minor_types = ["feat", "feature"]
major_version_zero = true
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let repository = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), repository.path()).unwrap();

    assert_eq!(config.remote, "upstream");
    assert_eq!(config.default_branches, vec!["trunk"]);
    assert_eq!(config.changelog_file, "docs/CHANGES.md");
    assert_eq!(config.committer.name, "Release Bot");
    assert_eq!(config.committer.email, "releaser@localhost");
    assert_eq!(config.commits.minor_types, vec!["feat", "feature"]);
    assert!(config.commits.major_version_zero);
}

#[test]
fn test_repository_file_is_used() {
    let repository = TempDir::new().unwrap();
    fs::write(
        repository.path().join(CONFIG_FILE_NAME),
        "changelog_file = \"HISTORY.md\"\n",
    )
    .unwrap();

    let config = load_config(None, repository.path()).unwrap();

    assert_eq!(config.changelog_file, "HISTORY.md");
    assert_eq!(config.remote, "origin");
}

#[test]
fn test_explicit_path_wins_over_repository_file() {
    let repository = TempDir::new().unwrap();
    fs::write(repository.path().join(CONFIG_FILE_NAME), "remote = \"repo\"\n").unwrap();
    let explicit = repository.path().join("explicit.toml");
    fs::write(&explicit, "remote = \"explicit\"\n").unwrap();

    let config = load_config(Some(explicit.as_path()), repository.path()).unwrap();

    assert_eq!(config.remote, "explicit");
}

#[test]
fn test_missing_explicit_file() {
    let repository = TempDir::new().unwrap();
    let missing = repository.path().join("missing.toml");
    let result = load_config(Some(missing.as_path()), repository.path());

    assert!(result.is_err());
}

#[test]
fn test_default_values() {
    let config = Config::default();

    assert_eq!(config.commits.minor_types, vec!["feat"]);
    assert_eq!(config.commits.patch_types, vec!["fix", "refactor", "perf"]);
    assert!(config.commits.allowed_types.contains(&"bump".to_string()));
    assert!(config
        .commits
        .allowed_prefixes
        .contains(&"fixup!".to_string()));
}
