// tests/bump_test.rs
mod common;

use common::Origin;
use git2::{BranchType, Repository};
use releaser::analyzer::{Analysis, CommitAnalyzer, ConventionalAnalyzer};
use releaser::changelog::ChangelogTemplate;
use releaser::config::{CommitRulesConfig, Config};
use releaser::domain::Version;
use releaser::git::Git2Repository;
use releaser::workflow::{bump, BumpOutcome};
use releaser::{ReleaserError, Result};
use std::path::Path;

struct FailingAnalyzer;

impl CommitAnalyzer for FailingAnalyzer {
    fn analyze(&self, _workdir: &Path) -> Result<Analysis> {
        Err(ReleaserError::validation("Unexpected exception"))
    }

    fn render_changelog(
        &self,
        _workdir: &Path,
        _remote_url: &str,
        _version: &Version,
        _template: Option<ChangelogTemplate>,
    ) -> Result<String> {
        unreachable!("analysis never succeeds")
    }

    fn check(&self, _workdir: &Path, _from: &str, _to: &str) -> Result<()> {
        Ok(())
    }
}

fn local_branches(path: &Path) -> Vec<String> {
    let repo = Repository::open(path).unwrap();
    let names = repo
        .branches(Some(BranchType::Local))
        .unwrap()
        .map(|b| b.unwrap().0.name().unwrap().unwrap().to_string())
        .collect();
    names
}

#[test]
fn test_no_version_bump() {
    let origin = Origin::new("main");
    origin.commit(".releaser", "{}", "docs: v0.0.0", None);
    let path = origin.clone(&[]);
    let repo = Git2Repository::open(&path, &Config::default()).unwrap();
    let analyzer = ConventionalAnalyzer::new(CommitRulesConfig::default());

    let outcome = bump(&repo, &analyzer, "main", None).unwrap();

    assert_eq!(outcome, BumpOutcome::NoBump);
    assert_eq!(local_branches(&path), vec!["main"]);
}

#[test]
fn test_unexpected_exception() {
    let origin = Origin::new("main");
    origin.create_branch("v0");
    let path = origin.clone(&[]);
    let repo = Git2Repository::open(&path, &Config::default()).unwrap();

    let err = bump(&repo, &FailingAnalyzer, "main", None).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Commit validation failed: Unexpected exception"
    );
    assert_eq!(local_branches(&path), vec!["main"]);
}

#[test]
fn test_preview_does_not_touch_release_branch() {
    let origin = Origin::new("main");
    origin.create_branch("v0");
    origin.commit("feature.txt", "feature", "feat: add a feature", None);
    let path = origin.clone(&[]);
    let repo = Git2Repository::open(&path, &Config::default()).unwrap();
    let analyzer = ConventionalAnalyzer::new(CommitRulesConfig::default());

    let outcome = bump(&repo, &analyzer, "main", None).unwrap();

    match outcome {
        BumpOutcome::Bumped { version, changelog } => {
            assert_eq!(version, Version::new(0, 1, 0));
            assert!(changelog.contains("- add a feature"));
        }
        BumpOutcome::NoBump => panic!("Expected a bump"),
    }
    assert_eq!(local_branches(&path), vec!["main"]);
    assert_eq!(
        Repository::open(&path).unwrap().head().unwrap().shorthand(),
        Some("main")
    );
}
