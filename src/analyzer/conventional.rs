use crate::analyzer::{Analysis, CommitAnalyzer, CommitInfo};
use crate::changelog::{self, ChangelogEntry, ChangelogTemplate};
use crate::config::CommitRulesConfig;
use crate::domain::{ParsedCommit, Version, VersionBump};
use crate::error::{ReleaserError, Result};
use chrono::{Local, NaiveDate};
use git2::{Oid, Repository, Sort};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

const BREAKING_SECTION: &str = "BREAKING CHANGE";

/// Built-in analyzer following the conventional commits convention
///
/// The current version is the highest `v<major>.<minor>.<patch>` tag reachable
/// from `HEAD` (`0.0.0` without one); only commits made after that tag count.
pub struct ConventionalAnalyzer {
    rules: CommitRulesConfig,
    release_date: Option<NaiveDate>,
}

impl ConventionalAnalyzer {
    /// Create a new analyzer
    pub fn new(rules: CommitRulesConfig) -> Self {
        ConventionalAnalyzer {
            rules,
            release_date: None,
        }
    }

    /// Pin the date written into changelog headers instead of using today
    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    /// Bump warranted by `commits` on top of `current`, if any
    pub fn determine_bump(&self, current: Version, commits: &[CommitInfo]) -> Option<VersionBump> {
        let mut bump = None;

        for commit in commits {
            let Some(parsed) = ParsedCommit::parse(&commit.message) else {
                continue;
            };

            let candidate = if parsed.is_breaking_change {
                Some(VersionBump::Major)
            } else if self.rules.minor_types.contains(&parsed.r#type) {
                Some(VersionBump::Minor)
            } else if self.rules.patch_types.contains(&parsed.r#type) {
                Some(VersionBump::Patch)
            } else {
                None
            };

            bump = bump.max(candidate);
        }

        if bump == Some(VersionBump::Major) && current.major == 0 && self.rules.major_version_zero
        {
            return Some(VersionBump::Minor);
        }

        bump
    }

    /// Highest release tag whose commit is `head` or one of its ancestors
    fn current_release(&self, repo: &Repository, head: Oid) -> Result<Option<(Version, Oid)>> {
        let mut current: Option<(Version, Oid)> = None;

        for name in repo.tag_names(None)?.iter().flatten() {
            if !name.starts_with('v') {
                continue;
            }
            let Ok(version) = Version::parse(name) else {
                continue;
            };

            let commit = repo
                .find_reference(&format!("refs/tags/{}", name))?
                .peel_to_commit()?
                .id();
            let reachable = commit == head || repo.graph_descendant_of(head, commit)?;

            if reachable && current.map_or(true, |(best, _)| version > best) {
                current = Some((version, commit));
            }
        }

        Ok(current)
    }

    /// Commits reachable from `head` but not from `since`, newest first
    fn commits_since(
        &self,
        repo: &Repository,
        head: Oid,
        since: Option<Oid>,
    ) -> Result<Vec<CommitInfo>> {
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;
        if let Some(since) = since {
            revwalk.hide(since)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = repo.find_commit(oid)?;
            commits.push(CommitInfo {
                hash: oid.to_string(),
                message: commit.message().unwrap_or_default().to_string(),
            });
        }

        Ok(commits)
    }

    /// Current version and the commits made since it, for the checked-out `HEAD`
    fn pending_release(&self, workdir: &Path) -> Result<(Version, Vec<CommitInfo>)> {
        let repo = Repository::open(workdir)?;
        let head = repo.head()?.peel_to_commit()?.id();

        let current = self.current_release(&repo, head)?;
        let commits = self.commits_since(&repo, head, current.map(|(_, commit)| commit))?;
        let version = current
            .map(|(version, _)| version)
            .unwrap_or(Version::new(0, 0, 0));

        debug!(
            "Current version {} with {} commit(s) since",
            version,
            commits.len()
        );
        Ok((version, commits))
    }

    /// Changelog section a commit belongs to, or `None` when it is left out
    fn section_for(&self, parsed: &ParsedCommit) -> Option<String> {
        if parsed.is_breaking_change {
            return Some(BREAKING_SECTION.to_string());
        }

        let listed = self.rules.minor_types.contains(&parsed.r#type)
            || self.rules.patch_types.contains(&parsed.r#type);
        listed.then(|| capitalize(&parsed.r#type))
    }

    fn section_order(&self) -> Vec<String> {
        std::iter::once(BREAKING_SECTION.to_string())
            .chain(
                self.rules
                    .minor_types
                    .iter()
                    .chain(self.rules.patch_types.iter())
                    .map(|t| capitalize(t)),
            )
            .collect()
    }

    fn message_pattern(&self) -> Result<Regex> {
        let types: Vec<String> = self
            .rules
            .allowed_types
            .iter()
            .map(|t| regex::escape(t))
            .collect();

        Regex::new(&format!(
            r"(?s)^({})(\([^\s()]+\))?!?: [^\n\r]+((\n\n.*)|(\s*))?$",
            types.join("|")
        ))
        .map_err(|e| ReleaserError::config(format!("Invalid commit type list: {}", e)))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl CommitAnalyzer for ConventionalAnalyzer {
    fn analyze(&self, workdir: &Path) -> Result<Analysis> {
        let (current, commits) = self.pending_release(workdir)?;

        match self.determine_bump(current, &commits) {
            Some(bump) => {
                let next = current.bump(bump);
                info!("{:?} bump from {} to {}", bump, current, next);
                Ok(Analysis::Increment(next))
            }
            None => Ok(Analysis::NoIncrement),
        }
    }

    fn render_changelog(
        &self,
        workdir: &Path,
        remote_url: &str,
        version: &Version,
        template: Option<ChangelogTemplate>,
    ) -> Result<String> {
        let (_, commits) = self.pending_release(workdir)?;

        let entries: Vec<ChangelogEntry> = commits
            .iter()
            .filter_map(|commit| {
                let parsed = ParsedCommit::parse(&commit.message)?;
                let section = self.section_for(&parsed)?;
                Some(ChangelogEntry {
                    section,
                    scope: parsed.scope,
                    description: parsed.description,
                    hash: commit.hash.clone(),
                })
            })
            .collect();

        let date = self
            .release_date
            .unwrap_or_else(|| Local::now().date_naive());

        Ok(changelog::render(
            template.unwrap_or_default(),
            &version.release_tag(),
            date,
            remote_url,
            &self.section_order(),
            &entries,
        ))
    }

    fn check(&self, workdir: &Path, from: &str, to: &str) -> Result<()> {
        let repo = Repository::open(workdir)?;
        let from_oid = repo.revparse_single(from)?.peel_to_commit()?.id();
        let to_oid = repo.revparse_single(to)?.peel_to_commit()?.id();

        let pattern = self.message_pattern()?;
        let mut checked = 0;
        let mut invalid = Vec::new();

        for commit in self.commits_since(&repo, to_oid, Some(from_oid))? {
            let skipped = self
                .rules
                .allowed_prefixes
                .iter()
                .any(|prefix| commit.message.starts_with(prefix.as_str()));
            if skipped {
                continue;
            }

            checked += 1;
            if !pattern.is_match(&commit.message) {
                let header = commit.message.lines().next().unwrap_or_default();
                invalid.push(format!("{} {}", &commit.hash[..7], header));
            }
        }

        if invalid.is_empty() {
            info!("Checked {} commit message(s) in {}..{}", checked, from, to);
            return Ok(());
        }

        Err(ReleaserError::validation(format!(
            "commit message(s) do not follow the conventional commit format:\n{}",
            invalid.join("\n")
        )))
    }
}
