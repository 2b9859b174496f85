//! Changelog rendering and the registry of named templates
//!
//! A rendered release section looks like:
//!
//! ```text
//! ## v0.1.0 (2024-08-01)
//!
//! ### Feat
//!
//! - **scope1**: add a new feature
//! ```

use chrono::NaiveDate;
use std::fmt::Write;

/// Built-in changelog layouts, selectable by name on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangelogTemplate {
    #[default]
    Default,
    /// Appends a link to each commit on the hosting service
    GithubLinkedSha,
}

/// Every registered template, in the order they are listed to users
pub const TEMPLATES: [ChangelogTemplate; 2] = [
    ChangelogTemplate::Default,
    ChangelogTemplate::GithubLinkedSha,
];

impl ChangelogTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            ChangelogTemplate::Default => "default",
            ChangelogTemplate::GithubLinkedSha => "github_linked_sha",
        }
    }

    /// Resolve a template by its registered name
    pub fn from_name(name: &str) -> Option<Self> {
        TEMPLATES.into_iter().find(|template| template.name() == name)
    }

    /// Names of all registered templates
    pub fn names() -> Vec<&'static str> {
        TEMPLATES.iter().map(ChangelogTemplate::name).collect()
    }
}

/// One changelog line, already classified into a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub section: String,
    pub scope: Option<String>,
    pub description: String,
    pub hash: String,
}

/// Base URL for commit links: `.git` suffix dropped, SCP-style SSH remotes turned into https.
pub fn commit_url(remote_url: &str) -> String {
    let url = remote_url.strip_suffix(".git").unwrap_or(remote_url);

    let url = match url.strip_prefix("git@") {
        Some(rest) => format!("https://{}", rest.replacen(':', "/", 1)),
        None => url.to_string(),
    };

    format!("{}/commit/", url.trim_end_matches('/'))
}

/// Render one release section
///
/// Sections appear in the order given by `section_order`; sections without
/// entries are skipped. Entries keep their input order within a section.
pub fn render(
    template: ChangelogTemplate,
    tag: &str,
    date: NaiveDate,
    remote_url: &str,
    section_order: &[String],
    entries: &[ChangelogEntry],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {} ({})", tag, date.format("%Y-%m-%d"));
    out.push('\n');

    let link_base = commit_url(remote_url);

    for section in section_order {
        let in_section: Vec<&ChangelogEntry> =
            entries.iter().filter(|e| &e.section == section).collect();
        if in_section.is_empty() {
            continue;
        }

        let _ = writeln!(out, "### {}", section);
        out.push('\n');

        for entry in in_section {
            out.push_str("- ");
            if let Some(scope) = &entry.scope {
                let _ = write!(out, "**{}**: ", scope);
            }
            out.push_str(&entry.description);

            if template == ChangelogTemplate::GithubLinkedSha {
                let short = &entry.hash[..entry.hash.len().min(7)];
                let _ = write!(out, " ([{}]({}{}))", short, link_base, entry.hash);
            }
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Place a new release section above everything already in the changelog
pub fn prepend(next: &str, previous: &str) -> String {
    if previous.is_empty() {
        next.to_string()
    } else {
        format!("{}\n{}", next, previous)
    }
}
