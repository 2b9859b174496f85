use regex::Regex;

const BREAKING_FOOTERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl ParsedCommit {
    /// Parse a commit message written in the conventional commits format
    ///
    /// Only the first line is matched against `type(scope)!: description`; the
    /// body is scanned for a breaking-change footer. Returns `None` for messages
    /// that are not conventional commits (merge commits, free text).
    pub fn parse(message: &str) -> Option<Self> {
        let header = message.lines().next().unwrap_or_default();
        let captures = Regex::new(r"^([a-zA-Z]+)(?:\(([^)]+)\))?(!)?:\s*(.*)$")
            .ok()?
            .captures(header)?;

        let r#type = captures.get(1)?.as_str().to_lowercase();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).is_some();
        let description = captures
            .get(4)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let has_footer = BREAKING_FOOTERS
            .iter()
            .any(|footer| message.contains(footer));

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change: has_exclamation || has_footer,
        })
    }
}
