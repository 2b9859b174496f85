use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// A long-lived branch named after a major version (`v0`, `v1`, ...)
///
/// Ordering follows the numeric major version, so `v10` sorts above `v2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
    pub major: u64,
}

impl ReleaseBranch {
    /// Parse a remote-relative branch name; only exact `v<digits>` names qualify
    pub fn parse(name: &str) -> Option<Self> {
        let captures = Regex::new(r"^v(\d+)$").ok()?.captures(name)?;
        let major = captures.get(1)?.as_str().parse::<u64>().ok()?;

        Some(ReleaseBranch {
            name: name.to_string(),
            major,
        })
    }

    /// Sort release branches with the highest major first
    pub fn sort_descending(branches: &mut [ReleaseBranch]) {
        branches.sort_by(|a, b| b.cmp(a));
    }
}

impl Ord for ReleaseBranch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ReleaseBranch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_branch() {
        let branch = ReleaseBranch::parse("v12").unwrap();
        assert_eq!(branch.name, "v12");
        assert_eq!(branch.major, 12);
    }

    #[test]
    fn test_rejects_other_names() {
        assert!(ReleaseBranch::parse("main").is_none());
        assert!(ReleaseBranch::parse("v").is_none());
        assert!(ReleaseBranch::parse("v1.2").is_none());
        assert!(ReleaseBranch::parse("v1/hotfix").is_none());
        assert!(ReleaseBranch::parse("v1-beta").is_none());
        assert!(ReleaseBranch::parse("feature/v1").is_none());
    }

    #[test]
    fn test_numeric_descending_order() {
        let mut branches: Vec<ReleaseBranch> = ["v0", "v2", "v10", "v1"]
            .iter()
            .filter_map(|name| ReleaseBranch::parse(name))
            .collect();

        ReleaseBranch::sort_descending(&mut branches);

        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["v10", "v2", "v1", "v0"]);
    }
}
