use crate::error::{ReleaserError, Result};
use std::fmt;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a plain release version, with or without a `v`/`V` prefix ("v1.2.3" -> 1.2.3).
    ///
    /// Pre-release and build metadata are rejected: release lines only carry
    /// `major.minor.patch`.
    pub fn parse(tag: &str) -> Result<Self> {
        let clean_tag = tag.trim_start_matches('v').trim_start_matches('V');

        let parsed = semver::Version::parse(clean_tag)
            .map_err(|e| ReleaserError::version(format!("Invalid version '{}': {}", tag, e)))?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaserError::version(format!(
                "Invalid version '{}': expected X.Y.Z without pre-release or build metadata",
                tag
            )));
        }

        Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Bump version according to bump type
    pub fn bump(&self, bump_type: VersionBump) -> Self {
        match bump_type {
            VersionBump::Major => Version::new(self.major + 1, 0, 0),
            VersionBump::Minor => Version::new(self.major, self.minor + 1, 0),
            VersionBump::Patch => Version::new(self.major, self.minor, self.patch + 1),
        }
    }

    /// Tag created for this release, e.g. `v1.2.3`
    pub fn release_tag(&self) -> String {
        format!("v{}", self)
    }

    /// Long-lived branch collecting every release of this major line, e.g. `v1`
    pub fn release_branch(&self) -> String {
        format!("v{}", self.major)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    Patch,
    Minor,
    Major,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_without_prefix() {
        assert_eq!(Version::parse("0.1.0").unwrap(), Version::new(0, 1, 0));
        assert_eq!(Version::parse("V2.0.1").unwrap(), Version::new(2, 0, 1));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("v1.2.3.4").is_err());
        assert!(Version::parse("v1.2.3-rc.1").is_err());
        assert!(Version::parse("release").is_err());
    }

    #[test]
    fn test_version_bump() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Major), Version::new(2, 0, 0));
        assert_eq!(v.bump(VersionBump::Minor), Version::new(1, 3, 0));
        assert_eq!(v.bump(VersionBump::Patch), Version::new(1, 2, 4));
    }

    #[test]
    fn test_release_names() {
        let v = Version::new(0, 1, 1);
        assert_eq!(v.release_tag(), "v0.1.1");
        assert_eq!(v.release_branch(), "v0");
        assert_eq!(Version::new(10, 0, 0).release_branch(), "v10");
    }

    #[test]
    fn test_bump_ordering() {
        assert!(VersionBump::Major > VersionBump::Minor);
        assert!(VersionBump::Minor > VersionBump::Patch);
    }
}
