use serde::{Deserialize, Serialize};
use std::fmt;

use crate::version::ToolchainVersion;

/// Prefix shared by every switch this tool creates
pub const SWITCH_PREFIX: &str = "prism";

/// Name of an opam switch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchIdentifier(String);

impl SwitchIdentifier {
    /// Wrap a switch name reported by opam or the session environment
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the switch name for a toolchain version: `prism-<version>`
pub fn build_identifier(version: &ToolchainVersion) -> SwitchIdentifier {
    SwitchIdentifier(format!("{SWITCH_PREFIX}-{version}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_build_identifier_default() {
        let id = build_identifier(&ToolchainVersion::new("8.10.2"));
        assert_eq!(id.as_str(), "prism-8.10.2");
        assert_eq!(id.to_string(), "prism-8.10.2");
    }

    #[test]
    fn test_build_identifier_is_deterministic() {
        let version = ToolchainVersion::new("8.10.2");
        assert_eq!(build_identifier(&version), build_identifier(&version));
    }

    #[rstest]
    #[case("8.10.2", "8.10.20")]
    #[case("8.10.2", "8.9.0")]
    #[case("8.10.2", "8.10.2+flambda")]
    fn test_build_identifier_distinguishes_versions(#[case] left: &str, #[case] right: &str) {
        assert_ne!(
            build_identifier(&ToolchainVersion::new(left)),
            build_identifier(&ToolchainVersion::new(right))
        );
    }
}
