use std::fmt;

use crate::error::{Result, SwitchError};

/// Coq release every prism switch is built around
pub const DEFAULT_COQ_VERSION: &str = "8.10.2";

/// SerAPI release paired with [`DEFAULT_COQ_VERSION`]
pub const DEFAULT_SERAPI_VERSION: &str = "8.10.0+0.7.1";

/// OCaml compiler the switch is created with, independent of the Coq version
pub const OCAML_VERSION: &str = "4.07.1";

pub const COQ_PACKAGE: &str = "coq";
pub const SERAPI_PACKAGE: &str = "coq-serapi";

/// Version of the primary toolchain (Coq)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolchainVersion(String);

impl ToolchainVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version of the companion tool (SerAPI), fixed relative to the toolchain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanionVersion(String);

impl CompanionVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versions a switch is provisioned with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersions {
    pub toolchain: ToolchainVersion,
    pub companion: CompanionVersion,
}

impl ResolvedVersions {
    /// The only supported pairing
    pub fn default_pair() -> Self {
        Self {
            toolchain: ToolchainVersion(DEFAULT_COQ_VERSION.to_string()),
            companion: CompanionVersion(DEFAULT_SERAPI_VERSION.to_string()),
        }
    }

    /// OCaml compiler used for the switch
    pub fn runtime(&self) -> &'static str {
        OCAML_VERSION
    }
}

/// Resolve an optional requested Coq version against the supported default.
///
/// Omitting the version or naming the default yields the default pair; any
/// other value is rejected rather than silently replaced.
pub fn resolve(requested: Option<&str>) -> Result<ResolvedVersions> {
    match requested.map(str::trim) {
        None => Ok(ResolvedVersions::default_pair()),
        Some(version) if version == DEFAULT_COQ_VERSION => Ok(ResolvedVersions::default_pair()),
        Some(version) => Err(SwitchError::UnsupportedVersion {
            requested: version.to_string(),
            default: DEFAULT_COQ_VERSION.to_string(),
        }),
    }
}
