use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::switch::SwitchIdentifier;
use crate::version::ResolvedVersions;

/// Record of a completed provisioning, written next to other local state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Version of the receipt format
    version: u32,
    pub switch: SwitchIdentifier,
    pub coq: String,
    pub serapi: String,
    pub ocaml: String,
    /// When the switch was provisioned (RFC 3339)
    pub provisioned_at: String,
}

impl Receipt {
    pub fn new(switch: &SwitchIdentifier, versions: &ResolvedVersions) -> Self {
        Self {
            version: 1,
            switch: switch.clone(),
            coq: versions.toolchain.to_string(),
            serapi: versions.companion.to_string(),
            ocaml: versions.runtime().to_string(),
            provisioned_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Load a receipt, or `None` if the switch was never provisioned here
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read receipt {:?}", path))?;
        let receipt = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse receipt {:?}", path))?;
        Ok(Some(receipt))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize receipt")?;
        fs::write(path, contents).with_context(|| format!("Failed to write receipt {:?}", path))?;
        Ok(())
    }

    /// Whether the receipt still describes the given versions
    pub fn matches(&self, versions: &ResolvedVersions) -> bool {
        self.coq == versions.toolchain.as_str()
            && self.serapi == versions.companion.as_str()
            && self.ocaml == versions.runtime()
    }
}
