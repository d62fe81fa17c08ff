use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-project configuration file name
pub const CONFIG_FILE: &str = "prism-switch.toml";

/// Project configuration read from `prism-switch.toml`; every field is optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// opam executable
    pub opam: String,
    /// Dependency installer run by `build`
    pub install: Vec<String>,
    /// Test runner run by `test`
    pub test: Vec<String>,
    /// Output directories removed by `clean` from the project root; a leading `*` matches by suffix
    pub artifacts: Vec<String>,
    /// Cache directories removed by `clean` at any depth
    pub caches: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opam: "opam".to_string(),
            install: strings(&["pip", "install", "-e", "."]),
            test: strings(&["pytest"]),
            artifacts: strings(&["build", "dist", "*.egg-info"]),
            caches: strings(&["__pycache__", ".pytest_cache", ".mypy_cache"]),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        if config.install.is_empty() || config.test.is_empty() {
            anyhow::bail!("Config file {:?}: 'install' and 'test' must not be empty", path);
        }
        Ok(config)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
