use std::collections::{BTreeMap, BTreeSet};

use super::PackageManager;
use crate::environment::Activation;
use crate::error::{Result, SwitchError};
use crate::switch::SwitchIdentifier;

/// In-memory package manager for exercising switch logic without opam
#[derive(Debug, Default, Clone)]
pub struct InMemoryOpam {
    switches: BTreeSet<SwitchIdentifier>,
    pins: BTreeMap<(SwitchIdentifier, String), String>,
    unavailable: BTreeSet<(String, String)>,
    registry_error: Option<String>,
    current: Option<SwitchIdentifier>,
    calls: Vec<String>,
}

impl InMemoryOpam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given switches already installed
    pub fn with_switches<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            switches: names
                .into_iter()
                .map(|name| SwitchIdentifier::from_name(name))
                .collect(),
            ..Self::default()
        }
    }

    /// Make pinning `package` to `version` fail
    pub fn mark_unavailable(&mut self, package: &str, version: &str) {
        self.unavailable
            .insert((package.to_string(), version.to_string()));
    }

    /// Make registry queries fail
    pub fn fail_registry(&mut self, detail: &str) {
        self.registry_error = Some(detail.to_string());
    }

    pub fn contains(&self, id: &SwitchIdentifier) -> bool {
        self.switches.contains(id)
    }

    pub fn pinned(&self, id: &SwitchIdentifier, package: &str) -> Option<&str> {
        self.pins
            .get(&(id.clone(), package.to_string()))
            .map(String::as_str)
    }

    pub fn current(&self) -> Option<&SwitchIdentifier> {
        self.current.as_ref()
    }

    /// Mutating operations in the order they were requested
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn require(&self, id: &SwitchIdentifier, command: &str) -> Result<()> {
        if self.switches.contains(id) {
            Ok(())
        } else {
            Err(SwitchError::PackageManager {
                command: format!("opam {command}"),
                detail: format!("no switch named {id}"),
            })
        }
    }
}

impl PackageManager for InMemoryOpam {
    fn list_environments(&self) -> Result<Vec<SwitchIdentifier>> {
        match &self.registry_error {
            Some(detail) => Err(SwitchError::RegistryQuery {
                detail: detail.clone(),
            }),
            None => Ok(self.switches.iter().cloned().collect()),
        }
    }

    fn create_environment(&mut self, id: &SwitchIdentifier, ocaml_version: &str) -> Result<()> {
        self.calls.push(format!("create {id} {ocaml_version}"));
        if !self.switches.insert(id.clone()) {
            return Err(SwitchError::PackageManager {
                command: "opam switch create".to_string(),
                detail: format!("there already is an installed switch named {id}"),
            });
        }
        Ok(())
    }

    fn remove_environment(&mut self, id: &SwitchIdentifier) -> Result<()> {
        self.calls.push(format!("remove {id}"));
        self.require(id, "switch remove")?;
        self.switches.remove(id);
        self.pins.retain(|(switch, _), _| switch != id);
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        Ok(())
    }

    fn update_sources(&mut self, id: &SwitchIdentifier) -> Result<()> {
        self.calls.push(format!("update {id}"));
        self.require(id, "update")
    }

    fn pin_version(&mut self, id: &SwitchIdentifier, package: &str, version: &str) -> Result<()> {
        self.calls.push(format!("pin {id} {package} {version}"));
        self.require(id, "pin add")?;
        if self
            .unavailable
            .contains(&(package.to_string(), version.to_string()))
        {
            return Err(SwitchError::PinFailure {
                package: package.to_string(),
                version: version.to_string(),
                detail: "version not available".to_string(),
            });
        }
        self.pins
            .insert((id.clone(), package.to_string()), version.to_string());
        Ok(())
    }

    fn activate(&mut self, id: &SwitchIdentifier) -> Result<Activation> {
        self.calls.push(format!("activate {id}"));
        self.require(id, "env")?;
        self.current = Some(id.clone());
        Ok(Activation::new(
            id.clone(),
            vec![
                ("OPAMSWITCH".to_string(), id.to_string()),
                ("OPAM_SWITCH_PREFIX".to_string(), format!("/opam/{id}")),
            ],
        ))
    }
}
