//! Seam between the switch logic and the opam package manager.

use crate::environment::Activation;
use crate::error::Result;
use crate::switch::SwitchIdentifier;

mod cli;
mod memory;

pub use cli::{parse_env_output, parse_switch_list, OpamCli};
pub use memory::InMemoryOpam;

/// Package source added to every fresh switch
pub const COQ_REPOSITORY_NAME: &str = "coq-released";
pub const COQ_REPOSITORY_URL: &str = "https://coq.inria.fr/opam/released";

/// Operations the provisioner, prober and teardown need from the package manager
pub trait PackageManager {
    /// Names of every installed switch
    fn list_environments(&self) -> Result<Vec<SwitchIdentifier>>;

    /// Create `id` with the given OCaml compiler
    fn create_environment(&mut self, id: &SwitchIdentifier, ocaml_version: &str) -> Result<()>;

    /// Remove `id` and everything installed into it
    fn remove_environment(&mut self, id: &SwitchIdentifier) -> Result<()>;

    /// Register package repositories and refresh their indices
    fn update_sources(&mut self, id: &SwitchIdentifier) -> Result<()>;

    /// Pin `package` to exactly `version` inside `id`
    fn pin_version(&mut self, id: &SwitchIdentifier, package: &str, version: &str) -> Result<()>;

    /// Make `id` the current switch and report the resulting environment
    fn activate(&mut self, id: &SwitchIdentifier) -> Result<Activation>;
}
