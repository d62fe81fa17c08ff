use crate::confirm::{ask_until_answered, Confirm};
use crate::environment::{ActiveEnvironment, Activation};
use crate::error::Result;
use crate::opam::PackageManager;
use crate::probe::ProbeResult;
use crate::switch::SwitchIdentifier;
use crate::ui;
use crate::version::{ResolvedVersions, COQ_PACKAGE, SERAPI_PACKAGE};

/// What `setup` does for a probed switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPlan {
    /// Switch is missing; create it
    Fresh,
    /// Switch exists and the user asked to rebuild it
    Reinstall,
    /// Switch exists and is kept; only activate it
    Reactivate,
}

impl SetupPlan {
    /// Choose a plan, asking for confirmation only when the switch already exists
    pub fn decide(
        probe: ProbeResult,
        id: &SwitchIdentifier,
        confirm: &mut dyn Confirm,
    ) -> Result<Self> {
        if !probe.is_present() {
            return Ok(SetupPlan::Fresh);
        }

        let question = format!("Switch {id} already exists ({probe}). Reinstall it?");
        if ask_until_answered(confirm, &question)? {
            Ok(SetupPlan::Reinstall)
        } else {
            Ok(SetupPlan::Reactivate)
        }
    }
}

/// Creates, configures and activates a prism switch
pub struct Provisioner<'a> {
    manager: &'a mut dyn PackageManager,
}

impl<'a> Provisioner<'a> {
    pub fn new(manager: &'a mut dyn PackageManager) -> Self {
        Self { manager }
    }

    /// Build `id` from scratch and activate it.
    ///
    /// Steps run in order and are not rolled back: a failure after activation
    /// leaves the switch created and active but incompletely pinned.
    pub fn provision(
        &mut self,
        id: &SwitchIdentifier,
        versions: &ResolvedVersions,
        reinstall: bool,
        active: &mut ActiveEnvironment,
    ) -> Result<Activation> {
        if reinstall && self.manager.list_environments()?.contains(id) {
            self.step("Removing", format!("switch {id}"), |m| m.remove_environment(id))?;
        }

        let runtime = versions.runtime();
        self.step("Creating", format!("switch {id} (OCaml {runtime})"), |m| {
            m.create_environment(id, runtime)
        })?;

        let activation = self.activate(id, active)?;

        self.step("Updating", "package sources", |m| m.update_sources(id))
            .inspect_err(|_| partial_failure(id))?;

        let toolchain = versions.toolchain.as_str();
        self.step("Pinning", format!("{COQ_PACKAGE} {toolchain}"), |m| {
            m.pin_version(id, COQ_PACKAGE, toolchain)
        })
        .inspect_err(|_| partial_failure(id))?;

        let companion = versions.companion.as_str();
        self.step("Pinning", format!("{SERAPI_PACKAGE} {companion}"), |m| {
            m.pin_version(id, SERAPI_PACKAGE, companion)
        })
        .inspect_err(|_| partial_failure(id))?;

        tracing::info!(switch = %id, coq = toolchain, serapi = companion, "switch provisioned");
        Ok(activation)
    }

    /// Activate an existing switch and record it as the session's active switch
    pub fn activate(
        &mut self,
        id: &SwitchIdentifier,
        active: &mut ActiveEnvironment,
    ) -> Result<Activation> {
        let activation = self.step("Activating", format!("switch {id}"), |m| m.activate(id))?;
        active.set(id.clone());
        tracing::info!(switch = %id, "switch activated");
        Ok(activation)
    }

    fn step<T>(
        &mut self,
        label: &str,
        message: impl Into<String>,
        action: impl FnOnce(&mut dyn PackageManager) -> Result<T>,
    ) -> Result<T> {
        let step = ui::Step::start(label, message);
        match action(&mut *self.manager) {
            Ok(value) => {
                step.done("Done");
                Ok(value)
            }
            Err(err) => {
                step.fail(&err);
                Err(err)
            }
        }
    }
}

fn partial_failure(id: &SwitchIdentifier) {
    tracing::warn!(switch = %id, "switch left partially configured");
    ui::warn(format!(
        "Switch {id} was created and activated but is not fully configured.\n\
         Re-run 'prism-switch setup --reinstall' or remove it with 'prism-switch clean'."
    ));
}
