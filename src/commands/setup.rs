use crate::confirm::{Confirm, Preset, StdinConfirm};
use crate::environment::{ActiveEnvironment, Shell};
use crate::opam::PackageManager;
use crate::probe::probe;
use crate::provision::{Provisioner, SetupPlan};
use crate::receipt::Receipt;
use crate::switch::build_identifier;
use crate::version::ResolvedVersions;
use crate::{ui, Project};
use anyhow::{Context, Result};
use std::path::Path;

pub fn execute(
    project: &Project,
    versions: ResolvedVersions,
    preset: Option<bool>,
    mut active: ActiveEnvironment,
) -> Result<()> {
    let id = build_identifier(&versions.toolchain);
    let receipt_path = project.receipt_path(&id);
    let mut opam = project.opam();

    match preset {
        Some(answer) => run(&mut opam, &mut Preset(answer), &versions, &receipt_path, &mut active)?,
        None => run(&mut opam, &mut StdinConfirm::new(), &versions, &receipt_path, &mut active)?,
    };

    ui::success(
        "Ready",
        format!(
            "switch {active} (coq {}, coq-serapi {})",
            versions.toolchain, versions.companion
        ),
    );
    let shell = Shell::detect().unwrap_or(Shell::Sh);
    ui::info(format!(
        "Activate it in this shell with:\n  eval \"$(prism-switch env --shell {})\"",
        shell.as_str()
    ));
    Ok(())
}

/// Probe, decide and carry out the setup plan against `manager`
fn run(
    manager: &mut dyn PackageManager,
    confirm: &mut dyn Confirm,
    versions: &ResolvedVersions,
    receipt_path: &Path,
    active: &mut ActiveEnvironment,
) -> Result<SetupPlan> {
    let id = build_identifier(&versions.toolchain);
    let state = probe(&*manager, &id, active)?;
    ui::status("Switch", format!("{id} ({state})"));

    let plan = SetupPlan::decide(state, &id, confirm)?;
    tracing::info!(switch = %id, ?plan, "setup plan chosen");

    let mut provisioner = Provisioner::new(manager);
    let outcome = match plan {
        SetupPlan::Fresh => provisioner.provision(&id, versions, false, active),
        SetupPlan::Reinstall => provisioner.provision(&id, versions, true, active),
        SetupPlan::Reactivate => provisioner.activate(&id, active),
    };
    let activation = outcome.inspect_err(|err| {
        if err.is_retryable() {
            ui::info("opam failures are often transient; re-run 'prism-switch setup' to retry.");
        }
    })?;
    tracing::debug!(vars = activation.vars.len(), "activation computed");

    if plan == SetupPlan::Reactivate {
        if let Some(receipt) = stale_receipt(receipt_path, versions)? {
            ui::warn(format!(
                "Switch {id} was provisioned with coq {} / coq-serapi {}; run 'prism-switch setup --reinstall' to repin.",
                receipt.coq, receipt.serapi
            ));
        }
    } else {
        Receipt::new(&id, versions)
            .save(receipt_path)
            .with_context(|| format!("Switch {id} is ready but its receipt could not be saved"))?;
    }

    Ok(plan)
}

/// The saved receipt, if it records versions other than `versions`
fn stale_receipt(path: &Path, versions: &ResolvedVersions) -> Result<Option<Receipt>> {
    Ok(Receipt::load(path)?.filter(|receipt| !receipt.matches(versions)))
}
