use super::expected_switch;
use crate::environment::ActiveEnvironment;
use crate::probe::{probe, ProbeResult};
use crate::receipt::Receipt;
use crate::{ui, Project};
use anyhow::Result;

pub fn execute(project: &Project, active: &ActiveEnvironment) -> Result<()> {
    let id = expected_switch();
    let opam = project.opam();
    let state = probe(&opam, &id, active)?;

    ui::status("Expected", &id);
    ui::status("Active", active);
    match state {
        ProbeResult::PresentActive => ui::success("State", state),
        _ => ui::warn(format!("{id} is {state}")),
    }

    match Receipt::load(&project.receipt_path(&id))? {
        Some(receipt) => ui::status(
            "Receipt",
            format!(
                "coq {}, coq-serapi {}, OCaml {} (provisioned {})",
                receipt.coq, receipt.serapi, receipt.ocaml, receipt.provisioned_at
            ),
        ),
        None => ui::info("No provisioning receipt found."),
    }
    Ok(())
}
