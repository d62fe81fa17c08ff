use super::expected_switch;
use crate::environment::ActiveEnvironment;
use crate::teardown::{ensure_inactive, teardown};
use crate::{ui, Project};
use anyhow::Result;

pub fn execute(project: &Project, active: &ActiveEnvironment) -> Result<()> {
    // Never remove a switch out from under a live session
    ensure_inactive(active)?;

    let id = expected_switch();
    let mut opam = project.opam();
    let report = teardown(&mut opam, &id, &project.artifact_cleanup(&id))?;

    if report.switch_removed {
        ui::success("Removed", format!("switch {id}"));
    } else {
        ui::info(format!("Switch {id} is not installed."));
    }

    if report.artifacts.is_empty() {
        ui::info("No build artifacts to remove.");
    } else {
        let root = project.path(crate::project::ProjectPath::Root);
        for path in &report.artifacts {
            let shown = path.strip_prefix(&root).unwrap_or(path);
            ui::status("Removed", shown.display());
        }
    }
    Ok(())
}
