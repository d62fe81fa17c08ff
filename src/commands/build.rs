use super::require_expected_switch;
use crate::environment::ActiveEnvironment;
use crate::project::EXTERNAL_RUNTIME_ENV;
use crate::{ui, Project};
use anyhow::Result;

pub fn execute(project: &Project, active: &ActiveEnvironment) -> Result<()> {
    let switch = require_expected_switch(active)?;

    if project.external_runtime() {
        ui::info(format!(
            "{EXTERNAL_RUNTIME_ENV} is set; skipping dependency install (runtime is managed externally)."
        ));
        return Ok(());
    }

    let install = &project.config().install;
    ui::status("Installing", format!("{} into {switch}", install.join(" ")));
    project.run_delegate(install, &[])?;
    ui::success("Installed", format!("project into {switch}"));
    Ok(())
}
