use super::require_expected_switch;
use crate::environment::ActiveEnvironment;
use crate::{ui, Project};
use anyhow::Result;

pub fn execute(project: &Project, active: &ActiveEnvironment, args: &[String]) -> Result<()> {
    let switch = require_expected_switch(active)?;

    ui::status("Testing", format!("in {switch}"));
    project.run_delegate(&project.config().test, args)?;
    ui::success("Passed", "test suite");
    Ok(())
}
