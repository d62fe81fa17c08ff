use super::expected_switch;
use crate::environment::Shell;
use crate::opam::PackageManager;
use crate::Project;
use anyhow::Result;

pub fn execute(project: &Project, shell: Option<String>) -> Result<()> {
    // clap only accepts names `Shell::from_name` knows
    let shell = shell
        .as_deref()
        .and_then(Shell::from_name)
        .or_else(Shell::detect)
        .unwrap_or(Shell::Sh);

    let id = expected_switch();
    let activation = project.opam().activate(&id)?;
    println!("{}", activation.format_for_shell(shell));

    Ok(())
}
