use crate::cli::{Cli, Commands};
use crate::environment::ActiveEnvironment;
use crate::gate::check_gate;
use crate::switch::{build_identifier, SwitchIdentifier};
use crate::version::{resolve, ResolvedVersions};
use crate::Project;
use anyhow::Result;

mod build;
mod clean;
mod env;
mod setup;
mod status;
mod test_cmd;

pub fn execute(cli: Cli) -> Result<()> {
    let active = ActiveEnvironment::from_env();
    let project = || Project::new(cli.project_dir.clone(), cli.opam_root.as_deref());

    match cli.command {
        Commands::Setup {
            version,
            reinstall,
            no_reinstall,
        } => {
            // Version policy runs before the project config is read or opam is touched
            let versions = resolve(version.as_deref())?;
            setup::execute(
                &project()?,
                versions,
                Cli::preset_reinstall(reinstall, no_reinstall),
                active,
            )
        }

        Commands::Build => build::execute(&project()?, &active),

        Commands::Test { args } => test_cmd::execute(&project()?, &active, &args),

        Commands::Clean => clean::execute(&project()?, &active),

        Commands::Status => status::execute(&project()?, &active),

        Commands::Env { shell } => env::execute(&project()?, shell),
    }
}

/// Switch every command expects: the one built from the default versions
fn expected_switch() -> SwitchIdentifier {
    build_identifier(&ResolvedVersions::default_pair().toolchain)
}

/// Gate shared by build and test
fn require_expected_switch(active: &ActiveEnvironment) -> Result<SwitchIdentifier> {
    let expected = expected_switch();
    check_gate(&expected, active)?;
    Ok(expected)
}
