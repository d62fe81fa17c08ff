use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prism switch manager - provision and verify the opam switch prism builds in
///
/// prism-switch creates an opam switch named after the pinned Coq release
/// (prism-8.10.2), pins Coq and SerAPI inside it, and refuses to build or
/// test unless that switch is the one active in your shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// opam root holding the switches
    #[arg(long, global = true, env = "OPAMROOT", value_name = "DIR")]
    pub opam_root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create (or reuse) and activate the prism switch
    ///
    /// Asks before rebuilding a switch that already exists.
    Setup {
        /// Coq version (only the default is supported)
        #[arg(value_name = "VERSION")]
        version: Option<String>,

        /// Rebuild an existing switch without asking
        #[arg(long, conflicts_with = "no_reinstall")]
        reinstall: bool,

        /// Keep an existing switch without asking
        #[arg(long)]
        no_reinstall: bool,
    },

    /// Install the project into the active switch
    Build,

    /// Run the test suite inside the active switch
    Test {
        /// Extra arguments passed to the test runner
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Remove the prism switch and build artifacts
    Clean,

    /// Show switch status
    Status,

    /// Output the activation script for the prism switch
    Env {
        /// Shell type (sh, bash, zsh, fish); auto-detects from $SHELL
        #[arg(short, long, value_name = "SHELL", value_parser = ["sh", "bash", "zsh", "fish"])]
        shell: Option<String>,
    },
}

impl Cli {
    /// Confirmation answer given on the command line, if any
    pub fn preset_reinstall(reinstall: bool, no_reinstall: bool) -> Option<bool> {
        match (reinstall, no_reinstall) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_setup_version() {
        let cli = Cli::try_parse_from(["prism-switch", "setup", "8.10.2", "--reinstall"]).unwrap();
        match cli.command {
            Commands::Setup {
                version,
                reinstall,
                no_reinstall,
            } => {
                assert_eq!(version.as_deref(), Some("8.10.2"));
                assert_eq!(Cli::preset_reinstall(reinstall, no_reinstall), Some(true));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_reinstall_flags_conflict() {
        let result =
            Cli::try_parse_from(["prism-switch", "setup", "--reinstall", "--no-reinstall"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_test_passthrough() {
        let cli = Cli::try_parse_from(["prism-switch", "test", "--", "-k", "opam"]).unwrap();
        match cli.command {
            Commands::Test { args } => assert_eq!(args, vec!["-k", "opam"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_env_shell_values() {
        let cli = Cli::try_parse_from(["prism-switch", "env", "--shell", "fish"]).unwrap();
        match cli.command {
            Commands::Env { shell } => assert_eq!(shell.as_deref(), Some("fish")),
            other => panic!("unexpected command: {other:?}"),
        }

        let result = Cli::try_parse_from(["prism-switch", "env", "--shell", "powershell"]);
        assert!(result.is_err());
    }
}
