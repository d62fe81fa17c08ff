use regex::Regex;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use super::{PackageManager, COQ_REPOSITORY_NAME, COQ_REPOSITORY_URL};
use crate::environment::Activation;
use crate::error::{Result, SwitchError};
use crate::switch::SwitchIdentifier;

/// Package manager backed by the `opam` executable
#[derive(Debug, Clone)]
pub struct OpamCli {
    program: String,
    root: Option<PathBuf>,
}

impl OpamCli {
    pub fn new(program: impl Into<String>, root: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(root) = &self.root {
            command.env("OPAMROOT", root);
        }
        command
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    /// Run opam to completion, returning the output or a failure description
    fn run(&self, args: &[&str]) -> std::result::Result<Output, String> {
        tracing::debug!(command = %self.describe(args), "running opam");
        let output = self
            .command(args)
            .output()
            .map_err(|e| format!("could not run {}: {e}", self.program))?;

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            Err(if detail.is_empty() {
                format!("exited with {}", output.status)
            } else {
                detail.to_string()
            })
        }
    }

    fn run_step(&self, args: &[&str]) -> Result<Output> {
        self.run(args).map_err(|detail| SwitchError::PackageManager {
            command: self.describe(args),
            detail,
        })
    }
}

impl PackageManager for OpamCli {
    fn list_environments(&self) -> Result<Vec<SwitchIdentifier>> {
        let output = self
            .run(&["switch", "list", "--short"])
            .map_err(|detail| SwitchError::RegistryQuery { detail })?;
        let stdout = String::from_utf8(output.stdout).map_err(|_| SwitchError::RegistryQuery {
            detail: "switch list output is not valid UTF-8".to_string(),
        })?;
        parse_switch_list(&stdout)
    }

    fn create_environment(&mut self, id: &SwitchIdentifier, ocaml_version: &str) -> Result<()> {
        self.run_step(&["switch", "create", id.as_str(), ocaml_version, "--yes"])?;
        Ok(())
    }

    fn remove_environment(&mut self, id: &SwitchIdentifier) -> Result<()> {
        self.run_step(&["switch", "remove", id.as_str(), "--yes"])?;
        Ok(())
    }

    fn update_sources(&mut self, id: &SwitchIdentifier) -> Result<()> {
        let switch = format!("--switch={id}");
        self.run_step(&[
            "repo",
            "add",
            COQ_REPOSITORY_NAME,
            COQ_REPOSITORY_URL,
            &switch,
            "--yes",
        ])?;
        self.run_step(&["update", "--all", "--yes"])?;
        Ok(())
    }

    fn pin_version(&mut self, id: &SwitchIdentifier, package: &str, version: &str) -> Result<()> {
        let switch = format!("--switch={id}");
        self.run(&["pin", "add", package, version, &switch, "--yes"])
            .map_err(|detail| SwitchError::PinFailure {
                package: package.to_string(),
                version: version.to_string(),
                detail,
            })?;
        Ok(())
    }

    fn activate(&mut self, id: &SwitchIdentifier) -> Result<Activation> {
        let switch = format!("--switch={id}");
        let output = self.run_step(&["env", &switch, "--set-switch", "--shell=sh"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Activation::new(id.clone(), parse_env_output(&stdout)))
    }
}

/// Parse `opam switch list --short`, one switch name per line
pub fn parse_switch_list(output: &str) -> Result<Vec<SwitchIdentifier>> {
    let mut switches = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.split_whitespace().count() != 1 || line.starts_with('#') {
            return Err(SwitchError::RegistryQuery {
                detail: format!("unexpected line in switch list: {line:?}"),
            });
        }
        switches.push(SwitchIdentifier::from_name(line));
    }
    Ok(switches)
}

fn env_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)='((?:[^']|'\\'')*)';\s*export\s+[A-Za-z_][A-Za-z0-9_]*;?$")
            .expect("valid opam env pattern")
    })
}

/// Parse `opam env --shell=sh` output (`NAME='value'; export NAME;` per line)
pub fn parse_env_output(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| env_line_pattern().captures(line.trim()))
        .map(|caps| (caps[1].to_string(), caps[2].replace("'\\''", "'")))
        .collect()
}
