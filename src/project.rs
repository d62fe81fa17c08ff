use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::Command;

use crate::config::{Config, CONFIG_FILE};
use crate::error::SwitchError;
use crate::opam::OpamCli;
use crate::switch::SwitchIdentifier;
use crate::teardown::ArtifactCleanup;

/// Environment flag marking the Python runtime as managed outside this tool
pub const EXTERNAL_RUNTIME_ENV: &str = "PRISM_EXTERNAL_RUNTIME";

/// Project path types
#[derive(Debug, Clone, Copy)]
pub enum ProjectPath {
    /// Project root: --project-dir or the current directory
    Root,
    /// Config file: <root>/prism-switch.toml
    ConfigFile,
    /// State directory: $XDG_STATE_HOME/prism-switch
    State,
}

/// Project - the checkout being built plus local state about its switch
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    state_dir: PathBuf,
    opam_root: Option<PathBuf>,
    external_runtime: bool,
    config: Config,
}

impl Project {
    /// Locate the project and load its configuration.
    ///
    /// `opam_root` overrides where opam keeps its switches (`OPAMROOT`); `~` is expanded.
    pub fn new(root: Option<PathBuf>, opam_root: Option<&str>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => env::current_dir().context("Failed to determine current directory")?,
        };
        let config = Config::load(&root.join(CONFIG_FILE))?;
        let opam_root = opam_root
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| PathBuf::from(shellexpand::tilde(s).into_owned()));

        Ok(Self {
            root,
            state_dir: Self::get_state_dir()?,
            opam_root,
            external_runtime: is_truthy(env::var(EXTERNAL_RUNTIME_ENV).ok().as_deref()),
            config,
        })
    }

    /// Get the state directory (XDG_STATE_HOME/prism-switch)
    fn get_state_dir() -> Result<PathBuf> {
        let base = match env::var("XDG_STATE_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => directories::BaseDirs::new()
                .context("Failed to get home directory")?
                .home_dir()
                .join(".local/state"),
        };

        Ok(base.join("prism-switch"))
    }

    /// Get path for a specific project location
    pub fn path(&self, path_type: ProjectPath) -> PathBuf {
        match path_type {
            ProjectPath::Root => self.root.clone(),
            ProjectPath::ConfigFile => self.root.join(CONFIG_FILE),
            ProjectPath::State => self.state_dir.clone(),
        }
    }

    /// Receipt path for a provisioned switch
    pub fn receipt_path(&self, id: &SwitchIdentifier) -> PathBuf {
        self.state_dir.join(format!("{id}.toml"))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn external_runtime(&self) -> bool {
        self.external_runtime
    }

    pub fn opam(&self) -> OpamCli {
        OpamCli::new(self.config.opam.clone(), self.opam_root.clone())
    }

    /// Artifacts `clean` removes for `id`, including its receipt
    pub fn artifact_cleanup(&self, id: &SwitchIdentifier) -> ArtifactCleanup {
        ArtifactCleanup::new(
            self.root.clone(),
            self.config.artifacts.clone(),
            self.config.caches.clone(),
        )
        .with_file(self.receipt_path(id))
    }

    /// Run a build or test tool from the project root, inheriting the session environment
    pub fn run_delegate(&self, command: &[String], extra: &[String]) -> Result<(), SwitchError> {
        let (program, args) = command.split_first().ok_or_else(|| SwitchError::Delegate {
            command: String::new(),
            status: "no command configured".to_string(),
        })?;
        let described = command.iter().chain(extra).cloned().collect::<Vec<_>>().join(" ");

        tracing::debug!(command = %described, root = %self.root.display(), "running delegate");
        let mut child = Command::new(program);
        child.args(args).args(extra).current_dir(&self.root);
        if let Some(opam_root) = &self.opam_root {
            child.env("OPAMROOT", opam_root);
        }

        let status = child.status().map_err(|e| SwitchError::Delegate {
            command: described.clone(),
            status: format!("failed to start: {e}"),
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(SwitchError::Delegate {
                command: described,
                status: status.to_string(),
            })
        }
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_env() -> TempDir {
        let temp = TempDir::new().unwrap();
        env::set_var("XDG_STATE_HOME", temp.path().join("state"));
        env::remove_var(EXTERNAL_RUNTIME_ENV);
        temp
    }

    #[test]
    #[serial]
    fn test_project_paths() {
        let temp = setup_test_env();
        let project = Project::new(Some(temp.path().to_path_buf()), None).unwrap();
        let id = SwitchIdentifier::from_name("prism-8.10.2");

        assert_eq!(project.path(ProjectPath::Root), temp.path());
        assert_eq!(
            project.path(ProjectPath::ConfigFile),
            temp.path().join("prism-switch.toml")
        );
        assert_eq!(
            project.path(ProjectPath::State),
            temp.path().join("state/prism-switch")
        );
        assert_eq!(
            project.receipt_path(&id),
            temp.path().join("state/prism-switch/prism-8.10.2.toml")
        );
        assert!(!project.external_runtime());
    }

    #[test]
    #[serial]
    fn test_project_reads_config_and_flags() {
        let temp = setup_test_env();
        fs::write(temp.path().join(CONFIG_FILE), "test = [\"pytest\", \"-q\"]\n").unwrap();
        env::set_var(EXTERNAL_RUNTIME_ENV, "true");

        let project = Project::new(Some(temp.path().to_path_buf()), Some("~/opam-root")).unwrap();
        env::remove_var(EXTERNAL_RUNTIME_ENV);

        assert_eq!(project.config().test, vec!["pytest", "-q"]);
        assert!(project.external_runtime());
        let root = project.opam_root.clone().unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("opam-root"));
    }

    #[test]
    #[serial]
    fn test_run_delegate_reports_exit_status() {
        let temp = setup_test_env();
        let project = Project::new(Some(temp.path().to_path_buf()), None).unwrap();

        let ok = project.run_delegate(&["true".to_string()], &[]);
        assert!(ok.is_ok());

        let err = project
            .run_delegate(&["false".to_string()], &["--flag".to_string()])
            .unwrap_err();
        match err {
            SwitchError::Delegate { command, .. } => assert_eq!(command, "false --flag"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some(" yes "), true)]
    #[case(Some("0"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn test_is_truthy(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }
}
