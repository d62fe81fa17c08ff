use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::environment::ActiveEnvironment;
use crate::error::{Result, SwitchError};
use crate::opam::PackageManager;
use crate::switch::SwitchIdentifier;

/// Directories never entered by the sweep: version control, virtualenvs, local opam switches
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".venv", "venv", "_opam"];

/// Build artifacts removed alongside a switch.
///
/// Only directories are removed. Output directories (`build`, `dist`, `*.egg-info`)
/// match only at the project root; cache directories match at any depth.
#[derive(Debug, Clone)]
pub struct ArtifactCleanup {
    root: PathBuf,
    outputs: Vec<String>,
    caches: Vec<String>,
    files: Vec<PathBuf>,
}

impl ArtifactCleanup {
    /// Patterns are directory names; a leading `*` matches by suffix
    pub fn new(root: impl Into<PathBuf>, outputs: Vec<String>, caches: Vec<String>) -> Self {
        Self {
            root: root.into(),
            outputs,
            caches,
            files: Vec::new(),
        }
    }

    /// Also remove a specific file (such as the provisioning receipt)
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Matching directories under the root, without descending into matches or skipped trees
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        if !self.root.is_dir() {
            return found;
        }

        let mut walker = WalkDir::new(&self.root).min_depth(1).into_iter();
        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let is_output = entry.depth() == 1 && matches_any(&self.outputs, &name);
            if is_output || matches_any(&self.caches, &name) {
                found.push(entry.path().to_path_buf());
                walker.skip_current_dir();
            } else if SKIPPED_DIRS.contains(&&*name) || entry.path().join("pyvenv.cfg").exists() {
                tracing::debug!(path = %entry.path().display(), "not sweeping");
                walker.skip_current_dir();
            }
        }
        found
    }

    fn remove(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.discover().into_iter().chain(self.files.iter().cloned()) {
            if remove_path(&path)? {
                removed.push(path);
            }
        }
        Ok(removed)
    }
}

fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => name == pattern,
    })
}

fn remove_path(path: &Path) -> Result<bool> {
    let Ok(metadata) = path.symlink_metadata() else {
        return Ok(false);
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    tracing::debug!(path = %path.display(), "removed artifact");
    Ok(true)
}

/// What a teardown actually removed
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub switch_removed: bool,
    pub artifacts: Vec<PathBuf>,
}

/// Refuse to tear down while any switch is active in the calling session
pub fn ensure_inactive(active: &ActiveEnvironment) -> Result<()> {
    match active.get() {
        Some(id) => Err(SwitchError::ActiveEnvironment {
            active: id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Remove `id` from opam (if installed) and the project's build artifacts.
///
/// Tearing down a switch that is already gone is not an error.
pub fn teardown(
    manager: &mut dyn PackageManager,
    id: &SwitchIdentifier,
    cleanup: &ArtifactCleanup,
) -> Result<TeardownReport> {
    let switch_removed = if manager.list_environments()?.contains(id) {
        manager.remove_environment(id)?;
        tracing::info!(switch = %id, "switch removed");
        true
    } else {
        tracing::debug!(switch = %id, "switch already absent");
        false
    };

    let artifacts = cleanup.remove()?;
    Ok(TeardownReport {
        switch_removed,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opam::InMemoryOpam;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sweep(root: &Path) -> ArtifactCleanup {
        ArtifactCleanup::new(
            root,
            strings(&["build", "dist", "*.egg-info"]),
            strings(&["__pycache__", ".pytest_cache"]),
        )
    }

    fn project_with_artifacts() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("prism/__pycache__")).unwrap();
        fs::write(root.join("prism/__pycache__/mod.cpython-39.pyc"), "").unwrap();
        fs::create_dir_all(root.join("prism.egg-info")).unwrap();
        fs::create_dir_all(root.join(".pytest_cache")).unwrap();
        fs::create_dir_all(root.join(".git/build")).unwrap();
        fs::write(root.join("prism/mod.py"), "").unwrap();
        temp
    }

    fn id() -> SwitchIdentifier {
        SwitchIdentifier::from_name("prism-8.10.2")
    }

    #[test]
    fn test_discover_skips_git_and_nested_matches() {
        let temp = project_with_artifacts();
        let cleanup = sweep(temp.path());
        let mut found = cleanup.discover();
        found.sort();
        assert_eq!(
            found,
            vec![
                temp.path().join(".pytest_cache"),
                temp.path().join("prism/__pycache__"),
                temp.path().join("prism.egg-info"),
            ]
        );
    }

    #[test]
    fn test_discover_leaves_sources_and_virtualenvs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("scripts/build"), "#!/bin/sh\n").unwrap();
        fs::write(root.join("dist"), "not a directory").unwrap();
        fs::create_dir_all(root.join("docs/build")).unwrap();
        let site = root.join(".venv/lib/python3.9/site-packages");
        fs::create_dir_all(site.join("requests-2.0.egg-info")).unwrap();
        fs::create_dir_all(site.join("numpy/dist")).unwrap();
        fs::create_dir_all(site.join("numpy/__pycache__")).unwrap();
        fs::create_dir_all(root.join("env/lib/__pycache__")).unwrap();
        fs::write(root.join("env/pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        fs::create_dir_all(root.join("_opam/lib/build")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::create_dir_all(root.join("tests/__pycache__")).unwrap();

        let report = teardown(&mut InMemoryOpam::new(), &id(), &sweep(root)).unwrap();

        let mut removed = report.artifacts;
        removed.sort();
        assert_eq!(removed, vec![root.join("build"), root.join("tests/__pycache__")]);
        assert!(root.join("scripts/build").is_file());
        assert!(root.join("dist").is_file());
        assert!(root.join("docs/build").is_dir());
        assert!(site.join("requests-2.0.egg-info").is_dir());
        assert!(site.join("numpy/dist").is_dir());
        assert!(site.join("numpy/__pycache__").is_dir());
        assert!(root.join("env/lib/__pycache__").is_dir());
        assert!(root.join("_opam/lib/build").is_dir());
    }

    #[test]
    fn test_teardown_removes_switch_and_artifacts() {
        let temp = project_with_artifacts();
        let receipt = temp.path().join("receipt.toml");
        fs::write(&receipt, "switch = 'prism-8.10.2'").unwrap();
        let cleanup = sweep(temp.path()).with_file(&receipt);
        let mut opam = InMemoryOpam::with_switches(["prism-8.10.2", "default"]);

        let report = teardown(&mut opam, &id(), &cleanup).unwrap();

        assert!(report.switch_removed);
        assert_eq!(report.artifacts.len(), 4);
        assert!(!opam.contains(&id()));
        assert!(opam.contains(&SwitchIdentifier::from_name("default")));
        assert!(!temp.path().join("prism/__pycache__").exists());
        assert!(!receipt.exists());
        assert!(temp.path().join("prism/mod.py").exists());
        assert!(temp.path().join(".git/build").exists());
    }

    #[test]
    fn test_teardown_twice_is_noop() {
        let temp = project_with_artifacts();
        let cleanup = sweep(temp.path());
        let mut opam = InMemoryOpam::with_switches(["prism-8.10.2"]);

        teardown(&mut opam, &id(), &cleanup).unwrap();
        let second = teardown(&mut opam, &id(), &cleanup).unwrap();

        assert!(!second.switch_removed);
        assert!(second.artifacts.is_empty());
        assert_eq!(opam.calls(), &["remove prism-8.10.2"]);
    }

    #[test]
    fn test_ensure_inactive_refuses_active_session() {
        let opam = InMemoryOpam::with_switches(["prism-8.10.2"]);
        let active = ActiveEnvironment::active(id());

        let err = ensure_inactive(&active).unwrap_err();

        assert!(matches!(err, SwitchError::ActiveEnvironment { .. }));
        assert!(opam.contains(&id()));
        assert!(opam.calls().is_empty());
    }

    #[test]
    fn test_ensure_inactive_allows_no_session() {
        assert!(ensure_inactive(&ActiveEnvironment::none()).is_ok());
    }

    #[test]
    fn test_teardown_registry_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let cleanup = sweep(temp.path());
        let mut opam = InMemoryOpam::new();
        opam.fail_registry("opam root missing");
        let err = teardown(&mut opam, &id(), &cleanup).unwrap_err();
        assert!(matches!(err, SwitchError::RegistryQuery { .. }));
    }
}
