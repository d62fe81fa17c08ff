use std::fmt;

use crate::environment::ActiveEnvironment;
use crate::error::Result;
use crate::opam::PackageManager;
use crate::switch::SwitchIdentifier;

/// Installed and active state of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Absent,
    PresentInactive,
    PresentActive,
}

impl ProbeResult {
    pub fn is_present(self) -> bool {
        !matches!(self, ProbeResult::Absent)
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeResult::Absent => "not installed",
            ProbeResult::PresentInactive => "installed, inactive",
            ProbeResult::PresentActive => "installed, active",
        })
    }
}

/// Classify `id` against the installed switches and the session's active switch.
///
/// Registry failures propagate; they are never treated as `Absent`.
pub fn probe(
    manager: &dyn PackageManager,
    id: &SwitchIdentifier,
    active: &ActiveEnvironment,
) -> Result<ProbeResult> {
    let installed = manager.list_environments()?;
    let result = if !installed.contains(id) {
        ProbeResult::Absent
    } else if active.matches(id) {
        ProbeResult::PresentActive
    } else {
        ProbeResult::PresentInactive
    };

    tracing::debug!(switch = %id, active = %active, state = %result, "probed switch");
    Ok(result)
}
