use crate::environment::ActiveEnvironment;
use crate::error::{Result, SwitchError};
use crate::switch::SwitchIdentifier;

/// Require the session's active switch to be exactly `expected`.
///
/// Purely comparative: nothing is provisioned or activated here.
pub fn check_gate(expected: &SwitchIdentifier, actual: &ActiveEnvironment) -> Result<()> {
    if actual.matches(expected) {
        tracing::debug!(switch = %expected, "gate passed");
        return Ok(());
    }

    tracing::debug!(expected = %expected, actual = %actual, "gate refused");
    Err(SwitchError::EnvironmentMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}
