use thiserror::Error;

/// Convenience result type for switch operations
pub type Result<T> = std::result::Result<T, SwitchError>;

/// Failures raised while resolving, provisioning, gating or tearing down a switch
#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("Alternative versions not yet supported. Requested {requested}, only {default} is available.")]
    UnsupportedVersion { requested: String, default: String },

    #[error(
        "Active opam switch is '{actual}' but '{expected}' is required.\n\
         Run 'prism-switch setup' or activate it with:\n  eval \"$(opam env --switch={expected} --set-switch)\""
    )]
    EnvironmentMismatch { expected: String, actual: String },

    #[error(
        "Opam switch '{active}' is active in this session; deactivate it before cleaning \
         (for example with 'eval \"$(opam env --revert)\"' or a fresh shell)"
    )]
    ActiveEnvironment { active: String },

    #[error("Failed to pin {package} to {version}: {detail}")]
    PinFailure {
        package: String,
        version: String,
        detail: String,
    },

    #[error("Failed to query opam switches: {detail}")]
    RegistryQuery { detail: String },

    #[error("'{command}' failed: {detail}")]
    PackageManager { command: String, detail: String },

    #[error("No yes/no answer received after {attempts} attempt(s); aborting")]
    ConfirmationExhausted { attempts: usize },

    #[error("'{command}' exited with {status}")]
    Delegate { command: String, status: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwitchError {
    /// Whether re-running the same command may succeed without changes
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwitchError::PinFailure { .. } | SwitchError::PackageManager { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = SwitchError::UnsupportedVersion {
            requested: "9.0.0".to_string(),
            default: "8.10.2".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Alternative versions not yet supported."));
        assert!(message.contains("9.0.0"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_mismatch_names_both_switches() {
        let err = SwitchError::EnvironmentMismatch {
            expected: "prism-8.10.2".to_string(),
            actual: "prism-8.9.0".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("prism-8.10.2"));
        assert!(message.contains("prism-8.9.0"));
    }

    #[test]
    fn test_pin_failure_is_retryable() {
        let err = SwitchError::PinFailure {
            package: "coq".to_string(),
            version: "8.10.2".to_string(),
            detail: "network unreachable".to_string(),
        };
        assert!(err.is_retryable());
    }
}
