use std::env;
use std::fmt;
use std::path::Path;

use crate::switch::SwitchIdentifier;

/// Shell type for activation scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Sh,
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sh" | "dash" => Some(Shell::Sh),
            "bash" => Some(Shell::Bash),
            "zsh" => Some(Shell::Zsh),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    /// Shell named by `$SHELL`, if recognised
    pub fn detect() -> Option<Self> {
        let shell = env::var("SHELL").ok()?;
        let name = Path::new(&shell).file_name()?.to_str()?;
        Self::from_name(name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::Sh => "sh",
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }
}

/// Switch active in the calling session, passed explicitly to the gate and provisioner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveEnvironment(Option<SwitchIdentifier>);

impl ActiveEnvironment {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn active(id: SwitchIdentifier) -> Self {
        Self(Some(id))
    }

    /// Read the session's active switch from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("OPAMSWITCH").ok().as_deref(),
            env::var("OPAM_SWITCH_PREFIX").ok().as_deref(),
        )
    }

    /// `OPAMSWITCH` wins; otherwise the switch is the last component of `OPAM_SWITCH_PREFIX`
    pub fn from_vars(opam_switch: Option<&str>, switch_prefix: Option<&str>) -> Self {
        if let Some(name) = opam_switch.map(str::trim).filter(|s| !s.is_empty()) {
            return Self(Some(SwitchIdentifier::from_name(name)));
        }

        let name = switch_prefix
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|prefix| Path::new(prefix.trim_end_matches('/')).file_name())
            .and_then(|name| name.to_str());

        Self(name.map(SwitchIdentifier::from_name))
    }

    pub fn get(&self) -> Option<&SwitchIdentifier> {
        self.0.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }

    pub fn matches(&self, id: &SwitchIdentifier) -> bool {
        self.0.as_ref() == Some(id)
    }

    pub fn set(&mut self, id: SwitchIdentifier) {
        self.0 = Some(id);
    }
}

impl fmt::Display for ActiveEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("none"),
        }
    }
}

/// Environment variables opam reports for an activated switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub switch: SwitchIdentifier,
    pub vars: Vec<(String, String)>,
}

impl Activation {
    pub fn new(switch: SwitchIdentifier, vars: Vec<(String, String)>) -> Self {
        Self { switch, vars }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Format the activation for the given shell
    pub fn format_for_shell(&self, shell: Shell) -> String {
        match shell {
            Shell::Sh | Shell::Bash | Shell::Zsh => self.format_posix(),
            Shell::Fish => self.format_fish(),
        }
    }

    fn format_posix(&self) -> String {
        self.vars
            .iter()
            .map(|(key, value)| format!("export {key}='{}'", value.replace('\'', "'\\''")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_fish(&self) -> String {
        self.vars
            .iter()
            .map(|(key, value)| {
                let quote = |item: &str| format!("'{}'", item.replace('\\', "\\\\").replace('\'', "\\'"));
                let items = if key.ends_with("PATH") {
                    value.split(':').map(quote).collect::<Vec<_>>().join(" ")
                } else {
                    quote(value)
                };
                format!("set -gx {key} {items}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn sample_activation() -> Activation {
        Activation::new(
            SwitchIdentifier::from_name("prism-8.10.2"),
            vec![
                ("OPAMSWITCH".to_string(), "prism-8.10.2".to_string()),
                (
                    "OPAM_SWITCH_PREFIX".to_string(),
                    "/home/user/.opam/prism-8.10.2".to_string(),
                ),
                (
                    "PATH".to_string(),
                    "/home/user/.opam/prism-8.10.2/bin:/usr/bin".to_string(),
                ),
            ],
        )
    }

    #[test]
    fn test_active_from_opamswitch() {
        let active = ActiveEnvironment::from_vars(Some("prism-8.10.2"), Some("/x/other"));
        assert_eq!(active.get().map(|id| id.as_str()), Some("prism-8.10.2"));
    }

    #[test]
    fn test_active_from_switch_prefix() {
        let active = ActiveEnvironment::from_vars(None, Some("/home/user/.opam/prism-8.9.0/"));
        assert!(active.matches(&SwitchIdentifier::from_name("prism-8.9.0")));
    }

    #[test]
    fn test_active_none_when_unset_or_blank() {
        assert!(!ActiveEnvironment::from_vars(None, None).is_active());
        assert!(!ActiveEnvironment::from_vars(Some("  "), Some("")).is_active());
        assert_eq!(ActiveEnvironment::none().to_string(), "none");
    }

    #[test]
    #[serial]
    fn test_active_from_process_env() {
        env::set_var("OPAMSWITCH", "prism-8.10.2");
        let active = ActiveEnvironment::from_env();
        env::remove_var("OPAMSWITCH");
        assert_eq!(active.to_string(), "prism-8.10.2");
    }

    #[test]
    fn test_format_posix() {
        let output = sample_activation().format_for_shell(Shell::Zsh);
        assert!(output.contains("export OPAMSWITCH='prism-8.10.2'"));
        assert!(output.contains("export PATH='/home/user/.opam/prism-8.10.2/bin:/usr/bin'"));
        assert!(!output.contains("set -gx"));
    }

    #[test]
    fn test_format_posix_escapes_quotes() {
        let activation = Activation::new(
            SwitchIdentifier::from_name("prism-8.10.2"),
            vec![("MSG".to_string(), "it's".to_string())],
        );
        assert_eq!(activation.format_for_shell(Shell::Sh), "export MSG='it'\\''s'");
    }

    #[test]
    fn test_format_fish_splits_paths() {
        let output = sample_activation().format_for_shell(Shell::Fish);
        assert!(output.contains("set -gx OPAMSWITCH 'prism-8.10.2'"));
        assert!(output.contains("set -gx PATH '/home/user/.opam/prism-8.10.2/bin' '/usr/bin'"));
        assert!(!output.contains("export"));
    }

    #[test]
    fn test_var_lookup() {
        let activation = sample_activation();
        assert_eq!(
            activation.var("OPAM_SWITCH_PREFIX"),
            Some("/home/user/.opam/prism-8.10.2")
        );
        assert_eq!(activation.var("MISSING"), None);
    }

    #[test]
    fn test_shell_from_name() {
        assert_eq!(Shell::from_name("zsh"), Some(Shell::Zsh));
        assert_eq!(Shell::from_name("BASH"), Some(Shell::Bash));
        assert_eq!(Shell::from_name("Fish"), Some(Shell::Fish));
        assert_eq!(Shell::from_name("dash"), Some(Shell::Sh));
        assert_eq!(Shell::from_name("powershell"), None);
    }
}
