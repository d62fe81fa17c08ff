// Public API
pub mod cli;
pub mod commands;

// Switch lifecycle
pub mod confirm;
pub mod environment;
pub mod error;
pub mod gate;
pub mod opam;
pub mod probe;
pub mod provision;
pub mod switch;
pub mod teardown;
pub mod version;

// Local state and presentation
mod config;
mod project;
mod receipt;
mod ui;

// Re-export main types
pub use config::Config;
pub use environment::{ActiveEnvironment, Activation, Shell};
pub use error::SwitchError;
pub use project::{Project, ProjectPath};
pub use receipt::Receipt;
pub use switch::{build_identifier, SwitchIdentifier};
