use anyhow::Result;
use clap::Parser;
use prism_switch::cli::Cli;
use prism_switch::commands;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing on stderr so `env` output stays evaluable
    let default_filter = if cli.verbose {
        "prism_switch=debug"
    } else {
        "prism_switch=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    commands::execute(cli)
}
