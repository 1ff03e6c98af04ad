//! jobscout - job posting detection from the command line

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscout::cli::{Cli, Commands};
use jobscout::error::Result;

mod commands;
mod utils;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobscout=warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { url, html, json, save } => commands::cmd_detect(&url, html, json, save),
        Commands::Portals { json } => commands::cmd_portals(json),
        Commands::Init => commands::cmd_init(),
    }
}
