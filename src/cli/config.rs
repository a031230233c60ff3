use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use linkshieldbot::config::{Config, LoadOutcome};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,

    /// Load and validate the config file (generating it if missing)
    Check,
}

pub fn run(args: &ConfigArgs, path: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Check => check(path),
    }
}

fn check(path: &Path) -> Result<()> {
    match Config::load(path)? {
        LoadOutcome::Generated(path) => {
            println!("Config file not found, generated a template at {}", path.display());
        }
        LoadOutcome::Loaded(config) => {
            println!("Config OK: {}", path.display());
            println!("  Directives: {}", config.directives.len());
            for (chat, reference) in &config.directives {
                println!("    {} <- members of {}", chat, reference);
            }
            println!("  Poller timeout: {}s", config.poller_timeout);
            println!("  Handler timeout: {}s", config.handler_timeout);
            println!("  Verbose: {}", config.verbose);
        }
    }
    Ok(())
}
