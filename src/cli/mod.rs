pub mod config;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use linkshieldbot::config::Config;

#[derive(Parser)]
#[command(name = "linkshieldbot")]
#[command(
    author,
    version,
    about = "Approves Telegram join requests from members of a reference chat and declines the rest"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Emit verbose logs (has priority over config)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "LINKSHIELDBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bot API token
    #[arg(long, global = true, env = "BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll for updates and moderate join requests
    Run,

    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }
}

pub fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}
