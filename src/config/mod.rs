mod directives;

pub use directives::DirectiveTable;


use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poller::{PollerConfig, DEFAULT_RETRY_BACKOFF};
use crate::telegram::DEFAULT_API_BASE;

pub const APP_NAME: &str = "linkshieldbot";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Emit debug-level logs
    #[serde(default)]
    pub verbose: bool,

    /// Deadline of one getUpdates call, in seconds
    #[serde(default = "default_poller_timeout")]
    pub poller_timeout: u64,

    /// Deadline of one handled update, in seconds
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout: u64,

    /// Server-side long-poll wait, in seconds. Must stay below `poller_timeout`.
    #[serde(default = "default_long_poll_timeout")]
    pub long_poll_timeout: u64,

    /// Bot API server (override for a self-hosted instance)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Moderated chat id -> reference chat id. Keys are strings because TOML
    /// table keys cannot be integers.
    #[serde(default)]
    pub directives: BTreeMap<String, i64>,
}

/// Result of [`Config::load`].
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Config),
    /// No file existed; a commented template was written in its place.
    Generated(PathBuf),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            poller_timeout: default_poller_timeout(),
            handler_timeout: default_handler_timeout(),
            long_poll_timeout: default_long_poll_timeout(),
            api_base: default_api_base(),
            directives: BTreeMap::new(),
        }
    }
}

fn default_poller_timeout() -> u64 {
    10
}
fn default_handler_timeout() -> u64 {
    20
}
fn default_long_poll_timeout() -> u64 {
    1
}
fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Config {
    /// Load the config at `path`, generating a template if it does not exist.
    pub fn load(path: &Path) -> Result<LoadOutcome> {
        if !path.exists() {
            Self::write_template(path)
                .with_context(|| format!("Failed to generate config file at {}", path.display()))?;
            return Ok(LoadOutcome::Generated(path.to_path_buf()));
        }

        if path.is_dir() {
            anyhow::bail!("Config path must be a file, not a directory: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(LoadOutcome::Loaded(config))
    }

    pub fn validate(&self) -> Result<()> {
        if self.directives.is_empty() {
            anyhow::bail!(
                "No directives were found in config, a minimum of one directive is required"
            );
        }

        // Surfaces unparsable chat ids
        self.directive_table()?;

        if self.poller_timeout == 0 {
            anyhow::bail!("poller_timeout must be greater than 0");
        }
        if self.handler_timeout == 0 {
            anyhow::bail!("handler_timeout must be greater than 0");
        }
        if self.long_poll_timeout >= self.poller_timeout {
            anyhow::bail!(
                "long_poll_timeout ({}s) must be shorter than poller_timeout ({}s)",
                self.long_poll_timeout,
                self.poller_timeout
            );
        }
        if self.api_base.trim().is_empty() {
            anyhow::bail!("api_base cannot be empty");
        }

        Ok(())
    }

    pub fn directive_table(&self) -> Result<DirectiveTable> {
        self.directives
            .iter()
            .map(|(chat, reference)| {
                let chat_id = chat.trim().parse::<i64>().with_context(|| {
                    format!("Invalid chat id in directives: {:?}", chat)
                })?;
                Ok((chat_id, *reference))
            })
            .collect()
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            fetch_timeout: Duration::from_secs(self.poller_timeout),
            handler_timeout: Duration::from_secs(self.handler_timeout),
            long_poll_secs: self.long_poll_timeout,
            batch_limit: Some(1),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Default location: `<platform config dir>/linkshieldbot/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine the system's config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(())
    }
}

/// Written on first run; the directive below is a placeholder to replace.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# LinkShieldBot configuration
# Auto-created on first run. Edit as needed, then start the bot again.
# The bot token is read from the BOT_TOKEN environment variable.

# Emit verbose logs (the -v/--verbose flag also enables this)
verbose = false

# Seconds to wait for one getUpdates call before retrying
poller_timeout = 10

# Seconds a single update (join request, /start) may take to be handled
handler_timeout = 20

# Seconds the Bot API server holds a getUpdates call open waiting for updates
# long_poll_timeout = 1

# Use a self-hosted Bot API server
# api_base = "https://api.telegram.org"

# Directives: "<chat receiving join requests>" = <reference chat>
# A join request to the chat on the left is approved only if the requester is
# a member of the chat on the right; otherwise it is declined.
# The bot must be an administrator of both chats.
[directives]
"-1001111111111" = -1002222222222
"#;
