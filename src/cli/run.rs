use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use linkshieldbot::config::{Config, LoadOutcome};
use linkshieldbot::handlers::Moderator;
use linkshieldbot::poller::{LogErrorSink, Poller};
use linkshieldbot::telegram::{TelegramApi, TelegramClient, TelegramError};

use super::{init_logging, Cli};

pub async fn run(cli: &Cli) -> Result<()> {
    let token = cli
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing BOT_TOKEN environment variable"))?
        .to_string();

    let config_path = cli.config_path()?;
    let config = match Config::load(&config_path)? {
        LoadOutcome::Loaded(config) => config,
        LoadOutcome::Generated(path) => anyhow::bail!(
            "Config file not found, but it was generated (path = {})\n\
             Set it up to your needs and run me again once you're done",
            path.display()
        ),
    };

    init_logging(cli.verbose || config.verbose);

    let directives = Arc::new(config.directive_table()?);

    info!("Starting up..");
    debug!("Verbose logging is enabled!");
    debug!(
        os = std::env::consts::OS,
        version = env!("CARGO_PKG_VERSION"),
        config_path = %config_path.display(),
        poller_timeout = config.poller_timeout,
        handler_timeout = config.handler_timeout,
        directives = directives.len(),
        "Environment"
    );

    let client = TelegramClient::with_api_base(token, config.api_base.as_str())
        .context("Failed to build HTTP client")?;
    let api: Arc<dyn TelegramApi> = Arc::new(client);

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    let health_timeout = Duration::from_secs(config.poller_timeout);
    let me = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        res = tokio::time::timeout(health_timeout, api.get_me()) => {
            res.unwrap_or(Err(TelegramError::Timeout(health_timeout)))
        }
    };
    let me = me.context(
        "Healthcheck request failed. \
         Please check your connectivity or that the entered Bot API token is correct",
    )?;

    info!(
        "Running as {} (@{})",
        me.first_name,
        me.username.as_deref().unwrap_or("unknown")
    );

    let mut poller = Poller::new(api, config.poller_config());
    poller
        .run(
            cancel,
            Arc::new(Moderator::new(directives)),
            Arc::new(LogErrorSink),
        )
        .await
        .context("Error during polling")?;

    info!("Shut down cleanly");
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM.
fn spawn_signal_listener(token: CancellationToken) {
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt signal received! Shutting down..");
                token.cancel();
            }
        });
    }

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Terminate signal received! Shutting down..");
                token.cancel();
            }
            Err(e) => tracing::warn!("Failed to register SIGTERM handler: {}", e),
        }
    });
}
