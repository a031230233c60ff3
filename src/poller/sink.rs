use std::error::Error;
use std::fmt;
use tracing::warn;

/// Where a reported failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Fetching updates failed; the poller retries after a backoff.
    Poller,
    /// A dispatched update handler failed; only that update is affected.
    Handler,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOrigin::Poller => f.write_str("poller"),
            ErrorOrigin::Handler => f.write_str("handler"),
        }
    }
}

/// Receives every non-fatal failure of the engine.
///
/// Called at most once per failure and never for cancellation. Reporting must
/// not block: it runs inline on the poller loop and on dispatch tasks.
pub trait ErrorSink: Send + Sync {
    fn report(&self, origin: ErrorOrigin, error: &(dyn Error + Send + Sync + 'static));
}

impl<F> ErrorSink for F
where
    F: Fn(ErrorOrigin, &(dyn Error + Send + Sync + 'static)) + Send + Sync,
{
    fn report(&self, origin: ErrorOrigin, error: &(dyn Error + Send + Sync + 'static)) {
        self(origin, error)
    }
}

/// Production sink: one log line per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, origin: ErrorOrigin, error: &(dyn Error + Send + Sync + 'static)) {
        match origin {
            ErrorOrigin::Poller => warn!("Failed to fetch updates, retrying.. ({})", error),
            ErrorOrigin::Handler => warn!("Failed to process update: {}", error),
        }
    }
}
