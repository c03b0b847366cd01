//! Logging initialization
//!
//! Logs always go to stderr: in stdio mode stdout carries the MCP protocol.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "abc_pizza_mcp=info,sqlx=warn";

/// Install the global tracing subscriber
///
/// Safe to call more than once; later calls leave the installed subscriber in place.
pub fn init(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    // Fails only when a subscriber is already set
    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(LogFormat::Pretty);
        init(LogFormat::Json);
        tracing::info!("Still logging after a second init");
    }
}
