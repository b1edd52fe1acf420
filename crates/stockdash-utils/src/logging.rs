//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so page output
/// on stdout stays clean. Calling this twice returns an error.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Only one global subscriber per process
        let _ = init_tracing("debug", LogFormat::Text);
        assert!(init_tracing("debug", LogFormat::Json).is_err());
    }

    #[test]
    fn test_logging_inside_runtime() {
        tokio_test::block_on(async {
            let _ = init_tracing("info", LogFormat::Text);
            tracing::info!("logged from an async block");
        });
    }
}
