//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive
///
/// `RUST_LOG` wins, then `--verbose`, then the configured level, then `info`.
pub fn filter_directive(verbose: bool, configured: Option<&str>) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.trim().is_empty() {
            return env;
        }
    }

    if verbose {
        return "debug".to_string();
    }

    configured
        .map(str::to_string)
        .unwrap_or_else(|| "info".to_string())
}

/// Install the global subscriber (stderr, compact format)
pub fn init_logging(verbose: bool, configured: Option<&str>) {
    let directive = filter_directive(verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
