//! Tracing subscriber bootstrap shared by every binary in the workspace.

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the event filter: `RUST_LOG` wins, otherwise the configured directive.
fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(settings: &TelemetrySettings) {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(settings));

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "bookstore-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }
}
