//! Subscriber setup for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(diagnostics: bool) -> &'static str {
    if diagnostics {
        "bookvault=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless.
pub fn init_logging(diagnostics: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(diagnostics)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_turn_on_crate_debug_logs() {
        assert_eq!(default_filter(true), "bookvault=debug");
        assert_eq!(default_filter(false), "warn");
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
