//! Tracing setup
//!
//! Engine code emits `tracing` events with structured fields. The binary
//! installs a formatting subscriber once; libraries and tests that never call
//! `init_tracing` simply have no subscriber.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber
///
/// `default_filter` applies when `RUST_LOG` is unset or empty. An unparsable
/// default falls back to `envelope_ledger=warn`. Output goes to stderr so
/// command output on stdout stays clean.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(from_env) if !from_env.trim().is_empty() => EnvFilter::from_default_env(),
            _ => build_filter(default_filter),
        };

        // Another subscriber may already be installed by an embedding binary
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn build_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("envelope_ledger=warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directive_lists() {
        let filter = build_filter("envelope_ledger=debug,warn");
        let rendered = filter.to_string();
        assert!(rendered.contains("envelope_ledger=debug"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("envelope_ledger=warn");
        init_tracing("envelope_ledger=debug");
    }
}
