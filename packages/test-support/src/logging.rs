//! Unified test logging initialization
//!
//! Every test binary in the workspace installs the same subscriber, usually
//! through a `#[ctor::ctor]` hook so individual tests never have to.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when neither `TEST_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_TEST_FILTER: &str = "warn";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests with [`DEFAULT_TEST_FILTER`].
pub fn init() {
    init_with_default(DEFAULT_TEST_FILTER);
}

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe; the first call in a process wins. The filter is
/// read in this order of precedence:
///
/// 1. `TEST_LOG` environment variable (preferred)
/// 2. `RUST_LOG` environment variable (fallback)
/// 3. `default_filter`
///
/// Output goes through the test writer so cargo/nextest capture it, and
/// timestamps are dropped for stable output.
pub fn init_with_default(default_filter: &str) {
    INITIALIZED.get_or_init(|| {
        let directives = resolve_filter(
            std::env::var("TEST_LOG").ok(),
            std::env::var("RUST_LOG").ok(),
            default_filter,
        );

        fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

fn resolve_filter(test_log: Option<String>, rust_log: Option<String>, default: &str) -> String {
    test_log
        .into_iter()
        .chain(rust_log)
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with_default("debug");
        init();
    }

    #[test]
    fn test_test_log_takes_precedence() {
        let filter = resolve_filter(
            Some("txn_session=debug".to_string()),
            Some("info".to_string()),
            DEFAULT_TEST_FILTER,
        );
        assert_eq!(filter, "txn_session=debug");
    }

    #[test]
    fn test_rust_log_is_fallback() {
        assert_eq!(
            resolve_filter(None, Some("info".to_string()), DEFAULT_TEST_FILTER),
            "info"
        );
        assert_eq!(
            resolve_filter(Some("  ".to_string()), Some("info".to_string()), "warn"),
            "info"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(resolve_filter(None, None, "warn,actix_web=info"), "warn,actix_web=info");
    }
}
