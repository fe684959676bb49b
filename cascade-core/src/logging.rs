//! Logging
//!
//! The engine only emits `tracing` events. This module installs a
//! `tracing_subscriber` formatter for binaries and demos that want to see
//! them; libraries embedding the engine can ignore it.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Subscriber settings.
///
/// `env_filter` uses the `EnvFilter` directive syntax
/// (e.g. "info", "cascade_core=trace").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            ansi: true,
            with_target: true,
        }
    }
}

static INIT: Once = Once::new();

/// Install the global subscriber once.
///
/// The filter comes from `config.env_filter`, then `RUST_LOG`, then `info`.
/// Directives that fail to parse are skipped and reported once the
/// subscriber is up. Later calls, or an already-installed subscriber, leave
/// things as they are.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let (filter, rejected) = select_filter(config.env_filter.as_deref(), || {
            EnvFilter::try_from_default_env().ok()
        });

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.ansi)
            .with_target(config.with_target)
            .try_init()
            .is_ok();

        if let Some(error) = rejected {
            tracing::warn!(%error, "ignoring invalid log filter");
        }
        tracing::debug!(installed, "logging initialized");
    });
}

/// Explicit directives win when they parse; otherwise `from_env`, then `info`.
fn select_filter(
    explicit: Option<&str>,
    from_env: impl FnOnce() -> Option<EnvFilter>,
) -> (EnvFilter, Option<String>) {
    let mut rejected = None;
    if let Some(directives) = explicit {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return (filter, None),
            Err(error) => rejected = Some(format!("{directives:?}: {error}")),
        }
    }
    let filter = from_env().unwrap_or_else(|| EnvFilter::new("info"));
    (filter, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig {
            env_filter: Some("cascade_core=trace".into()),
            ansi: false,
            ..LoggingConfig::default()
        };
        init_logging(config.clone());
        init_logging(config);
        tracing::info!("still logging");
    }

    #[test]
    fn explicit_filter_wins() {
        let (filter, rejected) =
            select_filter(Some("cascade_core=trace"), || Some(EnvFilter::new("warn")));
        assert_eq!(filter.to_string(), "cascade_core=trace");
        assert!(rejected.is_none());
    }

    #[test]
    fn invalid_filter_falls_back_to_environment() {
        let (filter, rejected) =
            select_filter(Some("cascade_core=loudest"), || Some(EnvFilter::new("warn")));
        assert_eq!(filter.to_string(), "warn");
        assert!(rejected.is_some_and(|error| error.contains("cascade_core=loudest")));
    }

    #[test]
    fn missing_environment_falls_back_to_info() {
        let (filter, rejected) = select_filter(None, || None);
        assert_eq!(filter.to_string(), "info");
        assert!(rejected.is_none());
    }
}
