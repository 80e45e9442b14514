//=========================================================================
// Logging
//=========================================================================
//
// One-time installation of the `env_logger` backend behind the `log`
// facade used throughout the crate.
//
// Filter precedence: `LoggingConfig::filter`, then `RUST_LOG`, then `info`.
//
//=========================================================================

use std::sync::Once;

use serde::{Deserialize, Serialize};

//=== LoggingConfig =======================================================

/// `filter` follows the `env_logger` syntax (e.g. "info",
/// "aetheric_core=debug,winit=warn").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
///
/// A logger installed by someone else (tests, the embedding host) is left
/// in place.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.filter.as_deref() {
            Some(filter) => {
                builder.parse_filters(filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(log::LevelFilter::Info);
                }
            },
        }

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig { filter: Some("warn".into()) };

        init_logging(&config);
        init_logging(&LoggingConfig::default());

        log::warn!(target: "core", "logger survives repeated init");
    }
}
