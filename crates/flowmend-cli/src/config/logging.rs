//! Log output configuration.

use clap::Args;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_CONFIG;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Logs are written
/// to stderr so command output on stdout stays machine-readable.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log line format: `text` or `json`.
    #[arg(long, env = "FLOWMEND_LOG_FORMAT", default_value = "text", global = true)]
    #[serde(default)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// Installs the global tracing subscriber.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = self.log_format == LogFormat::Json;

        tracing_subscriber::registry()
            .with(filter)
            .with(json.then(|| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
            }))
            .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
            .init();
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            log_format = %self.log_format,
            "Logging configuration"
        );
    }
}
