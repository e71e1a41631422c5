//! Tracing configuration for the `rulepy` binary.
//!
//! Output format is chosen by `RULEPY_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `json`: one JSON object per event
//!
//! ```bash
//! RULEPY_LOG=debug rulepy rules.txt
//! RULEPY_LOG="rulepy::lowering=trace" RULEPY_LOG_FORMAT=json rulepy rules.txt
//! ```
//!
//! The subscriber is only installed when `RULEPY_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flat text lines (default).
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Read `RULEPY_LOG_FORMAT`.
    fn from_env() -> Self {
        Self::parse(&std::env::var("RULEPY_LOG_FORMAT").unwrap_or_default())
    }
}

/// Filter directives: `RULEPY_LOG` first, then `RUST_LOG`
fn directives(rulepy_log: Option<String>, rust_log: Option<String>) -> Option<String> {
    rulepy_log.or(rust_log)
}

/// Initialise the global tracing subscriber.
///
/// Everything goes to stderr; stdout carries the generated code. Exactly one
/// of the two format layers is present.
pub fn init_tracing() {
    let Some(filter_directives) = directives(std::env::var("RULEPY_LOG").ok(), std::env::var("RUST_LOG").ok()) else {
        return;
    };

    let (text, json) = match LogFormat::from_env() {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::builder().parse_lossy(filter_directives))
        .with(text)
        .with(json)
        .init();
}
