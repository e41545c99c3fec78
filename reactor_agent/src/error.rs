//! Error types for the link and the metric sources.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no serial device with a known USB bridge found")]
    DeviceNotFound,
    #[error("listing serial ports: {0}")]
    Enumerate(#[source] serialport::Error),
    #[error("opening {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("writing to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("link is not connected")]
    NotConnected,
    #[error("record is {len} bytes, limit is {limit}")]
    RecordTooLarge { len: usize, limit: usize },
    #[error("encoding record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MetricError {
    /// One probe failed; the snapshot carries zeros for that subtree.
    #[error("{what} unavailable: {reason}")]
    MetricSourceUnavailable { what: &'static str, reason: String },
}

impl MetricError {
    pub fn unavailable(what: &'static str, reason: impl ToString) -> Self {
        MetricError::MetricSourceUnavailable {
            what,
            reason: reason.to_string(),
        }
    }
}
