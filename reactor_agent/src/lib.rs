//! Host side of the serial dashboard: samples system telemetry and writes it
//! to the panel, one JSON record per line.

pub mod config;
pub mod error;
pub mod gpu;
pub mod link;
pub mod metrics;
pub mod proto;
pub mod sampler;
pub mod types;

pub use error::{LinkError, MetricError};
pub use link::{Link, LinkSession, PortCandidate, PortEnumerator, PortOpener, SerialOpener, SystemPorts, UsbIdentity};
pub use metrics::{Collector, SnapshotSource};
pub use proto::{encode_record, MAX_RECORD_BYTES};
pub use sampler::{RetryPolicy, Sampler, TickOutcome};
pub use types::{Snapshot, MAX_CORES};
