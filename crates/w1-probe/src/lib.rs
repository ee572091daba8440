//! 1-Wire Temperature Probes
//!
//! Parses raw probe samples into typed readings and polls every discovered
//! probe concurrently, funnelling results into a single reading queue.

mod error;
mod poller;
mod reader;
mod source;

pub use error::ProbeError;
pub use poller::SensorPoller;
pub use reader::{parse_sample, read_probe, try_parse_sample, try_parse_sample_at, Reading};
pub use source::{ProbeSource, W1Bus};

/// Marker the kernel appends to the first sample line when the CRC matched
pub const CRC_OK_MARKER: &str = "YES";

/// Index of the probe id in a slash-delimited sample path under the default
/// devices dir (`/sys/bus/w1/devices/<id>/w1_slave`)
pub const PROBE_ID_SEGMENT: usize = 5;

/// Shortest accepted probe id
pub const MIN_PROBE_ID_LEN: usize = 5;

/// Number of trailing characters of the data line holding milli-degrees
pub const TEMPERATURE_DIGITS: usize = 5;
