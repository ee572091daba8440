//! Probe Error Types

use thiserror::Error;

/// Reasons a probe sample is discarded
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The sample could not be read from the source
    #[error("Probe read error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrong line count or the CRC marker is missing
    #[error("Malformed sample: {0}")]
    Format(String),

    /// The sample path does not carry a usable probe id
    #[error("No probe id in path {0}")]
    MissingId(String),

    /// The temperature field is not an integer
    #[error("Invalid temperature field: {0}")]
    Temperature(String),
}
