//! Display Error Types

use thiserror::Error;

/// Errors raised by the display driver
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The bus device node could not be opened
    #[error("Failed to open I2C device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The slave address could not be selected on the bus
    #[error("Failed to select I2C address {address:#04x}: {source}")]
    Address {
        address: u8,
        #[source]
        source: std::io::Error,
    },

    /// A bus write was not acknowledged
    #[error("I2C bus error: {0}")]
    Bus(String),
}
