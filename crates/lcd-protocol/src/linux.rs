//! Linux i2c-dev Bus
//!
//! Talks to `/dev/i2c-N` directly: the slave address is bound to the open
//! file with the `I2C_SLAVE` ioctl, after which plain reads and writes go to
//! that device.

use crate::driver::LcdDriver;
use crate::error::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// `I2C_SLAVE` request from `<linux/i2c-dev.h>`
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// I/O failure on an i2c-dev file
#[derive(Debug, Error)]
#[error("i2c-dev I/O error: {0}")]
pub struct LinuxI2cError(#[from] pub io::Error);

impl i2c::Error for LinuxI2cError {
    fn kind(&self) -> ErrorKind {
        match self.0.raw_os_error() {
            Some(libc::ENXIO) | Some(libc::EREMOTEIO) => {
                ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Unknown)
            }
            Some(libc::EAGAIN) => ErrorKind::ArbitrationLoss,
            _ => ErrorKind::Other,
        }
    }
}

/// An open i2c-dev adapter
#[derive(Debug)]
pub struct LinuxI2c {
    file: File,
    address: Option<u8>,
}

impl LinuxI2c {
    /// Open an adapter node such as `/dev/i2c-1`
    pub fn open(path: &str) -> Result<Self, DisplayError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| DisplayError::Open {
                path: path.to_string(),
                source,
            })?;
        debug!("Opened I2C adapter {}", path);
        Ok(Self {
            file,
            address: None,
        })
    }

    /// Open an adapter and bind it to one slave address
    pub fn open_device(path: &str, address: u8) -> Result<Self, DisplayError> {
        let mut bus = Self::open(path)?;
        bus.select(address)
            .map_err(|source| DisplayError::Address { address, source })?;
        Ok(bus)
    }

    fn select(&mut self, address: u8) -> io::Result<()> {
        if self.address == Some(address) {
            return Ok(());
        }
        // SAFETY: the fd is owned by `self.file` and stays open for the call;
        // I2C_SLAVE takes the address by value.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        self.address = Some(address);
        Ok(())
    }
}

impl ErrorType for LinuxI2c {
    type Error = LinuxI2cError;
}

impl I2c<SevenBitAddress> for LinuxI2c {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.select(address)?;
        for op in operations {
            match op {
                Operation::Write(bytes) => self.file.write_all(bytes)?,
                Operation::Read(buf) => self.file.read_exact(buf)?,
            }
        }
        Ok(())
    }
}

/// Delay backed by thread sleep
///
/// Sleeps are at least as long as requested, which is all the display needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

impl LcdDriver<LinuxI2c, StdDelay> {
    /// Open the display on an i2c-dev adapter and initialise it
    pub fn open(path: &str, address: u8) -> Result<Self, DisplayError> {
        let bus = LinuxI2c::open_device(path, address)?;
        LcdDriver::new(bus, StdDelay, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn test_open_missing_device_fails() {
        let err = LinuxI2c::open("/dev/i2c-does-not-exist").unwrap_err();
        assert!(matches!(err, DisplayError::Open { .. }));
        assert!(err.to_string().contains("/dev/i2c-does-not-exist"));
    }

    #[test]
    fn test_driver_open_missing_device_fails() {
        assert!(LcdDriver::open("/dev/i2c-does-not-exist", 0x27).is_err());
    }

    #[test]
    fn test_nack_error_kind() {
        let err = LinuxI2cError(io::Error::from_raw_os_error(libc::ENXIO));
        assert!(matches!(err.kind(), ErrorKind::NoAcknowledge(_)));
        let err = LinuxI2cError(io::Error::from_raw_os_error(libc::EIO));
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
