//! Recording bus and delay for running the driver without hardware
//!
//! Clones share one log, so a test can hand a clone to the driver and keep
//! another to inspect what went over the wire.

use crate::driver::Mode;
use crate::pins::{ENABLE, REGISTER_SELECT};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use std::sync::{Arc, Mutex, MutexGuard};

/// Writes made by the driver: one PCF8574 transfer per byte
pub const WRITES_PER_BYTE: usize = 5;

#[derive(Debug, Default)]
struct BusLog {
    writes: Vec<(u8, Vec<u8>)>,
    fail: bool,
}

/// I2C bus that records every write
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    log: Arc<Mutex<BusLog>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, BusLog> {
        // A panicking test thread must not hide the log from the others
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent write fail with a NACK
    pub fn fail_writes(&self, fail: bool) {
        self.log().fail = fail;
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.log().writes.clear();
    }

    /// Every write as `(address, bytes)`
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.log().writes.clone()
    }

    /// All written bytes, flattened
    pub fn bytes(&self) -> Vec<u8> {
        self.log()
            .writes
            .iter()
            .flat_map(|(_, bytes)| bytes.iter().copied())
            .collect()
    }

    /// Reassemble the logical transfers from the nibble waveform
    ///
    /// Takes the data nibbles from the two strobed writes of each group.
    pub fn decoded(&self) -> Vec<(Mode, u8)> {
        self.bytes()
            .chunks_exact(WRITES_PER_BYTE)
            .map(|group| {
                debug_assert!(group[1] & ENABLE != 0 && group[3] & ENABLE != 0);
                let mode = if group[0] & REGISTER_SELECT != 0 {
                    Mode::Character
                } else {
                    Mode::Command
                };
                (mode, (group[1] & 0xF0) | (group[3] >> 4))
            })
            .collect()
    }
}

impl ErrorType for RecordingBus {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for RecordingBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut log = self.log();
        if log.fail {
            return Err(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => log.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Delay that records requested durations instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    nanos: Arc<Mutex<Vec<u64>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<u64>> {
        self.nanos.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    /// Requested delays in whole microseconds
    pub fn micros(&self) -> Vec<u64> {
        self.log().iter().map(|ns| ns / 1_000).collect()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log().push(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.log().push(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log().push(u64::from(ms) * 1_000_000);
    }
}
