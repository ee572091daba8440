//! Batch Temperature Control
//!
//! One PID loop per probe. Each probe's state ("batch") is created on its
//! first reading and lives for the rest of the process.

mod pid;
mod registry;

pub use pid::{PidController, PidGains};
pub use registry::{ControlRegistry, ControlState};

/// Setpoint every batch is held at (°C)
pub const TARGET_TEMP_C: f64 = 28.0;

/// Gains shared by every batch
pub const GAINS: PidGains = PidGains {
    kp: 1.0,
    ki: 3.0,
    kd: 0.2,
};

/// Lower bound of the control output (%)
pub const OUTPUT_MIN: f64 = 0.0;

/// Upper bound of the control output (%)
pub const OUTPUT_MAX: f64 = 100.0;
