//! Control Registry

use crate::pid::PidController;
use crate::{GAINS, OUTPUT_MAX, OUTPUT_MIN, TARGET_TEMP_C};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};
use w1_probe::Reading;

/// Control state of one probe's batch
#[derive(Debug, Clone)]
pub struct ControlState {
    probe_id: String,
    current_temp_c: f64,
    target_temp_c: f64,
    control_output: f64,
    started_at: Instant,
    pid: PidController,
}

impl ControlState {
    fn new(probe_id: &str, now: Instant) -> Self {
        let mut pid = PidController::new(GAINS);
        pid.set_output_limits(OUTPUT_MIN, OUTPUT_MAX);
        pid.set_setpoint(TARGET_TEMP_C);

        Self {
            probe_id: probe_id.to_string(),
            current_temp_c: 0.0,
            target_temp_c: TARGET_TEMP_C,
            control_output: 0.0,
            started_at: now,
            pid,
        }
    }

    pub fn probe_id(&self) -> &str {
        &self.probe_id
    }

    /// Latest measured temperature (°C)
    pub fn current_temp_c(&self) -> f64 {
        self.current_temp_c
    }

    /// Setpoint (°C), fixed at creation
    pub fn target_temp_c(&self) -> f64 {
        self.target_temp_c
    }

    /// Latest PID output in `[0, 100]`
    pub fn control_output(&self) -> f64 {
        self.control_output
    }

    /// When the first reading for this probe arrived
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }
}

/// Owns the control state of every known probe
///
/// Only the scheduler touches the registry, so it carries no locks. Share it
/// across threads only behind an owner that serialises access.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    states: HashMap<String, ControlState>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a reading, creating the probe's state on first sight
    pub fn on_reading(&mut self, reading: &Reading) -> &ControlState {
        self.on_reading_at(reading, Instant::now())
    }

    /// Apply a reading as if it arrived at `now`
    pub fn on_reading_at(&mut self, reading: &Reading, now: Instant) -> &ControlState {
        let state = self
            .states
            .entry(reading.probe_id.clone())
            .or_insert_with(|| {
                info!("New batch on probe {} (target {:.1}°C)", reading.probe_id, TARGET_TEMP_C);
                ControlState::new(&reading.probe_id, now)
            });

        state.current_temp_c = reading.temperature_c;
        state.control_output = state.pid.update_at(reading.temperature_c, now);

        debug!(
            "Probe {}: {:.3}°C -> output {:.2}",
            state.probe_id, state.current_temp_c, state.control_output
        );
        state
    }

    /// Current state of every known probe, in no particular order
    pub fn snapshot(&self) -> impl Iterator<Item = &ControlState> + '_ {
        self.states.values()
    }

    pub fn get(&self, probe_id: &str) -> Option<&ControlState> {
        self.states.get(probe_id)
    }

    /// Number of known probes
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
