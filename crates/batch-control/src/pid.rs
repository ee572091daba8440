//! PID Controller
//!
//! Positional form with derivative on measurement, so setpoint changes do not
//! kick the output. The integral term is clamped to the output bounds to stop
//! windup while the output is saturated.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Proportional, integral and derivative gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain (Kp)
    pub kp: f64,
    /// Integral gain (Ki, per second)
    pub ki: f64,
    /// Derivative gain (Kd, seconds)
    pub kd: f64,
}

/// PID controller with clamped output
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    setpoint: f64,
    out_min: f64,
    out_max: f64,
    integral: f64,
    prev_value: f64,
    last_update: Option<Instant>,
}

impl PidController {
    /// Create a controller with a zero setpoint and unbounded output
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            out_min: f64::NEG_INFINITY,
            out_max: f64::INFINITY,
            integral: 0.0,
            prev_value: 0.0,
            last_update: None,
        }
    }

    /// Set the target value
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Bound the output (and the integral term) to `[min, max]`
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        assert!(min <= max, "output limits inverted: {} > {}", min, max);
        self.out_min = min;
        self.out_max = max;
        self.integral = self.integral.clamp(min, max);
    }

    /// Step the controller at `now`, using the time since the previous step
    ///
    /// The first step sees zero elapsed time, so it is purely proportional.
    pub fn update_at(&mut self, value: f64, now: Instant) -> f64 {
        let elapsed = self
            .last_update
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_update = Some(now);
        self.update_elapsed(value, elapsed)
    }

    /// Step the controller with an explicit elapsed time
    pub fn update_elapsed(&mut self, value: f64, elapsed: Duration) -> f64 {
        let dt = elapsed.as_secs_f64();
        let error = self.setpoint - value;

        self.integral = (self.integral + error * dt * self.gains.ki).clamp(self.out_min, self.out_max);

        let derivative = if dt > 0.0 {
            -(value - self.prev_value) / dt
        } else {
            0.0
        };
        self.prev_value = value;

        let output = self.gains.kp * error + self.integral + self.gains.kd * derivative;
        output.clamp(self.out_min, self.out_max)
    }

    /// Current setpoint
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Configured gains
    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Output bounds as `(min, max)`
    pub fn output_limits(&self) -> (f64, f64) {
        (self.out_min, self.out_max)
    }

    /// Accumulated integral term
    pub fn integral(&self) -> f64 {
        self.integral
    }
}
