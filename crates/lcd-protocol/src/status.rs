//! Status line formatting

use batch_control::ControlState;
use std::time::{Duration, Instant};

/// Width of the running-time field
const UPTIME_WIDTH: usize = 12;

/// Convert Celsius to Fahrenheit
pub fn fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Build the 20-column status line for a batch
///
/// `" 68.00°F  1:02:03:04"`: temperature in °F (non-negative values get a
/// leading space in place of the sign) followed by days:hours:minutes:seconds
/// since the batch started, right-aligned.
pub fn status_line(state: &ControlState, now: Instant) -> String {
    let temp = fahrenheit(state.current_temp_c());
    let temp = if temp < 0.0 {
        format!("{:.2}", temp)
    } else {
        format!(" {:.2}", temp)
    };
    let uptime = uptime(now.saturating_duration_since(state.started_at()));
    format!("{}°F{:>width$}", temp, uptime, width = UPTIME_WIDTH)
}

fn uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        " {}:{:02}:{:02}:{:02}",
        secs / 86_400,
        (secs / 3_600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COLUMNS;
    use batch_control::ControlRegistry;
    use w1_probe::Reading;

    fn line(temperature_c: f64, elapsed: Duration) -> String {
        let start = Instant::now();
        let mut registry = ControlRegistry::new();
        let reading = Reading {
            probe_id: "28-000000000001".to_string(),
            temperature_c,
        };
        let state = registry.on_reading_at(&reading, start);
        status_line(state, start + elapsed)
    }

    #[test]
    fn test_fahrenheit() {
        assert!((fahrenheit(20.0) - 68.0).abs() < 1e-9);
        assert!((fahrenheit(-40.0) + 40.0).abs() < 1e-9);
        assert!((fahrenheit(100.0) - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_line_layout() {
        let line = line(20.0, Duration::from_secs(86_400 + 2 * 3_600 + 3 * 60 + 4));
        assert_eq!(line, " 68.00°F  1:02:03:04");
        assert_eq!(line.chars().count(), COLUMNS);
    }

    #[test]
    fn test_status_line_fresh_batch() {
        assert_eq!(line(28.0, Duration::ZERO), " 82.40°F  0:00:00:00");
    }

    #[test]
    fn test_status_line_negative_fahrenheit() {
        assert_eq!(line(-20.0, Duration::from_secs(59)), "-4.00°F  0:00:00:59");
    }

    #[test]
    fn test_status_line_long_running() {
        let line = line(20.0, Duration::from_secs(12 * 86_400 + 23 * 3_600));
        assert_eq!(line, " 68.00°F 12:23:00:00");
    }
}
