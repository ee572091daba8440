//! Runtime Settings
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `BATCH_MONITOR_*` environment variables.

use crate::scheduler::SchedulerConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Settings file read when no path is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "batch-monitor.toml";

const ENV_PREFIX: &str = "BATCH_MONITOR";

/// Errors while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Device paths and timer periods
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// i2c-dev adapter the display hangs off
    pub i2c_device: String,
    /// 7-bit address of the display backpack
    pub lcd_address: u8,
    /// sysfs directory holding 1-Wire slaves
    pub w1_devices_dir: String,
    /// Seconds between probe discovery passes
    pub discovery_interval_secs: u64,
    /// Seconds between display refreshes
    pub render_interval_secs: u64,
    pub log_level: String,
}

impl Settings {
    /// Load settings, treating a missing file as empty
    pub fn load(path: &str) -> Result<Self, SettingsError> {
        let settings: Settings = config::Config::builder()
            .set_default("i2c_device", "/dev/i2c-1")?
            .set_default("lcd_address", i64::from(lcd_protocol::DEFAULT_ADDRESS))?
            .set_default("w1_devices_dir", w1_probe::W1Bus::DEFAULT_DEVICES_DIR)?
            .set_default("discovery_interval_secs", 10_i64)?
            .set_default("render_interval_secs", 5_i64)?
            .set_default("log_level", "info")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.discovery_interval_secs == 0 {
            return Err(SettingsError::Invalid("discovery_interval_secs must be > 0".to_string()));
        }
        if self.render_interval_secs == 0 {
            return Err(SettingsError::Invalid("render_interval_secs must be > 0".to_string()));
        }
        if self.lcd_address > 0x7F {
            return Err(SettingsError::Invalid(format!(
                "lcd_address {:#04x} is not a 7-bit address",
                self.lcd_address
            )));
        }
        Ok(())
    }

    /// Timer periods for the scheduler
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            discovery_interval: Duration::from_secs(self.discovery_interval_secs),
            render_interval: Duration::from_secs(self.render_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load("/nonexistent/batch-monitor").unwrap();
        assert_eq!(settings.i2c_device, "/dev/i2c-1");
        assert_eq!(settings.lcd_address, 0x27);
        assert_eq!(settings.w1_devices_dir, "/sys/bus/w1/devices");

        let config = settings.scheduler_config();
        assert_eq!(config.discovery_interval, Duration::from_secs(10));
        assert_eq!(config.render_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "i2c_device = \"/dev/i2c-0\"").unwrap();
        writeln!(file, "lcd_address = 63").unwrap();
        writeln!(file, "render_interval_secs = 2").unwrap();

        let settings = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.i2c_device, "/dev/i2c-0");
        assert_eq!(settings.lcd_address, 0x3F);
        assert_eq!(settings.render_interval_secs, 2);
        assert_eq!(settings.discovery_interval_secs, 10);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "discovery_interval_secs = 0").unwrap();

        let result = Settings::load(file.path().to_str().unwrap());
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }
}
