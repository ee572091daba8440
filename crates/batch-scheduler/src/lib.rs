//! Batch Monitor
//!
//! Single control loop multiplexing probe readings, the discovery timer and
//! the display refresh timer.

mod scheduler;
mod settings;

pub use scheduler::{Scheduler, SchedulerConfig};
pub use settings::{Settings, SettingsError, DEFAULT_CONFIG_FILE};

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging at the given level ("trace" .. "error")
///
/// An unrecognised level falls back to INFO.
pub fn init_logging(level: &str) -> Result<(), SetGlobalDefaultError> {
    let max_level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
