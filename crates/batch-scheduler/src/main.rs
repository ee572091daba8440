//! Batch Monitor - Main Entry Point

use anyhow::Context;
use batch_scheduler::{init_logging, Scheduler, Settings, DEFAULT_CONFIG_FILE};
use lcd_protocol::LcdDriver;
use tracing::{info, warn};
use w1_probe::W1Bus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let settings = Settings::load(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path))?;

    init_logging(&settings.log_level).context("Failed to set tracing subscriber")?;

    info!("=== Batch Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    // No point running without somewhere to show the batches
    let display = LcdDriver::open(&settings.i2c_device, settings.lcd_address).with_context(|| {
        format!(
            "Cannot start without the display at {} address {:#04x}",
            settings.i2c_device, settings.lcd_address
        )
    })?;

    let source = W1Bus::new(&settings.w1_devices_dir);
    let mut scheduler = Scheduler::new(source, display, settings.scheduler_config());

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Batch Monitor stopped");
    Ok(())
}
