//! Control Loop
//!
//! The scheduler owns the control registry and the display, so both are only
//! ever touched from this loop. Probe reads run on blocking worker threads and
//! reach the loop through the reading queue.

use batch_control::ControlRegistry;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use lcd_protocol::LcdDriver;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use w1_probe::{ProbeSource, Reading, SensorPoller};

/// Timer periods
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period of probe discovery (default: 10s)
    pub discovery_interval: Duration,
    /// Period of display refresh (default: 5s)
    pub render_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            discovery_interval: Duration::from_secs(10),
            render_interval: Duration::from_secs(5),
        }
    }
}

/// Single-threaded event loop over readings, discovery ticks and render ticks
pub struct Scheduler<S, I, D> {
    config: SchedulerConfig,
    registry: ControlRegistry,
    display: LcdDriver<I, D>,
    poller: SensorPoller<S>,
    readings: mpsc::UnboundedReceiver<Reading>,
}

impl<S, I, D> Scheduler<S, I, D>
where
    S: ProbeSource,
    I: I2c,
    D: DelayNs,
{
    /// Create a scheduler polling `source` and rendering to `display`
    pub fn new(source: S, display: LcdDriver<I, D>, config: SchedulerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            registry: ControlRegistry::new(),
            display,
            poller: SensorPoller::new(source, tx),
            readings: rx,
        }
    }

    /// Run until `shutdown` resolves
    ///
    /// Both timers first fire one full period after start. `select!` picks
    /// among ready branches at random, so a busy reading queue cannot starve
    /// either timer.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut discovery = periodic(self.config.discovery_interval);
        let mut render = periodic(self.config.render_interval);
        tokio::pin!(shutdown);

        info!(
            "Scheduler running (discovery every {:?}, render every {:?})",
            self.config.discovery_interval, self.config.render_interval
        );

        loop {
            tokio::select! {
                Some(reading) = self.readings.recv() => self.handle_reading(reading),
                _ = discovery.tick() => {
                    self.discover();
                }
                _ = render.tick() => self.render(),
                _ = &mut shutdown => {
                    info!("Scheduler stopping with {} batches", self.registry.len());
                    break;
                }
            }
        }
    }

    /// Feed one reading into its probe's control loop
    pub fn handle_reading(&mut self, reading: Reading) {
        let state = self.registry.on_reading(&reading);
        info!(
            "{} {:.3}°C pid={:.2}",
            state.probe_id(),
            state.current_temp_c(),
            state.control_output()
        );
    }

    /// Launch a read for every probe currently present
    pub fn discover(&mut self) -> usize {
        self.poller.poll()
    }

    /// Redraw the display from the current control states
    pub fn render(&mut self) {
        self.render_at(Instant::now());
    }

    pub fn render_at(&mut self, now: Instant) {
        for state in self.registry.snapshot() {
            // A bus error ends this probe's line; the next tick redraws it in full
            if let Err(e) = self.display.render_state(state, now) {
                warn!("Failed to render probe {}: {}", state.probe_id(), e);
            }
        }
        debug!("Rendered {} batches", self.registry.len());
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
