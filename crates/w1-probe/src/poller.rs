//! Concurrent Probe Polling

use crate::reader::{read_probe, Reading};
use crate::source::ProbeSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Launches one blocking read per discovered probe on every discovery tick
///
/// Reads are fire-and-forget: nothing tracks or cancels them, and a slow read
/// may still be in flight when the next tick launches another one for the
/// same probe. Both results are delivered.
pub struct SensorPoller<S> {
    source: Arc<S>,
    readings: mpsc::UnboundedSender<Reading>,
}

impl<S: ProbeSource> SensorPoller<S> {
    /// Create a poller feeding the given reading queue
    pub fn new(source: S, readings: mpsc::UnboundedSender<Reading>) -> Self {
        Self {
            source: Arc::new(source),
            readings,
        }
    }

    /// Enumerate probes and launch a read for each, returning how many were launched
    ///
    /// Must be called from within a Tokio runtime.
    pub fn poll(&self) -> usize {
        let paths = match self.source.discover() {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Probe discovery failed: {}", e);
                return 0;
            }
        };

        for path in &paths {
            let source = Arc::clone(&self.source);
            let tx = self.readings.clone();
            let path = path.clone();
            tokio::task::spawn_blocking(move || {
                if let Some(reading) = read_probe(source.as_ref(), &path) {
                    if tx.send(reading).is_err() {
                        debug!("Reading queue closed, dropping sample from {}", path);
                    }
                }
            });
        }

        debug!("Launched {} probe reads", paths.len());
        paths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::W1Bus;
    use std::collections::HashMap;
    use std::io;

    struct FakeSource {
        samples: HashMap<String, String>,
    }

    impl FakeSource {
        fn new(samples: &[(&str, &str)]) -> Self {
            Self {
                samples: samples
                    .iter()
                    .map(|(path, content)| (path.to_string(), content.to_string()))
                    .collect(),
            }
        }
    }

    impl ProbeSource for FakeSource {
        fn discover(&self) -> io::Result<Vec<String>> {
            let mut paths: Vec<String> = self.samples.keys().cloned().collect();
            paths.sort();
            Ok(paths)
        }

        fn read_raw(&self, path: &str) -> io::Result<String> {
            match self.samples.get(path) {
                Some(content) if !content.is_empty() => Ok(content.clone()),
                _ => Err(io::Error::new(io::ErrorKind::Other, "read failed")),
            }
        }
    }

    struct BrokenSource;

    impl ProbeSource for BrokenSource {
        fn discover(&self) -> io::Result<Vec<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn read_raw(&self, _path: &str) -> io::Result<String> {
            unreachable!("nothing is discovered")
        }
    }

    const GOOD: &str = "aa : crc=57 YES\naa t=21500\n";

    async fn drain(mut rx: mpsc::UnboundedReceiver<Reading>) -> Vec<Reading> {
        let mut readings = Vec::new();
        while let Some(reading) = rx.recv().await {
            readings.push(reading);
        }
        readings.sort_by(|a, b| a.probe_id.cmp(&b.probe_id));
        readings
    }

    #[tokio::test]
    async fn test_poll_reads_every_probe() {
        let source = FakeSource::new(&[
            ("/sys/bus/w1/devices/28-000000000001/w1_slave", GOOD),
            ("/sys/bus/w1/devices/28-000000000002/w1_slave", GOOD),
            ("/sys/bus/w1/devices/28-000000000003/w1_slave", GOOD),
        ]);
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = SensorPoller::new(source, tx);

        assert_eq!(poller.poll(), 3);
        drop(poller);

        let readings = drain(rx).await;
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].probe_id, "28-000000000001");
        assert!((readings[2].temperature_c - 21.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_probe_does_not_affect_others() {
        let source = FakeSource::new(&[
            ("/sys/bus/w1/devices/28-000000000001/w1_slave", GOOD),
            ("/sys/bus/w1/devices/28-000000000002/w1_slave", ""),
            ("/sys/bus/w1/devices/28-000000000003/w1_slave", "aa : crc=00 NO\naa t=21500\n"),
        ]);
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = SensorPoller::new(source, tx);

        assert_eq!(poller.poll(), 3);
        drop(poller);

        let readings = drain(rx).await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].probe_id, "28-000000000001");
    }

    #[tokio::test]
    async fn test_overlapping_polls_deliver_both_readings() {
        let source = FakeSource::new(&[("/sys/bus/w1/devices/28-000000000001/w1_slave", GOOD)]);
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = SensorPoller::new(source, tx);

        poller.poll();
        poller.poll();
        drop(poller);

        let readings = drain(rx).await;
        assert_eq!(readings.len(), 2);
        assert!(readings.iter().all(|r| r.probe_id == "28-000000000001"));
    }

    #[tokio::test]
    async fn test_poll_over_sysfs_layout() {
        let dir = tempfile::tempdir().unwrap();
        for (id, millis) in [("28-0316a2797bff", "21500"), ("28-0416a2797c00", "19250")] {
            std::fs::create_dir(dir.path().join(id)).unwrap();
            let sample = format!("72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n72 01 4b 46 7f ff 0e 10 57 t={}\n", millis);
            std::fs::write(dir.path().join(id).join("w1_slave"), sample).unwrap();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = SensorPoller::new(W1Bus::new(dir.path()), tx);

        assert_eq!(poller.poll(), 2);
        drop(poller);

        let readings = drain(rx).await;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].probe_id, "28-0316a2797bff");
        assert!((readings[0].temperature_c - 21.5).abs() < 1e-9);
        assert_eq!(readings[1].probe_id, "28-0416a2797c00");
        assert!((readings[1].temperature_c - 19.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_discovery_failure_launches_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let poller = SensorPoller::new(BrokenSource, tx);
        assert_eq!(poller.poll(), 0);
    }
}
