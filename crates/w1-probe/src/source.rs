//! Probe Sources

use crate::PROBE_ID_SEGMENT;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Name of the sample file the kernel exposes per 1-Wire slave
const SLAVE_FILE: &str = "w1_slave";

/// Where probe samples come from
///
/// Reads may block (a 1-Wire conversion takes up to 750ms), so the poller
/// always calls `read_raw` off the scheduler thread.
pub trait ProbeSource: Send + Sync + 'static {
    /// Enumerate the sample paths currently present
    fn discover(&self) -> io::Result<Vec<String>>;

    /// Read the raw sample text at `path`
    fn read_raw(&self, path: &str) -> io::Result<String>;

    /// Slash-segment of a discovered path that holds the probe id
    fn id_segment(&self) -> usize {
        PROBE_ID_SEGMENT
    }
}

/// Kernel 1-Wire bus exposed under sysfs
#[derive(Debug, Clone)]
pub struct W1Bus {
    devices_dir: PathBuf,
}

impl W1Bus {
    /// Default sysfs location of 1-Wire slaves
    pub const DEFAULT_DEVICES_DIR: &'static str = "/sys/bus/w1/devices";

    /// Create a source rooted at the given devices directory
    pub fn new(devices_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices_dir: devices_dir.into(),
        }
    }
}

impl Default for W1Bus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEVICES_DIR)
    }
}

impl ProbeSource for W1Bus {
    fn discover(&self) -> io::Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.devices_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("1-Wire devices dir {:?} not present", self.devices_dir);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let slave = entry?.path().join(SLAVE_FILE);
            if slave.is_file() {
                paths.push(slave.to_string_lossy().into_owned());
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn read_raw(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// The segment right after the devices dir, wherever that dir lives
    fn id_segment(&self) -> usize {
        let dir = self.devices_dir.to_string_lossy();
        // `join` adds no separator after a single trailing slash
        let dir = dir.strip_suffix('/').unwrap_or(&*dir);
        dir.split('/').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_lists_slave_files() {
        let dir = tempfile::tempdir().unwrap();
        for id in ["28-0000000000b2", "28-0000000000a1"] {
            fs::create_dir(dir.path().join(id)).unwrap();
            fs::write(dir.path().join(id).join(SLAVE_FILE), "").unwrap();
        }
        // Bus master entries have no sample file
        fs::create_dir(dir.path().join("w1_bus_master1")).unwrap();

        let bus = W1Bus::new(dir.path());
        let paths = bus.discover().unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("28-0000000000a1/w1_slave"));
        assert!(paths[1].ends_with("28-0000000000b2/w1_slave"));
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let bus = W1Bus::new("/nonexistent/w1/devices");
        assert!(bus.discover().unwrap().is_empty());
    }

    #[test]
    fn test_id_segment_follows_devices_dir() {
        assert_eq!(W1Bus::default().id_segment(), PROBE_ID_SEGMENT);
        assert_eq!(W1Bus::new("/sys/bus/w1/devices/").id_segment(), PROBE_ID_SEGMENT);
        assert_eq!(W1Bus::new("/srv/w1").id_segment(), 3);
        assert_eq!(W1Bus::new("devices").id_segment(), 1);
    }

    #[test]
    fn test_discovered_path_carries_id_at_segment() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("28-0316a2797bff")).unwrap();
        fs::write(dir.path().join("28-0316a2797bff").join(SLAVE_FILE), "").unwrap();

        let bus = W1Bus::new(dir.path());
        let paths = bus.discover().unwrap();
        let id = paths[0].split('/').nth(bus.id_segment());
        assert_eq!(id, Some("28-0316a2797bff"));
    }

    #[test]
    fn test_read_raw() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(SLAVE_FILE);
        fs::write(&file, "abc YES\nt=21000\n").unwrap();

        let bus = W1Bus::default();
        let content = bus.read_raw(file.to_str().unwrap()).unwrap();
        assert_eq!(content, "abc YES\nt=21000\n");
    }
}
