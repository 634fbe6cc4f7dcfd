//! Counter readers: where a tick gets its raw numbers from.
//!
//! The engine only sees [`CounterReader`]. [`SysfsReader`] reads the kernel's
//! statistics files; [`RandomReader`] produces simulated values so the whole
//! pipeline runs without hardware or privileges.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::catalog::CounterDef;
use crate::collector::traits::FileSystem;

/// Inclusive range of values produced by [`RandomReader`].
pub const RANDOM_RANGE: std::ops::RangeInclusive<u64> = 1..=10_000;

/// Error reading a single counter during a tick.
#[derive(Debug)]
pub enum DeviceReadError {
    /// Device directory vanished after discovery.
    DeviceGone { device: String },
    /// Counter file missing or unreadable.
    Io {
        device: String,
        counter: &'static str,
        source: std::io::Error,
    },
    /// Counter file content is not an unsigned integer.
    Parse {
        device: String,
        counter: &'static str,
        content: String,
    },
}

impl DeviceReadError {
    pub fn device(&self) -> &str {
        match self {
            DeviceReadError::DeviceGone { device }
            | DeviceReadError::Io { device, .. }
            | DeviceReadError::Parse { device, .. } => device,
        }
    }
}

impl std::fmt::Display for DeviceReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceReadError::DeviceGone { device } => write!(f, "device {} disappeared", device),
            DeviceReadError::Io {
                device,
                counter,
                source,
            } => write!(f, "cannot read {}/{}: {}", device, counter, source),
            DeviceReadError::Parse {
                device,
                counter,
                content,
            } => write!(f, "invalid value in {}/{}: {:?}", device, counter, content),
        }
    }
}

impl std::error::Error for DeviceReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceReadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Source of raw counter values.
pub trait CounterReader {
    /// Reads the current raw value of `counter` on `device`.
    fn read(&mut self, device: &str, counter: &CounterDef) -> Result<u64, DeviceReadError>;
}

impl<R: CounterReader + ?Sized> CounterReader for Box<R> {
    fn read(&mut self, device: &str, counter: &CounterDef) -> Result<u64, DeviceReadError> {
        (**self).read(device, counter)
    }
}

/// Reads `<net_root>/<device>/statistics/<source_key>`.
pub struct SysfsReader<F: FileSystem> {
    fs: F,
    net_root: PathBuf,
}

impl<F: FileSystem> SysfsReader<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `net_root` - Network devices root (usually "/sys/class/net")
    pub fn new(fs: F, net_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            net_root: net_root.into(),
        }
    }

    pub fn net_root(&self) -> &Path {
        &self.net_root
    }
}

impl<F: FileSystem> CounterReader for SysfsReader<F> {
    fn read(&mut self, device: &str, counter: &CounterDef) -> Result<u64, DeviceReadError> {
        let device_dir = self.net_root.join(device);
        let path = device_dir.join("statistics").join(counter.source_key);

        let content = self.fs.read_to_string(&path).map_err(|source| {
            if self.fs.exists(&device_dir) {
                DeviceReadError::Io {
                    device: device.to_string(),
                    counter: counter.source_key,
                    source,
                }
            } else {
                DeviceReadError::DeviceGone {
                    device: device.to_string(),
                }
            }
        })?;

        let value = content
            .trim()
            .parse::<u64>()
            .map_err(|_| DeviceReadError::Parse {
                device: device.to_string(),
                counter: counter.source_key,
                content: content.trim().to_string(),
            })?;
        trace!(device, counter = counter.source_key, value, "read counter");
        Ok(value)
    }
}

/// Simulated reader returning uniform values in [`RANDOM_RANGE`].
pub struct RandomReader {
    rng: StdRng,
}

impl RandomReader {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterReader for RandomReader {
    fn read(&mut self, _device: &str, _counter: &CounterDef) -> Result<u64, DeviceReadError> {
        Ok(self.rng.random_range(RANDOM_RANGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DEFAULT_NET_PATH;
    use crate::collector::mock::MockFs;
    use crate::collector::traits::RealFs;

    const RX_BYTES: CounterDef = CounterDef::new("rx_bytes", "bytes");

    #[test]
    fn test_sysfs_reader_reads_trimmed_value() {
        let mut fs = MockFs::new();
        fs.add_device(DEFAULT_NET_PATH, "eth0", &[("rx_bytes", 1_048_576)]);

        let mut reader = SysfsReader::new(fs, DEFAULT_NET_PATH);
        assert_eq!(reader.read("eth0", &RX_BYTES).unwrap(), 1_048_576);
    }

    #[test]
    fn test_sysfs_reader_device_gone() {
        let mut fs = MockFs::typical_host();
        fs.remove_device(DEFAULT_NET_PATH, "eth1");

        let mut reader = SysfsReader::new(fs, DEFAULT_NET_PATH);
        let err = reader.read("eth1", &RX_BYTES).unwrap_err();
        assert!(matches!(err, DeviceReadError::DeviceGone { .. }));
        assert_eq!(err.device(), "eth1");
        assert_eq!(err.to_string(), "device eth1 disappeared");
    }

    #[test]
    fn test_sysfs_reader_missing_counter() {
        let mut fs = MockFs::new();
        fs.add_device(DEFAULT_NET_PATH, "eth0", &[("rx_packets", 1)]);

        let mut reader = SysfsReader::new(fs, DEFAULT_NET_PATH);
        let err = reader.read("eth0", &RX_BYTES).unwrap_err();
        assert!(matches!(
            err,
            DeviceReadError::Io {
                counter: "rx_bytes",
                ..
            }
        ));
    }

    #[test]
    fn test_sysfs_reader_parse_error() {
        let mut reader = SysfsReader::new(MockFs::corrupt_counter_host(), DEFAULT_NET_PATH);
        let err = reader.read("eth0", &RX_BYTES).unwrap_err();
        match err {
            DeviceReadError::Parse { content, .. } => assert_eq!(content, "not-a-number"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_sysfs_reader_real_fs() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("eth0").join("statistics");
        std::fs::create_dir_all(&stats).unwrap();
        std::fs::write(stats.join("rx_bytes"), "  777\n").unwrap();

        let mut reader = SysfsReader::new(RealFs::new(), dir.path());
        assert_eq!(reader.net_root(), dir.path());
        assert_eq!(reader.read("eth0", &RX_BYTES).unwrap(), 777);
    }

    #[test]
    fn test_random_reader_range() {
        let mut reader = RandomReader::new();
        for _ in 0..1000 {
            let v = reader.read("eth0", &RX_BYTES).unwrap();
            assert!(RANDOM_RANGE.contains(&v));
        }
    }

    #[test]
    fn test_random_reader_seeded_is_reproducible() {
        let mut a = RandomReader::with_seed(7);
        let mut b = RandomReader::with_seed(7);
        let xs: Vec<u64> = (0..16).map(|_| a.read("x", &RX_BYTES).unwrap()).collect();
        let ys: Vec<u64> = (0..16).map(|_| b.read("x", &RX_BYTES).unwrap()).collect();
        assert_eq!(xs, ys);
    }
}
