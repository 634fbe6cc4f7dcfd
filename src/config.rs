//! Runtime configuration and the one-time setup phase.
//!
//! `Settings` is the resolved configuration surface, filled by the CLI.
//! `Settings::setup` turns it into the device list and counter set that stay
//! fixed for the rest of the run.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::catalog::{CounterSet, UnitMode};
use crate::collector::traits::FileSystem;
use crate::collector::{DEFAULT_DEVICE_REGEX, DEFAULT_NET_PATH, DevicePattern, DeviceSource};
use crate::monitor::DisplayMode;

/// Error detected while resolving configuration, before any tick runs.
#[derive(Debug)]
pub enum ConfigError {
    /// The network devices root could not be listed.
    Enumerate {
        path: PathBuf,
        source: std::io::Error,
    },
    /// `--device-regex` does not compile.
    InvalidPattern { pattern: String, message: String },
    /// Neither the explicit list nor the pattern selected any device.
    NoDevices,
    /// Sampling interval of zero.
    InvalidInterval,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Enumerate { path, source } => {
                write!(f, "cannot list devices in {}: {}", path.display(), source)
            }
            ConfigError::InvalidPattern { pattern, message } => {
                write!(f, "invalid device regex '{}': {}", pattern, message)
            }
            ConfigError::NoDevices => write!(f, "no devices to monitor"),
            ConfigError::InvalidInterval => write!(f, "interval must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Enumerate { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolved runtime options.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Comma-separated device list; empty means "use `device_regex`".
    pub devices: String,
    pub device_regex: String,
    pub rx_only: bool,
    /// Show only packets, bytes and errors.
    pub simple: bool,
    /// Halt on read errors and on growing error counters.
    pub assert_mode: bool,
    pub unit: UnitMode,
    /// Replace sysfs reads with simulated values.
    pub random: bool,
    /// Seed for simulated values.
    pub seed: Option<u64>,
    pub display: DisplayMode,
    pub net_path: PathBuf,
    pub interval: Duration,
    /// Number of ticks to run; 0 runs until interrupted.
    pub iterations: u64,
    /// Clear the screen before each frame.
    pub clear: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            devices: String::new(),
            device_regex: DEFAULT_DEVICE_REGEX.to_string(),
            rx_only: false,
            simple: false,
            assert_mode: false,
            unit: UnitMode::default(),
            random: false,
            seed: None,
            display: DisplayMode::default(),
            net_path: PathBuf::from(DEFAULT_NET_PATH),
            interval: Duration::from_secs(1),
            iterations: 0,
            clear: true,
        }
    }
}

/// Everything fixed at setup time.
#[derive(Debug, Clone)]
pub struct Setup {
    pub devices: Vec<String>,
    pub counters: CounterSet,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn counter_set(&self) -> CounterSet {
        CounterSet::new(self.rx_only, self.simple, self.unit)
    }

    /// Resolves devices and counters once, before the first tick.
    pub fn setup<F: FileSystem>(&self, source: &DeviceSource<F>) -> Result<Setup, ConfigError> {
        self.validate()?;
        let pattern = DevicePattern::new(&self.device_regex)?;
        let devices = source.resolve_devices(&self.devices, &pattern)?;
        let counters = self.counter_set();
        debug!(
            devices = devices.len(),
            counters = counters.len(),
            unit = counters.unit().label(),
            "setup complete"
        );
        Ok(Setup { devices, counters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn source() -> DeviceSource<MockFs> {
        DeviceSource::new(MockFs::typical_host(), DEFAULT_NET_PATH)
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.unit, UnitMode::Mbits);
        assert_eq!(settings.display, DisplayMode::Delta);
        assert_eq!(settings.device_regex, "^.*$");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_setup_resolves_devices_and_counters() {
        let settings = Settings {
            device_regex: "eth[0-9]+".to_string(),
            rx_only: true,
            simple: true,
            unit: UnitMode::Bytes,
            ..Settings::default()
        };
        let setup = settings.setup(&source()).unwrap();
        assert_eq!(setup.devices, vec!["eth0", "eth1"]);
        assert_eq!(setup.counters.labels(), vec!["packets", "bytes", "errors"]);
    }

    #[test]
    fn test_setup_no_devices() {
        let settings = Settings {
            device_regex: "wlan.*".to_string(),
            ..Settings::default()
        };
        let err = settings.setup(&source()).unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices));
        assert_eq!(err.to_string(), "no devices to monitor");
    }

    #[test]
    fn test_setup_rejects_zero_interval() {
        let settings = Settings {
            interval: Duration::ZERO,
            ..Settings::default()
        };
        assert!(matches!(
            settings.setup(&source()),
            Err(ConfigError::InvalidInterval)
        ));
    }

    #[test]
    fn test_setup_invalid_regex() {
        let settings = Settings {
            device_regex: "[".to_string(),
            ..Settings::default()
        };
        let err = settings.setup(&source()).unwrap_err();
        assert!(err.to_string().starts_with("invalid device regex '['"));
    }
}
