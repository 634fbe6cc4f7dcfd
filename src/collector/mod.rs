//! Network counter collection from Linux sysfs.
//!
//! Devices are discovered under `/sys/class/net` and each counter is read
//! from `/sys/class/net/<dev>/statistics/<counter>`. All access goes through
//! the [`FileSystem`] trait so tests run against [`MockFs`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    SnapshotEngine                      │
//! │                          │                             │
//! │                  ┌───────▼────────┐                    │
//! │                  │ CounterReader  │ (trait)            │
//! │                  └───────┬────────┘                    │
//! │            ┌─────────────┴──────────────┐              │
//! │     ┌──────▼──────┐              ┌──────▼──────┐       │
//! │     │ SysfsReader │              │ RandomReader│       │
//! │     └──────┬──────┘              └─────────────┘       │
//! │            │         ┌──────────────┐                  │
//! │            │         │ DeviceSource │                  │
//! │            │         └──────┬───────┘                  │
//! │            └────────┬───────┘                          │
//! │              ┌──────▼──────┐                           │
//! │              │  FileSystem │ (trait)                   │
//! │              └──────┬──────┘                           │
//! └─────────────────────┼──────────────────────────────────┘
//!              ┌────────┴────────┐
//!       ┌──────▼──────┐   ┌──────▼──────┐
//!       │   RealFs    │   │   MockFs    │
//!       └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use linkrate::collector::{CounterReader, DeviceSource, DevicePattern, MockFs, SysfsReader};
//! use linkrate::catalog::CounterDef;
//!
//! let source = DeviceSource::new(MockFs::typical_host(), "/sys/class/net");
//! let pattern = DevicePattern::new("eth.*").unwrap();
//! let devices = source.resolve_devices("", &pattern).unwrap();
//! assert_eq!(devices, vec!["eth0", "eth1"]);
//!
//! let mut reader = SysfsReader::new(source.into_fs(), "/sys/class/net");
//! let rx = reader.read("eth0", &CounterDef::new("rx_packets", "packets")).unwrap();
//! assert!(rx > 0);
//! ```

pub mod devices;
pub mod mock;
pub mod reader;
pub mod traits;

pub use devices::{DEFAULT_DEVICE_REGEX, DevicePattern, DeviceSource};
pub use mock::MockFs;
pub use reader::{CounterReader, DeviceReadError, RANDOM_RANGE, RandomReader, SysfsReader};
pub use traits::{FileSystem, RealFs};

/// Default network devices root.
pub const DEFAULT_NET_PATH: &str = "/sys/class/net";
