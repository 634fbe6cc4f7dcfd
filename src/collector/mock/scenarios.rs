//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/sys/class/net` states.

use super::filesystem::MockFs;
use crate::collector::DEFAULT_NET_PATH;

/// Every counter the catalog knows, with plausible values for a busy NIC.
const BUSY_NIC: [(&str, u64); 13] = [
    ("rx_packets", 8_123_456),
    ("rx_bytes", 10_737_418_240),
    ("rx_errors", 3),
    ("rx_dropped", 12),
    ("rx_missed_errors", 0),
    ("rx_fifo_errors", 0),
    ("rx_length_errors", 1),
    ("rx_over_errors", 0),
    ("rx_crc_errors", 2),
    ("rx_frame_errors", 0),
    ("tx_packets", 6_543_210),
    ("tx_bytes", 5_368_709_120),
    ("tx_errors", 0),
];

impl MockFs {
    /// Creates a host with two ethernet ports and loopback.
    ///
    /// Devices: `eth0`, `eth1`, `lo` under `/sys/class/net`.
    pub fn typical_host() -> Self {
        let mut fs = Self::new();
        fs.add_device(DEFAULT_NET_PATH, "eth0", &BUSY_NIC);
        fs.add_device(DEFAULT_NET_PATH, "eth1", &BUSY_NIC);

        let idle: Vec<(&str, u64)> = BUSY_NIC.iter().map(|(key, _)| (*key, 0)).collect();
        fs.add_device(DEFAULT_NET_PATH, "lo", &idle);
        fs
    }

    /// Creates a typical host whose `eth0` has a non-numeric `rx_bytes` file.
    pub fn corrupt_counter_host() -> Self {
        let mut fs = Self::typical_host();
        fs.add_file(
            format!("{}/eth0/statistics/rx_bytes", DEFAULT_NET_PATH),
            "not-a-number\n",
        );
        fs
    }
}
