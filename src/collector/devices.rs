//! Network device discovery.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::collector::traits::FileSystem;
use crate::config::ConfigError;

/// Pattern matching everything, used when no `--device-regex` is given.
pub const DEFAULT_DEVICE_REGEX: &str = "^.*$";

/// Device name filter that must match the whole name.
#[derive(Debug, Clone)]
pub struct DevicePattern {
    source: String,
    regex: Regex,
}

impl DevicePattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Enumerates interfaces under the network devices root.
pub struct DeviceSource<F: FileSystem> {
    fs: F,
    net_root: PathBuf,
}

impl<F: FileSystem> DeviceSource<F> {
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

    /// Returns the underlying filesystem, for building a reader over the
    /// same tree.
    pub fn into_fs(self) -> F {
        self.fs
    }

    /// Lists every interface name.
    ///
    /// Names are sorted, since `read_dir` order is unspecified on real
    /// filesystems. Callers that filter this list see the sorted order.
    pub fn list_all_devices(&self) -> Result<Vec<String>, ConfigError> {
        let entries = self
            .fs
            .read_dir(&self.net_root)
            .map_err(|source| ConfigError::Enumerate {
                path: self.net_root.clone(),
                source,
            })?;

        let mut names: Vec<String> = entries
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Lists interfaces whose full name matches `pattern`.
    pub fn list_matching_devices(
        &self,
        pattern: &DevicePattern,
    ) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .list_all_devices()?
            .into_iter()
            .filter(|name| pattern.is_match(name))
            .collect())
    }

    /// Resolves the monitor list from an explicit comma list or the pattern.
    ///
    /// Explicit names are taken as given, without checking they exist; a
    /// missing device surfaces as a read error on the first tick. Whitespace
    /// around each name is trimmed and empty entries are dropped, so
    /// `"eth0,,eth1"` yields `["eth0", "eth1"]`.
    pub fn resolve_devices(
        &self,
        explicit: &str,
        pattern: &DevicePattern,
    ) -> Result<Vec<String>, ConfigError> {
        let devices: Vec<String> = if explicit.trim().is_empty() {
            self.list_matching_devices(pattern)?
        } else {
            explicit
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        };

        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        debug!(?devices, pattern = pattern.as_str(), "resolved devices");
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DEFAULT_NET_PATH;
    use crate::collector::mock::MockFs;

    fn source() -> DeviceSource<MockFs> {
        DeviceSource::new(MockFs::typical_host(), DEFAULT_NET_PATH)
    }

    #[test]
    fn test_list_all_devices() {
        assert_eq!(source().list_all_devices().unwrap(), vec!["eth0", "eth1", "lo"]);
    }

    #[test]
    fn test_list_all_devices_missing_root() {
        let source = DeviceSource::new(MockFs::new(), DEFAULT_NET_PATH);
        assert_eq!(source.net_root(), Path::new(DEFAULT_NET_PATH));
        assert!(matches!(
            source.list_all_devices(),
            Err(ConfigError::Enumerate { .. })
        ));
    }

    #[test]
    fn test_resolve_by_pattern() {
        let pattern = DevicePattern::new("^eth.*$").unwrap();
        assert_eq!(
            source().resolve_devices("", &pattern).unwrap(),
            vec!["eth0", "eth1"]
        );
    }

    #[test]
    fn test_pattern_is_full_match() {
        let pattern = DevicePattern::new("eth").unwrap();
        assert!(!pattern.is_match("eth0"));
        assert!(pattern.is_match("eth"));

        let pattern = DevicePattern::new("eth[0-9]|lo").unwrap();
        assert!(pattern.is_match("lo"));
        assert!(pattern.is_match("eth1"));
        assert!(!pattern.is_match("veth1"));
    }

    #[test]
    fn test_default_regex_matches_all() {
        let devices = source()
            .resolve_devices("", &DevicePattern::new(DEFAULT_DEVICE_REGEX).unwrap())
            .unwrap();
        assert_eq!(devices.len(), 3);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = DevicePattern::new("eth(").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_resolve_explicit_list_verbatim() {
        let devices = source()
            .resolve_devices("wlan0, eth1,", &DevicePattern::new("lo").unwrap())
            .unwrap();
        assert_eq!(devices, vec!["wlan0", "eth1"]);
    }

    #[test]
    fn test_resolve_explicit_list_drops_empty_entries() {
        let pattern = DevicePattern::new(DEFAULT_DEVICE_REGEX).unwrap();
        let devices = source().resolve_devices("eth0,,eth1", &pattern).unwrap();
        assert_eq!(devices, vec!["eth0", "eth1"]);

        let err = source().resolve_devices(" , ,", &pattern).unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices));
    }

    #[test]
    fn test_resolve_empty_is_config_error() {
        let pattern = DevicePattern::new("^bond.*$").unwrap();
        let err = source().resolve_devices("", &pattern).unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices));
    }
}
