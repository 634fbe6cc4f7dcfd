//! Sampling ticks and per-interval deltas.
//!
//! The engine owns three snapshots: `previous` (last tick), `current` (this
//! tick) and `delta` (their difference). Reads are issued sequentially in
//! device order, then catalog order.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::catalog::CounterSet;
use crate::collector::{CounterReader, DeviceReadError};

/// Per-device counter values, positionally aligned with a [`CounterSet`].
///
/// Values are `f64` because converted byte counters may be fractional and
/// deltas may be negative after a counter reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    values: HashMap<String, Vec<f64>>,
}

impl DeviceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, device: impl Into<String>, values: Vec<f64>) {
        self.values.insert(device.into(), values);
    }

    /// All column values for `device`, in counter-set order.
    pub fn device(&self, device: &str) -> Option<&[f64]> {
        self.values.get(device).map(Vec::as_slice)
    }

    /// Value of column `index` for `device`.
    pub fn get(&self, device: &str, index: usize) -> Option<f64> {
        self.values.get(device).and_then(|v| v.get(index).copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `self - previous`, with devices or columns absent from `previous`
    /// taken as zero. Negative results are kept as-is.
    pub fn diff(&self, previous: Option<&DeviceSnapshot>) -> DeviceSnapshot {
        let values = self
            .values
            .iter()
            .map(|(device, current)| {
                let prev = previous.and_then(|p| p.device(device)).unwrap_or(&[]);
                let delta = current
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v - prev.get(i).copied().unwrap_or(0.0))
                    .collect();
                (device.clone(), delta)
            })
            .collect();
        DeviceSnapshot { values }
    }
}

/// Reads snapshots through a [`CounterReader`] and keeps the delta state.
pub struct SnapshotEngine<R: CounterReader> {
    reader: R,
    devices: Vec<String>,
    counters: CounterSet,
    previous: Option<DeviceSnapshot>,
    current: DeviceSnapshot,
    delta: DeviceSnapshot,
    ticks: u64,
}

impl<R: CounterReader> SnapshotEngine<R> {
    /// # Arguments
    /// * `reader` - Counter source (sysfs, simulated, or scripted)
    /// * `devices` - Resolved monitor list
    /// * `counters` - Active counter set
    pub fn new(reader: R, devices: Vec<String>, counters: CounterSet) -> Self {
        Self {
            reader,
            devices,
            counters,
            previous: None,
            current: DeviceSnapshot::new(),
            delta: DeviceSnapshot::new(),
            ticks: 0,
        }
    }

    /// Mutable access to the reader, e.g. to reseed a simulated source.
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn counters(&self) -> &CounterSet {
        &self.counters
    }

    pub fn current(&self) -> &DeviceSnapshot {
        &self.current
    }

    pub fn previous(&self) -> Option<&DeviceSnapshot> {
        self.previous.as_ref()
    }

    pub fn delta(&self) -> &DeviceSnapshot {
        &self.delta
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reads every active counter of every device into a new current
    /// snapshot.
    ///
    /// The first failed read aborts the tick and leaves the engine state
    /// untouched.
    pub fn sample_tick(&mut self) -> Result<&DeviceSnapshot, DeviceReadError> {
        let mut snapshot = DeviceSnapshot::new();
        for device in &self.devices {
            let mut values = Vec::with_capacity(self.counters.len());
            for counter in self.counters.counters() {
                let raw = self.reader.read(device, counter)?;
                values.push(self.counters.convert(counter, raw));
            }
            snapshot.insert(device.clone(), values);
        }
        self.current = snapshot;
        Ok(&self.current)
    }

    /// Computes `current - previous` and rotates `previous := current`.
    ///
    /// Before the first rotation `previous` counts as all zeros, so the first
    /// delta equals the first snapshot.
    pub fn compute_delta(&mut self) -> &DeviceSnapshot {
        self.delta = self.current.diff(self.previous.as_ref());
        self.previous = Some(self.current.clone());
        &self.delta
    }

    /// One monitoring interval: sample, then diff.
    pub fn tick(&mut self) -> Result<(&DeviceSnapshot, &DeviceSnapshot), DeviceReadError> {
        let start = Instant::now();
        self.sample_tick()?;
        self.compute_delta();
        self.ticks += 1;
        debug!(
            tick = self.ticks,
            devices = self.devices.len(),
            counters = self.counters.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "tick complete"
        );
        Ok((&self.current, &self.delta))
    }
}
