//! One refresh of the monitoring loop: tick the engine, render a frame.

use crate::catalog::CounterKind;
use crate::collector::{CounterReader, DeviceReadError};
use crate::engine::{DeviceSnapshot, SnapshotEngine};
use crate::render::{render_header, render_table};

/// Which snapshot a frame shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Cumulative counter values.
    Raw,
    /// Change since the previous tick.
    #[default]
    Delta,
}

impl DisplayMode {
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Raw => "total",
            DisplayMode::Delta => "delta",
        }
    }
}

/// An error counter that grew during the last interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHit {
    pub device: String,
    pub source_key: &'static str,
    pub value: f64,
}

/// Drives a [`SnapshotEngine`] and renders its output.
pub struct Monitor<R: CounterReader> {
    engine: SnapshotEngine<R>,
    mode: DisplayMode,
    show_tx: bool,
    header: String,
}

impl<R: CounterReader> Monitor<R> {
    pub fn new(engine: SnapshotEngine<R>, mode: DisplayMode) -> Self {
        let counters = engine.counters();
        let show_tx = counters.tx_count() > 0;
        let header = render_header(counters, show_tx);
        Self {
            engine,
            mode,
            show_tx,
            header,
        }
    }

    pub fn engine(&self) -> &SnapshotEngine<R> {
        &self.engine
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    fn shown(&self) -> &DeviceSnapshot {
        match self.mode {
            DisplayMode::Raw => self.engine.current(),
            DisplayMode::Delta => self.engine.delta(),
        }
    }

    /// Runs one tick and returns the rendered table.
    pub fn step(&mut self) -> Result<String, DeviceReadError> {
        self.engine.tick()?;
        Ok(render_table(
            &self.header,
            self.engine.devices(),
            self.shown(),
            self.engine.counters(),
            self.show_tx,
        ))
    }

    /// Error-category counters with a positive delta on the last tick.
    ///
    /// Empty until a second tick has run, since the first delta is measured
    /// against a zero baseline.
    pub fn detected_errors(&self) -> Vec<ErrorHit> {
        if self.engine.ticks() < 2 {
            return Vec::new();
        }
        let delta = self.engine.delta();
        let mut hits = Vec::new();
        for device in self.engine.devices() {
            for (index, counter) in self.engine.counters().counters().iter().enumerate() {
                if counter.kind() != CounterKind::Error {
                    continue;
                }
                if let Some(value) = delta.get(device, index)
                    && value > 0.0
                {
                    hits.push(ErrorHit {
                        device: device.clone(),
                        source_key: counter.source_key,
                        value,
                    });
                }
            }
        }
        hits
    }
}
