//! Built-in counter table and the transforms that derive the active set.
//!
//! Columns in the rendered table are positional, so the catalog order is
//! significant: receive counters first, transmit counters second, and each
//! group ordered packets, bytes, then the error categories.

/// Traffic direction of a counter, taken from its `rx_`/`tx_` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

/// Semantic category of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Packets,
    /// Byte counter, subject to unit conversion.
    Bytes,
    /// Any error or drop category.
    Error,
}

/// One named counter: the statistics file it comes from and its column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterDef {
    /// File name under `/sys/class/net/<dev>/statistics/`.
    pub source_key: &'static str,
    /// Short name shown in the second header line.
    pub label: &'static str,
}

impl CounterDef {
    pub const fn new(source_key: &'static str, label: &'static str) -> Self {
        Self { source_key, label }
    }

    pub fn direction(&self) -> Direction {
        if self.source_key.starts_with("tx_") {
            Direction::Tx
        } else {
            Direction::Rx
        }
    }

    pub fn kind(&self) -> CounterKind {
        if self.source_key.ends_with("_bytes") {
            CounterKind::Bytes
        } else if self.source_key.ends_with("_packets") {
            CounterKind::Packets
        } else {
            CounterKind::Error
        }
    }
}

const CATALOG: [CounterDef; 13] = [
    CounterDef::new("rx_packets", "packets"),
    CounterDef::new("rx_bytes", "bytes"),
    CounterDef::new("rx_errors", "errors"),
    CounterDef::new("rx_dropped", "dropped"),
    CounterDef::new("rx_missed_errors", "missed"),
    CounterDef::new("rx_fifo_errors", "fifo"),
    CounterDef::new("rx_length_errors", "length"),
    CounterDef::new("rx_over_errors", "overrun"),
    CounterDef::new("rx_crc_errors", "crc"),
    CounterDef::new("rx_frame_errors", "frame"),
    CounterDef::new("tx_packets", "packets"),
    CounterDef::new("tx_bytes", "bytes"),
    CounterDef::new("tx_errors", "errors"),
];

/// Labels kept by the simple view.
const SIMPLE_LABELS: [&str; 3] = ["packets", "bytes", "errors"];

/// Presentation unit for byte counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitMode {
    Bits,
    Kbits,
    #[default]
    Mbits,
    Bytes,
}

impl UnitMode {
    /// Column label used in place of `"bytes"`.
    pub fn label(self) -> &'static str {
        match self {
            UnitMode::Bits => "bits",
            UnitMode::Kbits => "kbits",
            UnitMode::Mbits => "mbits",
            UnitMode::Bytes => "bytes",
        }
    }

    /// Converts a raw byte count into this unit.
    ///
    /// Only powers of two are involved, so the result is exact for any
    /// counter below 2^53.
    pub fn convert(self, bytes: u64) -> f64 {
        let v = bytes as f64;
        match self {
            UnitMode::Bytes => v,
            UnitMode::Bits => v * 8.0,
            UnitMode::Kbits => v * 8.0 / 1024.0,
            UnitMode::Mbits => v * 8.0 / 1024.0 / 1024.0,
        }
    }
}

/// Returns the 13 built-in counters in display order.
pub fn full_catalog() -> Vec<CounterDef> {
    CATALOG.to_vec()
}

/// Keeps only receive counters when `rx_only` is set.
pub fn apply_direction_filter(catalog: Vec<CounterDef>, rx_only: bool) -> Vec<CounterDef> {
    if !rx_only {
        return catalog;
    }
    catalog
        .into_iter()
        .filter(|c| c.direction() == Direction::Rx)
        .collect()
}

/// Keeps only packets/bytes/errors when `simple` is set.
pub fn apply_simple_filter(catalog: Vec<CounterDef>, simple: bool) -> Vec<CounterDef> {
    if !simple {
        return catalog;
    }
    catalog
        .into_iter()
        .filter(|c| SIMPLE_LABELS.contains(&c.label))
        .collect()
}

/// Replaces the `"bytes"` label with the unit's label. Source keys are kept.
pub fn apply_unit_relabel(catalog: Vec<CounterDef>, unit: UnitMode) -> Vec<CounterDef> {
    catalog
        .into_iter()
        .map(|c| {
            if c.label == "bytes" {
                CounterDef::new(c.source_key, unit.label())
            } else {
                c
            }
        })
        .collect()
}

/// The counters selected for a run, in catalog order, with their unit.
///
/// Built once at setup and shared read-only by the engine and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSet {
    counters: Vec<CounterDef>,
    unit: UnitMode,
}

impl CounterSet {
    pub fn new(rx_only: bool, simple: bool, unit: UnitMode) -> Self {
        let counters = apply_direction_filter(full_catalog(), rx_only);
        let counters = apply_simple_filter(counters, simple);
        let counters = apply_unit_relabel(counters, unit);
        Self { counters, unit }
    }

    pub fn counters(&self) -> &[CounterDef] {
        &self.counters
    }

    pub fn unit(&self) -> UnitMode {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn rx_count(&self) -> usize {
        self.count(Direction::Rx)
    }

    pub fn tx_count(&self) -> usize {
        self.count(Direction::Tx)
    }

    fn count(&self, direction: Direction) -> usize {
        self.counters
            .iter()
            .filter(|c| c.direction() == direction)
            .count()
    }

    /// Column index of the counter read from `source_key`.
    pub fn position(&self, source_key: &str) -> Option<usize> {
        self.counters.iter().position(|c| c.source_key == source_key)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.counters.iter().map(|c| c.label).collect()
    }

    /// Converts a raw reading for `counter` into its displayed value.
    pub fn convert(&self, counter: &CounterDef, raw: u64) -> f64 {
        match counter.kind() {
            CounterKind::Bytes => self.unit.convert(raw),
            _ => raw as f64,
        }
    }
}

impl Default for CounterSet {
    fn default() -> Self {
        Self::new(false, false, UnitMode::default())
    }
}
