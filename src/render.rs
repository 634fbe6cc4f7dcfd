//! Fixed-width table rendering.
//!
//! The grid is not configurable: a 14-character left-aligned device column
//! followed by 11-character right-aligned data columns, separated by single
//! spaces.

use crate::catalog::{CounterDef, CounterSet, Direction};
use crate::engine::DeviceSnapshot;

/// Width of the device name column.
pub const DEVICE_WIDTH: usize = 14;
/// Width of every data column.
pub const COLUMN_WIDTH: usize = 11;

/// Placeholder for a device missing from the snapshot.
const MISSING: &str = "-";

fn device_cell(value: &str) -> String {
    let truncated: String = value.chars().take(DEVICE_WIDTH).collect();
    format!("{:<width$}", truncated, width = DEVICE_WIDTH)
}

fn data_cell(value: &str) -> String {
    format!("{:>width$}", value, width = COLUMN_WIDTH)
}

/// Formats a counter value.
///
/// Integral values print without a fractional part; anything else prints
/// with two decimals.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Active counters that get a column, with their snapshot positions.
fn visible(counters: &CounterSet, show_tx: bool) -> impl Iterator<Item = (usize, &CounterDef)> {
    counters
        .counters()
        .iter()
        .enumerate()
        .filter(move |(_, c)| show_tx || c.direction() == Direction::Rx)
}

/// Two header lines: direction banners, then counter labels.
pub fn render_header(counters: &CounterSet, show_tx: bool) -> String {
    let mut banners = vec![device_cell("")];
    let mut labels = vec![device_cell("")];
    for (_, counter) in visible(counters, show_tx) {
        let banner = match counter.direction() {
            Direction::Rx => "RX",
            Direction::Tx => "TX",
        };
        banners.push(data_cell(banner));
        labels.push(data_cell(counter.label));
    }
    format!("{}\n{}", banners.join(" "), labels.join(" "))
}

/// One line for `device`, one field per column of the matching header.
pub fn render_row(
    device: &str,
    snapshot: &DeviceSnapshot,
    counters: &CounterSet,
    show_tx: bool,
) -> String {
    let mut cells = Vec::with_capacity(counters.len() + 1);
    cells.push(device_cell(device));
    for (index, _) in visible(counters, show_tx) {
        let value = snapshot
            .get(device, index)
            .map(format_value)
            .unwrap_or_else(|| MISSING.to_string());
        cells.push(data_cell(&value));
    }
    cells.join(" ")
}

/// Header followed by one row per device, in monitor-list order.
///
/// `show_tx` must be the value `header` was rendered with.
pub fn render_table(
    header: &str,
    devices: &[String],
    snapshot: &DeviceSnapshot,
    counters: &CounterSet,
    show_tx: bool,
) -> String {
    let mut lines = Vec::with_capacity(devices.len() + 1);
    lines.push(header.to_string());
    for device in devices {
        lines.push(render_row(device, snapshot, counters, show_tx));
    }
    lines.join("\n")
}
