//! linkrate - per-interface network counter monitor library.
//!
//! Provides:
//! - `catalog` — built-in counter table, filters, unit conversion
//! - `collector` — device discovery and counter readers over sysfs
//! - `engine` — sampling ticks and per-interval deltas
//! - `render` — fixed-width table formatting
//! - `monitor` — tick + render composition used by the `linkrate` binary
//! - `config` — runtime settings and the setup phase

pub mod catalog;
pub mod collector;
pub mod config;
pub mod engine;
pub mod monitor;
pub mod render;
