//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for exercising
//! device discovery and counter reads without a Linux `/sys` tree.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
