//! Output formatters for sensor readings.
//!
//! This module provides a trait for formatting readings and implementations
//! for the supported output formats: InfluxDB line protocol for Telegraf and
//! JSON rows matching the `metrics` table layout.

pub mod influxdb;
pub mod json;

use crate::reading::SensorReading;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// InfluxDB line protocol
    #[default]
    Influxdb,
    /// One JSON object per reading
    Json,
}

/// Trait for formatting readings into output lines.
pub trait OutputFormatter: Send + Sync {
    /// Format a reading.
    ///
    /// # Arguments
    /// * `reading` - The reading to format (includes timestamp)
    /// * `name` - Human-readable name of the device that sent it
    fn format(&self, reading: &SensorReading, name: &str) -> String;
}
