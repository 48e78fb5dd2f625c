//! `switchbot-recorder` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit codes.
//! Decoding lives in [`crate::envelope`] and [`crate::decoder`]: both are pure
//! functions of their input plus an injected [`Classifier`]. The runner in
//! [`crate::app`] wires them to a cached [`DeviceDirectory`] and an output format,
//! and can be tested deterministically with injected input and output streams.

pub mod address;
pub mod alias;
pub mod app;
pub mod batch;
pub mod decoder;
pub mod device;
pub mod directory;
pub mod duration;
pub mod envelope;
pub mod output;
pub mod reading;
pub mod timestamp;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use address::{DeviceId, HardwareAddress};
pub use alias::{Alias, AliasMap, parse_alias, resolve_name, to_map};
pub use batch::{BatchReport, LineError, LineFailure, decode_batch, decode_line};
pub use decoder::{DecodeError, decode};
pub use device::{Classifier, DeviceType, DirectoryError};
pub use directory::{DeviceDirectory, DeviceList, DeviceSource, FileDeviceSource};
pub use envelope::{AdStructure, ExtractError, extract};
pub use output::OutputFormatter;
pub use output::influxdb::InfluxDbFormatter;
pub use output::json::JsonFormatter;
pub use reading::{ReadingType, SensorReading};
pub use timestamp::CaptureTimestamp;
