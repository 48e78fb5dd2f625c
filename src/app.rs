//! Core application runner (business logic) for `switchbot-recorder`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit codes
//! so it can be tested deterministically.

use crate::address::DeviceId;
use crate::alias::{Alias, AliasMap, resolve_name};
use crate::batch::decode_line;
use crate::device::DirectoryError;
use crate::directory::{DeviceDirectory, DeviceSource, FileDeviceSource};
use crate::output::influxdb::InfluxDbFormatter;
use crate::output::json::JsonFormatter;
use crate::output::{Format, OutputFormatter};
use clap::Parser;
use log::{debug, info};
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Saved SwitchBot device list (the response of GET /v1.1/devices).
    #[arg(long, value_name = "PATH")]
    pub devices: PathBuf,

    /// Scanner capture file with one JSON message per line. Reads stdin when omitted.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value_t, value_enum)]
    pub format: Format,

    /// The name of the measurement in InfluxDB line protocol.
    #[arg(long, default_value = "switchbot")]
    pub influxdb_measurement: String,

    /// Specify human-readable alias for a device, overriding its directory name.
    /// Format: --alias ac:de:48:28:ac:ed=Desk
    #[arg(long = "alias", value_parser = crate::alias::parse_alias, value_name = "ALIAS")]
    pub aliases: Vec<Alias>,

    /// Reload the device list when it is older than this.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, value_parser = crate::duration::parse_duration)]
    pub directory_max_age: Option<Duration>,

    /// Minimum time between device list reloads caused by unknown devices.
    /// Same duration format as --directory-max-age. Defaults to 1m.
    #[arg(long, value_parser = crate::duration::parse_duration)]
    pub directory_miss_refresh: Option<Duration>,

    /// Verbose output, print errors for lines that cannot be decoded
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Counts of what a run processed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-empty input lines
    pub lines: usize,
    pub readings: usize,
    /// Lines that could not be decoded
    pub failures: usize,
}

fn formatter_for(options: &Options) -> Box<dyn OutputFormatter> {
    match options.format {
        Format::Influxdb => Box::new(InfluxDbFormatter::new(
            options.influxdb_measurement.clone(),
        )),
        Format::Json => Box::new(JsonFormatter),
    }
}

/// Run the core processing loop, writing formatted output to `out` and verbose errors to `err`.
///
/// - The device list is loaded from `source` before any input is read; failing that is fatal.
/// - Each non-empty input line is decoded on its own. Readings are formatted and written to `out`.
/// - Lines that fail to decode are counted and written to `err` only when `options.verbose` is true.
pub async fn run_with_io<S, R>(
    options: Options,
    source: S,
    input: R,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RunSummary, RunError>
where
    S: DeviceSource,
    R: AsyncBufRead + Unpin,
{
    let aliases: AliasMap = crate::alias::to_map(&options.aliases);
    let formatter = formatter_for(&options);

    let mut directory = DeviceDirectory::new(source);
    if let Some(max_age) = options.directory_max_age {
        directory = directory.with_max_age(max_age);
    }
    if let Some(interval) = options.directory_miss_refresh {
        directory = directory.with_miss_refresh_interval(interval);
    }
    directory.ensure(false).await?;

    let mut summary = RunSummary::default();
    let mut lines = input.lines();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        directory.ensure(false).await?;

        match decode_line(&line, &directory) {
            Ok(readings) => {
                for reading in &readings {
                    let directory_name = directory.device_name(&DeviceId::from(reading.address));
                    let name = resolve_name(&reading.address, &aliases, directory_name);
                    writeln!(out, "{}", formatter.format(reading, &name))?;
                }
                summary.readings += readings.len();
            }
            Err(line_err) => {
                summary.failures += 1;
                debug!("line {line_number}: {line_err}");
                if options.verbose {
                    writeln!(err, "line {line_number}: {line_err}")?;
                }
            }
        }
    }

    if summary.readings == 0 {
        info!("no sensor data in {} lines", summary.lines);
    } else {
        info!(
            "recorded {} readings from {} lines ({} failed)",
            summary.readings, summary.lines, summary.failures
        );
    }

    Ok(summary)
}

/// Run with the device list and input named in `options`, writing to stdout and stderr.
pub async fn run(options: Options) -> Result<RunSummary, RunError> {
    let source = FileDeviceSource::new(&options.devices);

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &options.input {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut out = io::stdout();
    let mut err = io::stderr();
    run_with_io(options, source, input, &mut out, &mut err).await
}
