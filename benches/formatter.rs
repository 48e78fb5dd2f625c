//! Benchmark suite for the output formatters.
//!
//! Isolates formatter performance from async runtime overhead to enable
//! precise measurement and optimization of the formatting logic.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use switchbot_recorder::{
    AliasMap, HardwareAddress, InfluxDbFormatter, JsonFormatter, OutputFormatter, ReadingType,
    SensorReading, resolve_name,
};

const TEST_ADDRESS: HardwareAddress = HardwareAddress([0xAC, 0xDE, 0x48, 0x28, 0xAC, 0xED]);

fn reading(kind: ReadingType, value: f64, time: &str) -> SensorReading {
    SensorReading {
        timestamp: time.parse().unwrap(),
        address: TEST_ADDRESS,
        kind,
        value,
    }
}

/// Benchmark both formatters on a reading with and without fractional seconds
fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_reading");
    let influxdb = InfluxDbFormatter::new("switchbot".to_string());
    let name = "Living room";

    group.throughput(Throughput::Elements(1));

    let micros = reading(
        ReadingType::Temperature,
        -27.5,
        "2022-08-29T14:35:36.033219+00:00",
    );
    let seconds = reading(ReadingType::Load, 269.3, "2023-09-30T13:05:48+00:00");

    group.bench_function("influxdb_micros", |b| {
        b.iter(|| black_box(influxdb.format(black_box(&micros), black_box(name))))
    });
    group.bench_function("influxdb_seconds", |b| {
        b.iter(|| black_box(influxdb.format(black_box(&seconds), black_box(name))))
    });
    group.bench_function("json", |b| {
        b.iter(|| black_box(JsonFormatter.format(black_box(&micros), black_box(name))))
    });

    group.finish();
}

/// Benchmark name resolution
fn bench_name_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_resolution");

    group.throughput(Throughput::Elements(1));

    // No alias and no directory name - falls back to the address
    let empty_aliases = AliasMap::new();
    group.bench_function("address_fallback", |b| {
        b.iter(|| black_box(resolve_name(black_box(&TEST_ADDRESS), &empty_aliases, None)))
    });

    group.bench_function("directory_name", |b| {
        b.iter(|| {
            black_box(resolve_name(
                black_box(&TEST_ADDRESS),
                &empty_aliases,
                Some("Desk"),
            ))
        })
    });

    // Many aliases, none for this address
    let many_aliases: AliasMap = (0..100u8)
        .map(|i| (HardwareAddress([0, 0, 0, 0, 0, i]), format!("Device_{i}")))
        .collect();
    group.bench_function("miss_in_100", |b| {
        b.iter(|| black_box(resolve_name(black_box(&TEST_ADDRESS), &many_aliases, None)))
    });

    group.finish();
}

criterion_group!(benches, bench_format, bench_name_resolution);
criterion_main!(benches);
