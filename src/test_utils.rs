use crate::address::{DeviceId, HardwareAddress};
use crate::device::{DeviceType, DirectoryError};
use crate::envelope::AdStructure;
use crate::reading::{ReadingType, SensorReading};

/// A stable hardware address for unit tests.
pub const TEST_ADDRESS: HardwareAddress = HardwareAddress([0xAC, 0xDE, 0x48, 0x28, 0xAC, 0xED]);

/// A capture timestamp with microsecond precision.
pub const TEST_TIME: &str = "2022-08-29T14:35:36.033219+00:00";

/// Build an `AdStructure` captured from `TEST_ADDRESS` at `TEST_TIME`.
pub fn structure(ad_type: u8, payload: &str) -> AdStructure {
    AdStructure {
        timestamp: TEST_TIME.parse().unwrap(),
        address: TEST_ADDRESS,
        ad_type,
        payload: payload.to_string(),
    }
}

/// A classifier that reports the same device type for every device.
pub fn classify_as(
    device_type: DeviceType,
) -> impl Fn(&DeviceId) -> Result<DeviceType, DirectoryError> {
    move |_: &DeviceId| Ok(device_type.clone())
}

/// Build a reading from `TEST_ADDRESS` at `TEST_TIME`.
pub fn test_reading(kind: ReadingType, value: f64) -> SensorReading {
    SensorReading {
        timestamp: TEST_TIME.parse().unwrap(),
        address: TEST_ADDRESS,
        kind,
        value,
    }
}
