//! Hardware address and SwitchBot device identifier types.
//!
//! Both types wrap the same 6-byte link-layer address. They differ only in how
//! they are written: the scanner reports `aa:bb:cc:dd:ee:ff`, while the SwitchBot
//! device directory keys devices by `AABBCCDDEEFF`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A BLE hardware address, written as lowercase colon-separated hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HardwareAddress(pub [u8; 6]);

/// A SwitchBot device identifier, written as 12 uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DeviceId(pub [u8; 6]);

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Errors returned when parsing a hardware address string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseAddressError {
    #[error("invalid hardware address '{0}': expected 6 colon-separated parts")]
    InvalidLength(String),
    #[error("invalid hardware address '{0}': part {1} is not two lowercase hex digits")]
    InvalidPart(String, usize),
}

/// Errors returned when parsing a device identifier string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseDeviceIdError {
    #[error("invalid device id '{0}': expected 12 characters")]
    InvalidLength(String),
    #[error("invalid device id '{0}': expected uppercase hex digits only")]
    InvalidDigit(String),
}

fn is_lower_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}

fn is_upper_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

impl FromStr for HardwareAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(ParseAddressError::InvalidLength(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 || !part.bytes().all(is_lower_hex) {
                return Err(ParseAddressError::InvalidPart(s.to_string(), i));
            }
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| ParseAddressError::InvalidPart(s.to_string(), i))?;
        }

        Ok(HardwareAddress(bytes))
    }
}

impl FromStr for DeviceId {
    type Err = ParseDeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 12 {
            return Err(ParseDeviceIdError::InvalidLength(s.to_string()));
        }
        if !s.bytes().all(is_upper_hex) {
            return Err(ParseDeviceIdError::InvalidDigit(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| ParseDeviceIdError::InvalidDigit(s.to_string()))?;
        Ok(DeviceId(bytes))
    }
}

impl From<[u8; 6]> for HardwareAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl From<DeviceId> for HardwareAddress {
    fn from(id: DeviceId) -> Self {
        Self(id.0)
    }
}

impl From<HardwareAddress> for DeviceId {
    fn from(addr: HardwareAddress) -> Self {
        Self(addr.0)
    }
}
