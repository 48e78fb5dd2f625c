//! SwitchBot device types and the classifier seam used by the decoder.

use crate::address::DeviceId;
use std::fmt;
use thiserror::Error;

/// Device type of an advertisement's sender, as labelled by the SwitchBot
/// device directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Thermo-hygrometer
    Meter,
    /// Thermo-hygrometer with a CO2 sensor
    MeterProCo2,
    /// Indoor/outdoor thermo-hygrometer
    WoIoSensor,
    PlugMiniUs,
    PlugMiniJp,
    MotionSensor,
    CeilingLight,
    HubMini,
    /// The address is not registered in the directory
    NotMyDevice,
    /// A directory label this crate does not know about
    Unrecognized(String),
}

impl DeviceType {
    /// Map a directory `deviceType` label to a device type.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Meter" => DeviceType::Meter,
            "MeterPro(CO2)" => DeviceType::MeterProCo2,
            "WoIOSensor" => DeviceType::WoIoSensor,
            "Plug Mini (US)" => DeviceType::PlugMiniUs,
            "Plug Mini (JP)" => DeviceType::PlugMiniJp,
            "Motion Sensor" => DeviceType::MotionSensor,
            "Ceiling Light" => DeviceType::CeilingLight,
            "Hub Mini" => DeviceType::HubMini,
            other => DeviceType::Unrecognized(other.to_string()),
        }
    }

    /// The directory label for this device type.
    pub fn label(&self) -> &str {
        match self {
            DeviceType::Meter => "Meter",
            DeviceType::MeterProCo2 => "MeterPro(CO2)",
            DeviceType::WoIoSensor => "WoIOSensor",
            DeviceType::PlugMiniUs => "Plug Mini (US)",
            DeviceType::PlugMiniJp => "Plug Mini (JP)",
            DeviceType::MotionSensor => "Motion Sensor",
            DeviceType::CeilingLight => "Ceiling Light",
            DeviceType::HubMini => "Hub Mini",
            DeviceType::NotMyDevice => "_NotMyOwnDevice",
            DeviceType::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised while resolving a device type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// The directory was queried before it was ever filled
    #[error("device directory unavailable: not loaded")]
    NotLoaded,
    /// The backing device list could not be fetched
    #[error("device directory unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the device type of a device identifier.
///
/// Implementations own any caching or refresh policy; the decoder calls
/// [`Classifier::classify`] once per advertisement structure and propagates
/// errors unchanged.
pub trait Classifier {
    fn classify(&self, id: &DeviceId) -> Result<DeviceType, DirectoryError>;
}

impl<F> Classifier for F
where
    F: Fn(&DeviceId) -> Result<DeviceType, DirectoryError>,
{
    fn classify(&self, id: &DeviceId) -> Result<DeviceType, DirectoryError> {
        self(id)
    }
}
