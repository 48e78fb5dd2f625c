//! Cached SwitchBot device directory.
//!
//! The directory maps device identifiers to device types and names. It is
//! filled from a [`DeviceSource`] and implements [`Classifier`] on top of the
//! cached list, so the decoder never waits on the source itself. Callers decide
//! when to refresh with [`DeviceDirectory::ensure`].

use crate::address::DeviceId;
use crate::device::{Classifier, DeviceType, DirectoryError};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// `statusCode` of a successful SwitchBot API response.
pub const API_STATUS_OK: i64 = 100;

/// Default minimum time between refreshes caused by unknown devices.
pub const DEFAULT_MISS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// A device registered to the SwitchBot account.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub device_type: DeviceType,
}

/// The devices known to the directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevicesResponse {
    status_code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    body: DevicesBody,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DevicesBody {
    #[serde(default)]
    device_list: Vec<RawDevice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDevice {
    device_id: String,
    #[serde(default)]
    device_name: String,
    #[serde(default)]
    device_type: String,
}

impl DeviceList {
    /// Parse the body of a SwitchBot `GET /v1.1/devices` response.
    ///
    /// Entries whose `deviceId` is not a valid device identifier are skipped.
    /// Infrared remotes are not part of `deviceList` and are ignored.
    pub fn from_api_response(json: &str) -> Result<Self, DirectoryError> {
        let response: DevicesResponse = serde_json::from_str(json)
            .map_err(|e| DirectoryError::Unavailable(format!("invalid device list: {e}")))?;

        if response.status_code != API_STATUS_OK {
            return Err(DirectoryError::Unavailable(format!(
                "device list status code {} ({})",
                response.status_code, response.message
            )));
        }

        let devices = response
            .body
            .device_list
            .into_iter()
            .filter_map(|raw| match raw.device_id.parse::<DeviceId>() {
                Ok(id) => Some(Device {
                    id,
                    name: raw.device_name,
                    device_type: DeviceType::from_label(&raw.device_type),
                }),
                Err(e) => {
                    warn!("skipping device '{}': {e}", raw.device_name);
                    None
                }
            })
            .collect();

        Ok(DeviceList { devices })
    }
}

/// Where the directory gets its device list from.
pub trait DeviceSource: Send + Sync {
    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceList, DirectoryError>> + Send + '_>>;
}

/// Reads a saved SwitchBot device list response from disk.
#[derive(Debug, Clone)]
pub struct FileDeviceSource {
    path: PathBuf,
}

impl FileDeviceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DeviceSource for FileDeviceSource {
    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceList, DirectoryError>> + Send + '_>> {
        Box::pin(async move {
            let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                DirectoryError::Unavailable(format!("{}: {e}", self.path.display()))
            })?;
            DeviceList::from_api_response(&json)
        })
    }
}

struct Cache {
    devices: HashMap<DeviceId, Device>,
    fetched_at: Instant,
}

/// Device directory with a refreshable in-memory cache.
pub struct DeviceDirectory<S> {
    source: S,
    max_age: Option<Duration>,
    miss_refresh_interval: Duration,
    cache: Option<Cache>,
    /// Set by `classify` when an id is not in the cached list.
    missed: AtomicBool,
}

impl<S: DeviceSource> DeviceDirectory<S> {
    /// Create an empty directory. Nothing is fetched until [`Self::ensure`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_age: None,
            miss_refresh_interval: DEFAULT_MISS_REFRESH_INTERVAL,
            cache: None,
            missed: AtomicBool::new(false),
        }
    }

    /// Refetch the device list once it is older than `max_age`.
    ///
    /// Without a max age the list is fetched once and kept until a forced refresh.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Minimum time between refreshes triggered by lookups of unknown devices.
    ///
    /// A device registered after the list was loaded is picked up by the first
    /// [`Self::ensure`] after a miss, once this long has passed since the last
    /// fetch. Advertisements from other people's devices miss too, so this
    /// bounds how often they can cause a fetch.
    pub fn with_miss_refresh_interval(mut self, interval: Duration) -> Self {
        self.miss_refresh_interval = interval;
        self
    }

    fn needs_fetch(&self, force: bool) -> bool {
        match &self.cache {
            None => true,
            Some(cache) => {
                let age = cache.fetched_at.elapsed();
                force
                    || self.max_age.is_some_and(|max_age| age >= max_age)
                    || (self.missed.load(Ordering::Relaxed)
                        && age >= self.miss_refresh_interval)
            }
        }
    }

    /// Make sure the device list is loaded.
    ///
    /// Fetches when `force` is set, when nothing is cached yet, when the
    /// cached list is older than the max age, or when a lookup missed and the
    /// miss refresh interval has passed. If a refresh fails while a list is
    /// cached, the old list stays in use and the fetch time is reset.
    ///
    /// # Errors
    /// Returns the source error when no list has been loaded yet.
    pub async fn ensure(&mut self, force: bool) -> Result<(), DirectoryError> {
        if !self.needs_fetch(force) {
            return Ok(());
        }

        if self.missed.swap(false, Ordering::Relaxed) {
            debug!("refreshing device directory after a lookup miss");
        }

        match self.source.fetch().await {
            Ok(list) => {
                info!(
                    "loaded {} devices into the device directory",
                    list.devices.len()
                );
                let devices = list.devices.into_iter().map(|d| (d.id, d)).collect();
                self.cache = Some(Cache {
                    devices,
                    fetched_at: Instant::now(),
                });
                Ok(())
            }
            Err(e) => match &mut self.cache {
                Some(cache) => {
                    warn!("device directory refresh failed, keeping cached list: {e}");
                    cache.fetched_at = Instant::now();
                    Ok(())
                }
                None => Err(e),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }
}

impl<S> DeviceDirectory<S> {
    fn device(&self, id: &DeviceId) -> Result<Option<&Device>, DirectoryError> {
        let cache = self.cache.as_ref().ok_or(DirectoryError::NotLoaded)?;
        Ok(cache.devices.get(id))
    }

    /// Display name of a registered device.
    pub fn device_name(&self, id: &DeviceId) -> Option<&str> {
        self.device(id).ok().flatten().map(|d| d.name.as_str())
    }
}

impl<S> Classifier for DeviceDirectory<S> {
    fn classify(&self, id: &DeviceId) -> Result<DeviceType, DirectoryError> {
        match self.device(id)? {
            Some(device) => Ok(device.device_type.clone()),
            None => {
                self.missed.store(true, Ordering::Relaxed);
                Ok(DeviceType::NotMyDevice)
            }
        }
    }
}
