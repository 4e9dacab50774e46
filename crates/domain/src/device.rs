//! Devices known to a hub: zones (thermostats) and plugs.
//!
//! Zones and plugs share one record type tagged by [`DeviceKind`]. Records
//! are created and removed only by reconciliation, keyed by name.

use std::fmt;

use serde::Serialize;

use crate::identity::DeviceIdentity;
use crate::profile::DeviceProfile;
use crate::status::{DeviceLiveStatus, EngineersStatus};

/// Variant of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Thermostat grouped under a zone name.
    Zone,
    /// Switched output.
    Plug,
}

impl DeviceKind {
    /// Lowercase label used in errors, logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Plug => "plug",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zone or plug attached to a hub.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Unique name within the hub.
    pub name: String,
    pub kind: DeviceKind,
    pub identity: DeviceIdentity,
    /// Device id of the owning hub.
    pub hub_id: String,
    /// Last `GET_LIVE_DATA` entry for this device.
    pub live_status: Option<DeviceLiveStatus>,
    /// Last `GET_ENGINEERS` entry for this device.
    pub engineers: Option<EngineersStatus>,
    /// Active schedule from `GET_PROFILE_0`.
    pub profile_0: Option<DeviceProfile>,
}

impl Device {
    /// Create a device with no status attached yet.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: DeviceKind,
        identity: DeviceIdentity,
        hub_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            identity,
            hub_id: hub_id.into(),
            live_status: None,
            engineers: None,
            profile_0: None,
        }
    }
}
