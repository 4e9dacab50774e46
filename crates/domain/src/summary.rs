//! Read-only projections for front ends (CLI tables, `/api/hub`).

use serde::Serialize;

use crate::device::{Device, DeviceKind};
use crate::profile::{NamedProfile, Profile, ScheduleLength};
use crate::state::HubState;

/// Hub overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubSummary {
    pub device_id: String,
    pub address: String,
    pub hub_type: Option<i64>,
    pub hub_version: Option<i64>,
    pub ntp: Option<String>,
    pub away: Option<bool>,
    pub holiday: Option<bool>,
    pub time: Option<i64>,
    pub zones: usize,
    pub plugs: usize,
    pub profiles: usize,
}

impl From<&HubState> for HubSummary {
    fn from(state: &HubState) -> Self {
        Self {
            device_id: state.identity.device_id.clone(),
            address: state.identity.address.clone(),
            hub_type: state.system_config.hub_type,
            hub_version: state.system_config.hub_version,
            ntp: state.system_config.ntp_on.clone(),
            away: state.live_status.hub_away,
            holiday: state.live_status.hub_holiday,
            time: state.live_status.hub_time,
            zones: state.zones.len(),
            plugs: state.plugs.len(),
            profiles: state.profiles.len(),
        }
    }
}

/// One-line view of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary {
    pub name: String,
    pub kind: DeviceKind,
    pub set_temp: Option<String>,
    pub current_temp: Option<String>,
    pub active_profile: Option<i64>,
    pub heat_on: Option<bool>,
    pub timer_on: Option<bool>,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        let live = device.live_status.as_ref();
        Self {
            name: device.name.clone(),
            kind: device.kind,
            set_temp: live.and_then(|l| l.set_temp.clone()),
            current_temp: live.and_then(|l| l.actual_temp.clone()),
            active_profile: live.and_then(|l| l.active_profile),
            heat_on: live.and_then(|l| l.heat_on),
            timer_on: live.and_then(|l| l.timer_on),
        }
    }
}

/// Full view of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDetail {
    pub name: String,
    pub kind: DeviceKind,
    pub device_id: Option<i64>,
    pub set_temp: Option<String>,
    pub current_temp: Option<String>,
    pub active_profile: Option<i64>,
    pub heat_on: Option<bool>,
    pub hold_on: Option<bool>,
    pub standby: Option<bool>,
    pub offline: Option<bool>,
    /// Up to the four most recent temperature samples.
    pub recent_temps: Vec<String>,
    pub frost_temp: Option<f64>,
    pub profile: Option<ProfileSummary>,
}

impl From<&Device> for DeviceDetail {
    fn from(device: &Device) -> Self {
        let live = device.live_status.as_ref();
        Self {
            name: device.name.clone(),
            kind: device.kind,
            device_id: live.and_then(|l| l.device_id).or(device.identity.id),
            set_temp: live.and_then(|l| l.set_temp.clone()),
            current_temp: live.and_then(|l| l.actual_temp.clone()),
            active_profile: live.and_then(|l| l.active_profile),
            heat_on: live.and_then(|l| l.heat_on),
            hold_on: live.and_then(|l| l.hold_on),
            standby: live.and_then(|l| l.standby),
            offline: live.and_then(|l| l.offline),
            recent_temps: live
                .and_then(|l| l.recent_temps.as_ref())
                .map(|temps| temps.iter().take(4).cloned().collect())
                .unwrap_or_default(),
            frost_temp: device.engineers.as_ref().and_then(|e| e.frost_temp),
            profile: device
                .profile_0
                .as_ref()
                .map(|p| ProfileSummary::from(&p.profile)),
        }
    }
}

/// Switching point as `(level, time, temperature)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: &'static str,
    pub time: String,
    pub temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: &'static str,
    pub levels: Vec<LevelSummary>,
}

/// Condensed schedule view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub profile_id: Option<i64>,
    pub name: Option<String>,
    pub schedule: ScheduleLength,
    pub days: Vec<DaySummary>,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        let days = profile
            .days()
            .into_iter()
            .map(|(day, levels)| DaySummary {
                day,
                levels: levels
                    .levels()
                    .into_iter()
                    .map(|(level, comfort)| LevelSummary {
                        level,
                        time: comfort.time.clone(),
                        temp: comfort.temp,
                    })
                    .collect(),
            })
            .collect();
        Self {
            profile_id: None,
            name: None,
            schedule: profile.schedule(),
            days,
        }
    }
}

impl From<&NamedProfile> for ProfileSummary {
    fn from(named: &NamedProfile) -> Self {
        Self {
            profile_id: Some(named.profile_id),
            name: Some(named.name.clone()),
            ..Self::from(&named.info)
        }
    }
}
