//! Typed status records decoded from hub replies.
//!
//! Every field is optional: hubs omit keys depending on firmware and
//! device type, and a missing key must not fail the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Decode a typed record from a borrowed JSON value.
///
/// # Errors
///
/// Returns [`DecodeError::Invalid`] when the value has the wrong shape.
pub fn decode<T: DeserializeOwned>(record: &'static str, value: &Value) -> Result<T, DecodeError> {
    T::deserialize(value).map_err(|source| DecodeError::Invalid { record, source })
}

/// Hub configuration from `GET_SYSTEM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct SystemConfig {
    pub alt_timer_format: Option<i64>,
    pub corf: Option<String>,
    pub device_id: Option<String>,
    pub dst_auto: Option<bool>,
    pub dst_on: Option<bool>,
    pub format: Option<i64>,
    pub heating_levels: Option<i64>,
    pub heatorcool: Option<String>,
    pub hub_type: Option<i64>,
    pub hub_version: Option<i64>,
    pub ntp_on: Option<String>,
    pub partition: Option<String>,
    pub timestamp: Option<i64>,
    pub time_zone: Option<f64>,
    pub utc: Option<i64>,
}

impl SystemConfig {
    /// Whether the hub reports its NTP client as running.
    #[must_use]
    pub fn ntp_running(&self) -> bool {
        self.ntp_on.as_deref() == Some("Running")
    }
}

/// Hub-level part of the `GET_LIVE_DATA` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct SystemLiveStatus {
    pub close_delay: Option<i64>,
    pub cool_input: Option<bool>,
    pub global_system_type: Option<String>,
    pub holiday_end: Option<i64>,
    pub hub_away: Option<bool>,
    pub hub_holiday: Option<bool>,
    pub hub_time: Option<i64>,
    pub open_delay: Option<i64>,
}

/// One entry of the `devices` array in the `GET_LIVE_DATA` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct DeviceLiveStatus {
    pub zone_name: Option<String>,
    pub active_level: Option<i64>,
    pub active_profile: Option<i64>,
    pub actual_temp: Option<String>,
    pub available_modes: Option<Vec<String>>,
    pub away: Option<bool>,
    pub cool_mode: Option<bool>,
    pub cool_on: Option<bool>,
    pub cool_temp: Option<f64>,
    pub current_floor_temperature: Option<f64>,
    pub date: Option<String>,
    pub device_id: Option<i64>,
    pub fan_control: Option<String>,
    pub fan_speed: Option<String>,
    pub floor_limit: Option<bool>,
    pub hc_mode: Option<String>,
    pub heat_mode: Option<bool>,
    pub heat_on: Option<bool>,
    pub hold_off: Option<bool>,
    pub hold_on: Option<bool>,
    pub hold_temp: Option<f64>,
    pub hold_time: Option<String>,
    pub holiday: Option<bool>,
    pub lock: Option<bool>,
    pub low_battery: Option<bool>,
    pub manual_off: Option<bool>,
    pub modelock: Option<bool>,
    pub modulation_level: Option<i64>,
    pub offline: Option<bool>,
    pub pin_number: Option<String>,
    pub preheat_active: Option<bool>,
    pub recent_temps: Option<Vec<String>>,
    pub set_temp: Option<String>,
    pub standby: Option<bool>,
    pub switch_delay_left: Option<String>,
    pub temporary_set_flag: Option<bool>,
    pub thermostat: Option<bool>,
    pub time: Option<String>,
    pub timer_on: Option<bool>,
    pub window_open: Option<bool>,
    pub write_count: Option<i64>,
}

impl DeviceLiveStatus {
    /// Set-point temperature as a number, if it parses.
    #[must_use]
    pub fn set_temp_value(&self) -> Option<f64> {
        self.set_temp.as_deref().and_then(|t| t.trim().parse().ok())
    }

    /// Measured temperature as a number, if it parses.
    #[must_use]
    pub fn actual_temp_value(&self) -> Option<f64> {
        self.actual_temp.as_deref().and_then(|t| t.trim().parse().ok())
    }
}

/// Per-device engineering parameters from `GET_ENGINEERS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct EngineersStatus {
    pub deadband: Option<f64>,
    pub device_id: Option<i64>,
    pub device_type: Option<i64>,
    pub floor_limit: Option<f64>,
    pub frost_temp: Option<f64>,
    pub max_preheat: Option<i64>,
    pub output_delay: Option<i64>,
    pub pump_delay: Option<i64>,
    pub rf_sensor_mode: Option<String>,
    pub stat_failsafe: Option<i64>,
    pub stat_version: Option<i64>,
    #[serde(alias = "SWITCHING DIFFERENTIAL")]
    pub switching_differential: Option<f64>,
    pub switch_delay: Option<i64>,
    pub system_type: Option<i64>,
    pub timestamp: Option<i64>,
    pub user_limit: Option<f64>,
    pub window_switch_open: Option<bool>,
}
