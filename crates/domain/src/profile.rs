//! Weekly comfort-level schedules.
//!
//! A [`Profile`] maps each scheduled day to a set of [`ComfortLevels`].
//! Two independent variations exist on the wire:
//!
//! | Variation | Selected by |
//! |-----------|-------------|
//! | 4 levels (`wake`/`leave`/`return`/`sleep`) vs 6 levels | presence of a `leave` key |
//! | 1-day, 2-day (5/2) or 7-day schedule | presence of `tuesday`, then `monday` |
//!
//! Each comfort level is a 4-element array `[time, temp, alt_temp, alt_enabled]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::status::decode;

/// One switching point of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64, f64, bool)", into = "(String, f64, f64, bool)")]
pub struct ComfortLevel {
    /// Switching time, `HH:MM`.
    pub time: String,
    /// Target temperature.
    pub temp: f64,
    /// Secondary temperature.
    pub alt_temp: f64,
    /// Whether the secondary temperature is in use.
    pub alt_temp_enabled: bool,
}

impl From<(String, f64, f64, bool)> for ComfortLevel {
    fn from((time, temp, alt_temp, alt_temp_enabled): (String, f64, f64, bool)) -> Self {
        Self {
            time,
            temp,
            alt_temp,
            alt_temp_enabled,
        }
    }
}

impl From<ComfortLevel> for (String, f64, f64, bool) {
    fn from(level: ComfortLevel) -> Self {
        (level.time, level.temp, level.alt_temp, level.alt_temp_enabled)
    }
}

/// Four-level day: wake, leave, return, sleep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FourLevels {
    pub wake: Option<ComfortLevel>,
    pub leave: Option<ComfortLevel>,
    pub return_: Option<ComfortLevel>,
    pub sleep: Option<ComfortLevel>,
}

/// Six-level day: wake, four intermediate levels, sleep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SixLevels {
    pub wake: Option<ComfortLevel>,
    pub level1: Option<ComfortLevel>,
    pub level2: Option<ComfortLevel>,
    pub level3: Option<ComfortLevel>,
    pub level4: Option<ComfortLevel>,
    pub sleep: Option<ComfortLevel>,
}

/// The comfort levels of one scheduled day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLevels", into = "RawLevels")]
pub enum ComfortLevels {
    Four(FourLevels),
    Six(SixLevels),
}

impl ComfortLevels {
    /// Number of comfort levels per day (4 or 6).
    #[must_use]
    pub fn level_count(&self) -> u8 {
        match self {
            Self::Four(_) => 4,
            Self::Six(_) => 6,
        }
    }

    /// Present levels in schedule order, labelled with their wire key.
    #[must_use]
    pub fn levels(&self) -> Vec<(&'static str, &ComfortLevel)> {
        let slots: Vec<(&'static str, Option<&ComfortLevel>)> = match self {
            Self::Four(l) => vec![
                ("wake", l.wake.as_ref()),
                ("leave", l.leave.as_ref()),
                ("return", l.return_.as_ref()),
                ("sleep", l.sleep.as_ref()),
            ],
            Self::Six(l) => vec![
                ("wake", l.wake.as_ref()),
                ("level1", l.level1.as_ref()),
                ("level2", l.level2.as_ref()),
                ("level3", l.level3.as_ref()),
                ("level4", l.level4.as_ref()),
                ("sleep", l.sleep.as_ref()),
            ],
        };
        slots
            .into_iter()
            .filter_map(|(key, level)| level.map(|level| (key, level)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawLevels {
    #[serde(skip_serializing_if = "Option::is_none")]
    wake: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    leave: Option<ComfortLevel>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    return_: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level1: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level2: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level3: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level4: Option<ComfortLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sleep: Option<ComfortLevel>,
}

impl From<RawLevels> for ComfortLevels {
    fn from(raw: RawLevels) -> Self {
        if raw.leave.is_some() {
            Self::Four(FourLevels {
                wake: raw.wake,
                leave: raw.leave,
                return_: raw.return_,
                sleep: raw.sleep,
            })
        } else {
            Self::Six(SixLevels {
                wake: raw.wake,
                level1: raw.level1,
                level2: raw.level2,
                level3: raw.level3,
                level4: raw.level4,
                sleep: raw.sleep,
            })
        }
    }
}

impl From<ComfortLevels> for RawLevels {
    fn from(levels: ComfortLevels) -> Self {
        match levels {
            ComfortLevels::Four(l) => Self {
                wake: l.wake,
                leave: l.leave,
                return_: l.return_,
                sleep: l.sleep,
                ..Self::default()
            },
            ComfortLevels::Six(l) => Self {
                wake: l.wake,
                level1: l.level1,
                level2: l.level2,
                level3: l.level3,
                level4: l.level4,
                sleep: l.sleep,
                ..Self::default()
            },
        }
    }
}

/// How many distinct days a profile schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduleLength {
    /// Same schedule every day (`sunday` only).
    #[serde(rename = "24h")]
    OneDay,
    /// Weekday/weekend split (`monday` and `sunday`).
    #[serde(rename = "5/2day")]
    TwoDay,
    /// One schedule per weekday.
    #[serde(rename = "7day")]
    SevenDay,
}

/// A weekly schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProfile", into = "RawProfile")]
pub struct Profile {
    pub sunday: Option<ComfortLevels>,
    pub monday: Option<ComfortLevels>,
    pub tuesday: Option<ComfortLevels>,
    pub wednesday: Option<ComfortLevels>,
    pub thursday: Option<ComfortLevels>,
    pub friday: Option<ComfortLevels>,
    pub saturday: Option<ComfortLevels>,
}

impl Profile {
    /// Schedule length, derived from which day keys are present.
    #[must_use]
    pub fn schedule(&self) -> ScheduleLength {
        if self.tuesday.is_some() {
            ScheduleLength::SevenDay
        } else if self.monday.is_some() {
            ScheduleLength::TwoDay
        } else {
            ScheduleLength::OneDay
        }
    }

    /// Scheduled days relevant to [`schedule`](Self::schedule), in wire order.
    #[must_use]
    pub fn days(&self) -> Vec<(&'static str, &ComfortLevels)> {
        let all = [
            ("sunday", self.sunday.as_ref()),
            ("monday", self.monday.as_ref()),
            ("tuesday", self.tuesday.as_ref()),
            ("wednesday", self.wednesday.as_ref()),
            ("thursday", self.thursday.as_ref()),
            ("friday", self.friday.as_ref()),
            ("saturday", self.saturday.as_ref()),
        ];
        let take = match self.schedule() {
            ScheduleLength::OneDay => 1,
            ScheduleLength::TwoDay => 2,
            ScheduleLength::SevenDay => 7,
        };
        all.into_iter()
            .take(take)
            .filter_map(|(day, levels)| levels.map(|levels| (day, levels)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    sunday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tuesday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wednesday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thursday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    friday: Option<ComfortLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saturday: Option<ComfortLevels>,
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        Self {
            sunday: raw.sunday,
            monday: raw.monday,
            tuesday: raw.tuesday,
            wednesday: raw.wednesday,
            thursday: raw.thursday,
            friday: raw.friday,
            saturday: raw.saturday,
        }
    }
}

impl From<Profile> for RawProfile {
    fn from(profile: Profile) -> Self {
        // Only the days the schedule length uses go back on the wire.
        match profile.schedule() {
            ScheduleLength::OneDay => Self {
                sunday: profile.sunday,
                ..Self::default()
            },
            ScheduleLength::TwoDay => Self {
                sunday: profile.sunday,
                monday: profile.monday,
                ..Self::default()
            },
            ScheduleLength::SevenDay => Self {
                sunday: profile.sunday,
                monday: profile.monday,
                tuesday: profile.tuesday,
                wednesday: profile.wednesday,
                thursday: profile.thursday,
                friday: profile.friday,
                saturday: profile.saturday,
            },
        }
    }
}

/// The active schedule of one device (`GET_PROFILE_0`).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Device the hub says the profile belongs to.
    pub device_name: Option<String>,
    /// Change timestamp reported alongside the profile.
    pub timestamp: Option<i64>,
    /// The schedule itself.
    pub profile: Profile,
}

impl DeviceProfile {
    /// Decode a `GET_PROFILE_0` reply: `{"TIMESTAMP": n, "profiles": [{"device": …, <days>}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingField`] when `profiles` is absent or
    /// empty, or [`DecodeError::Invalid`] when a day is malformed.
    pub fn from_reply(reply: &Value) -> Result<Self, DecodeError> {
        let entry = reply
            .get("profiles")
            .and_then(Value::as_array)
            .and_then(|profiles| profiles.first())
            .ok_or(DecodeError::MissingField {
                record: "profile_0",
                field: "profiles",
            })?;

        Ok(Self {
            device_name: entry
                .get("device")
                .and_then(Value::as_str)
                .map(str::to_owned),
            timestamp: reply.get("TIMESTAMP").and_then(Value::as_i64),
            profile: decode("profile_0", entry)?,
        })
    }

    /// Encode back into the `GET_PROFILE_0` reply shape.
    #[must_use]
    pub fn to_reply(&self) -> Value {
        let mut entry = serde_json::to_value(&self.profile).unwrap_or_default();
        if let (Some(name), Value::Object(map)) = (&self.device_name, &mut entry) {
            map.insert("device".to_string(), Value::String(name.clone()));
        }
        serde_json::json!({
            "TIMESTAMP": self.timestamp,
            "profiles": [entry],
        })
    }
}

/// A schedule stored by name in the hub's profile registry (`GET_PROFILES`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProfile {
    #[serde(rename = "PROFILE_ID")]
    pub profile_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub info: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn four_level_day() -> Value {
        json!({
            "wake": ["07:00", 21, 16, true],
            "leave": ["09:00", 16, 16, false],
            "return": ["17:00", 21, 16, true],
            "sleep": ["22:30", 16, 16, false]
        })
    }

    fn six_level_day() -> Value {
        json!({
            "wake": ["06:30", 20, 16, true],
            "level1": ["08:00", 18, 16, false],
            "level2": ["12:00", 19, 16, false],
            "level3": ["15:00", 20, 16, false],
            "level4": ["18:00", 21, 16, false],
            "sleep": ["23:00", 16, 16, false]
        })
    }

    #[test]
    fn should_decode_comfort_level_array() {
        let level: ComfortLevel = serde_json::from_value(json!(["07:00", 21, 16, true])).unwrap();
        assert_eq!(level.time, "07:00");
        assert!((level.temp - 21.0).abs() < f64::EPSILON);
        assert!(level.alt_temp_enabled);
    }

    #[test]
    fn should_select_four_levels_when_leave_present() {
        let levels: ComfortLevels = serde_json::from_value(four_level_day()).unwrap();
        assert_eq!(levels.level_count(), 4);
        let keys: Vec<_> = levels.levels().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["wake", "leave", "return", "sleep"]);
    }

    #[test]
    fn should_select_six_levels_when_leave_absent() {
        let levels: ComfortLevels = serde_json::from_value(six_level_day()).unwrap();
        assert_eq!(levels.level_count(), 6);
        assert_eq!(levels.levels().len(), 6);
    }

    #[test]
    fn should_classify_one_day_schedule() {
        let profile: Profile = serde_json::from_value(json!({"sunday": four_level_day()})).unwrap();
        assert_eq!(profile.schedule(), ScheduleLength::OneDay);
        assert_eq!(profile.days().len(), 1);
    }

    #[test]
    fn should_classify_two_day_schedule_when_monday_without_tuesday() {
        let profile: Profile = serde_json::from_value(
            json!({"sunday": four_level_day(), "monday": four_level_day()}),
        )
        .unwrap();
        assert_eq!(profile.schedule(), ScheduleLength::TwoDay);
    }

    #[test]
    fn should_classify_seven_day_schedule_when_tuesday_present() {
        let day = six_level_day();
        let profile: Profile = serde_json::from_value(json!({
            "sunday": day, "monday": day, "tuesday": day, "wednesday": day,
            "thursday": day, "friday": day, "saturday": day
        }))
        .unwrap();
        assert_eq!(profile.schedule(), ScheduleLength::SevenDay);
        assert_eq!(profile.days().len(), 7);
    }

    #[test]
    fn should_reproduce_device_profile_after_reencoding() {
        let reply = json!({
            "TIMESTAMP": 1_700_000_000,
            "profiles": [{
                "device": "Kitchen",
                "sunday": four_level_day(),
                "monday": four_level_day()
            }]
        });
        let original = DeviceProfile::from_reply(&reply).unwrap();
        assert_eq!(original.device_name.as_deref(), Some("Kitchen"));
        assert_eq!(original.timestamp, Some(1_700_000_000));

        let decoded = DeviceProfile::from_reply(&original.to_reply()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn should_fail_device_profile_without_profiles() {
        let result = DeviceProfile::from_reply(&json!({"TIMESTAMP": 1}));
        assert!(matches!(
            result,
            Err(DecodeError::MissingField {
                field: "profiles",
                ..
            })
        ));
    }

    #[test]
    fn should_reproduce_named_profile_after_reencoding() {
        let value = json!({
            "PROFILE_ID": 3,
            "name": "Weekdays",
            "group": "heating",
            "info": {"sunday": six_level_day(), "monday": six_level_day()}
        });
        let original: NamedProfile = serde_json::from_value(value).unwrap();
        assert_eq!(original.info.schedule(), ScheduleLength::TwoDay);

        let reencoded = serde_json::to_value(&original).unwrap();
        let decoded: NamedProfile = serde_json::from_value(reencoded).unwrap();
        assert_eq!(decoded, original);
    }
}
