//! Change timestamps: the hub's per-category dirty flags.
//!
//! The live-data snapshot carries one monotonic counter per category of
//! hub data. A cached value strictly lower than the fresh one means the
//! category is stale; equal or higher means no refresh is needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One category of hub data guarded by its own change timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampCategory {
    DeviceLists,
    Engineers,
    Profile0,
    ProfileComfortLevels,
    ProfileTimers,
    ProfileTimers0,
    System,
}

impl TimestampCategory {
    /// Every category, in wire order.
    pub const ALL: [Self; 7] = [
        Self::DeviceLists,
        Self::Engineers,
        Self::Profile0,
        Self::ProfileComfortLevels,
        Self::ProfileTimers,
        Self::ProfileTimers0,
        Self::System,
    ];

    /// Key carrying this category in the live-data snapshot.
    #[must_use]
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::DeviceLists => "TIMESTAMP_DEVICE_LISTS",
            Self::Engineers => "TIMESTAMP_ENGINEERS",
            Self::Profile0 => "TIMESTAMP_PROFILE_0",
            Self::ProfileComfortLevels => "TIMESTAMP_PROFILE_COMFORT_LEVELS",
            Self::ProfileTimers => "TIMESTAMP_PROFILE_TIMERS",
            Self::ProfileTimers0 => "TIMESTAMP_PROFILE_TIMERS_0",
            Self::System => "TIMESTAMP_SYSTEM",
        }
    }
}

/// Last-seen change timestamps for one hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub device_lists: i64,
    pub engineers: i64,
    pub profile_0: i64,
    pub profile_comfort_levels: i64,
    pub profile_timers: i64,
    pub profile_timers_0: i64,
    pub system: i64,
}

impl Timestamps {
    /// Extract the timestamps from a `GET_LIVE_DATA` reply.
    ///
    /// Absent or non-numeric keys read as `0`, which never marks a category
    /// stale.
    #[must_use]
    pub fn from_live_data(live_data: &Value) -> Self {
        let mut timestamps = Self::default();
        for category in TimestampCategory::ALL {
            let value = live_data
                .get(category.wire_key())
                .and_then(Value::as_i64)
                .unwrap_or(0);
            *timestamps.slot_mut(category) = value;
        }
        timestamps
    }

    /// Value of one category.
    #[must_use]
    pub fn get(&self, category: TimestampCategory) -> i64 {
        match category {
            TimestampCategory::DeviceLists => self.device_lists,
            TimestampCategory::Engineers => self.engineers,
            TimestampCategory::Profile0 => self.profile_0,
            TimestampCategory::ProfileComfortLevels => self.profile_comfort_levels,
            TimestampCategory::ProfileTimers => self.profile_timers,
            TimestampCategory::ProfileTimers0 => self.profile_timers_0,
            TimestampCategory::System => self.system,
        }
    }

    /// Whether the cached value of `category` is older than `fresh`'s.
    #[must_use]
    pub fn is_stale(&self, fresh: &Self, category: TimestampCategory) -> bool {
        self.get(category) < fresh.get(category)
    }

    /// Adopt `fresh`'s value for `category` if it is newer.
    ///
    /// Cached values never decrease.
    pub fn advance(&mut self, fresh: &Self, category: TimestampCategory) {
        if self.is_stale(fresh, category) {
            *self.slot_mut(category) = fresh.get(category);
        }
    }

    fn slot_mut(&mut self, category: TimestampCategory) -> &mut i64 {
        match category {
            TimestampCategory::DeviceLists => &mut self.device_lists,
            TimestampCategory::Engineers => &mut self.engineers,
            TimestampCategory::Profile0 => &mut self.profile_0,
            TimestampCategory::ProfileComfortLevels => &mut self.profile_comfort_levels,
            TimestampCategory::ProfileTimers => &mut self.profile_timers,
            TimestampCategory::ProfileTimers0 => &mut self.profile_timers_0,
            TimestampCategory::System => &mut self.system,
        }
    }
}
