//! Hub state: the aggregate mutated by reconciliation.

use std::collections::BTreeMap;

use crate::device::Device;
use crate::identity::HubIdentity;
use crate::profile::NamedProfile;
use crate::status::{SystemConfig, SystemLiveStatus};
use crate::timestamps::Timestamps;

/// In-memory model of one hub.
///
/// Created on connect, mutated only by reconciliation, discarded on
/// disconnect. Zone and plug names are expected to be unique across both
/// maps; lookups by name prefer zones.
#[derive(Debug, Clone, PartialEq)]
pub struct HubState {
    pub identity: HubIdentity,
    /// Zones by name.
    pub zones: BTreeMap<String, Device>,
    /// Plugs by name.
    pub plugs: BTreeMap<String, Device>,
    /// Profile registry by profile name.
    pub profiles: BTreeMap<String, NamedProfile>,
    pub system_config: SystemConfig,
    pub live_status: SystemLiveStatus,
    /// Last applied change timestamps.
    pub timestamps: Timestamps,
}

impl HubState {
    /// Empty state for a freshly connected hub.
    #[must_use]
    pub fn new(identity: HubIdentity) -> Self {
        Self {
            identity,
            zones: BTreeMap::new(),
            plugs: BTreeMap::new(),
            profiles: BTreeMap::new(),
            system_config: SystemConfig::default(),
            live_status: SystemLiveStatus::default(),
            timestamps: Timestamps::default(),
        }
    }

    /// Device id of the hub, used as the `hub_id` label.
    #[must_use]
    pub fn hub_id(&self) -> &str {
        &self.identity.device_id
    }

    /// Look up a zone or plug by name, zones first.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.zones.get(name).or_else(|| self.plugs.get(name))
    }

    /// Mutable lookup with the same precedence as [`device`](Self::device).
    pub fn device_mut(&mut self, name: &str) -> Option<&mut Device> {
        if self.zones.contains_key(name) {
            self.zones.get_mut(name)
        } else {
            self.plugs.get_mut(name)
        }
    }

    /// All zones followed by all plugs.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.zones.values().chain(self.plugs.values())
    }
}
