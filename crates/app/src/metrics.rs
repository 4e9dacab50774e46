//! Gauges reported after each reconciliation cycle.

use neohub_domain::state::HubState;

use crate::ports::{Gauge, MetricsSink};

pub const NTP: Gauge = Gauge {
    name: "neohub_ntp",
    help: "ntp running status",
};
pub const AWAY: Gauge = Gauge {
    name: "neohub_away",
    help: "hub away status",
};
pub const HOLIDAY: Gauge = Gauge {
    name: "neohub_holiday",
    help: "hub holiday status",
};
pub const SET_TEMP: Gauge = Gauge {
    name: "neohub_set_temp",
    help: "set temperature",
};
pub const CURRENT_TEMP: Gauge = Gauge {
    name: "neohub_current_temp",
    help: "current temperature",
};
pub const ACTIVE_PROFILE: Gauge = Gauge {
    name: "neohub_active_profile",
    help: "current active profile",
};
pub const HEAT_ON: Gauge = Gauge {
    name: "neohub_heat_on",
    help: "heat on",
};
pub const HOLD_ON: Gauge = Gauge {
    name: "neohub_hold_on",
    help: "hold on",
};
pub const STANDBY: Gauge = Gauge {
    name: "neohub_standby",
    help: "standby",
};
pub const OFFLINE: Gauge = Gauge {
    name: "neohub_offline",
    help: "offline",
};

/// Gauges labelled per device, rewritten from scratch on every report.
pub const DEVICE_GAUGES: [Gauge; 7] = [
    SET_TEMP,
    CURRENT_TEMP,
    ACTIVE_PROFILE,
    HEAT_ON,
    HOLD_ON,
    STANDBY,
    OFFLINE,
];

fn flag(value: Option<bool>) -> Option<f64> {
    value.map(|on| if on { 1.0 } else { 0.0 })
}

/// Push hub and zone gauges for `state` into `sink`.
///
/// Values the hub did not report are skipped rather than zeroed. Device
/// series are cleared first so removed zones stop being exported.
#[allow(clippy::cast_precision_loss)]
pub fn report(sink: &dyn MetricsSink, state: &HubState) {
    let hub_id = state.hub_id();
    let hub_labels = [("hub_id", hub_id)];

    sink.set_gauge(
        NTP,
        &hub_labels,
        if state.system_config.ntp_running() { 1.0 } else { 0.0 },
    );
    if let Some(away) = flag(state.live_status.hub_away) {
        sink.set_gauge(AWAY, &hub_labels, away);
    }
    if let Some(holiday) = flag(state.live_status.hub_holiday) {
        sink.set_gauge(HOLIDAY, &hub_labels, holiday);
    }

    for gauge in DEVICE_GAUGES {
        sink.clear_gauge(gauge);
    }
    for zone in state.zones.values() {
        let Some(live) = zone.live_status.as_ref() else {
            continue;
        };
        let labels = [("hub_id", hub_id), ("device", zone.name.as_str())];
        let values = [
            (SET_TEMP, live.set_temp_value()),
            (CURRENT_TEMP, live.actual_temp_value()),
            (ACTIVE_PROFILE, live.active_profile.map(|p| p as f64)),
            (HEAT_ON, flag(live.heat_on)),
            (HOLD_ON, flag(live.hold_on)),
            (STANDBY, flag(live.standby)),
            (OFFLINE, flag(live.offline)),
        ];
        for (gauge, value) in values {
            if let Some(value) = value {
                sink.set_gauge(gauge, &labels, value);
            }
        }
    }
}
