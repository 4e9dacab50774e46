//! Reconciliation: timestamp-gated partial refresh of [`HubState`].
//!
//! One cycle runs these steps in order:
//!
//! 1. Fetch `GET_LIVE_DATA` and `GET_SYSTEM` (the system timestamp is always
//!    zero on the wire, so system config is refetched every cycle).
//! 2. Compare the fresh timestamps against the cached ones.
//! 3. `device_lists` stale: refetch zone and plug names, add and remove
//!    devices by name. Unchanged devices are kept as they are.
//! 4. `engineers` stale: attach engineers parameters to every device.
//! 5. `profile_0` stale: fetch each device's active profile. A failing
//!    device is logged and skipped.
//! 6. Apply the live-data snapshot to the hub and to every known device.
//! 7. `profile_comfort_levels` stale: refresh the named-profile registry.
//! 8. Timer timestamps are ignored.
//!
//! Any other failure aborts the remaining steps. Cached timestamps advance
//! per step, only once that step has been applied, so an aborted cycle
//! retries exactly the unfinished categories on the next run.

use std::collections::BTreeMap;
use std::sync::Arc;

use neohub_domain::command::{Command, DeviceCommand, HubCommand};
use neohub_domain::device::{Device, DeviceKind};
use neohub_domain::diff::NameDiff;
use neohub_domain::error::{DecodeError, HubError};
use neohub_domain::identity::DeviceIdentity;
use neohub_domain::profile::{DeviceProfile, NamedProfile};
use neohub_domain::state::HubState;
use neohub_domain::status::{
    decode, DeviceLiveStatus, EngineersStatus, SystemConfig, SystemLiveStatus,
};
use neohub_domain::timestamps::{TimestampCategory, Timestamps};
use serde_json::Value;

use crate::metrics;
use crate::ports::{HubChannel, MetricsSink};

/// What one reconciliation cycle changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Categories that were stale and refreshed.
    pub refreshed: Vec<TimestampCategory>,
    pub zones: NameDiff,
    pub plugs: NameDiff,
    pub profiles: NameDiff,
    /// Devices whose profile fetch failed in this cycle.
    pub failed_devices: Vec<String>,
}

/// Drives reconciliation cycles over a [`HubChannel`].
pub struct Reconciler<C> {
    channel: C,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl<C: HubChannel> Reconciler<C> {
    /// Create a reconciler without metrics reporting.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            metrics: None,
        }
    }

    /// Report gauges to `sink` after every completed cycle.
    #[must_use]
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Run one reconciliation cycle against `state`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or decode failure outside the per-device
    /// profile step, or a connection-lost error from any step.
    #[tracing::instrument(skip_all, fields(hub_id = %state.hub_id()))]
    pub async fn update_network(&self, state: &mut HubState) -> Result<ReconcileReport, HubError> {
        let mut report = ReconcileReport::default();

        let live = self.send(HubCommand::GetLiveData.into()).await?;
        tracing::debug!("got live data");
        tracing::trace!(%live, "live data");
        let system = self.send(HubCommand::GetSystem.into()).await?;
        state.system_config = decode::<SystemConfig>("system", &system)?;

        let fresh = Timestamps::from_live_data(&live);
        tracing::debug!(cached = ?state.timestamps, ?fresh, "comparing timestamps");
        state.timestamps.advance(&fresh, TimestampCategory::System);

        if state.timestamps.is_stale(&fresh, TimestampCategory::DeviceLists) {
            tracing::debug!("stale device lists");
            self.refresh_device_lists(state, &mut report).await?;
            state.timestamps.advance(&fresh, TimestampCategory::DeviceLists);
            report.refreshed.push(TimestampCategory::DeviceLists);
        }

        if state.timestamps.is_stale(&fresh, TimestampCategory::Engineers) {
            tracing::debug!("stale engineers status");
            self.refresh_engineers(state).await?;
            state.timestamps.advance(&fresh, TimestampCategory::Engineers);
            report.refreshed.push(TimestampCategory::Engineers);
        }

        if state.timestamps.is_stale(&fresh, TimestampCategory::Profile0) {
            tracing::debug!("stale device profiles");
            self.refresh_device_profiles(state, &mut report).await?;
            if report.failed_devices.is_empty() {
                state.timestamps.advance(&fresh, TimestampCategory::Profile0);
            }
            report.refreshed.push(TimestampCategory::Profile0);
        }

        apply_live_data(state, &live)?;

        if state
            .timestamps
            .is_stale(&fresh, TimestampCategory::ProfileComfortLevels)
        {
            tracing::debug!("stale stored profiles");
            self.refresh_profiles(state, &mut report).await?;
            state
                .timestamps
                .advance(&fresh, TimestampCategory::ProfileComfortLevels);
            report.refreshed.push(TimestampCategory::ProfileComfortLevels);
        }

        if let Some(sink) = &self.metrics {
            metrics::report(sink.as_ref(), state);
        }

        Ok(report)
    }

    async fn send(&self, command: Command) -> Result<Value, HubError> {
        let name = command.name().to_string();
        self.channel.send_command(command).await.inspect_err(|err| {
            tracing::warn!(command = %name, error = %err, "command failed");
        })
    }

    async fn refresh_device_lists(
        &self,
        state: &mut HubState,
        report: &mut ReconcileReport,
    ) -> Result<(), HubError> {
        let zones_reply = self.send(HubCommand::GetZones.into()).await?;
        let devices_reply = self.send(HubCommand::GetDevices.into()).await?;

        let zones: BTreeMap<String, Value> = decode("zones", &zones_reply)?;
        let device_names: Vec<String> = decode(
            "devices",
            devices_reply.get("result").ok_or(DecodeError::MissingField {
                record: "devices",
                field: "result",
            })?,
        )?;
        let plug_names: Vec<&str> = device_names
            .iter()
            .map(String::as_str)
            .filter(|name| !zones.contains_key(*name))
            .collect();

        let hub_id = state.hub_id().to_string();

        let zone_diff = NameDiff::compute(
            zones.keys().map(String::as_str),
            state.zones.keys().map(String::as_str),
        );
        for name in &zone_diff.added {
            let identity = zones
                .get(name)
                .map(DeviceIdentity::from_zone_entry)
                .unwrap_or_default();
            state.zones.insert(
                name.clone(),
                Device::new(name.as_str(), DeviceKind::Zone, identity, hub_id.as_str()),
            );
            tracing::info!(device = %name, "added zone");
        }
        for name in &zone_diff.removed {
            state.zones.remove(name);
            tracing::info!(device = %name, "removed zone");
        }

        let plug_diff = NameDiff::compute(plug_names, state.plugs.keys().map(String::as_str));
        for name in &plug_diff.added {
            state.plugs.insert(
                name.clone(),
                Device::new(
                    name.as_str(),
                    DeviceKind::Plug,
                    DeviceIdentity::default(),
                    hub_id.as_str(),
                ),
            );
            tracing::info!(device = %name, "added plug");
        }
        for name in &plug_diff.removed {
            state.plugs.remove(name);
            tracing::info!(device = %name, "removed plug");
        }

        report.zones = zone_diff;
        report.plugs = plug_diff;
        Ok(())
    }

    async fn refresh_engineers(&self, state: &mut HubState) -> Result<(), HubError> {
        let reply = self.send(HubCommand::GetEngineers.into()).await?;

        let mut updates = Vec::new();
        for device in state.devices() {
            let status = reply
                .get(&device.name)
                .map(|entry| decode::<EngineersStatus>("engineers", entry))
                .transpose()?;
            updates.push((device.name.clone(), status));
        }
        for (name, status) in updates {
            if let Some(device) = state.device_mut(&name) {
                tracing::debug!(device = %name, present = status.is_some(), "updated engineers status");
                device.engineers = status;
            }
        }
        Ok(())
    }

    /// Fetch every device's profile 0, one command per device.
    ///
    /// A failing device is logged, recorded in the report and skipped. A
    /// connection-lost error is the exception: every remaining fetch and the
    /// live-data apply would fail the same way, so the cycle is aborted and
    /// the caller reconnects.
    async fn refresh_device_profiles(
        &self,
        state: &mut HubState,
        report: &mut ReconcileReport,
    ) -> Result<(), HubError> {
        let devices: Vec<Device> = state.devices().cloned().collect();
        for device in devices {
            match self.fetch_profile_0(&device).await {
                Ok(profile) => {
                    tracing::debug!(device = %device.name, "updated profile 0");
                    let target = match device.kind {
                        DeviceKind::Zone => state.zones.get_mut(&device.name),
                        DeviceKind::Plug => state.plugs.get_mut(&device.name),
                    };
                    if let Some(target) = target {
                        target.profile_0 = Some(profile);
                    }
                }
                Err(err) if err.is_connection_lost() => return Err(err),
                Err(err) => {
                    let err = HubError::DeviceFetch {
                        device: device.name.clone(),
                        source: Box::new(err),
                    };
                    tracing::error!(error = %err, "unable to read profile 0");
                    report.failed_devices.push(device.name);
                }
            }
        }
        Ok(())
    }

    async fn fetch_profile_0(&self, device: &Device) -> Result<DeviceProfile, HubError> {
        let command = DeviceCommand::GetProfile0.bind(device, None)?;
        let reply = self.send(command).await?;
        Ok(DeviceProfile::from_reply(&reply)?)
    }

    async fn refresh_profiles(
        &self,
        state: &mut HubState,
        report: &mut ReconcileReport,
    ) -> Result<(), HubError> {
        let reply = self.send(HubCommand::GetProfiles.into()).await?;
        let entries: BTreeMap<String, Value> = decode("profiles", &reply)?;

        let diff = NameDiff::compute(
            entries.keys().map(String::as_str),
            state.profiles.keys().map(String::as_str),
        );

        let mut decoded = Vec::with_capacity(diff.added.len() + diff.remaining.len());
        for name in diff.added.iter().chain(&diff.remaining) {
            if let Some(entry) = entries.get(name) {
                decoded.push((name.clone(), decode::<NamedProfile>("profile", entry)?));
            }
        }

        for (name, profile) in decoded {
            let previous = state.profiles.insert(name.clone(), profile);
            if previous.is_some() {
                tracing::info!(profile = %name, "updated profile");
            } else {
                tracing::info!(profile = %name, "added profile");
            }
        }
        for name in &diff.removed {
            state.profiles.remove(name);
            tracing::info!(profile = %name, "removed profile");
        }

        report.profiles = diff;
        Ok(())
    }
}

fn apply_live_data(state: &mut HubState, live: &Value) -> Result<(), HubError> {
    let hub_status: SystemLiveStatus = decode("live_data", live)?;
    let entries = match live.get("devices") {
        Some(devices) => decode::<Vec<Value>>("live_data", devices)?,
        None => Vec::new(),
    };

    state.live_status = hub_status;
    for raw in &entries {
        let entry: DeviceLiveStatus = match decode("device_live_status", raw) {
            Ok(entry) => entry,
            Err(err) => {
                let device = raw.get("ZONE_NAME").and_then(Value::as_str).unwrap_or("?");
                tracing::warn!(device, error = %err, "skipping malformed live status");
                continue;
            }
        };
        let Some(name) = entry.zone_name.clone() else {
            continue;
        };
        match state.device_mut(&name) {
            Some(device) => {
                tracing::debug!(device = %name, "updated live status");
                device.live_status = Some(entry);
            }
            None => tracing::trace!(device = %name, "live status for unknown device"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    use neohub_domain::error::{ProtocolError, TransportError};
    use neohub_domain::identity::HubIdentity;
    use serde_json::json;

    use crate::metrics::tests::RecordingSink;

    type Responder = dyn Fn(&Command) -> Result<Value, HubError> + Send + Sync;

    /// Scripted hub answering each command through a closure.
    struct FakeHub {
        calls: Mutex<Vec<Command>>,
        respond: Box<Responder>,
    }

    impl FakeHub {
        fn new(respond: impl Fn(&Command) -> Result<Value, HubError> + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        fn calls_named(&self, name: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.name() == name)
                .count()
        }

        fn names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        }
    }

    impl HubChannel for FakeHub {
        fn send_command(
            &self,
            command: Command,
        ) -> impl Future<Output = Result<Value, HubError>> + Send {
            let result = (self.respond)(&command);
            self.calls.lock().unwrap().push(command);
            async move { result }
        }
    }

    fn live_data(timestamps: i64, devices: Value) -> Value {
        json!({
            "HUB_AWAY": false,
            "HUB_HOLIDAY": false,
            "HUB_TIME": 1_700_000_000,
            "TIMESTAMP_DEVICE_LISTS": timestamps,
            "TIMESTAMP_ENGINEERS": timestamps,
            "TIMESTAMP_PROFILE_0": timestamps,
            "TIMESTAMP_PROFILE_COMFORT_LEVELS": timestamps,
            "TIMESTAMP_PROFILE_TIMERS": timestamps,
            "TIMESTAMP_PROFILE_TIMERS_0": timestamps,
            "TIMESTAMP_SYSTEM": 0,
            "devices": devices
        })
    }

    fn profile_reply(device: &str) -> Value {
        json!({
            "TIMESTAMP": 5,
            "profiles": [{
                "device": device,
                "sunday": {
                    "wake": ["07:00", 21, 16, true],
                    "leave": ["09:00", 16, 16, false],
                    "return": ["17:00", 21, 16, true],
                    "sleep": ["22:00", 16, 16, false]
                }
            }]
        })
    }

    /// A hub with zones `zones`, plugs `plugs`, every timestamp at `ts`.
    fn hub(zones: &[&str], plugs: &[&str], ts: i64) -> FakeHub {
        let zones: Vec<String> = zones.iter().map(|s| (*s).to_string()).collect();
        let plugs: Vec<String> = plugs.iter().map(|s| (*s).to_string()).collect();
        FakeHub::new(move |command| {
            let devices: Vec<Value> = zones
                .iter()
                .chain(&plugs)
                .map(|name| json!({"ZONE_NAME": name, "SET_TEMP": "20.5", "HEAT_ON": true}))
                .collect();
            match command.name() {
                "GET_LIVE_DATA" => Ok(live_data(ts, Value::Array(devices))),
                "GET_SYSTEM" => Ok(json!({"NTP_ON": "Running", "TIMESTAMP": 0, "DEVICE_ID": "NeoHub"})),
                "GET_ZONES" => Ok(Value::Object(
                    zones
                        .iter()
                        .enumerate()
                        .map(|(i, name)| (name.clone(), json!(i + 1)))
                        .collect(),
                )),
                "GET_DEVICES" => Ok(json!({"result": plugs})),
                "GET_ENGINEERS" => Ok(Value::Object(
                    zones
                        .iter()
                        .map(|name| (name.clone(), json!({"FROST_TEMP": 12})))
                        .collect(),
                )),
                "GET_PROFILE_0" => {
                    let device = command.args()[0].as_str().unwrap_or_default();
                    Ok(profile_reply(device))
                }
                "GET_PROFILES" => Ok(json!({
                    "Home": {"PROFILE_ID": 1, "name": "Home", "info": {"sunday": {
                        "wake": ["07:00", 21, 16, true],
                        "leave": ["09:00", 16, 16, false],
                        "return": ["17:00", 21, 16, true],
                        "sleep": ["22:00", 16, 16, false]
                    }}}
                })),
                other => panic!("unexpected command {other}"),
            }
        })
    }

    fn empty_state() -> HubState {
        HubState::new(HubIdentity::new("10.0.0.2", "hub-1"))
    }

    #[tokio::test]
    async fn should_populate_state_on_first_cycle() {
        let fake = hub(&["Hall", "Kitchen"], &["Lamp"], 10);
        let reconciler = Reconciler::new(fake);
        let mut state = empty_state();

        let report = reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(state.zones.keys().collect::<Vec<_>>(), ["Hall", "Kitchen"]);
        assert_eq!(state.plugs.keys().collect::<Vec<_>>(), ["Lamp"]);
        assert_eq!(state.zones["Kitchen"].identity.id, Some(2));
        assert_eq!(
            state.zones["Hall"].engineers.as_ref().and_then(|e| e.frost_temp),
            Some(12.0)
        );
        assert!(state.plugs["Lamp"].engineers.is_none());
        assert!(state.zones["Hall"].profile_0.is_some());
        assert!(state.plugs["Lamp"].profile_0.is_some());
        assert_eq!(
            state.zones["Hall"].live_status.as_ref().and_then(|l| l.set_temp_value()),
            Some(20.5)
        );
        assert!(state.plugs["Lamp"].live_status.is_some());
        assert_eq!(state.profiles.keys().collect::<Vec<_>>(), ["Home"]);
        assert_eq!(state.live_status.hub_away, Some(false));
        assert!(state.system_config.ntp_running());
        assert_eq!(report.zones.added, ["Hall", "Kitchen"]);
        assert_eq!(report.profiles.added, ["Home"]);
        assert_eq!(state.timestamps.device_lists, 10);
        assert_eq!(state.timestamps.profile_comfort_levels, 10);
    }

    #[tokio::test]
    async fn should_fetch_zone_and_device_lists_exactly_once_when_stale() {
        let reconciler = Reconciler::new(hub(&["Hall"], &["Lamp"], 10));
        let mut state = empty_state();
        state.timestamps = Timestamps {
            device_lists: 9,
            engineers: 10,
            profile_0: 10,
            profile_comfort_levels: 10,
            ..Timestamps::default()
        };

        reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(reconciler.channel.calls_named("GET_ZONES"), 1);
        assert_eq!(reconciler.channel.calls_named("GET_DEVICES"), 1);
        assert_eq!(
            reconciler.channel.names(),
            ["GET_LIVE_DATA", "GET_SYSTEM", "GET_ZONES", "GET_DEVICES"]
        );
        assert_eq!(state.zones.keys().collect::<Vec<_>>(), ["Hall"]);
        assert_eq!(state.plugs.keys().collect::<Vec<_>>(), ["Lamp"]);
    }

    #[tokio::test]
    async fn should_not_refetch_categories_that_are_up_to_date() {
        let reconciler = Reconciler::new(hub(&["Hall"], &[], 10));
        let mut state = empty_state();
        reconciler.update_network(&mut state).await.unwrap();
        reconciler.channel.calls.lock().unwrap().clear();

        let report = reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(reconciler.channel.names(), ["GET_LIVE_DATA", "GET_SYSTEM"]);
        assert!(report.refreshed.is_empty());
    }

    #[tokio::test]
    async fn should_not_refetch_when_cached_timestamp_is_newer() {
        let reconciler = Reconciler::new(hub(&["Hall"], &[], 10));
        let mut state = empty_state();
        state.timestamps = Timestamps {
            device_lists: 50,
            engineers: 50,
            profile_0: 50,
            profile_comfort_levels: 50,
            ..Timestamps::default()
        };

        reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(reconciler.channel.names(), ["GET_LIVE_DATA", "GET_SYSTEM"]);
        assert_eq!(state.timestamps.device_lists, 50);
    }

    #[tokio::test]
    async fn should_add_new_remove_old_and_keep_unchanged_devices() {
        let mut state = empty_state();
        Reconciler::new(hub(&["A", "B", "C"], &[], 1))
            .update_network(&mut state)
            .await
            .unwrap();
        let before_b = state.zones["B"].clone();
        state.zones.get_mut("C").unwrap().identity.timestamp = Some(999);

        let reconciler = Reconciler::new(hub(&["B", "C", "D"], &[], 2));
        let report = reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(report.zones.added, ["D"]);
        assert_eq!(report.zones.removed, ["A"]);
        assert_eq!(report.zones.remaining, ["B", "C"]);
        assert_eq!(state.zones.keys().collect::<Vec<_>>(), ["B", "C", "D"]);
        assert_eq!(state.zones["B"].identity, before_b.identity);
        assert_eq!(state.zones["C"].identity.timestamp, Some(999));
    }

    #[tokio::test]
    async fn should_isolate_failing_device_profile_fetch() {
        let base = hub(&["Hall", "Kitchen"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_PROFILE_0" && command.args()[0] == "Hall" {
                return Err(TransportError::RecvTimeout.into());
            }
            (base.respond)(command)
        });
        let reconciler = Reconciler::new(fake);
        let mut state = empty_state();

        let report = reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(report.failed_devices, ["Hall"]);
        assert!(state.zones["Hall"].profile_0.is_none());
        assert!(state.zones["Kitchen"].profile_0.is_some());
        assert_eq!(state.profiles.len(), 1);
        assert!(state.zones["Hall"].live_status.is_some());
        assert_eq!(state.timestamps.profile_0, 0);
        assert_eq!(state.timestamps.engineers, 10);
    }

    #[tokio::test]
    async fn should_abort_cycle_when_live_data_fails() {
        let fake = FakeHub::new(|_| Err(ProtocolError::NotConnected.into()));
        let reconciler = Reconciler::new(fake);
        let mut state = empty_state();

        let err = reconciler.update_network(&mut state).await.unwrap_err();

        assert!(err.is_connection_lost());
        assert_eq!(reconciler.channel.names(), ["GET_LIVE_DATA"]);
        assert_eq!(state, empty_state());
    }

    #[tokio::test]
    async fn should_abort_cycle_when_connection_drops_during_profile_fetch() {
        let base = hub(&["Hall", "Kitchen"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_PROFILE_0" {
                return Err(TransportError::Closed.into());
            }
            (base.respond)(command)
        });
        let reconciler = Reconciler::new(fake);
        let mut state = empty_state();

        let err = reconciler.update_network(&mut state).await.unwrap_err();

        assert!(matches!(err, HubError::Transport(TransportError::Closed)));
        assert_eq!(reconciler.channel.calls_named("GET_PROFILE_0"), 1);
        assert_eq!(reconciler.channel.calls_named("GET_PROFILES"), 0);
        assert!(state.zones["Hall"].live_status.is_none());
        assert_eq!(state.timestamps.profile_0, 0);
    }

    #[tokio::test]
    async fn should_skip_malformed_live_entry_and_apply_the_rest() {
        let base = hub(&["Hall", "Kitchen"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_LIVE_DATA" {
                return Ok(live_data(
                    10,
                    json!([
                        {"ZONE_NAME": "Hall", "HEAT_ON": "sometimes"},
                        {"ZONE_NAME": "Kitchen", "SET_TEMP": "19.0"}
                    ]),
                ));
            }
            (base.respond)(command)
        });
        let mut state = empty_state();

        Reconciler::new(fake).update_network(&mut state).await.unwrap();

        assert!(state.zones["Hall"].live_status.is_none());
        let kitchen = state.zones["Kitchen"].live_status.as_ref().unwrap();
        assert_eq!(kitchen.set_temp.as_deref(), Some("19.0"));
    }

    #[tokio::test]
    async fn should_abort_remaining_steps_when_engineers_fetch_fails() {
        let base = hub(&["Hall"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_ENGINEERS" {
                return Err(TransportError::RecvTimeout.into());
            }
            (base.respond)(command)
        });
        let reconciler = Reconciler::new(fake);
        let mut state = empty_state();

        let result = reconciler.update_network(&mut state).await;

        assert!(matches!(
            result,
            Err(HubError::Transport(TransportError::RecvTimeout))
        ));
        assert_eq!(reconciler.channel.calls_named("GET_PROFILE_0"), 0);
        assert_eq!(reconciler.channel.calls_named("GET_PROFILES"), 0);
        assert_eq!(state.timestamps.device_lists, 10);
        assert_eq!(state.timestamps.engineers, 0);
    }

    #[tokio::test]
    async fn should_ignore_live_entries_for_unknown_devices() {
        let base = hub(&["Hall"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_LIVE_DATA" {
                return Ok(live_data(
                    10,
                    json!([{"ZONE_NAME": "Ghost", "SET_TEMP": "30"}, {"ZONE_NAME": "Hall"}]),
                ));
            }
            (base.respond)(command)
        });
        let mut state = empty_state();

        Reconciler::new(fake).update_network(&mut state).await.unwrap();

        assert!(state.device("Ghost").is_none());
        assert!(state.zones["Hall"].live_status.is_some());
    }

    #[tokio::test]
    async fn should_treat_remaining_profiles_as_updated() {
        let mut state = empty_state();
        Reconciler::new(hub(&[], &[], 1))
            .update_network(&mut state)
            .await
            .unwrap();
        state.profiles.get_mut("Home").unwrap().group = Some("stale".to_string());

        let report = Reconciler::new(hub(&[], &[], 2))
            .update_network(&mut state)
            .await
            .unwrap();

        assert_eq!(report.profiles.remaining, ["Home"]);
        assert_eq!(state.profiles["Home"].group, None);
    }

    #[tokio::test]
    async fn should_exclude_zone_names_from_plugs() {
        let base = hub(&["Hall"], &[], 10);
        let fake = FakeHub::new(move |command| {
            if command.name() == "GET_DEVICES" {
                return Ok(json!({"result": ["Hall", "Lamp"]}));
            }
            (base.respond)(command)
        });
        let mut state = empty_state();

        Reconciler::new(fake).update_network(&mut state).await.unwrap();

        assert_eq!(state.plugs.keys().collect::<Vec<_>>(), ["Lamp"]);
    }

    #[tokio::test]
    async fn should_report_metrics_after_cycle() {
        let sink = Arc::new(RecordingSink::default());
        let reconciler = Reconciler::new(hub(&["Hall"], &[], 10)).with_metrics(sink.clone());
        let mut state = empty_state();

        reconciler.update_network(&mut state).await.unwrap();

        assert_eq!(sink.value("neohub_ntp", None), Some(1.0));
        assert_eq!(sink.value("neohub_set_temp", Some("Hall")), Some(20.5));
    }
}
