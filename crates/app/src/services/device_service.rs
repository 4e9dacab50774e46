//! Device service: use-cases for zone and plug commands.

use neohub_domain::command::DeviceCommand;
use neohub_domain::device::Device;
use neohub_domain::error::HubError;
use neohub_domain::profile::DeviceProfile;
use serde_json::{Value, json};

use crate::ports::HubChannel;

/// Application service issuing device-scoped commands.
///
/// Every command goes through [`execute`](Self::execute), which binds the
/// device name according to the command table and rejects verbs that do
/// not apply to the device's kind.
pub struct DeviceService<C> {
    channel: C,
}

impl<C: HubChannel> DeviceService<C> {
    /// Create a new service sending through `channel`.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Issue `command` against `device`, with an optional leading value.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when the command does not apply to
    /// the device's kind, otherwise propagates the channel error unchanged.
    #[tracing::instrument(skip(self, device, value), fields(device = %device.name))]
    pub async fn execute(
        &self,
        device: &Device,
        command: DeviceCommand,
        value: Option<Value>,
    ) -> Result<Value, HubError> {
        let command = command.bind(device, value)?;
        self.channel
            .send_command(command)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "device command failed"))
    }

    /// Flash the device's display.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn identify(&self, device: &Device) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::Identify, None).await
    }

    /// Fetch and decode the device's active profile.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); also [`HubError::Decode`] for a
    /// malformed reply.
    pub async fn get_profile_0(&self, device: &Device) -> Result<DeviceProfile, HubError> {
        let reply = self.execute(device, DeviceCommand::GetProfile0, None).await?;
        Ok(DeviceProfile::from_reply(&reply)?)
    }

    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get_timer_0(&self, device: &Device) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::GetTimer0, None).await
    }

    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get_hours_run(&self, device: &Device) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::HoursRun, None).await
    }

    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn set_frost_protection(&self, device: &Device, on: bool) -> Result<Value, HubError> {
        let command = if on {
            DeviceCommand::FrostOn
        } else {
            DeviceCommand::FrostOff
        };
        self.execute(device, command, None).await
    }

    /// Zone set-point.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn set_temp(&self, device: &Device, temp: f64) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::SetTemp, Some(json!(temp)))
            .await
    }

    /// Zone frost-protection temperature.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn set_frost_temp(&self, device: &Device, temp: f64) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::SetFrost, Some(json!(temp)))
            .await
    }

    /// Lock a zone's keypad behind `pin`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn lock(&self, device: &Device, pin: &str) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::Lock, Some(json!(pin)))
            .await
    }

    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn unlock(&self, device: &Device) -> Result<Value, HubError> {
        self.execute(device, DeviceCommand::Unlock, None).await
    }

    /// Turn a plug's output on or off for `minutes`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn set_timed_hold(
        &self,
        device: &Device,
        on: bool,
        minutes: u32,
    ) -> Result<Value, HubError> {
        let command = if on {
            DeviceCommand::TimerHoldOn
        } else {
            DeviceCommand::TimerHoldOff
        };
        self.execute(device, command, Some(json!(minutes))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neohub_domain::device::DeviceKind;
    use neohub_domain::error::ValidationError;
    use neohub_domain::identity::DeviceIdentity;

    use crate::services::hub_service::tests::RecordingChannel;

    fn zone() -> Device {
        Device::new("Kitchen", DeviceKind::Zone, DeviceIdentity::default(), "hub-1")
    }

    fn plug() -> Device {
        Device::new("Lamp", DeviceKind::Plug, DeviceIdentity::default(), "hub-1")
    }

    #[tokio::test]
    async fn should_send_set_temp_with_value_then_device() {
        let service = DeviceService::new(RecordingChannel::replying(json!({"result": "ok"})));
        service.set_temp(&zone(), 21.5).await.unwrap();
        assert_eq!(
            service.channel.sent(),
            [json!({"SET_TEMP": [21.5, "Kitchen"]})]
        );
    }

    #[tokio::test]
    async fn should_send_frost_temperature_as_set_frost() {
        let service = DeviceService::new(RecordingChannel::replying(json!({})));
        service.set_frost_temp(&zone(), 8.0).await.unwrap();
        assert_eq!(service.channel.sent(), [json!({"SET_FROST": [8.0, "Kitchen"]})]);
    }

    #[tokio::test]
    async fn should_reject_zone_command_on_plug_without_sending() {
        let service = DeviceService::new(RecordingChannel::replying(json!({})));
        let err = service.set_temp(&plug(), 20.0).await.unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation(ValidationError::UnsupportedCommand { .. })
        ));
        assert!(service.channel.sent().is_empty());
    }

    #[tokio::test]
    async fn should_send_timed_hold_for_plug() {
        let service = DeviceService::new(RecordingChannel::replying(json!({})));
        service.set_timed_hold(&plug(), true, 30).await.unwrap();
        assert_eq!(
            service.channel.sent(),
            [json!({"TIMER_HOLD_ON": [30, "Lamp"]})]
        );
    }

    #[tokio::test]
    async fn should_allow_shared_commands_on_both_kinds() {
        let service = DeviceService::new(RecordingChannel::replying(json!({})));
        service.identify(&zone()).await.unwrap();
        service.set_frost_protection(&plug(), false).await.unwrap();
        assert_eq!(
            service.channel.sent(),
            [
                json!({"IDENTIFY_DEV": ["Kitchen"]}),
                json!({"FROST_OFF": ["Lamp"]})
            ]
        );
    }

    #[tokio::test]
    async fn should_decode_profile_0_reply() {
        let reply = json!({
            "TIMESTAMP": 3,
            "profiles": [{"device": "Kitchen", "sunday": {
                "wake": ["07:00", 21, 16, true],
                "level1": ["09:00", 18, 16, false],
                "sleep": ["22:00", 16, 16, false]
            }}]
        });
        let service = DeviceService::new(RecordingChannel::replying(reply));
        let profile = service.get_profile_0(&zone()).await.unwrap();
        assert_eq!(profile.device_name.as_deref(), Some("Kitchen"));
        assert_eq!(profile.timestamp, Some(3));
    }
}
