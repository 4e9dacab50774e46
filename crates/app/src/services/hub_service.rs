//! Hub service: hub-scoped commands.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use neohub_domain::command::{Channel, HubCommand, LevelCount, ProgramFormat, TempFormat};
use neohub_domain::error::{DecodeError, HubError};
use serde_json::Value;

use crate::ports::HubChannel;

/// Application service for commands addressed to the hub itself.
///
/// Arguments are validated before anything is sent; the hub's response is
/// returned as-is.
pub struct HubService<C> {
    channel: C,
}

impl<C: HubChannel> HubService<C> {
    /// Create a new service sending through `channel`.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    async fn run(&self, command: HubCommand) -> Result<Value, HubError> {
        self.channel.send_command(command.into()).await
    }

    /// Reboot the hub (`RESET`).
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn reboot(&self) -> Result<Value, HubError> {
        self.run(HubCommand::Reset).await
    }

    /// Flash the hub's LED (`IDENTIFY`).
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn identify(&self) -> Result<Value, HubError> {
        self.run(HubCommand::Identify).await
    }

    /// Change the RF channel.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for a channel outside
    /// [`VALID_CHANNELS`](neohub_domain::command::VALID_CHANNELS).
    #[tracing::instrument(skip(self))]
    pub async fn set_channel(&self, channel: u8) -> Result<Value, HubError> {
        let channel = Channel::try_from(channel).inspect_err(|err| {
            tracing::warn!(error = %err, "rejected channel");
        })?;
        self.run(HubCommand::SetChannel(channel)).await
    }

    /// Switch between `C` and `F`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for any other format.
    #[tracing::instrument(skip(self))]
    pub async fn set_temp_format(&self, format: &str) -> Result<Value, HubError> {
        let format: TempFormat = format.parse()?;
        self.run(HubCommand::SetTempFormat(format)).await
    }

    /// Change the programming format.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for an unknown format.
    #[tracing::instrument(skip(self))]
    pub async fn set_format(&self, format: &str) -> Result<Value, HubError> {
        let format: ProgramFormat = format.parse()?;
        self.run(HubCommand::SetFormat(format)).await
    }

    /// Enable or disable away mode.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_away(&self, away: bool) -> Result<Value, HubError> {
        self.run(HubCommand::Away(away)).await
    }

    /// Schedule a holiday between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_holiday(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Value, HubError> {
        self.run(HubCommand::Holiday { start, end }).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_holiday(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetHoliday).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_holiday(&self) -> Result<Value, HubError> {
        self.run(HubCommand::CancelHoliday).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_system(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetSystem).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_live_data(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetLiveData).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_zones(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetZones).await
    }

    /// Device names from `GET_DEVICES`, unwrapped from its `result` key.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Decode`] when the reply has no `result`.
    pub async fn get_devices(&self) -> Result<Value, HubError> {
        let mut reply = self.run(HubCommand::GetDevices).await?;
        reply
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| {
                DecodeError::MissingField {
                    record: "devices",
                    field: "result",
                }
                .into()
            })
    }

    /// Devices attached to `room`.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_device_list(&self, room: &str) -> Result<Value, HubError> {
        self.run(HubCommand::GetDeviceList(room.to_string())).await
    }

    /// Serial numbers of every device (`DEVICES_SN`).
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_devices_sn(&self) -> Result<Value, HubError> {
        self.run(HubCommand::DevicesSerialNumbers).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_engineers(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetEngineers).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_firmware(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetFirmware).await
    }

    /// Enable or disable the hub's NTP client.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_ntp(&self, enabled: bool) -> Result<Value, HubError> {
        self.run(HubCommand::Ntp(enabled)).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_date(&self, date: NaiveDate) -> Result<Value, HubError> {
        self.run(HubCommand::SetDate(date)).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_time(&self, time: NaiveTime) -> Result<Value, HubError> {
        self.run(HubCommand::SetTime(time)).await
    }

    /// Set the UTC offset in hours.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_timezone(&self, offset: f64) -> Result<Value, HubError> {
        self.run(HubCommand::TimeZone(offset)).await
    }

    /// Force daylight saving on or off regardless of the automatic rule.
    ///
    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn set_manual_dst(&self, on: bool) -> Result<Value, HubError> {
        self.run(HubCommand::ManualDst(on)).await
    }

    /// Enable or disable automatic daylight saving.
    ///
    /// Disabling also clears the manual override.
    ///
    /// # Errors
    ///
    /// Propagates the first channel error; the override is not cleared if
    /// `DST_OFF` fails.
    #[tracing::instrument(skip(self))]
    pub async fn set_dst(&self, enabled: bool) -> Result<Value, HubError> {
        let reply = self.run(HubCommand::Dst(enabled)).await?;
        tracing::trace!(%reply, "dst response");
        if !enabled {
            self.set_manual_dst(false).await?;
        }
        Ok(reply)
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_profile_names(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetProfileNames).await
    }

    /// # Errors
    ///
    /// Propagates the channel error unchanged.
    pub async fn get_profiles(&self) -> Result<Value, HubError> {
        self.run(HubCommand::GetProfiles).await
    }

    /// Switch every schedule to 4 or 6 comfort levels per day.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for any other count.
    #[tracing::instrument(skip(self))]
    pub async fn set_comfort_levels(&self, levels: u8) -> Result<Value, HubError> {
        let levels = LevelCount::try_from(levels)?;
        self.run(HubCommand::SetLevels(levels)).await
    }
}
