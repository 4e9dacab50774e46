//! Named hub commands and their positional arguments.
//!
//! A [`Command`] is a verb plus positional arguments. Hub-scoped verbs are
//! built from [`HubCommand`]; device-scoped verbs come from the
//! [`DeviceCommand`] table, which binds the device name into the argument
//! list according to each verb's [`CommandSpec`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde_json::{Map, Value};

use crate::device::{Device, DeviceKind};
use crate::error::ValidationError;

/// A command verb with positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    args: Vec<Value>,
}

impl Command {
    /// A command with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// JSON request body: `{"<NAME>": [args…]}`, or `{"<NAME>": 0}` without
    /// arguments.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let payload = if self.args.is_empty() {
            Value::from(0)
        } else {
            Value::Array(self.args.clone())
        };
        let mut body = Map::with_capacity(1);
        body.insert(self.name.clone(), payload);
        Value::Object(body)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// RF channels the hub accepts for `SET_CHANNEL`.
pub const VALID_CHANNELS: [u8; 7] = [11, 14, 15, 19, 20, 24, 25];

/// A validated RF channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(u8);

impl TryFrom<u8> for Channel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if VALID_CHANNELS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidChannel(value))
        }
    }
}

impl Channel {
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Temperature display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempFormat {
    Celsius,
    Fahrenheit,
}

impl TempFormat {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl FromStr for TempFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            other => Err(ValidationError::InvalidTempFormat(other.to_string())),
        }
    }
}

/// Programming format of the hub's schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFormat {
    NonProgrammable,
    TwentyFourHoursFixed,
    FiveDayTwoDay,
    SevenDay,
}

impl ProgramFormat {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::NonProgrammable => "NONPROGRAMMABLE",
            Self::TwentyFourHoursFixed => "24HOURSFIXED",
            Self::FiveDayTwoDay => "5DAY/2DAY",
            Self::SevenDay => "7DAY",
        }
    }
}

impl FromStr for ProgramFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONPROGRAMMABLE" => Ok(Self::NonProgrammable),
            "24HOURSFIXED" => Ok(Self::TwentyFourHoursFixed),
            "5DAY/2DAY" => Ok(Self::FiveDayTwoDay),
            "7DAY" => Ok(Self::SevenDay),
            other => Err(ValidationError::InvalidFormat(other.to_string())),
        }
    }
}

/// Number of comfort levels per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCount {
    Four,
    Six,
}

impl TryFrom<u8> for LevelCount {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            other => Err(ValidationError::InvalidLevelCount(other)),
        }
    }
}

/// Holiday boundaries are sent as `HHMMSSDDMMYYYY`.
#[must_use]
pub fn holiday_timestamp(at: &NaiveDateTime) -> String {
    at.format("%H%M%S%d%m%Y").to_string()
}

/// Hub-scoped commands.
#[derive(Debug, Clone, PartialEq)]
pub enum HubCommand {
    Reset,
    Identify,
    SetChannel(Channel),
    SetTempFormat(TempFormat),
    SetFormat(ProgramFormat),
    Away(bool),
    Holiday {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    GetHoliday,
    CancelHoliday,
    GetSystem,
    GetLiveData,
    GetZones,
    GetDevices,
    GetDeviceList(String),
    DevicesSerialNumbers,
    GetEngineers,
    GetFirmware,
    Ntp(bool),
    SetDate(NaiveDate),
    SetTime(NaiveTime),
    TimeZone(f64),
    ManualDst(bool),
    Dst(bool),
    GetProfileNames,
    GetProfiles,
    SetLevels(LevelCount),
}

impl From<HubCommand> for Command {
    fn from(command: HubCommand) -> Self {
        match command {
            HubCommand::Reset => Self::new("RESET"),
            HubCommand::Identify => Self::new("IDENTIFY"),
            HubCommand::SetChannel(channel) => Self::new("SET_CHANNEL").arg(channel.get()),
            HubCommand::SetTempFormat(format) => Self::new("SET_TEMP_FORMAT").arg(format.as_wire()),
            HubCommand::SetFormat(format) => Self::new("SET_FORMAT").arg(format.as_wire()),
            HubCommand::Away(true) => Self::new("AWAY_ON"),
            HubCommand::Away(false) => Self::new("AWAY_OFF"),
            HubCommand::Holiday { start, end } => Self::new("HOLIDAY")
                .arg(holiday_timestamp(&start))
                .arg(holiday_timestamp(&end)),
            HubCommand::GetHoliday => Self::new("GET_HOLIDAY"),
            HubCommand::CancelHoliday => Self::new("CANCEL_HOLIDAY"),
            HubCommand::GetSystem => Self::new("GET_SYSTEM"),
            HubCommand::GetLiveData => Self::new("GET_LIVE_DATA"),
            HubCommand::GetZones => Self::new("GET_ZONES"),
            HubCommand::GetDevices => Self::new("GET_DEVICES"),
            HubCommand::GetDeviceList(room) => Self::new("GET_DEVICE_LIST").arg(room),
            HubCommand::DevicesSerialNumbers => Self::new("DEVICES_SN"),
            HubCommand::GetEngineers => Self::new("GET_ENGINEERS"),
            HubCommand::GetFirmware => Self::new("GET_FIRMWARE"),
            HubCommand::Ntp(true) => Self::new("NTP_ON"),
            HubCommand::Ntp(false) => Self::new("NTP_OFF"),
            HubCommand::SetDate(date) => Self::new("SET_DATE")
                .arg(date.year())
                .arg(date.month())
                .arg(date.day()),
            HubCommand::SetTime(time) => Self::new("SET_TIME").arg(time.hour()).arg(time.minute()),
            HubCommand::TimeZone(offset) => Self::new("TIME_ZONE").arg(offset),
            HubCommand::ManualDst(on) => Self::new("MANUAL_DST").arg(u8::from(on)),
            HubCommand::Dst(true) => Self::new("DST_ON"),
            HubCommand::Dst(false) => Self::new("DST_OFF"),
            HubCommand::GetProfileNames => Self::new("GET_PROFILE_NAMES"),
            HubCommand::GetProfiles => Self::new("GET_PROFILES"),
            HubCommand::SetLevels(LevelCount::Four) => Self::new("SET_LEVEL_4"),
            HubCommand::SetLevels(LevelCount::Six) => Self::new("SET_LEVEL_6"),
        }
    }
}

/// Position of the device name in a device command's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgOrder {
    /// `[device]`
    Device,
    /// `[value, device]`
    ValueDevice,
}

/// Device kinds a command may be issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliesTo {
    Any,
    Zone,
    Plug,
}

impl AppliesTo {
    #[must_use]
    pub fn accepts(self, kind: DeviceKind) -> bool {
        match self {
            Self::Any => true,
            Self::Zone => kind == DeviceKind::Zone,
            Self::Plug => kind == DeviceKind::Plug,
        }
    }
}

/// Wire shape of one device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: usize,
    pub order: ArgOrder,
    pub applies_to: AppliesTo,
}

/// Device-scoped commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Identify,
    GetProfile0,
    GetTimer0,
    StoreProfile0,
    StoreTimer0,
    HoursRun,
    FrostOn,
    FrostOff,
    TempLog,
    SetDiff,
    SetFloor,
    SetPreheat,
    SetFrost,
    SetDelay,
    Hold,
    Lock,
    Unlock,
    SetTemp,
    TimerHoldOn,
    TimerHoldOff,
}

impl DeviceCommand {
    pub const ALL: [Self; 20] = [
        Self::Identify,
        Self::GetProfile0,
        Self::GetTimer0,
        Self::StoreProfile0,
        Self::StoreTimer0,
        Self::HoursRun,
        Self::FrostOn,
        Self::FrostOff,
        Self::TempLog,
        Self::SetDiff,
        Self::SetFloor,
        Self::SetPreheat,
        Self::SetFrost,
        Self::SetDelay,
        Self::Hold,
        Self::Lock,
        Self::Unlock,
        Self::SetTemp,
        Self::TimerHoldOn,
        Self::TimerHoldOff,
    ];

    #[must_use]
    pub fn spec(self) -> CommandSpec {
        use AppliesTo::{Any, Plug, Zone};
        use ArgOrder::{Device, ValueDevice};

        let (name, order, applies_to) = match self {
            Self::Identify => ("IDENTIFY_DEV", Device, Any),
            Self::GetProfile0 => ("GET_PROFILE_0", Device, Any),
            Self::GetTimer0 => ("GET_TIMER_0", Device, Any),
            Self::StoreProfile0 => ("STORE_PROFILE_0", ValueDevice, Any),
            Self::StoreTimer0 => ("STORE_TIMER_0", ValueDevice, Any),
            Self::HoursRun => ("GET_HOURSRUN", Device, Any),
            Self::FrostOn => ("FROST_ON", Device, Any),
            Self::FrostOff => ("FROST_OFF", Device, Any),
            Self::TempLog => ("GET_TEMPLOG", Device, Zone),
            Self::SetDiff => ("SET_DIFF", ValueDevice, Zone),
            Self::SetFloor => ("SET_FLOOR", ValueDevice, Zone),
            Self::SetPreheat => ("SET_PREHEAT", ValueDevice, Zone),
            Self::SetFrost => ("SET_FROST", ValueDevice, Zone),
            Self::SetDelay => ("SET_DELAY", ValueDevice, Zone),
            Self::Hold => ("HOLD", ValueDevice, Zone),
            Self::Lock => ("LOCK", ValueDevice, Zone),
            Self::Unlock => ("UNLOCK", Device, Zone),
            Self::SetTemp => ("SET_TEMP", ValueDevice, Zone),
            Self::TimerHoldOn => ("TIMER_HOLD_ON", ValueDevice, Plug),
            Self::TimerHoldOff => ("TIMER_HOLD_OFF", ValueDevice, Plug),
        };
        let arity = match order {
            Device => 1,
            ValueDevice => 2,
        };
        CommandSpec {
            name,
            arity,
            order,
            applies_to,
        }
    }

    /// Bind the command to `device`, placing `value` first when the verb
    /// takes one.
    ///
    /// A missing value yields a shorter argument list; the request frame
    /// stays well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCommand`] when the verb does not
    /// apply to the device's kind.
    pub fn bind(self, device: &Device, value: Option<Value>) -> Result<Command, ValidationError> {
        let spec = self.spec();
        if !spec.applies_to.accepts(device.kind) {
            return Err(ValidationError::UnsupportedCommand {
                command: spec.name,
                kind: device.kind.as_str(),
            });
        }

        let mut command = Command::new(spec.name);
        if spec.order == ArgOrder::ValueDevice {
            if let Some(value) = value {
                command = command.arg(value);
            }
        }
        Ok(command.arg(device.name.as_str()))
    }
}
