//! Identities: the hub's network identity and per-device identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Network address and device id of a discovered hub.
///
/// Immutable once discovered; persisted by the application's address store
/// so the next start can skip discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HubIdentity {
    /// IP address or host name of the hub.
    pub address: String,
    /// Hub device identifier as reported by discovery.
    pub device_id: String,
}

impl HubIdentity {
    /// Build an identity from its parts.
    #[must_use]
    pub fn new(address: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            device_id: device_id.into(),
        }
    }

    /// Parse a discovery reply.
    ///
    /// Returns `None` unless the message carries both a non-empty `ip` and a
    /// non-empty `device_id`.
    #[must_use]
    pub fn from_discovery_reply(reply: &Value) -> Option<Self> {
        let address = non_empty_string(reply.get("ip")?)?;
        let device_id = non_empty_string(reply.get("device_id")?)?;
        Some(Self {
            address,
            device_id,
        })
    }
}

impl fmt::Display for HubIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.device_id, self.address)
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Identifier the hub assigns to a zone or plug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Numeric device id, when the hub reports one.
    pub id: Option<i64>,
    /// Change timestamp attached to the identity, when reported.
    pub timestamp: Option<i64>,
}

impl DeviceIdentity {
    /// Decode one entry of a `GET_ZONES` reply.
    ///
    /// Hubs report either a bare id (`"Kitchen": 3`) or an object carrying
    /// `DEVICE_ID` and `TIMESTAMP`.
    #[must_use]
    pub fn from_zone_entry(entry: &Value) -> Self {
        match entry {
            Value::Number(n) => Self {
                id: n.as_i64(),
                timestamp: None,
            },
            Value::Object(map) => Self {
                id: map.get("DEVICE_ID").and_then(Value::as_i64),
                timestamp: map.get("TIMESTAMP").and_then(Value::as_i64),
            },
            _ => Self::default(),
        }
    }
}

/// Lifecycle state of the hub connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_discovery_reply_with_ip_and_device_id() {
        let reply = json!({"ip": "192.168.1.20", "device_id": "ab:cd:ef"});
        let identity = HubIdentity::from_discovery_reply(&reply).unwrap();
        assert_eq!(identity, HubIdentity::new("192.168.1.20", "ab:cd:ef"));
    }

    #[test]
    fn should_reject_discovery_reply_without_device_id() {
        let reply = json!({"ip": "192.168.1.20"});
        assert!(HubIdentity::from_discovery_reply(&reply).is_none());
    }

    #[test]
    fn should_reject_discovery_reply_with_empty_ip() {
        let reply = json!({"ip": "", "device_id": "x"});
        assert!(HubIdentity::from_discovery_reply(&reply).is_none());
    }

    #[test]
    fn should_decode_bare_zone_id() {
        let identity = DeviceIdentity::from_zone_entry(&json!(7));
        assert_eq!(identity.id, Some(7));
        assert_eq!(identity.timestamp, None);
    }

    #[test]
    fn should_decode_zone_object_entry() {
        let identity =
            DeviceIdentity::from_zone_entry(&json!({"DEVICE_ID": 4, "TIMESTAMP": 1700}));
        assert_eq!(identity.id, Some(4));
        assert_eq!(identity.timestamp, Some(1700));
    }

    #[test]
    fn should_display_connection_state() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
