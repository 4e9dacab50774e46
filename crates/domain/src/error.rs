//! Common error types used across the workspace.
//!
//! [`HubError`] is the shared taxonomy: every layer either returns it
//! directly or defines its own typed error and converts via `From`.

use std::error::Error as StdError;

/// Top-level error for everything that talks to, or reasons about, a hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Socket-level failure (discovery, connect, send, receive).
    #[error("transport error")]
    Transport(#[from] TransportError),

    /// Request/response protocol violation or misuse.
    #[error("protocol error")]
    Protocol(#[from] ProtocolError),

    /// A complete response did not have the expected shape.
    #[error("unexpected response")]
    Decode(#[from] DecodeError),

    /// A command argument was rejected before reaching the hub.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// Fetching a single device's data failed.
    #[error("failed to fetch data for device {device:?}")]
    DeviceFetch {
        /// Device name.
        device: String,
        /// Underlying failure.
        #[source]
        source: Box<HubError>,
    },

    /// The persisted-address store failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),
}

impl HubError {
    /// Whether this error means the underlying socket can no longer be used.
    ///
    /// Timeouts and framing errors abort a single command only; closed or
    /// failed sockets require the full connect sequence to run again.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Self::Transport(
                TransportError::Send(_) | TransportError::Recv(_) | TransportError::Closed
            ) | Self::Protocol(ProtocolError::NotConnected)
        )
    }
}

/// Socket-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No hub answered the discovery probe in time.
    #[error("hub discovery timed out")]
    DiscoveryTimeout,

    /// The discovery socket could not be opened or used.
    #[error("discovery socket error")]
    Discovery(#[source] std::io::Error),

    /// The TCP connection was not established within the connect timeout.
    #[error("connection to hub timed out")]
    ConnectTimeout,

    /// The TCP connection could not be established.
    #[error("failed to connect to hub")]
    Connect(#[source] std::io::Error),

    /// Writing a request failed.
    #[error("failed to send request")]
    Send(#[source] std::io::Error),

    /// No complete response arrived within the receive timeout.
    #[error("timed out waiting for response")]
    RecvTimeout,

    /// Reading from the socket failed.
    #[error("failed to read response")]
    Recv(#[source] std::io::Error),

    /// The hub closed the connection.
    #[error("connection closed by hub")]
    Closed,
}

/// Command protocol failures.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A command was issued while the connection is down.
    #[error("not connected to hub")]
    NotConnected,

    /// A command was issued while another one awaits its response.
    #[error("cannot send {command}: another command is in progress")]
    CommandInProgress {
        /// Name of the rejected command.
        command: String,
    },

    /// Data after the delimiter could not be parsed as JSON.
    #[error("malformed response payload")]
    Framing(#[source] serde_json::Error),
}

/// A response parsed as JSON but did not match the expected record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A required field was absent.
    #[error("missing field {field} in {record} response")]
    MissingField {
        /// Record being decoded.
        record: &'static str,
        /// Absent field.
        field: &'static str,
    },

    /// Serde rejected the payload.
    #[error("invalid {record} payload")]
    Invalid {
        /// Record being decoded.
        record: &'static str,
        /// Serde failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Arguments rejected before a command is sent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// RF channel outside the set the hub accepts.
    #[error("invalid channel {0}")]
    InvalidChannel(u8),

    /// Temperature format other than `C` or `F`.
    #[error("invalid temperature format {0:?}")]
    InvalidTempFormat(String),

    /// Programming format the hub does not know.
    #[error("invalid programming format {0:?}")]
    InvalidFormat(String),

    /// Comfort level count other than 4 or 6.
    #[error("invalid comfort level count {0}")]
    InvalidLevelCount(u8),

    /// Device command issued against the wrong kind of device.
    #[error("command {command} is not supported by {kind} devices")]
    UnsupportedCommand {
        /// Rejected command name.
        command: &'static str,
        /// Device kind it was issued against.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_command_in_progress_with_command_name() {
        let err = ProtocolError::CommandInProgress {
            command: "GET_LIVE_DATA".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot send GET_LIVE_DATA: another command is in progress"
        );
    }

    #[test]
    fn should_convert_transport_error_into_hub_error() {
        let err: HubError = TransportError::RecvTimeout.into();
        assert!(matches!(
            err,
            HubError::Transport(TransportError::RecvTimeout)
        ));
    }

    #[test]
    fn should_treat_closed_socket_as_connection_lost() {
        let err: HubError = TransportError::Closed.into();
        assert!(err.is_connection_lost());
    }

    #[test]
    fn should_not_treat_timeout_or_framing_as_connection_lost() {
        let timeout: HubError = TransportError::RecvTimeout.into();
        assert!(!timeout.is_connection_lost());

        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let framing: HubError = ProtocolError::Framing(json_err).into();
        assert!(!framing.is_connection_lost());
    }

    #[test]
    fn should_display_unsupported_command() {
        let err = ValidationError::UnsupportedCommand {
            command: "SET_TEMP",
            kind: "plug",
        };
        assert_eq!(
            err.to_string(),
            "command SET_TEMP is not supported by plug devices"
        );
    }
}
