//! Network configuration for discovery, the TCP connection and the client.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

/// UDP discovery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Destination of the `hubseek` probe.
    pub broadcast_address: Ipv4Addr,
    /// Port the hub listens on for probes.
    pub broadcast_port: u16,
    /// Local port the reply is received on.
    pub listen_port: u16,
    /// Interval between probes, in seconds.
    pub probe_interval_secs: u64,
    /// How long one discovery attempt may take, in seconds.
    pub timeout_secs: u64,
    /// Wait before retrying a failed discovery, in seconds.
    pub retry_wait_secs: u64,
}

impl DiscoveryConfig {
    #[must_use]
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs(self.retry_wait_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast_address: Ipv4Addr::BROADCAST,
            broadcast_port: 19790,
            listen_port: 19790,
            probe_interval_secs: 5,
            timeout_secs: 15,
            retry_wait_secs: 15,
        }
    }
}

/// TCP connection and protocol settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Hub command port.
    pub port: u16,
    pub connect_timeout_secs: u64,
    /// Maximum wait for a complete response, in seconds.
    pub recv_timeout_secs: u64,
    /// Interval between keep-alive requests, in seconds.
    pub keep_alive_secs: u64,
}

impl ConnectionConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_secs(self.recv_timeout_secs)
    }

    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: 4242,
            connect_timeout_secs: 15,
            recv_timeout_secs: 30,
            keep_alive_secs: 30,
        }
    }
}

/// Settings for the long-lived [`HubClient`](crate::HubClient).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Fixed hub address. When set, discovery and the address store are
    /// bypassed.
    pub address: Option<String>,
    /// Device id reported for a fixed address. Defaults to the address.
    pub device_id: Option<String>,
    /// Interval between reconciliation cycles, in seconds.
    pub poll_interval_secs: u64,
    /// Wait before reconnecting after a failed connect, in seconds.
    pub reconnect_backoff_secs: u64,
    pub discovery: DiscoveryConfig,
    pub connection: ConnectionConfig,
}

impl ClientConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: None,
            device_id: None,
            poll_interval_secs: 10,
            reconnect_backoff_secs: 5,
            discovery: DiscoveryConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }
}
