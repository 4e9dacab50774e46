//! UDP broadcast discovery.
//!
//! The hub answers a `hubseek` datagram with `{"ip": ..., "device_id": ...}`.
//! Probes repeat until a usable reply arrives or the attempt times out. The
//! probe itself is often echoed back on the broadcast segment and is
//! ignored, as is any reply missing either field.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde_json::Value;
use tokio::net::UdpSocket;

use neohub_domain::error::TransportError;
use neohub_domain::identity::HubIdentity;

use crate::config::DiscoveryConfig;

/// Payload of the discovery probe.
pub const PROBE: &[u8] = b"hubseek";

/// Broadcast probes until a hub answers.
///
/// The socket lives only for the duration of the call.
///
/// # Errors
///
/// Returns [`TransportError::Discovery`] if the socket cannot be opened or
/// read, and [`TransportError::DiscoveryTimeout`] if no hub answered within
/// the configured timeout.
#[tracing::instrument(skip(config), fields(
    broadcast = %config.broadcast_address,
    port = config.broadcast_port,
))]
pub async fn discover(config: &DiscoveryConfig) -> Result<HubIdentity, TransportError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.listen_port))
        .await
        .map_err(TransportError::Discovery)?;
    socket
        .set_broadcast(true)
        .map_err(TransportError::Discovery)?;

    let target = SocketAddr::from((config.broadcast_address, config.broadcast_port));
    tracing::debug!("starting hub discovery");

    tokio::time::timeout(
        config.timeout(),
        probe_until_reply(&socket, target, config.probe_interval()),
    )
    .await
    .map_err(|_| TransportError::DiscoveryTimeout)?
}

async fn probe_until_reply(
    socket: &UdpSocket,
    target: SocketAddr,
    interval: Duration,
) -> Result<HubIdentity, TransportError> {
    let mut ticker = tokio::time::interval(interval);
    let mut buffer = [0u8; 1024];

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::trace!(%target, "sending discovery probe");
                if let Err(err) = socket.send_to(PROBE, target).await {
                    tracing::warn!(error = %err, "failed to send discovery probe");
                }
            }
            received = socket.recv_from(&mut buffer) => {
                let (len, peer) = received.map_err(TransportError::Discovery)?;
                if let Some(hub) = parse_reply(&buffer[..len], peer) {
                    tracing::info!(%hub, "hub discovered");
                    return Ok(hub);
                }
            }
        }
    }
}

fn parse_reply(message: &[u8], peer: SocketAddr) -> Option<HubIdentity> {
    if message == PROBE {
        tracing::trace!(%peer, "ignoring probe echo");
        return None;
    }
    let reply: Value = match serde_json::from_slice(message) {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(%peer, error = %err, "malformed discovery reply");
            return None;
        }
    };
    let hub = HubIdentity::from_discovery_reply(&reply);
    if hub.is_none() {
        tracing::debug!(%peer, "discovery reply without ip or device_id");
    }
    hub
}
