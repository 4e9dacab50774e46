//! Delimited-JSON command protocol over a [`Transport`].
//!
//! Requests are one JSON object followed by `\0\n`. A response is complete
//! once the accumulated buffer contains a NUL byte; NULs are stripped, the
//! text is trimmed and parsed as JSON. At most one command is in flight per
//! connection: a concurrent caller is rejected rather than queued, and the
//! keep-alive simply skips a tick when the channel is busy.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior};

use neohub_app::ports::HubChannel;
use neohub_domain::command::{Command, HubCommand};
use neohub_domain::error::{HubError, ProtocolError};

use crate::transport::Transport;

/// Bytes terminating every request.
pub const REQUEST_TERMINATOR: &[u8] = b"\0\n";

/// Serialize `command` into a request frame.
#[must_use]
pub fn encode_frame(command: &Command) -> Vec<u8> {
    let mut frame = command.to_json().to_string().into_bytes();
    frame.extend_from_slice(REQUEST_TERMINATOR);
    frame
}

/// Extract a complete response from `buffer`.
///
/// Returns `Ok(None)` until a NUL byte has been received.
///
/// # Errors
///
/// Returns [`ProtocolError::Framing`] if the delimited payload is not JSON.
/// More data will not fix it, so the caller must not keep reading.
pub fn delimited_json(buffer: &[u8]) -> Result<Option<Value>, HubError> {
    if !buffer.contains(&0) {
        return Ok(None);
    }
    let payload: Vec<u8> = buffer.iter().copied().filter(|b| *b != 0).collect();
    serde_json::from_slice(payload.trim_ascii())
        .map(Some)
        .map_err(|err| ProtocolError::Framing(err).into())
}

struct Inner {
    transport: Mutex<Option<Transport>>,
    connected: AtomicBool,
    recv_timeout: Duration,
    /// Raised on dispose. Dropping it also ends the keep-alive loop.
    stopping: watch::Sender<bool>,
}

/// Request/response codec over one hub connection.
///
/// Cloning yields another handle to the same connection.
#[derive(Clone)]
pub struct Protocol {
    inner: Arc<Inner>,
}

impl Protocol {
    /// Take ownership of `transport` and start the keep-alive timer.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(transport: Transport, recv_timeout: Duration, keep_alive: Duration) -> Self {
        let (stopping, stop_rx) = watch::channel(false);
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            tokio::spawn(keep_alive_loop(weak.clone(), stop_rx, keep_alive));
            Inner {
                transport: Mutex::new(Some(transport)),
                connected: AtomicBool::new(true),
                recv_timeout,
                stopping,
            }
        });
        Self { inner }
    }

    /// Whether the connection is still usable.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Send `command` and wait for its response.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::NotConnected`] once the connection is lost or
    ///   disposed.
    /// - [`ProtocolError::CommandInProgress`] if another command is awaiting
    ///   its response. Nothing is written in that case.
    /// - Transport errors and [`ProtocolError::Framing`] for the exchange
    ///   itself. Connection-lost errors also mark the protocol disconnected.
    #[tracing::instrument(skip(self, command), fields(command = %command.name()))]
    pub async fn request(&self, command: Command) -> Result<Value, HubError> {
        if !self.is_connected() {
            tracing::warn!("cannot send command, not connected");
            return Err(ProtocolError::NotConnected.into());
        }
        let Ok(mut guard) = self.inner.transport.try_lock() else {
            tracing::warn!("command rejected, another command is in progress");
            return Err(ProtocolError::CommandInProgress {
                command: command.name().to_string(),
            }
            .into());
        };
        let Some(transport) = guard.as_mut() else {
            return Err(ProtocolError::NotConnected.into());
        };

        let result = exchange(transport, &command, self.inner.recv_timeout).await;
        if let Err(err) = &result
            && err.is_connection_lost()
        {
            tracing::warn!(error = %err, "hub connection lost");
            self.inner.connected.store(false, Ordering::Release);
        }
        result
    }

    /// Stop the keep-alive, let an in-flight command finish, then close
    /// the socket. Later requests fail with [`ProtocolError::NotConnected`].
    ///
    /// The keep-alive only stops between ticks: a keep-alive already
    /// waiting for its response keeps the lock until it completes.
    pub async fn dispose(&self) {
        self.inner.stopping.send_replace(true);
        self.inner.connected.store(false, Ordering::Release);
        let transport = self.inner.transport.lock().await.take();
        if let Some(transport) = transport {
            transport.shutdown().await;
            tracing::debug!("hub connection disposed");
        }
    }
}

impl HubChannel for Protocol {
    fn send_command(&self, command: Command) -> impl Future<Output = Result<Value, HubError>> + Send {
        self.request(command)
    }
}

async fn exchange(
    transport: &mut Transport,
    command: &Command,
    recv_timeout: Duration,
) -> Result<Value, HubError> {
    transport.discard_pending()?;
    transport.send(&encode_frame(command)).await?;
    let response = transport.recv(delimited_json, recv_timeout).await?;
    tracing::trace!(%response, "response");
    Ok(response)
}

/// Resolve once the flag is raised or its sender is gone.
pub(crate) async fn stopped(stopping: &mut watch::Receiver<bool>) {
    let _ = stopping.wait_for(|stop| *stop).await;
}

async fn keep_alive_loop(
    inner: Weak<Inner>,
    mut stopping: watch::Receiver<bool>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = stopped(&mut stopping) => break,
            _ = ticker.tick() => {}
        }
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let protocol = Protocol { inner };
        match protocol.request(HubCommand::GetSystem.into()).await {
            Ok(_) => tracing::trace!("keep-alive acknowledged"),
            Err(HubError::Protocol(ProtocolError::CommandInProgress { .. })) => {
                tracing::debug!("keep-alive skipped, channel busy");
            }
            Err(err) => tracing::warn!(error = %err, "keep-alive failed"),
        }
    }
}
