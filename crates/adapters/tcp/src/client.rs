//! Long-lived hub session: discovery, connect, reconciliation and polling.
//!
//! [`HubClient`] owns at most one [`Protocol`] at a time together with the
//! [`HubState`] it reconciles. Connect failures dispose the connection,
//! forget the persisted address, wait the reconnect backoff and start over;
//! the loop only gives up when the client is stopped, and only while
//! waiting between attempts. Readers observe completed snapshots through a
//! `watch` channel and lifecycle changes through the event bus.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use neohub_app::event_bus::InProcessEventBus;
use neohub_app::ports::{AddressStore, EventPublisher, MetricsSink};
use neohub_app::reconcile::Reconciler;
use neohub_domain::error::{HubError, ProtocolError};
use neohub_domain::event::SessionEvent;
use neohub_domain::identity::{ConnectionState, HubIdentity};
use neohub_domain::state::HubState;

use crate::config::ClientConfig;
use crate::discovery;
use crate::protocol::{Protocol, stopped};
use crate::transport::Transport;

const EVENT_CAPACITY: usize = 64;

struct Session {
    protocol: Protocol,
    reconciler: Reconciler<Protocol>,
    state: HubState,
}

#[derive(Default)]
struct Slot {
    /// Identity of the hub last connected to, reused on reconnect.
    identity: Option<HubIdentity>,
    active: Option<Session>,
}

struct Shared<S> {
    config: ClientConfig,
    store: S,
    events: InProcessEventBus,
    metrics: Option<Arc<dyn MetricsSink>>,
    snapshot: watch::Sender<Option<Arc<HubState>>>,
    connection: watch::Sender<ConnectionState>,
    /// Raised by `stop_poll`. Checked only between commands.
    stopping: watch::Sender<bool>,
    slot: Mutex<Slot>,
}

/// Client session for one hub.
pub struct HubClient<S> {
    shared: Arc<Shared<S>>,
    poll: Option<JoinHandle<()>>,
}

impl<S> HubClient<S>
where
    S: AddressStore + Send + Sync + 'static,
{
    /// Create an idle client. Nothing touches the network until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(config: ClientConfig, store: S, metrics: Option<Arc<dyn MetricsSink>>) -> Self {
        let (snapshot, _) = watch::channel(None);
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        let (stopping, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                config,
                store,
                events: InProcessEventBus::new(EVENT_CAPACITY),
                metrics,
                snapshot,
                connection,
                stopping,
                slot: Mutex::new(Slot::default()),
            }),
            poll: None,
        }
    }

    /// Connect and run the initial reconciliation.
    ///
    /// Retries until it succeeds. Returns the current snapshot immediately
    /// when already connected.
    pub async fn start(&self) -> Arc<HubState> {
        let mut slot = self.shared.slot.lock().await;
        if slot.active.is_some()
            && let Some(snapshot) = self.snapshot()
        {
            return snapshot;
        }
        self.shared.stopping.send_replace(false);
        loop {
            // Only `stop_poll` raises the flag and it needs `&mut self`.
            if let Some(snapshot) = self.shared.connect(&mut slot).await {
                return snapshot;
            }
        }
    }

    /// Reconcile every poll interval until [`stop_poll`](Self::stop_poll).
    pub fn start_poll(&mut self) {
        if self.poll.is_some() {
            return;
        }
        self.shared.stopping.send_replace(false);
        let shared = Arc::clone(&self.shared);
        let period = shared.config.poll_interval();
        tracing::debug!(?period, "starting poll");
        self.poll = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut stopping = shared.stopping.subscribe();
            loop {
                tokio::select! {
                    biased;
                    () = stopped(&mut stopping) => break,
                    _ = ticker.tick() => {}
                }
                shared.poll().await;
            }
        }));
    }

    /// Stop polling after the running cycle, if any, has finished.
    ///
    /// A reconnect in progress gives up at its next wait.
    pub async fn stop_poll(&mut self) {
        self.shared.stopping.send_replace(true);
        if let Some(handle) = self.poll.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "poll task ended abnormally");
            }
            tracing::debug!("poll stopped");
        }
    }

    /// Stop polling and close the connection once any in-flight command
    /// has completed.
    pub async fn stop(&mut self) {
        self.stop_poll().await;
        let mut slot = self.shared.slot.lock().await;
        self.shared.teardown(&mut slot, "client stopped").await;
        self.shared
            .connection
            .send_replace(ConnectionState::Disconnected);
    }

    /// Latest completed snapshot, if any cycle has finished.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<HubState>> {
        self.shared.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn watch_snapshot(&self) -> watch::Receiver<Option<Arc<HubState>>> {
        self.shared.snapshot.subscribe()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection.borrow()
    }

    #[must_use]
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connection.subscribe()
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Handle to the active connection for issuing commands.
    ///
    /// Commands share the single-flight rule with polling and keep-alive.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotConnected`] when there is no session.
    pub async fn channel(&self) -> Result<Protocol, HubError> {
        let slot = self.shared.slot.lock().await;
        slot.active
            .as_ref()
            .map(|session| session.protocol.clone())
            .ok_or_else(|| ProtocolError::NotConnected.into())
    }
}

impl<S> Drop for HubClient<S> {
    fn drop(&mut self) {
        // The detached poll task exits after its current cycle.
        self.shared.stopping.send_replace(true);
    }
}

impl<S: AddressStore + Send + Sync> Shared<S> {
    /// Connect, retrying after the backoff. Returns `None` once the client
    /// is stopping.
    async fn connect(&self, slot: &mut Slot) -> Option<Arc<HubState>> {
        loop {
            let identity = self.resolve_identity(slot).await?;
            self.connection.send_replace(ConnectionState::Connecting);
            match self.establish(&identity).await {
                Ok(session) => {
                    let snapshot = Arc::new(session.state.clone());
                    self.snapshot.send_replace(Some(Arc::clone(&snapshot)));
                    self.connection.send_replace(ConnectionState::Connected);
                    slot.identity = Some(identity.clone());
                    slot.active = Some(session);
                    tracing::info!(hub = %identity, "connected to hub");
                    self.emit(SessionEvent::Connected { hub: identity }).await;
                    return Some(snapshot);
                }
                Err(err) => {
                    tracing::error!(hub = %identity, error = %err, "failed to connect to hub");
                    self.connection.send_replace(ConnectionState::Failed);
                    slot.identity = None;
                    if let Err(err) = self.store.delete().await {
                        tracing::warn!(error = %err, "failed to forget hub address");
                    }
                    let backoff = self.config.reconnect_backoff();
                    tracing::info!(?backoff, "reconnecting after backoff");
                    if !self.pause(backoff).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Cached identity, then the configured address, then the persisted
    /// one, then discovery retried until a hub answers.
    async fn resolve_identity(&self, slot: &Slot) -> Option<HubIdentity> {
        if let Some(identity) = &slot.identity {
            return Some(identity.clone());
        }
        if let Some(address) = &self.config.address {
            let device_id = self.config.device_id.as_ref().unwrap_or(address);
            return Some(HubIdentity::new(address.as_str(), device_id.as_str()));
        }
        match self.store.load().await {
            Ok(Some(identity)) => {
                tracing::debug!(hub = %identity, "using persisted hub address");
                return Some(identity);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "failed to load persisted hub address"),
        }
        loop {
            let mut stopping = self.stopping.subscribe();
            let found = tokio::select! {
                () = stopped(&mut stopping) => return None,
                found = discovery::discover(&self.config.discovery) => found,
            };
            match found {
                Ok(identity) => {
                    if let Err(err) = self.store.save(identity.clone()).await {
                        tracing::warn!(error = %err, "failed to persist hub address");
                    }
                    self.emit(SessionEvent::HubDiscovered {
                        hub: identity.clone(),
                    })
                    .await;
                    return Some(identity);
                }
                Err(err) => {
                    let wait = self.config.discovery.retry_wait();
                    tracing::warn!(error = %err, ?wait, "hub discovery failed, retrying");
                    if !self.pause(wait).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Sleep for `wait`. Returns `false` early if the client is stopping.
    async fn pause(&self, wait: Duration) -> bool {
        let mut stopping = self.stopping.subscribe();
        tokio::select! {
            () = stopped(&mut stopping) => false,
            () = tokio::time::sleep(wait) => true,
        }
    }

    async fn establish(&self, identity: &HubIdentity) -> Result<Session, HubError> {
        let connection = &self.config.connection;
        let transport = Transport::connect(
            &identity.address,
            connection.port,
            connection.connect_timeout(),
        )
        .await?;
        let protocol = Protocol::new(
            transport,
            connection.recv_timeout(),
            connection.keep_alive(),
        );
        let mut reconciler = Reconciler::new(protocol.clone());
        if let Some(sink) = &self.metrics {
            reconciler = reconciler.with_metrics(Arc::clone(sink));
        }

        let mut state = HubState::new(identity.clone());
        match reconciler.update_network(&mut state).await {
            Ok(report) => {
                tracing::debug!(?report, "initial reconciliation finished");
                Ok(Session {
                    protocol,
                    reconciler,
                    state,
                })
            }
            Err(err) => {
                protocol.dispose().await;
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn poll(&self) {
        let mut slot = self.slot.lock().await;
        let Some(session) = slot.active.as_mut() else {
            tracing::info!("no hub session, reconnecting");
            self.connect(&mut slot).await;
            return;
        };
        match session.reconciler.update_network(&mut session.state).await {
            Ok(report) => {
                tracing::debug!(?report, "network updated");
                let snapshot = Arc::new(session.state.clone());
                let hub_id = snapshot.hub_id().to_string();
                self.snapshot.send_replace(Some(snapshot));
                self.emit(SessionEvent::NetworkUpdated {
                    hub_id,
                    at: Utc::now(),
                })
                .await;
            }
            Err(err) if err.is_connection_lost() => {
                tracing::error!(error = %err, "hub connection lost, reconnecting");
                self.teardown(&mut slot, &err.to_string()).await;
                self.connect(&mut slot).await;
            }
            Err(err) => tracing::error!(error = %err, "unable to update network"),
        }
    }

    async fn teardown(&self, slot: &mut Slot, reason: &str) {
        let Some(session) = slot.active.take() else {
            return;
        };
        session.protocol.dispose().await;
        self.connection.send_replace(ConnectionState::Disconnected);
        tracing::info!(hub = %session.state.identity, reason, "disconnected from hub");
        self.emit(SessionEvent::Disconnected {
            hub: session.state.identity,
            reason: reason.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: SessionEvent) {
        if let Err(err) = self.events.publish(event).await {
            tracing::warn!(error = %err, "failed to publish session event");
        }
    }
}
