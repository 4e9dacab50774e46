//! # neohubd: neohub daemon and CLI
//!
//! Composition root that wires the hub client, the address store and the
//! HTTP endpoint together.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, env vars)
//! - Initialise `tracing` output
//! - `serve`: keep a session open, poll the hub, and expose `/metrics` and
//!   the JSON API until interrupted
//! - One-shot commands: connect, print a view of the snapshot, disconnect
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use neohub_adapter_http_axum::{AppState, GaugeRegistry, router};
use neohub_adapter_store_toml::TomlAddressStore;
use neohub_adapter_tcp::{HubClient, discovery};
use neohub_app::ports::{AddressStore, MetricsSink};
use neohub_domain::device::Device;
use neohub_domain::state::HubState;
use neohub_domain::summary::{DeviceDetail, DeviceSummary, HubSummary, ProfileSummary};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "neohubd", about = "neohub heating hub client and metrics exporter", version)]
struct Cli {
    /// Configuration file.
    #[arg(long, short, default_value = "neohub.toml")]
    config: PathBuf,

    /// Give up connecting after this many seconds (one-shot commands only).
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the hub and serve metrics until interrupted.
    Serve,
    #[command(subcommand)]
    Hub(HubAction),
    #[command(subcommand)]
    Zone(ZoneAction),
    #[command(subcommand)]
    Plug(PlugAction),
    #[command(subcommand)]
    Profile(ProfileAction),
}

#[derive(Subcommand, Debug)]
enum HubAction {
    /// Broadcast a discovery probe and print the first hub that answers.
    Discover,
    /// Print the persisted hub address.
    ShowSaved,
    /// Forget the persisted hub address.
    DeleteSaved,
    /// Connect and print a hub overview.
    Status,
}

#[derive(Subcommand, Debug)]
enum ZoneAction {
    List,
    Show { name: String },
    /// Print the zone's active weekly profile.
    ShowProfile { name: String },
}

#[derive(Subcommand, Debug)]
enum PlugAction {
    List,
    Show { name: String },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    List,
    Show { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging.filter);

    let timeout = Duration::from_secs(cli.timeout_secs);
    match cli.command {
        Command::Serve => serve(config).await,
        Command::Hub(action) => hub(action, &config, timeout).await,
        Command::Zone(action) => {
            let state = snapshot(&config, timeout).await?;
            match action {
                ZoneAction::List => print_json(&summaries(&state.zones)),
                ZoneAction::Show { name } => {
                    let zone = state.zones.get(&name).ok_or_else(|| not_found("zone", &name))?;
                    print_json(&DeviceDetail::from(zone))
                }
                ZoneAction::ShowProfile { name } => {
                    let zone = state.zones.get(&name).ok_or_else(|| not_found("zone", &name))?;
                    let profile = zone
                        .profile_0
                        .as_ref()
                        .map(|p| ProfileSummary::from(&p.profile));
                    print_json(&profile)
                }
            }
        }
        Command::Plug(action) => {
            let state = snapshot(&config, timeout).await?;
            match action {
                PlugAction::List => print_json(&summaries(&state.plugs)),
                PlugAction::Show { name } => {
                    let plug = state.plugs.get(&name).ok_or_else(|| not_found("plug", &name))?;
                    print_json(&DeviceDetail::from(plug))
                }
            }
        }
        Command::Profile(action) => {
            let state = snapshot(&config, timeout).await?;
            match action {
                ProfileAction::List => print_json(
                    &state
                        .profiles
                        .values()
                        .map(ProfileSummary::from)
                        .collect::<Vec<_>>(),
                ),
                ProfileAction::Show { name } => {
                    let profile = state
                        .profiles
                        .get(&name)
                        .ok_or_else(|| not_found("profile", &name))?;
                    print_json(&ProfileSummary::from(profile))
                }
            }
        }
    }
}

fn init_tracing(filter: &str) {
    let (filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(err) = invalid {
        tracing::warn!(error = %err, "invalid log filter, falling back to info");
    }
}

async fn hub(action: HubAction, config: &Config, timeout: Duration) -> Result<()> {
    let store = TomlAddressStore::new(config.store.clone());
    match action {
        HubAction::Discover => {
            let hub = discovery::discover(&config.hub.discovery)
                .await
                .context("hub discovery failed")?;
            store.save(hub.clone()).await?;
            print_json(&hub)
        }
        HubAction::ShowSaved => print_json(&store.load().await?),
        HubAction::DeleteSaved => {
            store.delete().await?;
            tracing::info!(path = %store.path().display(), "forgot hub address");
            Ok(())
        }
        HubAction::Status => {
            let state = snapshot(config, timeout).await?;
            print_json(&HubSummary::from(state.as_ref()))
        }
    }
}

/// Connect, run one reconciliation and disconnect.
async fn snapshot(config: &Config, timeout: Duration) -> Result<Arc<HubState>> {
    let store = TomlAddressStore::new(config.store.clone());
    let mut client = HubClient::new(config.hub.clone(), store, None);
    let started = tokio::time::timeout(timeout, client.start()).await;
    client.stop().await;
    started.map_err(|_| anyhow!("no hub session within {timeout:?}"))
}

async fn serve(config: Config) -> Result<()> {
    let gauges = Arc::new(GaugeRegistry::new());
    let sink: Arc<dyn MetricsSink> = gauges.clone();
    let store = TomlAddressStore::new(config.store.clone());
    let mut client = HubClient::new(config.hub.clone(), store, Some(sink));

    let state = AppState::new(client.watch_snapshot(), client.watch_connection(), gauges);
    let app = router::build(state);
    let listener = tokio::net::TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.http.bind))?;
    tracing::info!(bind = %config.http.bind, "neohubd listening");
    let mut server = tokio::spawn(async move { axum::serve(listener, app).await });

    let started = tokio::select! {
        snapshot = client.start() => Some(snapshot),
        () = shutdown_signal() => None,
    };
    if let Some(snapshot) = started {
        tracing::info!(
            hub = %snapshot.identity,
            zones = snapshot.zones.len(),
            plugs = snapshot.plugs.len(),
            "initial snapshot ready"
        );
        client.start_poll();
        tokio::select! {
            result = &mut server => match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(error = %err, "server error"),
                Err(err) => tracing::error!(error = %err, "server task failed"),
            },
            () = shutdown_signal() => {}
        }
    }

    tracing::info!("shutting down");
    server.abort();
    client.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn summaries(devices: &BTreeMap<String, Device>) -> Vec<DeviceSummary> {
    devices.values().map(DeviceSummary::from).collect()
}

fn not_found(kind: &str, name: &str) -> anyhow::Error {
    anyhow!("{kind} {name:?} not found")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
