//! End-to-end smoke tests for the full neohubd stack.
//!
//! Each test starts a fake hub on a loopback socket, connects the real
//! client to it (real transport, protocol, reconciler, gauge registry) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use neohub_adapter_http_axum::{AppState, GaugeRegistry, router};
use neohub_adapter_store_toml::{StoreConfig, TomlAddressStore};
use neohub_adapter_tcp::{ClientConfig, HubClient};
use neohub_app::ports::MetricsSink;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tower::ServiceExt;

fn respond(name: &str) -> Value {
    match name {
        "GET_LIVE_DATA" => json!({
            "HUB_AWAY": false,
            "HUB_HOLIDAY": false,
            "TIMESTAMP_DEVICE_LISTS": 5,
            "TIMESTAMP_ENGINEERS": 5,
            "TIMESTAMP_PROFILE_0": 5,
            "TIMESTAMP_PROFILE_COMFORT_LEVELS": 5,
            "devices": [
                {"ZONE_NAME": "Lounge", "SET_TEMP": "20.5", "ACTUAL_TEMP": "19.0",
                 "HEAT_ON": true, "ACTIVE_PROFILE": 2}
            ]
        }),
        "GET_SYSTEM" => json!({"NTP_ON": "Running"}),
        "GET_ZONES" => json!({"Lounge": 1}),
        "GET_DEVICES" => json!({"result": ["Lounge"]}),
        "GET_ENGINEERS" => json!({"Lounge": {"FROST_TEMP": 10}}),
        "GET_PROFILE_0" => json!({"TIMESTAMP": 5, "profiles": []}),
        "GET_PROFILES" => json!({}),
        _ => json!({"result": "ok"}),
    }
}

/// Minimal hub: one response per `\0\n`-terminated request.
async fn spawn_hub() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stream);
                let mut frame = Vec::new();
                while reader.read_until(b'\n', &mut frame).await.unwrap_or(0) > 0 {
                    let text: Vec<u8> = frame.iter().copied().filter(|b| *b != 0).collect();
                    let request: Value = serde_json::from_slice(text.trim_ascii()).unwrap();
                    let name = request.as_object().unwrap().keys().next().unwrap().clone();
                    let mut reply = respond(&name).to_string().into_bytes();
                    reply.extend_from_slice(b"\0\n");
                    reader.get_mut().write_all(&reply).await.unwrap();
                    frame.clear();
                }
            });
        }
    });
    port
}

async fn connected_app() -> (axum::Router, HubClient<TomlAddressStore>, tempfile::TempDir) {
    let port = spawn_hub().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = ClientConfig {
        address: Some("127.0.0.1".to_string()),
        device_id: Some("hub-e2e".to_string()),
        ..ClientConfig::default()
    };
    config.connection.port = port;
    let store = TomlAddressStore::new(StoreConfig {
        path: dir.path().join("neohub.toml"),
    });

    let gauges = Arc::new(GaugeRegistry::new());
    let sink: Arc<dyn MetricsSink> = gauges.clone();
    let client = HubClient::new(config, store, Some(sink));
    client.start().await;

    let state = AppState::new(client.watch_snapshot(), client.watch_connection(), gauges);
    (router::build(state), client, dir)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn should_expose_zone_gauges_after_initial_reconciliation() {
    let (app, mut client, _dir) = connected_app().await;

    let (status, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("neohub_ntp{hub_id=\"hub-e2e\"} 1"));
    assert!(body.contains("neohub_set_temp{hub_id=\"hub-e2e\",device=\"Lounge\"} 20.5"));
    assert!(body.contains("neohub_current_temp{hub_id=\"hub-e2e\",device=\"Lounge\"} 19"));
    assert!(body.contains("neohub_active_profile{hub_id=\"hub-e2e\",device=\"Lounge\"} 2"));
    client.stop().await;
}

#[tokio::test]
async fn should_list_zones_from_snapshot() {
    let (app, mut client, _dir) = connected_app().await;

    let (status, body) = get(app, "/api/zones").await;

    assert_eq!(status, StatusCode::OK);
    let zones: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(zones[0]["name"], "Lounge");
    assert_eq!(zones[0]["kind"], "zone");
    client.stop().await;
}

#[tokio::test]
async fn should_report_connection_state_in_hub_view() {
    let (app, mut client, _dir) = connected_app().await;

    let (status, body) = get(app.clone(), "/api/hub").await;
    assert_eq!(status, StatusCode::OK);
    let hub: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(hub["connection"], "connected");
    assert_eq!(hub["device_id"], "hub-e2e");

    client.stop().await;
    let (_, body) = get(app, "/api/hub").await;
    let hub: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(hub["connection"], "disconnected");
}
