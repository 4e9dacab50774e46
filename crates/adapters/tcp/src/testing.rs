//! Loopback fake hub shared by the protocol and client tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

pub(crate) type Responder = Arc<dyn Fn(&str, &Value) -> Value + Send + Sync>;

/// TCP server speaking the hub framing, answering each request through a
/// responder closure keyed by command name.
pub(crate) struct FakeHub {
    pub(crate) addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    accepted: Arc<Mutex<usize>>,
    hang_up: Arc<Notify>,
}

impl FakeHub {
    pub(crate) async fn spawn(responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(Mutex::new(0));
        let hang_up = Arc::new(Notify::new());
        let log = Arc::clone(&received);
        let count = Arc::clone(&accepted);
        let hang_up_signal = Arc::clone(&hang_up);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                *count.lock().unwrap() += 1;
                tokio::spawn(serve(
                    stream,
                    Arc::clone(&responder),
                    Arc::clone(&log),
                    Arc::clone(&hang_up_signal),
                ));
            }
        });
        Self {
            addr,
            received,
            accepted,
            hang_up,
        }
    }

    /// Number of connections accepted so far.
    pub(crate) fn accepted(&self) -> usize {
        *self.accepted.lock().unwrap()
    }

    /// Close every idle connection, as a rebooting hub would.
    pub(crate) fn hang_up(&self) {
        self.hang_up.notify_waiters();
    }

    /// Command names received so far, in order.
    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

async fn serve(
    stream: TcpStream,
    responder: Responder,
    log: Arc<Mutex<Vec<String>>>,
    hang_up: Arc<Notify>,
) {
    let mut reader = BufReader::new(stream);
    let mut frame = Vec::new();
    loop {
        frame.clear();
        let read = tokio::select! {
            read = reader.read_until(b'\n', &mut frame) => read,
            () = hang_up.notified() => break,
        };
        match read {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let text: Vec<u8> = frame.iter().copied().filter(|b| *b != 0).collect();
        let Ok(Value::Object(request)) = serde_json::from_slice::<Value>(text.trim_ascii()) else {
            continue;
        };
        let Some((name, args)) = request.into_iter().next() else {
            continue;
        };
        log.lock().unwrap().push(name.clone());
        let mut reply = responder(&name, &args).to_string().into_bytes();
        reply.extend_from_slice(b"\0\n");
        if reader.get_mut().write_all(&reply).await.is_err() {
            break;
        }
    }
}

/// Responses for a small network: one zone, one plug, one named profile.
pub(crate) fn small_network(name: &str, _args: &Value) -> Value {
    match name {
        "GET_LIVE_DATA" => json!({
            "HUB_AWAY": false,
            "HUB_HOLIDAY": false,
            "TIMESTAMP_DEVICE_LISTS": 1,
            "TIMESTAMP_ENGINEERS": 1,
            "TIMESTAMP_PROFILE_0": 1,
            "TIMESTAMP_PROFILE_COMFORT_LEVELS": 1,
            "devices": [
                {"ZONE_NAME": "Kitchen", "SET_TEMP": "21.0", "ACTUAL_TEMP": "19.5", "HEAT_ON": true},
                {"ZONE_NAME": "Lamp", "TIMER_ON": false}
            ]
        }),
        "GET_SYSTEM" => json!({"NTP_ON": "Running", "TIMESTAMP": 0}),
        "GET_ZONES" => json!({"Kitchen": 1}),
        "GET_DEVICES" => json!({"result": ["Kitchen", "Lamp"]}),
        "GET_ENGINEERS" => json!({"Kitchen": {"FROST_TEMP": 12}, "Lamp": {}}),
        "GET_PROFILE_0" => json!({
            "TIMESTAMP": 1,
            "profiles": [{"device": "Kitchen", "sunday": {
                "wake": ["07:00", 21, 16, true],
                "level1": ["09:00", 18, 16, false],
                "sleep": ["22:00", 16, 16, false]
            }}]
        }),
        "GET_PROFILES" => json!({
            "Weekday": {
                "PROFILE_ID": 1,
                "name": "Weekday",
                "info": {"sunday": {
                    "wake": ["07:00", 21, 16, true],
                    "level1": ["09:00", 18, 16, false],
                    "sleep": ["22:00", 16, 16, false]
                }}
            }
        }),
        _ => json!({"result": "ok"}),
    }
}
