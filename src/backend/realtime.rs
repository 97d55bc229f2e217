// src/backend/realtime.rs
//
// Consumer for the backend's realtime change channel (Phoenix protocol
// over websocket). Subscribes to the order and return tables and forwards
// every change event to the hub as a refetch hint. Fire-and-forget: no
// replay on reconnect, no ordering across events.

use actix::Addr;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::Config;
use crate::ws::{EventHub, TableChanged};

const TOPICS: [&str; 2] = ["realtime:public:pedidos", "realtime:public:devoluciones"];
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ChannelMessage {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    event: String,
}

/// Spawns the subscription task when anon credentials are present. Without
/// them the admin views simply poll, so this silently does nothing.
pub fn spawn(config: &Config, hub: Addr<EventHub>) {
    let Some((base_url, apikey)) = config.anon_credentials() else {
        log::warn!("realtime channel disabled: backend credentials not configured");
        return;
    };

    let ws_url = websocket_url(&base_url, &apikey);
    tokio::spawn(async move {
        loop {
            if let Err(e) = run_connection(&ws_url, &hub).await {
                log::warn!("realtime connection lost: {e}");
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    });
}

fn websocket_url(base_url: &str, apikey: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{ws_base}/realtime/v1/websocket?apikey={apikey}&vsn=1.0.0")
}

async fn run_connection(ws_url: &str, hub: &Addr<EventHub>) -> Result<(), String> {
    let (stream, _) = connect_async(ws_url).await.map_err(|e| e.to_string())?;
    let (mut write, mut read) = stream.split();

    for (i, topic) in TOPICS.iter().enumerate() {
        let join = json!({
            "topic": topic,
            "event": "phx_join",
            "payload": {},
            "ref": (i + 1).to_string(),
        });
        write
            .send(Message::Text(join.to_string().into()))
            .await
            .map_err(|e| e.to_string())?;
    }
    log::info!("realtime channel subscribed to {TOPICS:?}");

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let beat = json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": "hb",
                });
                write
                    .send(Message::Text(beat.to_string().into()))
                    .await
                    .map_err(|e| e.to_string())?;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_message(text.as_str(), hub),
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        return Err("channel closed".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.to_string()),
                }
            }
        }
    }
}

fn handle_message(text: &str, hub: &Addr<EventHub>) {
    let Ok(msg) = serde_json::from_str::<ChannelMessage>(text) else {
        return;
    };
    if !matches!(msg.event.as_str(), "INSERT" | "UPDATE" | "DELETE") {
        return;
    }
    // Topic shape is realtime:<schema>:<table>.
    let Some(table) = msg.topic.rsplit(':').next() else {
        return;
    };
    hub.do_send(TableChanged {
        table: table.to_string(),
    });
}
