use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::postgrest::{RECORD_ID, TABLE};
use crate::config::SupabaseConfig;
use crate::core::model::RosterData;
use crate::utils::error::Result;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Client for the Supabase Realtime endpoint (Phoenix channels). Joins the
/// topic scoped to the single roster record and delivers each remote change
/// to a callback.
pub struct RealtimeChannel {
    config: SupabaseConfig,
}

impl RealtimeChannel {
    pub fn new(config: SupabaseConfig) -> Self {
        Self { config }
    }

    /// Opens the websocket, joins the record's topic and spawns a worker that
    /// invokes `callback` with the new payload on every INSERT/UPDATE/DELETE
    /// event carrying a non-empty `data` field. Connection errors surface
    /// here; once the worker is running, channel errors only end the stream
    /// with a warning log.
    pub async fn subscribe<F>(&self, mut callback: F) -> Result<Subscription>
    where
        F: FnMut(RosterData) + Send + 'static,
    {
        let url = websocket_url(&self.config.url, &self.config.anon_key);
        let (ws_stream, _) = connect_async(url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(join_message().to_string().into()))
            .await?;
        tracing::debug!("joined realtime topic {}", channel_topic());

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
            // the first tick completes immediately; the join frame already
            // went out, so consume it
            heartbeat.tick().await;
            let mut heartbeat_ref: u64 = 2;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }

                    _ = heartbeat.tick() => {
                        let frame = heartbeat_message(heartbeat_ref);
                        heartbeat_ref += 1;
                        if write.send(Message::Text(frame.to_string().into())).await.is_err() {
                            tracing::warn!("realtime heartbeat failed, closing channel");
                            break;
                        }
                    }

                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<Value>(&text) {
                                Ok(message) => {
                                    if let Some(data) = change_payload(&message) {
                                        tracing::debug!("roster record changed remotely");
                                        callback(data);
                                    }
                                }
                                Err(e) => tracing::warn!("unparseable realtime frame: {e}"),
                            }
                        }
                        Some(Ok(Message::Ping(body))) => {
                            let _ = write.send(Message::Pong(body)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::warn!("realtime channel closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("realtime channel error: {e}");
                            break;
                        }
                    }
                }
            }
        });

        Ok(Subscription {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Scoped handle to an open realtime channel. Dropping it signals the worker
/// to close the websocket; [`Subscription::unsubscribe`] additionally waits
/// for the worker to finish.
pub struct Subscription {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub async fn unsubscribe(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!("realtime worker ended abnormally: {e}");
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        // worker shuts itself down after the signal; nothing to await here
        let _ = self.task.take();
    }
}

fn websocket_url(base: &str, anon_key: &str) -> String {
    let ws = base
        .trim_end_matches('/')
        .replace("http://", "ws://")
        .replace("https://", "wss://");
    format!("{ws}/realtime/v1/websocket?apikey={anon_key}&vsn=1.0.0")
}

fn channel_topic() -> String {
    format!("realtime:public:{TABLE}:id=eq.{RECORD_ID}")
}

fn join_message() -> Value {
    json!({
        "topic": channel_topic(),
        "event": "phx_join",
        "payload": {},
        "ref": "1",
    })
}

fn heartbeat_message(reference: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
}

/// Extracts the new payload from a change event. Join replies, heartbeat
/// acks, events on other identities and events without a `data` value (e.g. a
/// bare DELETE) all map to `None`.
fn change_payload(message: &Value) -> Option<RosterData> {
    let event = message.get("event")?.as_str()?;
    if !matches!(event, "INSERT" | "UPDATE" | "DELETE") {
        return None;
    }

    let record = message.get("payload")?.get("record")?;
    if record.get("id")?.as_i64()? != RECORD_ID {
        return None;
    }

    let data = record.get("data")?;
    if data.is_null() {
        return None;
    }
    serde_json::from_value(data.clone()).ok()
}
