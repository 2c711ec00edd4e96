//! WebSocket streaming of a broadcast channel.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use chrono::Utc;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use warmup_core::error::AppError;
use warmup_realtime::{Channel, OutboundMessage};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /ws/{channel} where channel is `tasks` or `device:{id}`.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let channel = Channel::parse(&channel).ok_or_else(|| {
        AppError::invalid_argument(format!(
            "Unknown channel '{channel}'; expected 'tasks' or 'device:{{id}}'"
        ))
    })?;
    Ok(ws.on_upgrade(move |socket| stream_channel(state, channel, socket)))
}

async fn stream_channel(state: AppState, channel: Channel, socket: WebSocket) {
    let name = channel.to_string();
    let events = state.pubsub.subscribe(&name).await;
    info!(channel = %name, "WebSocket listener connected");

    let events = forward(&state, &name, events, socket).await;

    if state.pubsub.unsubscribe(&name, events).await {
        debug!(channel = %name, "Removed idle channel");
    }
    info!(channel = %name, "WebSocket listener disconnected");
}

/// Pump channel messages and pings into the socket until either side
/// closes. Hands the receiver back so the caller can release the channel.
async fn forward(
    state: &AppState,
    name: &str,
    mut events: Receiver<OutboundMessage>,
    socket: WebSocket,
) -> Receiver<OutboundMessage> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let subscribed = OutboundMessage::Subscribed {
        channel: name.to_string(),
    };
    if send(&mut ws_tx, &subscribed).await.is_err() {
        return events;
    }

    let period = Duration::from_secs(state.config.realtime.ping_interval_seconds.max(1));
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    loop {
        let outbound = tokio::select! {
            received = events.recv() => match received {
                Ok(msg) => msg,
                Err(RecvError::Lagged(skipped)) => OutboundMessage::Lagged {
                    channel: name.to_string(),
                    skipped,
                },
                Err(RecvError::Closed) => break,
            },
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(channel = %name, error = %e, "WebSocket receive error");
                    break;
                }
                Some(Ok(_)) => continue,
            },
            _ = ping.tick() => OutboundMessage::Ping { timestamp: Utc::now() },
        };

        if send(&mut ws_tx, &outbound).await.is_err() {
            break;
        }
    }

    events
}

async fn send(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: &OutboundMessage,
) -> Result<(), axum::Error> {
    ws_tx.send(Message::Text(msg.to_json().into())).await
}
