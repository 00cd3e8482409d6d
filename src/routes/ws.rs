// WebSocket stream of fast-tier snapshots

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::FastSnapshot;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_stats(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let mut rx = state.published.subscribe();
        let latest = state.published.fast().ok();
        if let Err(e) = stream_stats(socket, &mut rx, latest).await {
            tracing::info!("Stats stream error: {}", e);
        }
    })
}

/// Send one JSON text frame; false when the client is gone or too slow.
async fn send_json(socket: &mut WebSocket, snapshot: &FastSnapshot) -> anyhow::Result<bool> {
    let json = serde_json::to_string(snapshot)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_stats(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<FastSnapshot>,
    latest: Option<FastSnapshot>,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to stats stream");

    if let Some(snapshot) = latest
        && !send_json(&mut socket, &snapshot).await?
    {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(snapshot) => {
                        if !send_json(&mut socket, &snapshot).await? {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/stats client lagged, skipped {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
