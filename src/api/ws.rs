use crate::app_state::models::AppState;
use crate::services::stock_updates::{StockSnapshot, StockUpdatesService};
use axum::{
    extract::{
        ConnectInfo, Extension,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, warn};

pub async fn stock_updates_ws(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, app_state))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, app_state: Arc<AppState>) {
    info!("Stock updates client connected: {}", addr);

    let period = Duration::from_secs(app_state.settings.app_config.stock_updates.interval_seconds);
    let (sender, receiver) = socket.split();

    push_stock_updates(
        sender,
        receiver,
        &app_state.stock_updates_service,
        period,
        addr,
    )
    .await;

    info!("Stock updates connection closed for {}", addr);
}

/// Pushes a quote snapshot right away and then every `period` until the client goes away,
/// then sends a normal close frame.
pub async fn push_stock_updates<S, R, E>(
    mut sender: S,
    mut receiver: R,
    service: &StockUpdatesService,
    period: Duration,
    addr: SocketAddr,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    // First tick fires immediately
    let mut interval = time::interval(period);

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Stock updates client {} disconnected", addr);
                    break;
                }
                Some(Err(e)) => {
                    warn!("WebSocket receive error from {}: {}", addr, e);
                    break;
                }
                Some(Ok(_)) => debug!("Ignoring client message from {}", addr),
            },
            _ = interval.tick() => {
                let snapshot = service.snapshot().await;
                let payload = match snapshot_payload(&snapshot) {
                    Some(Ok(payload)) => payload,
                    Some(Err(e)) => {
                        error!("Failed to serialize stock snapshot: {}", e);
                        break;
                    }
                    None => {
                        info!("Empty quote list for {}, nothing to send", addr);
                        continue;
                    }
                };

                if let Err(e) = sender.send(Message::Text(payload.into())).await {
                    info!("Client {} went away before send: {}", addr, e);
                    break;
                }
            }
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static(""),
    }));
    if let Err(e) = sender.send(close).await {
        debug!("Close frame to {} not delivered: {}", addr, e);
    }
}

/// Text payload for one tick; an empty quote list sends nothing.
fn snapshot_payload(snapshot: &StockSnapshot) -> Option<Result<String, serde_json::Error>> {
    match snapshot {
        StockSnapshot::Quotes(quotes) if quotes.is_empty() => None,
        other => Some(serde_json::to_string(other)),
    }
}
