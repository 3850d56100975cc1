//! Websocket transport for the control session.
//!
//! Accepts sessions at `/`. Each socket becomes a [`SessionHandle`] registered
//! with the bridge loop; inbound text frames are forwarded as
//! [`Event::SessionFrame`] and outbound frames are drained from the session's
//! queue.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State as AxumState, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::bridge::Event;
use crate::session::SessionHandle;

/// Build the router serving the control session endpoint.
pub fn build_router(events: mpsc::UnboundedSender<Event>) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(events)
}

/// Serve control sessions on `listener` until the process stops.
pub async fn serve(
    listener: TcpListener,
    events: mpsc::UnboundedSender<Event>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Accepting control sessions on ws://{}", addr);
    }
    axum::serve(listener, build_router(events)).await
}

/// WebSocket upgrade handler.
async fn ws_handler(
    ws: WebSocketUpgrade,
    AxumState(events): AxumState<mpsc::UnboundedSender<Event>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

/// Pump one websocket until it closes.
///
/// When this session is superseded its outbound queue closes, but the socket
/// stays up and its frames keep flowing to the bridge.
async fn handle_socket(socket: WebSocket, events: mpsc::UnboundedSender<Event>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut outbound) = mpsc::unbounded_channel::<String>();
    let session = SessionHandle::new(tx);
    let id = session.id();

    if events.send(Event::SessionOpened(session)).is_err() {
        error!(session = %id, "Bridge is not running; dropping session");
        return;
    }

    let mut current = true;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let frame = Event::SessionFrame { session: id, text: text.as_str().to_owned() };
                        if events.send(frame).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!(session = %id, error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Binary and Pong frames carry nothing for us.
                    }
                    Some(Err(e)) => {
                        error!(session = %id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            frame = outbound.recv(), if current => {
                match frame {
                    Some(frame) => {
                        if let Err(e) = sender.send(Message::Text(frame.into())).await {
                            error!(session = %id, error = %e, "Failed to send frame");
                            break;
                        }
                    }
                    None => {
                        debug!(session = %id, "Session superseded; outbound closed");
                        current = false;
                    }
                }
            }
        }
    }

    let _ = events.send(Event::SessionClosed(id));
}
