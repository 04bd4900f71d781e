use crate::media::{Frame, StreamSource, media_channel};
use crate::signaling::{MediaPacket, PeerEndpoint, RelayErrorKind, RelayFrame, Switchboard};
use crate::transport::PeerEvent;
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use lovelens_core::{CallId, ControlMessage, LensError, PeerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// A remote peer attached to the switchboard through a WebSocket.
///
/// Relay peers may open links and upload media on calls they place.
/// Calls offered to them are refused.
pub struct RelayPeer {
    endpoint: PeerEndpoint,
    outgoing: HashMap<CallId, StreamSource>,
}

impl RelayPeer {
    pub fn new(endpoint: PeerEndpoint) -> Self {
        Self {
            endpoint,
            outgoing: HashMap::new(),
        }
    }

    pub fn id(&self) -> &PeerId {
        self.endpoint.id()
    }

    pub async fn next_event(&mut self) -> Option<PeerEvent> {
        self.endpoint.next_event().await
    }

    /// Applies a frame sent by the client and returns the immediate replies.
    pub fn handle_frame(&mut self, frame: RelayFrame) -> Vec<RelayFrame> {
        let switchboard = self.endpoint.switchboard().clone();

        match frame {
            RelayFrame::Connect { to } => match self.endpoint.connect(&to) {
                Ok(link) => vec![RelayFrame::Connecting { link, to }],
                Err(e) => vec![error_frame(&e)],
            },

            RelayFrame::Send { link, message } => {
                let payload = match message.encode() {
                    Ok(payload) => payload,
                    Err(e) => return vec![RelayFrame::error(RelayErrorKind::Malformed, e.to_string())],
                };
                match switchboard.send(self.endpoint.id(), link, payload) {
                    Ok(()) => Vec::new(),
                    Err(e) => vec![error_frame(&e)],
                }
            }

            RelayFrame::Close { link } => {
                switchboard.disconnect(link);
                Vec::new()
            }

            RelayFrame::Call { to } => {
                let (source, stream) = media_channel();
                match self.endpoint.call(&to, stream) {
                    Ok(call) => {
                        self.outgoing.insert(call, source);
                        vec![RelayFrame::Calling { call }]
                    }
                    Err(e) => vec![error_frame(&e)],
                }
            }

            RelayFrame::HangUp { call } => {
                if let Some(source) = self.outgoing.remove(&call) {
                    source.end();
                }
                switchboard.hang_up(call);
                Vec::new()
            }

            other => {
                warn!("Relay peer {} sent a server-only frame: {:?}", self.id(), other);
                vec![RelayFrame::error(
                    RelayErrorKind::Malformed,
                    "frame is not accepted from clients",
                )]
            }
        }
    }

    /// Publishes an uploaded frame on the matching outgoing call.
    pub fn handle_media(&mut self, packet: MediaPacket) -> Option<RelayFrame> {
        let Some(source) = self.outgoing.get(&packet.call) else {
            return Some(RelayFrame::error(
                RelayErrorKind::ChannelClosed,
                format!("no outgoing call {}", packet.call),
            ));
        };

        source.push(Frame {
            width: packet.width,
            height: packet.height,
            jpeg: Bytes::from(packet.jpeg),
        });
        None
    }

    /// Maps a broker event onto the frame the client should see.
    pub fn translate(&mut self, event: PeerEvent) -> Option<RelayFrame> {
        match event {
            PeerEvent::Open(id) => Some(RelayFrame::Open { id }),
            PeerEvent::Connection { link, remote } => Some(RelayFrame::Connection { link, remote }),
            PeerEvent::ConnectionOpen { link } => Some(RelayFrame::ConnectionOpen { link }),
            PeerEvent::Data { link, payload } => match ControlMessage::decode(&payload) {
                Ok(message) => Some(RelayFrame::Message { link, message }),
                Err(e) => {
                    warn!("Dropping undecodable payload on {}: {}", link, e);
                    None
                }
            },
            PeerEvent::ConnectionClosed { link } => Some(RelayFrame::ConnectionClosed { link }),
            PeerEvent::Call { call, remote, .. } => {
                debug!("Refusing call {} from {} to relay peer {}", call, remote, self.id());
                self.endpoint.switchboard().hang_up(call);
                None
            }
            PeerEvent::CallAnswered { call } => Some(RelayFrame::CallAnswered { call }),
            PeerEvent::CallClosed { call } => {
                if let Some(source) = self.outgoing.remove(&call) {
                    source.end();
                }
                Some(RelayFrame::CallClosed { call })
            }
        }
    }
}

impl Drop for RelayPeer {
    fn drop(&mut self) {
        for source in self.outgoing.values() {
            source.end();
        }
    }
}

fn error_frame(error: &LensError) -> RelayFrame {
    let kind = match error {
        LensError::PeerUnavailable(_) => RelayErrorKind::PeerUnavailable,
        LensError::IdTaken(_) => RelayErrorKind::UnavailableId,
        LensError::Protocol(_) => RelayErrorKind::Malformed,
        _ => RelayErrorKind::ChannelClosed,
    };
    RelayFrame::error(kind, error.to_string())
}

fn push_frame(tx: &mpsc::UnboundedSender<Message>, frame: &RelayFrame) {
    match serde_json::to_string(frame) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => warn!("Failed to serialize relay frame: {}", e),
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<String>,
    State(switchboard): State<Switchboard>,
) -> impl IntoResponse {
    let peer_id = PeerId::from(peer_id);

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, switchboard))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, switchboard: Switchboard) {
    info!("New relay connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();

    let mut peer = match switchboard.register(peer_id.clone()) {
        Ok(endpoint) => RelayPeer::new(endpoint),
        Err(e) => {
            warn!("Rejecting relay peer {}: {}", peer_id, e);
            if let Ok(json) = serde_json::to_string(&error_frame(&e)) {
                let _ = sender.send(Message::Text(json.into())).await;
            }
            let _ = sender.close().await;
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let Some(Ok(msg)) = msg else { break };
                let replies = match msg {
                    Message::Text(text) => match serde_json::from_str::<RelayFrame>(&text) {
                        Ok(frame) => peer.handle_frame(frame),
                        Err(e) => {
                            warn!("Invalid relay frame from {}: {}", peer_id, e);
                            vec![RelayFrame::error(RelayErrorKind::Malformed, e.to_string())]
                        }
                    },
                    Message::Binary(data) => match MediaPacket::decode(&data) {
                        Ok(packet) => peer.handle_media(packet).into_iter().collect(),
                        Err(e) => vec![RelayFrame::error(RelayErrorKind::Malformed, e.to_string())],
                    },
                    Message::Close(_) => break,
                    _ => Vec::new(),
                };
                for frame in &replies {
                    push_frame(&tx, frame);
                }
            }

            event = peer.next_event() => {
                let Some(event) = event else { break };
                if let Some(frame) = peer.translate(event) {
                    push_frame(&tx, &frame);
                }
            }

            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    drop(peer);
    info!("Relay connection closed: {}", peer_id);
}

/// Router exposing the relay at `/peer/{peer_id}`.
pub fn relay_router(switchboard: Switchboard) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/peer/{peer_id}", get(ws_handler))
        .layer(cors)
        .with_state(switchboard)
}

pub async fn serve_relay(addr: SocketAddr, switchboard: Switchboard) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay listening on ws://{}", listener.local_addr()?);
    axum::serve(listener, relay_router(switchboard)).await?;
    Ok(())
}
