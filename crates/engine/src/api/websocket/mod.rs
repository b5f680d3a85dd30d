//! WebSocket handling for game clients.
//!
//! One task per connection: the upgrade admits an identity, the join binds
//! it to a session, then inbound frames are decoded and applied under the
//! session lock until the socket closes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use fourinrow_domain::{GameError, ParticipantKey, SessionKey, AUTOMATED_OPPONENT_KEY};
use fourinrow_shared::{ClientMessage, ProtocolError, ServerMessage};

use crate::app::App;
use crate::stores::SessionHandle;
use crate::use_cases::session::{JoinInput, SessionMode};

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Identity given to connections without one when anonymous play is allowed.
pub const ANONYMOUS_IDENTITY: &str = "guest";

/// How long a closing connection may take to flush its last frames.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Session joined when the client names none.
pub const DEFAULT_SESSION: &str = "default";

/// Query parameters of `GET /ws`.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub player: Option<String>,
    pub name: Option<String>,
    pub session: Option<String>,
    pub mode: Option<String>,
}

/// A connection that passed admission, ready to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub session_id: SessionKey,
    pub participant: ParticipantKey,
    pub username: String,
    pub mode: SessionMode,
}

impl ConnectParams {
    /// Validate the parameters. The error is the reason sent with the 400.
    pub fn admit(self, allow_anonymous: bool) -> Result<Admission, String> {
        let player = non_blank(self.player);
        let player = match player {
            Some(player) => player,
            None if allow_anonymous => ANONYMOUS_IDENTITY.to_string(),
            None => return Err("missing player identity".to_string()),
        };
        if player.eq_ignore_ascii_case(AUTOMATED_OPPONENT_KEY) {
            return Err(format!("identity '{player}' is reserved"));
        }

        let mode = match non_blank(self.mode) {
            Some(raw) => {
                SessionMode::parse(&raw).ok_or_else(|| format!("unknown session mode '{raw}'"))?
            }
            None => SessionMode::default(),
        };

        Ok(Admission {
            session_id: SessionKey::new(
                non_blank(self.session).unwrap_or_else(|| DEFAULT_SESSION.to_string()),
            ),
            username: non_blank(self.name).unwrap_or_else(|| player.clone()),
            participant: ParticipantKey::new(player),
            mode,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(app): State<Arc<App>>,
) -> Response {
    let admission = match params.admit(app.settings.allow_anonymous) {
        Ok(admission) => admission,
        Err(reason) => {
            tracing::info!(reason = %reason, "WebSocket connection refused");
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, app, admission))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, app: Arc<App>, admission: Admission) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();
    let participant = admission.participant.clone();

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    let (superseded_tx, mut superseded_rx) = oneshot::channel::<()>();

    // Spawn a task to forward messages from the channel to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to encode server message"),
            }
        }
        // Every sender is gone: the join was refused, or the connection
        // ended and the session released it.
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    tracing::info!(
        connection_id = %connection_id,
        participant_id = %participant,
        session_id = %admission.session_id,
        "WebSocket connection established"
    );

    let joined = app
        .use_cases
        .session
        .join
        .execute(JoinInput {
            session_id: admission.session_id.clone(),
            participant: participant.clone(),
            username: admission.username,
            mode: admission.mode,
            connection_id,
            sender: tx.clone(),
            superseded: superseded_tx,
        })
        .await;

    let handle = match joined {
        Ok(joined) => joined.handle,
        Err(e) => {
            tracing::info!(
                connection_id = %connection_id,
                participant_id = %participant,
                session_id = %admission.session_id,
                error = %e,
                "Join refused"
            );
            reply(&tx, connection_id, ServerMessage::error(&e));
            drop(tx);
            let _ = send_task.await;
            return;
        }
    };

    // Handle incoming messages until the socket ends or a newer connection
    // for the same identity takes over.
    loop {
        tokio::select! {
            _ = &mut superseded_rx => {
                tracing::info!(
                    connection_id = %connection_id,
                    participant_id = %participant,
                    "Connection superseded by a newer one"
                );
                break;
            }
            next = ws_receiver.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    let still_bound = handle_frame(
                        &app,
                        &handle,
                        &participant,
                        connection_id,
                        text.as_str(),
                        &tx,
                    )
                    .await;
                    if !still_bound {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    // Clean up
    {
        let mut live = handle.lock().await;
        app.use_cases
            .session
            .leave
            .execute(&mut live, &participant, connection_id);
    }
    drop(tx);
    if tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Decode one inbound frame and apply it to the session. Returns false once
/// this connection no longer speaks for its participant.
async fn handle_frame(
    app: &App,
    handle: &SessionHandle,
    participant: &ParticipantKey,
    connection_id: Uuid,
    text: &str,
    tx: &mpsc::Sender<ServerMessage>,
) -> bool {
    let message = match ClientMessage::decode(text) {
        Ok(message) => message,
        Err(ProtocolError::Malformed(reason)) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %reason,
                "Dropping malformed frame"
            );
            return true;
        }
        Err(ProtocolError::InvalidPayload { kind, reason }) => {
            tracing::debug!(
                connection_id = %connection_id,
                kind,
                error = %reason,
                "Invalid payload"
            );
            reply(
                tx,
                connection_id,
                ServerMessage::error(GameError::invalid_payload(kind)),
            );
            return true;
        }
    };

    if matches!(message, ClientMessage::Unknown) {
        tracing::debug!(connection_id = %connection_id, "Ignoring unknown frame type");
        return true;
    }

    let mut live = handle.lock().await;
    if !live.is_current(participant, connection_id) {
        tracing::debug!(
            connection_id = %connection_id,
            participant_id = %participant,
            "Dropping frame from a released connection"
        );
        return false;
    }

    let result = match message {
        ClientMessage::Move { column } => {
            app.use_cases
                .session
                .play_move
                .execute(&mut live, participant, column)
        }
        ClientMessage::Reset => app.use_cases.session.reset.execute(&mut live, participant),
        ClientMessage::Unknown => Ok(()),
    };

    if let Err(e) = result {
        reply(tx, connection_id, ServerMessage::error(&e));
    }
    true
}

fn reply(tx: &mpsc::Sender<ServerMessage>, connection_id: Uuid, message: ServerMessage) {
    if tx.try_send(message).is_err() {
        tracing::warn!(
            connection_id = %connection_id,
            "Failed to send response, channel full or closed"
        );
    }
}

// =============================================================================
// WebSocket Integration Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support;
