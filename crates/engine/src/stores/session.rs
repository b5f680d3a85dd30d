//! Live session: the domain aggregate plus its transport side table.
//!
//! The side table maps each participant to its current outbound channel and
//! its pending forfeiture timer. Neither ever appears in a snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use fourinrow_domain::{ParticipantKey, Session};
use fourinrow_shared::{ServerMessage, SessionSnapshot};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Shared handle to one live session. Every mutation of the session happens
/// while holding this lock.
pub type SessionHandle = Arc<Mutex<LiveSession>>;

struct Connection {
    connection_id: Uuid,
    sender: mpsc::Sender<ServerMessage>,
    /// Fired when a newer connection for the same participant takes over
    superseded: Option<oneshot::Sender<()>>,
}

struct ForfeitTimer {
    token: u64,
    handle: AbortHandle,
}

#[derive(Default)]
struct Link {
    connection: Option<Connection>,
    forfeit: Option<ForfeitTimer>,
}

pub struct LiveSession {
    session: Session,
    links: HashMap<ParticipantKey, Link>,
    next_token: u64,
    this: Weak<Mutex<LiveSession>>,
}

impl LiveSession {
    /// Wrap `session` in a new shared handle.
    pub fn into_handle(session: Session) -> SessionHandle {
        Arc::new_cyclic(|this| {
            Mutex::new(Self {
                session,
                links: HashMap::new(),
                next_token: 0,
                this: this.clone(),
            })
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&self.session)
    }

    /// Weak handle for background tasks that must not keep the session alive.
    pub fn downgrade(&self) -> Weak<Mutex<LiveSession>> {
        self.this.clone()
    }

    // =========================================================================
    // Connections
    // =========================================================================

    /// Point `participant`'s outbound channel at a new connection. A previous
    /// connection is told through its `superseded` signal so its task can
    /// stop reading frames and close.
    pub fn bind(
        &mut self,
        participant: &ParticipantKey,
        connection_id: Uuid,
        sender: mpsc::Sender<ServerMessage>,
        superseded: Option<oneshot::Sender<()>>,
    ) {
        let link = self.links.entry(participant.clone()).or_default();
        let Some(previous) = link.connection.replace(Connection {
            connection_id,
            sender,
            superseded,
        }) else {
            return;
        };
        tracing::info!(
            session_id = %self.session.id(),
            participant_id = %participant,
            replaced_connection_id = %previous.connection_id,
            connection_id = %connection_id,
            "Connection superseded"
        );
        if let Some(signal) = previous.superseded {
            // The old task may already be gone.
            let _ = signal.send(());
        }
    }

    /// Drop `participant`'s channel if it still belongs to `connection_id`.
    /// Returns false when a newer connection has already taken over.
    pub fn unbind(&mut self, participant: &ParticipantKey, connection_id: Uuid) -> bool {
        let Some(link) = self.links.get_mut(participant) else {
            return false;
        };
        match &link.connection {
            Some(current) if current.connection_id == connection_id => {
                link.connection = None;
                true
            }
            _ => false,
        }
    }

    /// Whether `connection_id` is the connection `participant` is bound to.
    pub fn is_current(&self, participant: &ParticipantKey, connection_id: Uuid) -> bool {
        self.links
            .get(participant)
            .and_then(|link| link.connection.as_ref())
            .is_some_and(|c| c.connection_id == connection_id)
    }

    pub fn is_bound(&self, participant: &ParticipantKey) -> bool {
        self.links
            .get(participant)
            .is_some_and(|link| link.connection.is_some())
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Queue `message` for one participant. Best effort.
    pub fn send_to(&self, participant: &ParticipantKey, message: ServerMessage) {
        let Some(connection) = self
            .links
            .get(participant)
            .and_then(|link| link.connection.as_ref())
        else {
            return;
        };
        if let Err(e) = connection.sender.try_send(message) {
            tracing::warn!(
                session_id = %self.session.id(),
                participant_id = %participant,
                connection_id = %connection.connection_id,
                error = %e,
                "Failed to send message"
            );
        }
    }

    /// Deliver `message` to every connected human participant.
    ///
    /// Automated participants have no endpoint and disconnected ones catch up
    /// through the snapshot sent on reconnect. A failed delivery is logged and
    /// does not stop delivery to the others.
    pub fn broadcast(&self, message: &ServerMessage) {
        let mut delivered = 0usize;
        for participant in self.session.participants() {
            if participant.is_automated() || !participant.is_connected() {
                continue;
            }
            let Some(connection) = self
                .links
                .get(participant.id())
                .and_then(|link| link.connection.as_ref())
            else {
                continue;
            };
            match connection.sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    session_id = %self.session.id(),
                    participant_id = %participant.id(),
                    connection_id = %connection.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                ),
            }
        }
        tracing::debug!(
            session_id = %self.session.id(),
            delivered,
            "Broadcast"
        );
    }

    pub fn broadcast_snapshot(&self) {
        self.broadcast(&ServerMessage::Update(self.snapshot()));
    }

    // =========================================================================
    // Forfeiture timers
    // =========================================================================

    /// Reserve the generation token for a new timer.
    pub fn next_forfeit_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Record an armed timer, aborting whatever was armed before.
    pub fn install_forfeit(&mut self, participant: &ParticipantKey, token: u64, handle: AbortHandle) {
        let link = self.links.entry(participant.clone()).or_default();
        if let Some(previous) = link.forfeit.replace(ForfeitTimer { token, handle }) {
            previous.handle.abort();
        }
    }

    /// Abort `participant`'s pending timer. Returns whether one was armed.
    pub fn cancel_forfeit(&mut self, participant: &ParticipantKey) -> bool {
        match self
            .links
            .get_mut(participant)
            .and_then(|link| link.forfeit.take())
        {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all_forfeits(&mut self) {
        for link in self.links.values_mut() {
            if let Some(timer) = link.forfeit.take() {
                timer.handle.abort();
            }
        }
    }

    /// Claim the timer identified by `token`. A timer that lost a race with
    /// a reconnect or a re-arm finds a different token (or none) and must do
    /// nothing.
    pub fn claim_forfeit(&mut self, participant: &ParticipantKey, token: u64) -> bool {
        let Some(link) = self.links.get_mut(participant) else {
            return false;
        };
        if link.forfeit.as_ref().is_some_and(|t| t.token == token) {
            link.forfeit = None;
            true
        } else {
            false
        }
    }

    pub fn has_forfeit_pending(&self, participant: &ParticipantKey) -> bool {
        self.links
            .get(participant)
            .is_some_and(|link| link.forfeit.is_some())
    }
}
