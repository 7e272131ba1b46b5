/**
 * Lock Coordinator Actor
 *
 * One task owns the lock table, the roster, and the registry of connected
 * sessions. Every inbound message funnels through its command channel, so
 * lock decisions are applied strictly one at a time — two sessions can never
 * race each other for the same field.
 *
 * # Fan-out
 *
 * Each session registers a bounded outbound channel. Broadcasting uses
 * `try_send`: a session whose buffer is full (or whose socket task is gone)
 * is dropped on the spot and cleaned up like any other disconnect, so one
 * slow consumer can never stall the rest.
 *
 * # Identity
 *
 * The session id doubles as the participant id. Whatever id a client sends
 * in its `join` payload is discarded; the `welcome` reply tells the client
 * which id the server chose.
 */
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};

use crate::backend::coordinator::state::{LockTable, Roster, SessionId};
use crate::shared::error::ProtocolError;
use crate::shared::participant::Participant;
use crate::shared::protocol::{FormMessage, LockData, UnlockData, UpdateData};

/// Requests accepted by the coordinator task
enum Command {
    Register {
        session: SessionId,
        outbound: mpsc::Sender<FormMessage>,
    },
    Inbound {
        session: SessionId,
        message: FormMessage,
    },
    Malformed {
        session: SessionId,
        error: ProtocolError,
    },
    Disconnect {
        session: SessionId,
    },
    PingAll,
}

/// Cheap cloneable handle to the coordinator task
///
/// Sends never block; once the coordinator has shut down they are silently
/// dropped, which only happens while the whole server is going away.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    /// Attach a session's outbound channel; the coordinator replies with a
    /// `welcome` carrying the assigned participant id before anything else
    /// can reach that channel
    pub fn register(&self, session: SessionId, outbound: mpsc::Sender<FormMessage>) {
        let _ = self.commands.send(Command::Register { session, outbound });
    }

    /// Feed one decoded message from a session
    pub fn inbound(&self, session: SessionId, message: FormMessage) {
        let _ = self.commands.send(Command::Inbound { session, message });
    }

    /// Report an undecodable frame from a session
    pub fn malformed(&self, session: SessionId, error: ProtocolError) {
        let _ = self.commands.send(Command::Malformed { session, error });
    }

    /// A session's socket closed; release its locks and announce departure
    pub fn disconnect(&self, session: SessionId) {
        let _ = self.commands.send(Command::Disconnect { session });
    }

    /// Send a heartbeat ping to every connected session
    pub fn ping_all(&self) {
        let _ = self.commands.send(Command::PingAll);
    }
}

/// The coordinator's owned state; see [`LockCoordinator::spawn`]
pub struct LockCoordinator {
    locks: LockTable,
    roster: Roster,
    sessions: std::collections::HashMap<SessionId, mpsc::Sender<FormMessage>>,
}

impl LockCoordinator {
    /// Spawn the coordinator task and return its handle
    pub fn spawn() -> CoordinatorHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            locks: LockTable::default(),
            roster: Roster::default(),
            sessions: std::collections::HashMap::new(),
        };
        tokio::spawn(coordinator.run(command_rx));
        CoordinatorHandle {
            commands: command_tx,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!("[Coordinator] started");
        while let Some(command) = commands.recv().await {
            self.apply(command);
        }
        info!("[Coordinator] stopped");
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Register { session, outbound } => {
                debug!("[Coordinator] session {} connected", session);
                self.sessions.insert(session, outbound);
                self.reply(session, FormMessage::welcome(session.to_string()));
            }
            Command::Inbound { session, message } => self.handle_message(session, message),
            Command::Malformed { session, error } => {
                warn!("[Coordinator] malformed frame from {}: {}", session, error);
                self.reply(session, FormMessage::error(error.to_string(), None));
            }
            Command::Disconnect { session } => {
                debug!("[Coordinator] session {} disconnected", session);
                self.remove_session(session);
            }
            Command::PingAll => self.broadcast(FormMessage::HeartbeatPing),
        }
    }

    fn handle_message(&mut self, session: SessionId, message: FormMessage) {
        match message {
            FormMessage::Join(data) => self.handle_join(session, data.participant.display_name),
            FormMessage::Update(data) => self.handle_update(session, data),
            FormMessage::Lock(data) => self.handle_lock(session, data),
            FormMessage::Unlock(data) => self.handle_unlock(session, data),
            FormMessage::HeartbeatPing => self.reply(session, FormMessage::HeartbeatPong),
            FormMessage::HeartbeatPong => trace!("[Coordinator] pong from {}", session),
            FormMessage::Error(data) => {
                warn!("[Coordinator] error report from {}: {}", session, data.message)
            }
            // Server-origin kinds have no meaning coming from a client.
            FormMessage::Welcome(_) | FormMessage::Leave(_) => {
                warn!("[Coordinator] ignoring server-origin message from {}", session)
            }
        }
    }

    /// Register or refresh presence and tell everyone
    fn handle_join(&mut self, session: SessionId, display_name: String) {
        let participant = Participant::with_id(session.to_string(), display_name);
        info!(
            "[Coordinator] {} joined as {}",
            participant.display_name, participant.id
        );
        self.roster.upsert(session, participant.clone());
        self.broadcast(FormMessage::join(participant));
    }

    /// Value updates are relayed as-is; the legacy participant payload is
    /// normalized into a join
    fn handle_update(&mut self, session: SessionId, data: UpdateData) {
        if let Some(participant) = data.participant {
            self.handle_join(session, participant.display_name);
        }
        if let Some(field) = data.field {
            self.broadcast(FormMessage::update(
                field,
                data.value.unwrap_or(serde_json::Value::Null),
            ));
        }
    }

    fn handle_lock(&mut self, session: SessionId, data: LockData) {
        let requester = self.requesting_participant(session, data.participant);
        match self.locks.lock(&data.field, &requester) {
            Ok(lock) => {
                debug!(
                    "[Coordinator] '{}' locked by {}",
                    lock.field, lock.owner.display_name
                );
                self.broadcast(FormMessage::lock_granted(lock.field.clone(), lock.owner));
            }
            Err(holder) => {
                trace!(
                    "[Coordinator] '{}' denied to {}, held by {}",
                    data.field,
                    requester.display_name,
                    holder.display_name
                );
                self.reply(
                    session,
                    FormMessage::error(
                        format!("Field '{}' is locked by {}", data.field, holder.display_name),
                        Some(data.field),
                    ),
                );
            }
        }
    }

    fn handle_unlock(&mut self, session: SessionId, data: UnlockData) {
        match self.locks.unlock(&data.field, &session.to_string()) {
            Some(lock) => {
                debug!("[Coordinator] '{}' unlocked", lock.field);
                self.broadcast(FormMessage::unlock_released(lock.field.clone(), lock.owner));
            }
            // Unheld or foreign-owned fields are ignored without a reply.
            None => trace!("[Coordinator] unlock of '{}' ignored", data.field),
        }
    }

    /// The identity lock decisions are attributed to
    ///
    /// Prefers the roster record; a session that locks before joining is
    /// attributed by payload name under its session id.
    fn requesting_participant(
        &self,
        session: SessionId,
        payload: Option<Participant>,
    ) -> Participant {
        if let Some(known) = self.roster.get(&session) {
            return known.clone();
        }
        let display_name = payload
            .map(|p| p.display_name)
            .unwrap_or_else(|| "Anonymous".to_string());
        Participant::with_id(session.to_string(), display_name)
    }

    /// Send to one session, dropping it if it cannot accept
    fn reply(&mut self, session: SessionId, message: FormMessage) {
        let Some(outbound) = self.sessions.get(&session) else {
            return;
        };
        if let Err(error) = outbound.try_send(message) {
            Self::log_failure(session, &error);
            self.remove_session(session);
        }
    }

    /// Send to every session; sessions that cannot keep up are dropped and
    /// cleaned up like a disconnect
    fn broadcast(&mut self, message: FormMessage) {
        let mut dead = self.fan_out(&message);
        while let Some(session) = dead.pop() {
            dead.extend(self.drop_session(session));
        }
    }

    /// Disconnect cleanup for one session, following up on any sessions that
    /// die while receiving the cleanup broadcasts
    fn remove_session(&mut self, session: SessionId) {
        let mut dead = self.drop_session(session);
        while let Some(next) = dead.pop() {
            dead.extend(self.drop_session(next));
        }
    }

    fn fan_out(&mut self, message: &FormMessage) -> Vec<SessionId> {
        let mut dead = Vec::new();
        for (session, outbound) in &self.sessions {
            if let Err(error) = outbound.try_send(message.clone()) {
                Self::log_failure(*session, &error);
                dead.push(*session);
            }
        }
        for session in &dead {
            self.sessions.remove(session);
        }
        dead
    }

    /// Remove one session and publish its cleanup: an unlock per held field,
    /// then the departure. Returns sessions that died receiving those.
    fn drop_session(&mut self, session: SessionId) -> Vec<SessionId> {
        self.sessions.remove(&session);
        let mut dead = Vec::new();
        for lock in self.locks.release_all(&session.to_string()) {
            dead.extend(self.fan_out(&FormMessage::unlock_released(lock.field, lock.owner)));
        }
        if let Some(participant) = self.roster.remove(&session) {
            info!(
                "[Coordinator] {} left ({})",
                participant.display_name, participant.id
            );
            dead.extend(self.fan_out(&FormMessage::leave(participant.id)));
        }
        dead
    }

    fn log_failure(session: SessionId, error: &TrySendError<FormMessage>) {
        match error {
            TrySendError::Full(_) => {
                warn!("[Coordinator] session {} cannot keep up, dropping", session)
            }
            TrySendError::Closed(_) => {
                debug!("[Coordinator] session {} channel closed", session)
            }
        }
    }
}
