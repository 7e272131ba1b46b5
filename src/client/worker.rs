/**
 * Store Worker
 *
 * The single task behind a `FormStore`. Every mutation of the local caches —
 * field values, the lock table mirror, the roster — and every timer callback
 * runs here, so command handling, debounce expiry, and broadcast
 * reconciliation can never interleave mid-mutation.
 *
 * The worker owns three inputs, multiplexed in one loop:
 *
 * ```text
 * store commands ──┐
 * session events ──┼──► StoreWorker ──► state mirror + observer callbacks
 * debounce queue ──┘
 * ```
 *
 * Reads from the store handle go through a shared mirror (`StoreState`
 * behind an `RwLock`) that only this task writes. Observer callbacks are
 * invoked with no guard held, so a callback may freely call back into the
 * store.
 */
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures_util::future::poll_fn;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::time::{delay_queue::Key, DelayQueue};
use tracing::{debug, trace, warn};

use crate::client::error::ClientError;
use crate::client::observers::{ObserverCallback, Observers};
use crate::client::session::{SessionEvent, SessionHandle, SessionState};
use crate::shared::error::ProtocolError;
use crate::shared::participant::Participant;
use crate::shared::protocol::FormMessage;

/// Requests accepted by the worker, sent from `FormStore` handles
pub(crate) enum StoreCommand {
    UpdateField { field: String, value: Value },
    LockField { field: String },
    UnlockField { field: String },
    FieldFocus { field: String },
    FieldBlur { field: String },
    FieldChange { field: String, value: Value },
    Subscribe { id: u64, callback: ObserverCallback },
    Unsubscribe { id: u64 },
    Dispose,
}

/// Shared read mirror of the worker's state
///
/// Written only by the worker task; store handles take short read locks for
/// the pure getters.
#[derive(Clone)]
pub(crate) struct StoreState {
    pub values: HashMap<String, Value>,
    pub locks: HashMap<String, Participant>,
    pub roster: Vec<Participant>,
    pub participant: Participant,
    pub connection: SessionState,
}

impl StoreState {
    pub(crate) fn new(participant: Participant) -> Self {
        Self {
            values: HashMap::new(),
            locks: HashMap::new(),
            roster: Vec::new(),
            participant,
            connection: SessionState::Connecting,
        }
    }
}

pub(crate) struct StoreWorker {
    state: Arc<RwLock<StoreState>>,
    observers: Observers,
    commands: mpsc::UnboundedReceiver<StoreCommand>,
    session: SessionHandle,
    session_events: mpsc::UnboundedReceiver<SessionEvent>,
    session_alive: bool,
    debounce: DelayQueue<String>,
    pending: HashMap<String, Key>,
    debounce_delay: Duration,
}

impl StoreWorker {
    pub(crate) fn new(
        state: Arc<RwLock<StoreState>>,
        commands: mpsc::UnboundedReceiver<StoreCommand>,
        session: SessionHandle,
        session_events: mpsc::UnboundedReceiver<SessionEvent>,
        debounce_delay: Duration,
    ) -> Self {
        Self {
            state,
            observers: Observers::default(),
            commands,
            session,
            session_events,
            session_alive: true,
            debounce: DelayQueue::new(),
            pending: HashMap::new(),
            debounce_delay,
        }
    }

    pub(crate) async fn run(mut self) {
        enum Step {
            Command(Option<StoreCommand>),
            Session(Option<SessionEvent>),
            Debounce(Option<String>),
        }

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => Step::Command(command),
                event = self.session_events.recv(), if self.session_alive => {
                    Step::Session(event)
                }
                expired = poll_fn(|cx| self.debounce.poll_expired(cx)),
                    if !self.debounce.is_empty() =>
                {
                    Step::Debounce(expired.map(|e| e.into_inner()))
                }
            };
            match step {
                Step::Command(Some(StoreCommand::Dispose)) | Step::Command(None) => {
                    self.dispose();
                    return;
                }
                Step::Command(Some(command)) => self.handle_command(command),
                Step::Session(Some(event)) => self.handle_session_event(event),
                Step::Session(None) => self.session_alive = false,
                Step::Debounce(Some(field)) => self.debounce_elapsed(field),
                Step::Debounce(None) => {}
            }
        }
    }

    fn handle_command(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::UpdateField { field, value } => self.update_field(field, value),
            StoreCommand::LockField { field } => self.request_lock(&field),
            StoreCommand::UnlockField { field } => self.request_unlock(&field),
            StoreCommand::FieldFocus { field } => self.field_focus(field),
            StoreCommand::FieldBlur { field } => self.field_blur(&field),
            StoreCommand::FieldChange { field, value } => self.field_change(field, value),
            StoreCommand::Subscribe { id, callback } => self.subscribe(id, callback),
            StoreCommand::Unsubscribe { id } => self.observers.remove(id),
            // Handled by the run loop before dispatch.
            StoreCommand::Dispose => {}
        }
    }

    /// Write the value locally and send it; change observers fire on the
    /// server echo, not here
    fn update_field(&mut self, field: String, value: Value) {
        self.state_mut().values.insert(field.clone(), value.clone());
        self.send(FormMessage::update(field, value));
    }

    /// Ask the server for a lock unless the field is already held by anyone
    fn request_lock(&mut self, field: &str) {
        let (locked, participant) = {
            let state = self.state();
            (state.locks.contains_key(field), state.participant.clone())
        };
        if locked {
            trace!("[Store] lock request for '{}' skipped, already held", field);
            return;
        }
        self.send(FormMessage::lock_request(field, participant));
    }

    /// Release a lock we hold; a no-op for unheld or foreign locks
    fn request_unlock(&mut self, field: &str) {
        if !self.is_locked_by_me(field) {
            return;
        }
        self.send(FormMessage::unlock_request(field));
    }

    /// Arm (or re-arm) the debounced lock intent for a field
    fn field_focus(&mut self, field: String) {
        if self.state().locks.contains_key(&field) {
            return;
        }
        match self.pending.get(&field) {
            Some(key) => self.debounce.reset(key, self.debounce_delay),
            None => {
                let key = self.debounce.insert(field.clone(), self.debounce_delay);
                self.pending.insert(field, key);
            }
        }
    }

    /// Cancel any pending intent and release the lock if it is ours
    fn field_blur(&mut self, field: &str) {
        if let Some(key) = self.pending.remove(field) {
            self.debounce.remove(&key);
        }
        self.request_unlock(field);
    }

    /// Typing outranks the debounce wait: promote a pending intent to a lock
    /// request now, then propagate the value
    fn field_change(&mut self, field: String, value: Value) {
        if let Some(key) = self.pending.remove(&field) {
            self.debounce.remove(&key);
            self.request_lock(&field);
        }
        self.update_field(field, value);
    }

    fn debounce_elapsed(&mut self, field: String) {
        self.pending.remove(&field);
        trace!("[Store] debounce elapsed for '{}'", field);
        self.request_lock(&field);
    }

    fn subscribe(&mut self, id: u64, callback: ObserverCallback) {
        self.observers.insert(id, callback);
        let snapshot = self.state().clone();
        self.observers
            .replay(id, &snapshot.values, &snapshot.locks, &snapshot.roster);
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StateChanged(state) => {
                debug!("[Store] connection is now {:?}", state);
                self.state_mut().connection = state;
            }
            SessionEvent::Inbound(message) => self.reconcile(message),
            SessionEvent::Error(error) => self.observers.notify_error(&error),
        }
    }

    /// Apply one authoritative broadcast to the local caches
    fn reconcile(&mut self, message: FormMessage) {
        match message {
            FormMessage::Welcome(data) => self.adopt_identity(data.participant_id),
            FormMessage::Join(data) => self.upsert_participant(data.participant),
            FormMessage::Leave(data) => self.remove_participant(&data.participant_id),
            FormMessage::Update(data) => {
                if let Some(participant) = data.participant {
                    self.upsert_participant(participant);
                }
                if let Some(field) = data.field {
                    let value = data.value.unwrap_or(Value::Null);
                    self.state_mut().values.insert(field.clone(), value.clone());
                    self.observers.notify_change(&field, &value);
                }
            }
            FormMessage::Lock(data) => match data.participant {
                Some(owner) => self.record_lock(data.field, owner),
                None => warn!(
                    "[Store] lock broadcast for '{}' names no owner, ignored",
                    data.field
                ),
            },
            FormMessage::Unlock(data) => self.clear_lock(&data.field, data.participant),
            FormMessage::Error(data) => {
                let error = match data.field {
                    Some(field) => ClientError::lock_conflict(field, data.message),
                    None => ClientError::Protocol(ProtocolError::remote(data.message)),
                };
                self.observers.notify_error(&error);
            }
            // Absorbed by the session; they never reach the store.
            FormMessage::HeartbeatPing | FormMessage::HeartbeatPong => {}
        }
    }

    /// Take the server-assigned id and start a fresh lock epoch
    ///
    /// Locks recorded under the previous session are stale: ours were
    /// released server-side when that session closed, and foreign ones will
    /// be re-learned from future broadcasts or conflict replies.
    fn adopt_identity(&mut self, id: String) {
        debug!("[Store] server assigned participant id {}", id);
        let released: Vec<String> = {
            let mut state = self.state_mut();
            state.participant.id = id;
            state.locks.drain().map(|(field, _)| field).collect()
        };
        for field in released {
            self.observers.notify_lock(&field, None);
        }
    }

    fn upsert_participant(&mut self, participant: Participant) {
        {
            let mut state = self.state_mut();
            match state.roster.iter_mut().find(|p| p.id == participant.id) {
                Some(existing) => *existing = participant,
                None => state.roster.push(participant),
            }
        }
        let roster = self.state().roster.clone();
        self.observers.notify_users(&roster);
    }

    fn remove_participant(&mut self, id: &str) {
        let removed = {
            let mut state = self.state_mut();
            let before = state.roster.len();
            state.roster.retain(|p| p.id != id);
            state.roster.len() != before
        };
        if removed {
            let roster = self.state().roster.clone();
            self.observers.notify_users(&roster);
        }
    }

    /// Record a lock broadcast; our own echo is absorbed silently
    fn record_lock(&mut self, field: String, owner: Participant) {
        let mine = owner.id == self.state().participant.id;
        self.state_mut().locks.insert(field.clone(), owner.clone());
        if mine {
            trace!("[Store] own lock on '{}' confirmed", field);
            return;
        }
        self.observers.notify_lock(&field, Some(&owner));
    }

    /// Clear a lock record; suppression falls back to the evicted record
    /// when the broadcast does not name the former owner
    fn clear_lock(&mut self, field: &str, former_owner: Option<Participant>) {
        let (evicted, my_id) = {
            let mut state = self.state_mut();
            let evicted = state.locks.remove(field);
            (evicted, state.participant.id.clone())
        };
        let former = former_owner.or(evicted);
        if former.map(|owner| owner.id == my_id).unwrap_or(false) {
            trace!("[Store] own unlock of '{}' confirmed", field);
            return;
        }
        self.observers.notify_lock(field, None);
    }

    fn is_locked_by_me(&self, field: &str) -> bool {
        let state = self.state();
        state
            .locks
            .get(field)
            .map(|owner| owner.id == state.participant.id)
            .unwrap_or(false)
    }

    fn send(&self, message: FormMessage) {
        trace!("[Store] sending {}", message.kind());
        if self.session.send(message).is_err() {
            debug!("[Store] message dropped, session is gone");
        }
    }

    fn dispose(&mut self) {
        debug!("[Store] disposing");
        self.debounce.clear();
        self.pending.clear();
        // Cleared before the session closes: nothing fires after this point.
        self.observers.clear();
        self.session.close();
    }

    fn state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap()
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap()
    }
}
