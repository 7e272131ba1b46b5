/**
 * Form Store
 *
 * The UI-facing handle for collaborative form editing. A `FormStore` is a
 * cheap clone: all of them talk to one background worker that owns the
 * authoritative local caches and performs every mutation in order.
 *
 * Intent operations (`handle_field_focus`, `update_field`, ...) enqueue work
 * and return immediately; getters read a shared mirror and never touch the
 * network. Observer registrations replay current state once, then follow
 * live broadcasts.
 */
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::client::error::ClientError;
use crate::client::observers::{ObserverCallback, Subscription};
use crate::client::session::{ConnectionSession, SessionState};
use crate::client::transport::{Connector, WsConnector};
use crate::client::worker::{StoreCommand, StoreState, StoreWorker};
use crate::shared::config::{ClientConfig, ConfigError};
use crate::shared::participant::Participant;

/// Handle to a collaborative form editing session
///
/// # Example
///
/// ```no_run
/// use xfform::client::FormStore;
/// use xfform::shared::ClientConfig;
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new("ws://localhost:3001/ws", "Alice");
/// let store = FormStore::connect(config)?;
///
/// let _changes = store.on_change(|field, value| {
///     println!("{field} is now {value}");
/// });
/// store.handle_field_focus("email")?;
/// store.handle_field_change("email", "a@example.com".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FormStore {
    commands: mpsc::UnboundedSender<StoreCommand>,
    state: Arc<RwLock<StoreState>>,
    next_subscription: Arc<AtomicU64>,
}

impl FormStore {
    /// Validate the configuration and connect over WebSocket
    ///
    /// Returns immediately; connecting, joining, and any reconnecting happen
    /// in the background. Progress is observable via [`FormStore::on_error`]
    /// and [`FormStore::get_connection_state`].
    pub fn connect(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let connector = Arc::new(WsConnector::new(&config.server_url));
        Ok(Self::connect_with_connector(connector, config))
    }

    /// Connect through a caller-supplied transport
    ///
    /// Used for in-process wiring and tests; `connect` is the WebSocket
    /// convenience over this.
    pub fn connect_with_connector(connector: Arc<dyn Connector>, config: ClientConfig) -> Self {
        let participant = Participant::new(&config.display_name);
        let state = Arc::new(RwLock::new(StoreState::new(participant.clone())));
        let (session, session_events) = ConnectionSession::spawn(connector, participant, &config);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let worker = StoreWorker::new(
            state.clone(),
            command_rx,
            session,
            session_events,
            config.debounce_delay,
        );
        tokio::spawn(worker.run());
        Self {
            commands,
            state,
            next_subscription: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Set a field value locally and propagate it to all participants
    pub fn update_field(&self, field: impl Into<String>, value: Value) -> Result<(), ClientError> {
        self.command(StoreCommand::UpdateField {
            field: field.into(),
            value,
        })
    }

    /// Request a lock on `field` unless it is already held
    pub fn lock_field(&self, field: impl Into<String>) -> Result<(), ClientError> {
        self.command(StoreCommand::LockField {
            field: field.into(),
        })
    }

    /// Release the lock on `field` if this participant holds it
    pub fn unlock_field(&self, field: impl Into<String>) -> Result<(), ClientError> {
        self.command(StoreCommand::UnlockField {
            field: field.into(),
        })
    }

    /// A field gained focus: arm the debounced lock intent
    pub fn handle_field_focus(&self, field: impl Into<String>) -> Result<(), ClientError> {
        self.command(StoreCommand::FieldFocus {
            field: field.into(),
        })
    }

    /// A field lost focus: cancel the intent and release our lock
    pub fn handle_field_blur(&self, field: impl Into<String>) -> Result<(), ClientError> {
        self.command(StoreCommand::FieldBlur {
            field: field.into(),
        })
    }

    /// A field's value changed: lock immediately if an intent is pending,
    /// then propagate the value
    pub fn handle_field_change(
        &self,
        field: impl Into<String>,
        value: Value,
    ) -> Result<(), ClientError> {
        self.command(StoreCommand::FieldChange {
            field: field.into(),
            value,
        })
    }

    /// Shut down: cancel pending intents, drop observers, close the
    /// connection. Idempotent; later intent calls return
    /// [`ClientError::Disposed`].
    pub fn disconnect(&self) {
        let _ = self.commands.send(StoreCommand::Dispose);
    }

    /// Last observed value for `field`, if any
    pub fn get_field(&self, field: &str) -> Option<Value> {
        self.state().values.get(field).cloned()
    }

    /// Whether any participant currently holds `field`
    pub fn is_field_locked(&self, field: &str) -> bool {
        self.state().locks.contains_key(field)
    }

    /// Whether this participant currently holds `field`
    pub fn is_field_locked_by_me(&self, field: &str) -> bool {
        let state = self.state();
        state
            .locks
            .get(field)
            .map(|owner| owner.id == state.participant.id)
            .unwrap_or(false)
    }

    /// The participant holding `field`, if any
    pub fn get_field_locker(&self, field: &str) -> Option<Participant> {
        self.state().locks.get(field).cloned()
    }

    /// The currently known participants, in arrival order
    pub fn get_users(&self) -> Vec<Participant> {
        self.state().roster.clone()
    }

    /// This client's own identity; the id becomes server-assigned once the
    /// first welcome arrives
    pub fn get_participant(&self) -> Participant {
        self.state().participant.clone()
    }

    /// Current connection lifecycle state
    pub fn get_connection_state(&self) -> SessionState {
        self.state().connection
    }

    /// Observe field value changes
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &Value) + Send + 'static,
    {
        self.subscribe(ObserverCallback::Change(Box::new(callback)))
    }

    /// Observe roster changes; called with the full participant list
    pub fn on_users_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[Participant]) + Send + 'static,
    {
        self.subscribe(ObserverCallback::Users(Box::new(callback)))
    }

    /// Observe lock changes; `None` means the field was released
    ///
    /// Echoes of this client's own lock and unlock requests are suppressed.
    pub fn on_field_lock_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, Option<&Participant>) + Send + 'static,
    {
        self.subscribe(ObserverCallback::FieldLock(Box::new(callback)))
    }

    /// Observe errors: lock conflicts, protocol problems, connectivity loss
    pub fn on_error<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ClientError) + Send + 'static,
    {
        self.subscribe(ObserverCallback::Error(Box::new(callback)))
    }

    fn subscribe(&self, callback: ObserverCallback) -> Subscription {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        let _ = self.commands.send(StoreCommand::Subscribe { id, callback });
        Subscription::new(id, self.commands.clone())
    }

    fn command(&self, command: StoreCommand) -> Result<(), ClientError> {
        self.commands.send(command).map_err(|_| ClientError::Disposed)
    }

    fn state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap()
    }
}
