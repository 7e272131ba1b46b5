/**
 * Observer Registry
 *
 * Callback storage for the form store. Every registration — value changes,
 * roster changes, lock changes, errors — lands in one table keyed by a
 * store-allocated id, so removal is O(1) and a handle stays valid no matter
 * how many other observers come and go around it.
 *
 * The registry lives inside the store worker and is only ever touched from
 * that task; the callbacks themselves must be `Send` so they can move there.
 */
use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::client::error::ClientError;
use crate::client::worker::StoreCommand;
use crate::shared::participant::Participant;

/// A registered callback, tagged by what it listens to
pub enum ObserverCallback {
    /// Field value changed: `(field, value)`
    Change(Box<dyn Fn(&str, &Value) + Send>),
    /// Roster changed: the full current participant list
    Users(Box<dyn Fn(&[Participant]) + Send>),
    /// Lock state changed: `(field, owner)` with `None` meaning released
    FieldLock(Box<dyn Fn(&str, Option<&Participant>) + Send>),
    /// An error surfaced from the protocol, a lock conflict, or the link
    Error(Box<dyn Fn(&ClientError) + Send>),
}

/// Handle returned by the store's `on_*` registration methods
///
/// Call [`Subscription::unsubscribe`] to stop receiving callbacks. Dropping
/// the handle without unsubscribing leaves the observer registered until the
/// store is disconnected.
pub struct Subscription {
    id: u64,
    commands: mpsc::UnboundedSender<StoreCommand>,
}

impl Subscription {
    pub(crate) fn new(id: u64, commands: mpsc::UnboundedSender<StoreCommand>) -> Self {
        Self { id, commands }
    }

    /// Remove this observer; no callback runs after the removal is processed
    pub fn unsubscribe(self) {
        let _ = self.commands.send(StoreCommand::Unsubscribe { id: self.id });
    }
}

/// The callback table itself
#[derive(Default)]
pub struct Observers {
    callbacks: HashMap<u64, ObserverCallback>,
}

impl Observers {
    pub fn insert(&mut self, id: u64, callback: ObserverCallback) {
        trace!("[Store] observer {} registered", id);
        self.callbacks.insert(id, callback);
    }

    pub fn remove(&mut self, id: u64) {
        trace!("[Store] observer {} removed", id);
        self.callbacks.remove(&id);
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn notify_change(&self, field: &str, value: &Value) {
        for callback in self.callbacks.values() {
            if let ObserverCallback::Change(f) = callback {
                f(field, value);
            }
        }
    }

    pub fn notify_users(&self, roster: &[Participant]) {
        for callback in self.callbacks.values() {
            if let ObserverCallback::Users(f) = callback {
                f(roster);
            }
        }
    }

    pub fn notify_lock(&self, field: &str, owner: Option<&Participant>) {
        for callback in self.callbacks.values() {
            if let ObserverCallback::FieldLock(f) = callback {
                f(field, owner);
            }
        }
    }

    pub fn notify_error(&self, error: &ClientError) {
        for callback in self.callbacks.values() {
            if let ObserverCallback::Error(f) = callback {
                f(error);
            }
        }
    }

    /// Bring one just-registered observer up to date with current state
    ///
    /// Change observers see every known field value, lock observers every
    /// held lock, users observers the roster. Error observers get nothing;
    /// errors are events, not state.
    pub fn replay(
        &self,
        id: u64,
        values: &HashMap<String, Value>,
        locks: &HashMap<String, Participant>,
        roster: &[Participant],
    ) {
        match self.callbacks.get(&id) {
            Some(ObserverCallback::Change(f)) => {
                for (field, value) in values {
                    f(field, value);
                }
            }
            Some(ObserverCallback::Users(f)) => f(roster),
            Some(ObserverCallback::FieldLock(f)) => {
                for (field, owner) in locks {
                    f(field, Some(owner));
                }
            }
            Some(ObserverCallback::Error(_)) | None => {}
        }
    }
}
