/**
 * Lock Table and Roster
 *
 * Pure coordinator state: which participant holds which field, and who is
 * connected. Methods here are synchronous and never block; serializing
 * access to them is the actor's job.
 *
 * # Invariant
 *
 * At most one `FieldLock` exists per field name. Every mutation below
 * preserves it, so mutual exclusion holds as long as all writes go through
 * this table.
 */
use std::collections::HashMap;

use uuid::Uuid;

use crate::shared::participant::{FieldLock, Participant};

/// Server-side session identity; doubles as the participant id
pub type SessionId = Uuid;

/// The single source of truth for field locks
#[derive(Default)]
pub struct LockTable {
    locks: HashMap<String, FieldLock>,
}

impl LockTable {
    /// Grant `field` to `owner`, or report the current holder
    pub fn lock(&mut self, field: &str, owner: &Participant) -> Result<FieldLock, Participant> {
        match self.locks.get(field) {
            Some(existing) => Err(existing.owner.clone()),
            None => {
                let lock = FieldLock::new(field, owner.clone());
                self.locks.insert(field.to_string(), lock.clone());
                Ok(lock)
            }
        }
    }

    /// Release `field` if `owner_id` holds it
    ///
    /// Unlocking an unheld field, or one held by someone else, is a silent
    /// no-op: stale client intents racing a remote unlock are expected and
    /// must stay harmless.
    pub fn unlock(&mut self, field: &str, owner_id: &str) -> Option<FieldLock> {
        if !self.locks.get(field)?.is_owned_by(owner_id) {
            return None;
        }
        self.locks.remove(field)
    }

    /// Release every lock held by `owner_id`, returning the dropped records
    pub fn release_all(&mut self, owner_id: &str) -> Vec<FieldLock> {
        let mut released = Vec::new();
        self.locks.retain(|_, lock| {
            if lock.is_owned_by(owner_id) {
                released.push(lock.clone());
                false
            } else {
                true
            }
        });
        released
    }

    /// The participant holding `field`, if any
    pub fn holder(&self, field: &str) -> Option<&Participant> {
        self.locks.get(field).map(|lock| &lock.owner)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Connected participants, keyed by session
#[derive(Default)]
pub struct Roster {
    participants: HashMap<SessionId, Participant>,
}

impl Roster {
    /// Insert or refresh the participant record for a session
    pub fn upsert(&mut self, session: SessionId, participant: Participant) {
        self.participants.insert(session, participant);
    }

    pub fn get(&self, session: &SessionId) -> Option<&Participant> {
        self.participants.get(session)
    }

    pub fn remove(&mut self, session: &SessionId) -> Option<Participant> {
        self.participants.remove(session)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
