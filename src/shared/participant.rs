/**
 * Participant Data Structures
 *
 * This module defines the Participant struct shared between the client and
 * the server, plus the server-side FieldLock record.
 *
 * A Participant is created when a session first announces itself with a
 * `join` message. Its `id` is always assigned by the server (the session id);
 * any id supplied by a client is ignored, so two sessions can never claim
 * the same identity.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected (or locally known) participant
///
/// The `id` is an opaque string. On the server it is the session's UUID; on
/// the client it starts as a locally generated placeholder and is replaced
/// by the server-assigned id carried in the `welcome` message.
///
/// # Example
/// ```rust
/// use xfform::shared::participant::Participant;
///
/// let participant = Participant::new("Alice");
/// assert_eq!(participant.display_name, "Alice");
/// assert!(!participant.id.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Opaque identity, assigned by the server
    pub id: String,
    /// Human-readable name shown next to locked fields
    pub display_name: String,
}

impl Participant {
    /// Create a participant with a freshly generated placeholder id
    ///
    /// Used on the client before the server has assigned the real id.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.into(),
        }
    }

    /// Create a participant with a known id
    ///
    /// Used on the server, where the id is the session id.
    pub fn with_id(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A lock held on a single form field
///
/// Server-internal record: the wire protocol carries only the field name and
/// the owner. At most one FieldLock exists per field name at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLock {
    /// The locked field name
    pub field: String,
    /// The participant holding the lock
    pub owner: Participant,
    /// When the lock was granted
    pub acquired_at: DateTime<Utc>,
}

impl FieldLock {
    /// Create a lock acquired now
    pub fn new(field: impl Into<String>, owner: Participant) -> Self {
        Self {
            field: field.into(),
            owner,
            acquired_at: Utc::now(),
        }
    }

    /// Whether the lock is held by the participant with the given id
    pub fn is_owned_by(&self, participant_id: &str) -> bool {
        self.owner.id == participant_id
    }
}
