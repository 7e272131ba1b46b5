/**
 * Wire Protocol Messages
 *
 * This module defines the FormMessage enum used for all client/server
 * communication, and its encode/decode contract.
 *
 * Every message travels as one UTF-8 JSON text frame with the envelope
 * `{"type": <kind>, "data": <payload>}`. The enum is adjacently tagged so
 * the serialized form matches that envelope exactly. The protocol is
 * stateless per message: there are no sequence numbers, and lock/unlock
 * must be applied idempotently by the receiver.
 *
 * Decoding a malformed frame fails with a `ProtocolError` and must never
 * tear down the session that received it.
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::ProtocolError;
use crate::shared::participant::Participant;

/// A single protocol message
///
/// Serialized as `{"type": <kind>, "data": <payload>}` where kind is one of
/// `join`, `welcome`, `leave`, `update`, `lock`, `unlock`, `error`,
/// `heartbeat-ping`, `heartbeat-pong`.
///
/// # Example
/// ```rust
/// use xfform::shared::protocol::FormMessage;
///
/// let message = FormMessage::update("email", serde_json::json!("a@b.c"));
/// let text = message.encode().unwrap();
/// assert_eq!(FormMessage::decode(&text).unwrap(), message);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum FormMessage {
    /// A session announces (or refreshes) its participant identity
    Join(JoinData),
    /// Server → one session: your server-assigned participant id
    ///
    /// Always the first message a session receives, so a client knows its
    /// own id before any echo of its own requests can arrive.
    Welcome(WelcomeData),
    /// Server → all: a participant left
    Leave(LeaveData),
    /// A field value changed, and/or a participant record was refreshed
    Update(UpdateData),
    /// Request (client → server) or grant broadcast (server → all) of a
    /// field lock
    Lock(LockData),
    /// Release request or release broadcast of a field lock
    Unlock(UnlockData),
    /// Server → one session: a request failed (lock conflict or malformed
    /// input); never broadcast
    Error(ErrorData),
    /// Client → server liveness probe
    HeartbeatPing,
    /// Server → one session: reply to a liveness probe
    HeartbeatPong,
}

/// Payload of `join`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinData {
    /// The sender's participant record; the server overwrites its id
    pub participant: Participant,
}

/// Payload of `welcome`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeData {
    /// The id the server assigned to the receiving session
    pub participant_id: String,
}

/// Payload of `leave`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveData {
    /// Id of the participant that departed
    pub participant_id: String,
}

/// Payload of `update`
///
/// Historically this payload is all-optional: `field` + `value` is a value
/// broadcast, while a bare `participant` is the legacy roster-refresh form
/// (the server normalizes those to `join` broadcasts).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateData {
    /// The changed field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The new value (arbitrary JSON, last-writer-wins)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Refreshed participant record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Participant>,
}

/// Payload of `lock`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockData {
    /// The field to lock (request) or the field that was locked (broadcast)
    pub field: String,
    /// On broadcasts: the owner. On requests the server ignores this and
    /// attributes the lock to the sending session's registered participant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Participant>,
}

/// Payload of `unlock`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockData {
    /// The field to release (request) or that was released (broadcast)
    pub field: String,
    /// On broadcasts: the former owner, so clients can apply the self-echo
    /// suppression rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Participant>,
}

/// Payload of `error`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorData {
    /// Human-readable error text
    pub message: String,
    /// Set when the error concerns a specific field (lock conflicts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FormMessage {
    /// Build a `join` message
    pub fn join(participant: Participant) -> Self {
        Self::Join(JoinData { participant })
    }

    /// Build a `welcome` message
    pub fn welcome(participant_id: impl Into<String>) -> Self {
        Self::Welcome(WelcomeData {
            participant_id: participant_id.into(),
        })
    }

    /// Build a `leave` message
    pub fn leave(participant_id: impl Into<String>) -> Self {
        Self::Leave(LeaveData {
            participant_id: participant_id.into(),
        })
    }

    /// Build a field-value `update` message
    pub fn update(field: impl Into<String>, value: Value) -> Self {
        Self::Update(UpdateData {
            field: Some(field.into()),
            value: Some(value),
            participant: None,
        })
    }

    /// Build a `lock` request carrying the requester's current record
    pub fn lock_request(field: impl Into<String>, participant: Participant) -> Self {
        Self::Lock(LockData {
            field: field.into(),
            participant: Some(participant),
        })
    }

    /// Build a `lock` grant broadcast
    pub fn lock_granted(field: impl Into<String>, owner: Participant) -> Self {
        Self::Lock(LockData {
            field: field.into(),
            participant: Some(owner),
        })
    }

    /// Build an `unlock` request
    pub fn unlock_request(field: impl Into<String>) -> Self {
        Self::Unlock(UnlockData {
            field: field.into(),
            participant: None,
        })
    }

    /// Build an `unlock` broadcast, naming the former owner when known
    pub fn unlock_released(
        field: impl Into<String>,
        former_owner: impl Into<Option<Participant>>,
    ) -> Self {
        Self::Unlock(UnlockData {
            field: field.into(),
            participant: former_owner.into(),
        })
    }

    /// Build an `error` reply
    pub fn error(message: impl Into<String>, field: Option<String>) -> Self {
        Self::Error(ErrorData {
            message: message.into(),
            field,
        })
    }

    /// Serialize to one wire frame
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::encode(e.to_string()))
    }

    /// Parse one wire frame
    ///
    /// Fails with `ProtocolError::Decode` on invalid JSON, an unknown kind,
    /// or a payload that does not match the kind.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::decode(e.to_string()))
    }

    /// The wire name of this message's kind (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Welcome(_) => "welcome",
            Self::Leave(_) => "leave",
            Self::Update(_) => "update",
            Self::Lock(_) => "lock",
            Self::Unlock(_) => "unlock",
            Self::Error(_) => "error",
            Self::HeartbeatPing => "heartbeat-ping",
            Self::HeartbeatPong => "heartbeat-pong",
        }
    }
}
