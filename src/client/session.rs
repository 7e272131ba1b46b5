/**
 * Connection Session
 *
 * This module owns one transport connection's lifecycle on the client side:
 * connecting, the heartbeat/liveness watchdog, reconnecting with exponential
 * backoff, and outbound buffering while the link is down.
 *
 * # State machine
 *
 * ```text
 * Connecting ──ok──► Open ──drop──► Retrying ──delay──► Connecting ─ ─ ─
 *     │                │                │                      │
 *     └──fail──► Retrying               │  (attempts exhausted)│
 *                                       └──────► Terminal ◄────┘
 * ```
 *
 * A deliberate `close()` exits from any state without entering Terminal and
 * emits nothing further.
 *
 * # Guarantees
 *
 * - Messages sent while not Open queue in FIFO order and are flushed, in
 *   order, the moment the session re-enters Open.
 * - `join` is re-sent on every entry into Open, before the queue flush: the
 *   server forgets this participant on every disconnect, so presence must be
 *   re-established first.
 * - A successful reconnect resets the attempt counter.
 * - All side effects are delivered as `SessionEvent`s on the event channel
 *   returned by `spawn`; after a deliberate close or a terminal failure the
 *   channel simply closes.
 */
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::client::error::ClientError;
use crate::client::transport::{Connector, Transport};
use crate::shared::config::{ClientConfig, ReconnectConfig};
use crate::shared::participant::Participant;
use crate::shared::protocol::FormMessage;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A connect attempt is in flight
    Connecting,
    /// The transport is established and traffic flows
    Open,
    /// The transport dropped; a reconnect is scheduled
    Retrying {
        /// The upcoming 1-based reconnect attempt
        attempt: u32,
    },
    /// The reconnect budget is exhausted; no further recovery
    Terminal,
}

/// Asynchronous notifications from a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session changed state
    StateChanged(SessionState),
    /// A protocol message arrived
    Inbound(FormMessage),
    /// A non-fatal or terminal error occurred
    Error(ClientError),
}

enum SessionCommand {
    Send(FormMessage),
    Close,
}

/// Cheap cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Transmit a message, or queue it if the session is not Open
    pub fn send(&self, message: FormMessage) -> Result<(), ClientError> {
        self.commands
            .send(SessionCommand::Send(message))
            .map_err(|_| ClientError::Disposed)
    }

    /// Deliberately shut the session down; idempotent
    pub fn close(&self) {
        let _ = self.commands.send(SessionCommand::Close);
    }
}

/// Factory for spawned connection sessions
pub struct ConnectionSession;

impl ConnectionSession {
    /// Spawn a session task and return its handle plus the event channel
    ///
    /// The session starts connecting immediately. The `participant` record is
    /// announced via `join` on every entry into Open; its id is replaced by
    /// the server-assigned one carried in the `welcome` message.
    pub fn spawn(
        connector: Arc<dyn Connector>,
        participant: Participant,
        config: &ClientConfig,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let runner = SessionRunner {
            connector,
            participant,
            heartbeat_interval: config.heartbeat_interval,
            liveness_timeout: config.liveness_timeout,
            reconnect: config.reconnect.clone(),
            commands: command_rx,
            events: event_tx,
            queue: VecDeque::new(),
            attempts: 0,
        };
        tokio::spawn(runner.run());
        (
            SessionHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }
}

enum Establish {
    Connected(Box<dyn Transport>),
    Failed,
    Closed,
}

enum Drive {
    Closed,
    Dropped,
}

struct SessionRunner {
    connector: Arc<dyn Connector>,
    participant: Participant,
    heartbeat_interval: Duration,
    liveness_timeout: Duration,
    reconnect: ReconnectConfig,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    queue: VecDeque<FormMessage>,
    attempts: u32,
}

impl SessionRunner {
    async fn run(mut self) {
        loop {
            self.set_state(SessionState::Connecting);
            match self.establish().await {
                Establish::Connected(transport) => {
                    self.attempts = 0;
                    self.set_state(SessionState::Open);
                    match self.drive(transport).await {
                        Drive::Closed => {
                            debug!("[Session] closed deliberately");
                            return;
                        }
                        Drive::Dropped => {}
                    }
                }
                Establish::Failed => {}
                Establish::Closed => {
                    debug!("[Session] closed while connecting");
                    return;
                }
            }

            self.attempts += 1;
            if self.attempts > self.reconnect.max_attempts {
                warn!(
                    "[Session] giving up after {} reconnect attempts",
                    self.reconnect.max_attempts
                );
                self.set_state(SessionState::Terminal);
                self.emit_error(ClientError::terminal(
                    self.reconnect.max_attempts,
                    "reconnect attempts exhausted",
                ));
                return;
            }
            let delay = self.reconnect.delay_for(self.attempts);
            debug!(
                "[Session] reconnect attempt {} in {:?}",
                self.attempts, delay
            );
            self.set_state(SessionState::Retrying {
                attempt: self.attempts,
            });
            if !self.backoff(delay).await {
                debug!("[Session] closed while waiting to reconnect");
                return;
            }
        }
    }

    /// Connect while still queueing sends and honoring close
    async fn establish(&mut self) -> Establish {
        enum Step {
            Outcome(Result<Box<dyn Transport>, ClientError>),
            Command(Option<SessionCommand>),
        }

        let connector = Arc::clone(&self.connector);
        let connect = connector.connect();
        tokio::pin!(connect);
        loop {
            let step = tokio::select! {
                outcome = &mut connect => Step::Outcome(outcome),
                command = self.commands.recv() => Step::Command(command),
            };
            match step {
                Step::Outcome(Ok(transport)) => return Establish::Connected(transport),
                Step::Outcome(Err(error)) => {
                    self.emit_error(error);
                    return Establish::Failed;
                }
                Step::Command(Some(SessionCommand::Send(message))) => {
                    self.queue.push_back(message)
                }
                Step::Command(Some(SessionCommand::Close)) | Step::Command(None) => {
                    return Establish::Closed
                }
            }
        }
    }

    /// Run the Open phase until the transport drops or the session closes
    async fn drive(&mut self, mut transport: Box<dyn Transport>) -> Drive {
        enum Step {
            Command(Option<SessionCommand>),
            Inbound(Option<Result<FormMessage, ClientError>>),
            Heartbeat,
            LivenessExpired,
        }

        // Presence first: the server forgot us on the last disconnect.
        if let Err(error) = transport.send(&FormMessage::join(self.participant.clone())).await {
            self.emit_error(error);
            return Drive::Dropped;
        }
        while let Some(message) = self.queue.pop_front() {
            trace!("[Session] flushing queued {}", message.kind());
            if let Err(error) = transport.send(&message).await {
                self.queue.push_front(message);
                self.emit_error(error);
                return Drive::Dropped;
            }
        }

        let mut heartbeat = interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut liveness_deadline = Instant::now() + self.liveness_timeout;

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => Step::Command(command),
                inbound = transport.recv() => Step::Inbound(inbound),
                _ = heartbeat.tick() => Step::Heartbeat,
                _ = sleep_until(liveness_deadline) => Step::LivenessExpired,
            };
            match step {
                Step::Command(Some(SessionCommand::Send(message))) => {
                    if let Err(error) = transport.send(&message).await {
                        self.queue.push_back(message);
                        self.emit_error(error);
                        return Drive::Dropped;
                    }
                }
                Step::Command(Some(SessionCommand::Close)) | Step::Command(None) => {
                    transport.close().await;
                    return Drive::Closed;
                }
                Step::Inbound(Some(Ok(message))) => {
                    liveness_deadline = Instant::now() + self.liveness_timeout;
                    match message {
                        FormMessage::HeartbeatPong => trace!("[Session] pong"),
                        FormMessage::HeartbeatPing => {
                            if let Err(error) = transport.send(&FormMessage::HeartbeatPong).await {
                                self.emit_error(error);
                                return Drive::Dropped;
                            }
                        }
                        FormMessage::Welcome(ref welcome) => {
                            debug!("[Session] assigned id {}", welcome.participant_id);
                            self.participant.id = welcome.participant_id.clone();
                            self.emit(SessionEvent::Inbound(message));
                        }
                        other => self.emit(SessionEvent::Inbound(other)),
                    }
                }
                Step::Inbound(Some(Err(error @ ClientError::Protocol(_)))) => {
                    // Malformed frame: report it, keep the session alive.
                    self.emit_error(error);
                }
                Step::Inbound(Some(Err(error))) => {
                    self.emit_error(error);
                    return Drive::Dropped;
                }
                Step::Inbound(None) => {
                    self.emit_error(ClientError::connectivity("connection closed by peer"));
                    return Drive::Dropped;
                }
                Step::Heartbeat => {
                    trace!("[Session] ping");
                    if let Err(error) = transport.send(&FormMessage::HeartbeatPing).await {
                        self.emit_error(error);
                        return Drive::Dropped;
                    }
                }
                Step::LivenessExpired => {
                    self.emit_error(ClientError::connectivity(format!(
                        "liveness timeout: nothing heard for {:?}",
                        self.liveness_timeout
                    )));
                    transport.close().await;
                    return Drive::Dropped;
                }
            }
        }
    }

    /// Wait out a reconnect delay; returns false on deliberate close
    async fn backoff(&mut self, delay: Duration) -> bool {
        enum Step {
            Elapsed,
            Command(Option<SessionCommand>),
        }

        let timer = sleep(delay);
        tokio::pin!(timer);
        loop {
            let step = tokio::select! {
                _ = &mut timer => Step::Elapsed,
                command = self.commands.recv() => Step::Command(command),
            };
            match step {
                Step::Elapsed => return true,
                Step::Command(Some(SessionCommand::Send(message))) => {
                    self.queue.push_back(message)
                }
                Step::Command(Some(SessionCommand::Close)) | Step::Command(None) => return false,
            }
        }
    }

    fn set_state(&self, state: SessionState) {
        self.emit(SessionEvent::StateChanged(state));
    }

    fn emit_error(&self, error: ClientError) {
        self.emit(SessionEvent::Error(error));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
