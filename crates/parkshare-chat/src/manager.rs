//! Chat session manager: one realtime connection per booking.
//!
//! Responsibilities:
//! - Keep the booking id → session map (at most one entry per booking)
//! - Drive each session on its own task: handshake, inbound dispatch, outbound writes
//! - Expose `open` / `send` / `close` / `close_all`
//!
//! Session state only moves forward: `Connecting → Open → Closed`, or
//! `Connecting → Closed` when the handshake fails. `Closed` is terminal and
//! the map entry is gone by the time anyone can observe it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch, Notify};
use tracing::{debug, info, warn};
use url::Url;

use parkshare_core::config::ChatConfig;
use parkshare_core::{BookingId, ChatMessage};

use crate::error::ChatError;
use crate::frame::{chat_url, encode_outbound, is_normal_close, parse_chat_frame, parse_endpoint};
use crate::handler::{CallbackHandler, ChatHandler};
use crate::transport::{Connection, Connector, InboundFrame};

tokio::task_local! {
    /// Generation of the session whose callback is running on this task.
    static DISPATCHING: u64;
}

// ─────────────────────────────────────────────
// Session state
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// Caller-side view of one session.
///
/// Dropping the handle does not close the session; use
/// [`ChatSessionManager::close`].
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    booking_id: BookingId,
    state: watch::Receiver<SessionState>,
}

impl ConnectionHandle {
    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the handshake finishes. Fails with `NotConnected` if the
    /// session closes first.
    pub async fn wait_open(&mut self) -> Result<(), ChatError> {
        let booking_id = self.booking_id;
        let state = self
            .state
            .wait_for(|s| *s != SessionState::Connecting)
            .await
            .map(|s| *s)
            .unwrap_or(SessionState::Closed);
        match state {
            SessionState::Open => Ok(()),
            _ => Err(ChatError::NotConnected { booking_id }),
        }
    }

    /// Wait until the session reaches `Closed`.
    pub async fn closed(&mut self) {
        let _ = self.state.wait_for(|s| *s == SessionState::Closed).await;
    }
}

/// Shared between the map entry and the session task.
struct Session {
    booking_id: BookingId,
    generation: u64,
    state: watch::Sender<SessionState>,
    shutdown: Notify,
    /// Held while a callback runs, so `close` can wait out an in-flight one.
    dispatch: Mutex<()>,
}

impl Session {
    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn mark_open(&self) -> bool {
        self.state.send_if_modified(|s| {
            if *s == SessionState::Connecting {
                *s = SessionState::Open;
                true
            } else {
                false
            }
        })
    }

    /// Returns `false` if the session was already closed.
    fn mark_closed(&self) -> bool {
        self.state.send_if_modified(|s| {
            if *s == SessionState::Closed {
                false
            } else {
                *s = SessionState::Closed;
                true
            }
        })
    }

    /// Caller-initiated close. Once this returns no further callback for
    /// this session will start. Outside any callback it also waits for an
    /// in-flight one to finish; from inside a callback (of this or another
    /// session) it does not, since two callbacks closing each other would
    /// otherwise wait on each other's gate forever.
    fn shut_down(&self) {
        self.mark_closed();
        self.shutdown.notify_one();
        if !in_callback() {
            drop(lock(&self.dispatch));
        }
    }

    /// Run `f` as a callback unless the session has been closed.
    fn dispatch(&self, f: impl FnOnce()) {
        let _gate = lock(&self.dispatch);
        if self.state() == SessionState::Closed {
            return;
        }
        DISPATCHING.sync_scope(self.generation, f);
    }

    /// Close from the task side and run `f` as the final callback.
    fn finish(&self, sessions: &SessionMap, f: impl FnOnce()) {
        let _gate = lock(&self.dispatch);
        if !self.mark_closed() {
            return;
        }
        remove_if_current(sessions, self.booking_id, self.generation);
        DISPATCHING.sync_scope(self.generation, f);
    }
}

struct SessionEntry {
    session: Arc<Session>,
    outbound: mpsc::UnboundedSender<String>,
}

type SessionMap = Arc<Mutex<HashMap<BookingId, SessionEntry>>>;

/// Whether the current task is running a session callback.
fn in_callback() -> bool {
    DISPATCHING.try_with(|_| ()).is_ok()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drop the entry for `booking_id` only if it still belongs to `generation`.
fn remove_if_current(sessions: &SessionMap, booking_id: BookingId, generation: u64) {
    let mut map = lock(sessions);
    if map
        .get(&booking_id)
        .is_some_and(|e| e.session.generation == generation)
    {
        map.remove(&booking_id);
    }
}

// ─────────────────────────────────────────────
// ChatSessionManager
// ─────────────────────────────────────────────

/// Owns the live chat sessions, keyed by booking id.
///
/// Construct one per application and share it (e.g. behind an `Arc`).
/// `open` must be called from within a tokio runtime. Dropping the manager
/// closes every session.
pub struct ChatSessionManager {
    endpoint: Url,
    connector: Arc<dyn Connector>,
    sessions: SessionMap,
    next_generation: AtomicU64,
}

impl ChatSessionManager {
    /// Create a manager for the configured chat endpoint.
    pub fn new(config: &ChatConfig, connector: Arc<dyn Connector>) -> Result<Self, ChatError> {
        let endpoint = parse_endpoint(&config.ws_url)?;
        Ok(Self {
            endpoint,
            connector,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        })
    }

    /// Open the chat session for `booking_id`, replacing any existing one.
    ///
    /// Returns immediately; the handshake runs in the background and the
    /// handle reports `Open` once it succeeds. Until then `send` fails with
    /// `NotConnected`.
    pub fn open(
        &self,
        booking_id: BookingId,
        token: &str,
        handler: Arc<dyn ChatHandler>,
    ) -> Result<ConnectionHandle, ChatError> {
        if booking_id <= 0 {
            return Err(ChatError::InvalidBookingId(booking_id));
        }
        if token.is_empty() {
            return Err(ChatError::EmptyToken);
        }
        let url = chat_url(&self.endpoint, booking_id, token)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ChatError::NoRuntime)?;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let session = Arc::new(Session {
            booking_id,
            generation,
            state: state_tx,
            shutdown: Notify::new(),
            dispatch: Mutex::new(()),
        });
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let previous = lock(&self.sessions).insert(
            booking_id,
            SessionEntry {
                session: session.clone(),
                outbound: outbound_tx,
            },
        );
        if let Some(old) = previous {
            debug!(booking_id, "replacing existing chat session");
            old.session.shut_down();
        }

        info!(booking_id, "opening chat session");
        runtime.spawn(run_session(
            session,
            self.connector.clone(),
            url,
            handler,
            outbound_rx,
            self.sessions.clone(),
        ));

        Ok(ConnectionHandle {
            booking_id,
            state: state_rx,
        })
    }

    /// [`open`](Self::open) with a pair of closures instead of a handler.
    pub fn open_with_callbacks<M, E>(
        &self,
        booking_id: BookingId,
        token: &str,
        on_message: M,
        on_error: E,
    ) -> Result<ConnectionHandle, ChatError>
    where
        M: Fn(ChatMessage) + Send + Sync + 'static,
        E: Fn(ChatError) + Send + Sync + 'static,
    {
        self.open(
            booking_id,
            token,
            Arc::new(CallbackHandler::new(on_message, on_error)),
        )
    }

    /// Write `{"content": ...}` on the open session for `booking_id`.
    ///
    /// Fails fast with `NotConnected` when there is no session or it is not
    /// open yet. Nothing is buffered for later delivery and no
    /// acknowledgement is awaited.
    pub fn send(&self, booking_id: BookingId, content: &str) -> Result<(), ChatError> {
        let sessions = lock(&self.sessions);
        let entry = sessions
            .get(&booking_id)
            .filter(|e| e.session.state() == SessionState::Open)
            .ok_or(ChatError::NotConnected { booking_id })?;

        let frame = encode_outbound(content)?;
        entry
            .outbound
            .send(frame)
            .map_err(|_| ChatError::NotConnected { booking_id })?;

        debug!(booking_id, content_len = content.len(), "chat message sent");
        Ok(())
    }

    /// Close the session for `booking_id`. No-op if there is none.
    ///
    /// The session is forgotten before this returns; the socket teardown
    /// finishes in the background.
    pub fn close(&self, booking_id: BookingId) {
        let removed = lock(&self.sessions).remove(&booking_id);
        if let Some(entry) = removed {
            info!(booking_id, "closing chat session");
            entry.session.shut_down();
        }
    }

    /// Close every tracked session.
    pub fn close_all(&self) {
        let drained: Vec<SessionEntry> = lock(&self.sessions).drain().map(|(_, e)| e).collect();
        if drained.is_empty() {
            return;
        }
        info!(count = drained.len(), "closing all chat sessions");
        for entry in drained {
            entry.session.shut_down();
        }
    }

    /// Current state of the session for `booking_id`, if one is tracked.
    pub fn state(&self, booking_id: BookingId) -> Option<SessionState> {
        lock(&self.sessions)
            .get(&booking_id)
            .map(|e| e.session.state())
    }

    pub fn is_open(&self, booking_id: BookingId) -> bool {
        self.state(booking_id) == Some(SessionState::Open)
    }

    /// Booking ids with a tracked session, sorted.
    pub fn booking_ids(&self) -> Vec<BookingId> {
        let mut ids: Vec<BookingId> = lock(&self.sessions).keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sessions).is_empty()
    }
}

impl Drop for ChatSessionManager {
    fn drop(&mut self) {
        self.close_all();
    }
}

// ─────────────────────────────────────────────
// Session task
// ─────────────────────────────────────────────

async fn run_session(
    session: Arc<Session>,
    connector: Arc<dyn Connector>,
    url: Url,
    handler: Arc<dyn ChatHandler>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    sessions: SessionMap,
) {
    let booking_id = session.booking_id;

    let connected = tokio::select! {
        biased;
        _ = session.shutdown.notified() => {
            debug!(booking_id, "chat session closed during handshake");
            return;
        }
        result = connector.connect(&url) => result,
    };

    let Connection {
        mut sink,
        mut stream,
    } = match connected {
        Ok(conn) => conn,
        Err(e) => {
            warn!(booking_id, error = %e, "chat handshake failed");
            session.finish(&sessions, || handler.on_error(booking_id, e));
            return;
        }
    };

    if !session.mark_open() {
        // Closed by the caller while the handshake was completing.
        let _ = sink.close().await;
        return;
    }
    info!(booking_id, "chat session open");
    session.dispatch(|| handler.on_open(booking_id));

    loop {
        tokio::select! {
            biased;
            _ = session.shutdown.notified() => {
                if let Err(e) = sink.close().await {
                    debug!(booking_id, error = %e, "error closing chat socket");
                }
                debug!(booking_id, "chat session task stopped");
                return;
            }
            Some(frame) = outbound.recv() => {
                if let Err(e) = sink.send(frame).await {
                    warn!(booking_id, error = %e, "chat write failed");
                    session.finish(&sessions, || handler.on_error(booking_id, e));
                    return;
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(InboundFrame::Text(raw))) => match parse_chat_frame(&raw) {
                    Ok(message) => {
                        debug!(booking_id, message_id = message.id, "chat message received");
                        session.dispatch(|| handler.on_message(message));
                    }
                    Err(e) => {
                        warn!(booking_id, error = %e, "dropping malformed chat frame");
                    }
                },
                Some(Ok(InboundFrame::Binary(data))) => {
                    warn!(booking_id, len = data.len(), "dropping binary chat frame");
                }
                Some(Ok(InboundFrame::Close(info))) => {
                    if is_normal_close(info.as_ref()) {
                        info!(booking_id, "chat session closed by server");
                        session.finish(&sessions, || handler.on_close(booking_id));
                    } else {
                        let (code, reason) = info
                            .map(|i| (i.code, i.reason))
                            .unwrap_or_default();
                        warn!(booking_id, code, reason = %reason, "chat session closed with error");
                        let e = ChatError::Transport(format!("closed with code {code}: {reason}"));
                        session.finish(&sessions, || handler.on_error(booking_id, e));
                    }
                    return;
                }
                Some(Err(e)) => {
                    warn!(booking_id, error = %e, "chat read failed");
                    session.finish(&sessions, || handler.on_error(booking_id, e));
                    return;
                }
                None => {
                    info!(booking_id, "chat stream ended");
                    session.finish(&sessions, || handler.on_close(booking_id));
                    return;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
