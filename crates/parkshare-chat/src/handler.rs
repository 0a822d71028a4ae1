//! Session observers.
//!
//! A [`ChatHandler`] is attached to a session at `open` time and receives
//! every notification for it. Callbacks are synchronous and run on the
//! session's task; keep them short. Two adapters are provided:
//!
//! - [`CallbackHandler`]: a pair of closures (`on_message`, `on_error`)
//! - [`EventHandler`]: forwards everything as [`ChatEvent`]s into an mpsc channel

use parkshare_core::{BookingId, ChatMessage};
use tokio::sync::mpsc;

use crate::error::ChatError;

/// Receives the notifications of one or more chat sessions.
pub trait ChatHandler: Send + Sync {
    /// One validated inbound message, in arrival order.
    fn on_message(&self, message: ChatMessage);

    /// The session failed and has been closed. Called at most once.
    fn on_error(&self, booking_id: BookingId, error: ChatError);

    /// Handshake completed; `send` is now accepted.
    fn on_open(&self, _booking_id: BookingId) {}

    /// The server ended the session normally. Not called for
    /// caller-initiated `close`.
    fn on_close(&self, _booking_id: BookingId) {}
}

/// Adapts a message closure and an error closure into a [`ChatHandler`].
pub struct CallbackHandler<M, E> {
    on_message: M,
    on_error: E,
}

impl<M, E> CallbackHandler<M, E>
where
    M: Fn(ChatMessage) + Send + Sync,
    E: Fn(ChatError) + Send + Sync,
{
    pub fn new(on_message: M, on_error: E) -> Self {
        Self {
            on_message,
            on_error,
        }
    }
}

impl<M, E> ChatHandler for CallbackHandler<M, E>
where
    M: Fn(ChatMessage) + Send + Sync,
    E: Fn(ChatError) + Send + Sync,
{
    fn on_message(&self, message: ChatMessage) {
        (self.on_message)(message)
    }

    fn on_error(&self, _booking_id: BookingId, error: ChatError) {
        (self.on_error)(error)
    }
}

/// Lifecycle and message notifications as values.
#[derive(Debug)]
pub enum ChatEvent {
    Opened { booking_id: BookingId },
    Message(ChatMessage),
    Error { booking_id: BookingId, error: ChatError },
    Closed { booking_id: BookingId },
}

/// Forwards notifications into an unbounded channel.
///
/// The receiver yields `None` once every session holding this handler has
/// finished, which makes it easy to await a session's end.
#[derive(Clone)]
pub struct EventHandler {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl EventHandler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: ChatEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.tx.send(event);
    }
}

impl ChatHandler for EventHandler {
    fn on_message(&self, message: ChatMessage) {
        self.emit(ChatEvent::Message(message));
    }

    fn on_error(&self, booking_id: BookingId, error: ChatError) {
        self.emit(ChatEvent::Error { booking_id, error });
    }

    fn on_open(&self, booking_id: BookingId) {
        self.emit(ChatEvent::Opened { booking_id });
    }

    fn on_close(&self, booking_id: BookingId) {
        self.emit(ChatEvent::Closed { booking_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sample_message() -> ChatMessage {
        serde_json::from_str(
            r#"{"id":1,"booking_id":42,"sender_id":"3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "receiver_id":"9b2e4c1a-0d7f-4e55-8a0b-1c2d3e4f5a6b","content":"hi",
                "sent_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_callback_handler_routes_closures() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let m = messages.clone();
        let e = errors.clone();
        let handler = CallbackHandler::new(
            move |msg: ChatMessage| m.lock().unwrap().push(msg.content),
            move |err: ChatError| e.lock().unwrap().push(err.to_string()),
        );

        handler.on_open(42);
        handler.on_message(sample_message());
        handler.on_error(42, ChatError::Transport("reset".into()));
        handler.on_close(42);

        assert_eq!(*messages.lock().unwrap(), vec!["hi".to_string()]);
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_event_handler_forwards_in_order() {
        let (handler, mut rx) = EventHandler::channel();
        handler.on_open(42);
        handler.on_message(sample_message());
        handler.on_close(42);
        drop(handler);

        assert!(matches!(rx.recv().await, Some(ChatEvent::Opened { booking_id: 42 })));
        assert!(matches!(rx.recv().await, Some(ChatEvent::Message(m)) if m.id == 1));
        assert!(matches!(rx.recv().await, Some(ChatEvent::Closed { booking_id: 42 })));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_event_handler_tolerates_dropped_receiver() {
        let (handler, rx) = EventHandler::channel();
        drop(rx);
        handler.on_message(sample_message());
    }
}
