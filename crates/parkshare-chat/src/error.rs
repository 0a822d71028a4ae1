//! Chat error taxonomy.

use parkshare_core::BookingId;

/// Errors produced by the chat session manager.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// `send` was called for a booking with no open session.
    #[error("no open chat session for booking {booking_id}")]
    NotConnected { booking_id: BookingId },

    /// Handshake failure, network drop, or a server close carrying an error code.
    #[error("chat transport error: {0}")]
    Transport(String),

    /// Inbound data that is not JSON or does not have the chat message shape.
    #[error("malformed chat frame: {0}")]
    MalformedFrame(String),

    #[error("booking id must be positive, got {0}")]
    InvalidBookingId(BookingId),

    #[error("auth token must not be empty")]
    EmptyToken,

    #[error("invalid chat endpoint: {0}")]
    InvalidEndpoint(String),

    /// `open` was called outside a tokio runtime.
    #[error("no async runtime available to drive chat sessions")]
    NoRuntime,

    #[error("failed to encode outbound frame: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_display() {
        let err = ChatError::NotConnected { booking_id: 42 };
        assert_eq!(err.to_string(), "no open chat session for booking 42");
    }

    #[test]
    fn test_transport_display() {
        let err = ChatError::Transport("connection reset".into());
        assert!(err.to_string().contains("connection reset"));
    }
}
