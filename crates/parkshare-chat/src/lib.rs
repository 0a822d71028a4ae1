//! Parkshare Chat: realtime booking chat over WebSocket.
//!
//! This crate provides:
//! - **manager**: `ChatSessionManager`, at most one live session per booking,
//!   with `open` / `send` / `close` / `close_all`
//! - **handler**: the `ChatHandler` observer trait and its closure/channel adapters
//! - **transport**: the `Connector` seam and the tokio-tungstenite implementation
//! - **frame**: inbound frame validation and chat URL construction

pub mod error;
pub mod frame;
pub mod handler;
pub mod manager;
pub mod transport;

pub use error::ChatError;
pub use handler::{CallbackHandler, ChatEvent, ChatHandler, EventHandler};
pub use manager::{ChatSessionManager, ConnectionHandle, SessionState};
pub use transport::{Connector, TungsteniteConnector};
