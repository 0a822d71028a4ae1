//! Parkshare Core: shared domain types, configuration and helpers.
//!
//! - **types**: marketplace entities and the chat wire shapes
//! - **error**: `ValidationError` for client-side payload checks
//! - **config**: `~/.parkshare/config.json` schema + loader
//! - **utils**: data paths and price formatting

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::ValidationError;
pub use types::{BookingId, ChatMessage, OutboundChatFrame};
