//! Parkshare REST client.
//!
//! - [`client::ApiClient`]: typed calls for auth, listings, bookings and invoices
//! - [`error::ApiError`]: HTTP, network and decode failures

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
