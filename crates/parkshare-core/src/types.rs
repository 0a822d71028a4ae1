//! Domain types shared by the chat manager, the REST client and the CLI.
//!
//! The backend speaks snake_case JSON. Money columns are `Decimal` on the
//! server and may arrive either as JSON numbers or as decimal strings, so
//! they go through [`money`]. Timestamps are produced by Python's
//! `datetime.isoformat()` and are usually naive, so they go through
//! [`timestamp`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Integer id the backend assigns to a booking.
pub type BookingId = i64;

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// A chat message broadcast by the server for one booking.
///
/// Immutable once received. Only the server creates these: it assigns
/// `id` and `sent_at`. camelCase keys are accepted as aliases; a payload
/// carrying both spellings of one field fails with a duplicate-field error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    #[serde(alias = "bookingId")]
    pub booking_id: BookingId,
    #[serde(alias = "senderId")]
    pub sender_id: Uuid,
    #[serde(alias = "receiverId")]
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(alias = "sentAt", with = "timestamp")]
    pub sent_at: DateTime<Utc>,
}

/// The only payload a client ever writes to a chat socket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundChatFrame {
    pub content: String,
}

impl OutboundChatFrame {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Users & auth
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /users/`.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Response of `POST /token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ─────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────

/// A parking space offered by a host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(with = "money")]
    pub price_per_day: f64,
    #[serde(with = "money")]
    pub price_per_hour: f64,
    #[serde(default)]
    pub vehicle_types: Vec<String>,
    pub is_long_term: bool,
    pub is_short_term: bool,
    pub is_available: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /listings/`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub price_per_day: f64,
    pub price_per_hour: f64,
    pub vehicle_types: Vec<String>,
    pub is_long_term: bool,
    pub is_short_term: bool,
    pub is_available: bool,
}

impl ListingInput {
    /// Client-side checks mirroring the create-listing form.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("zip_code", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        if self.price_per_day < 0.0 || self.price_per_hour < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        if self.vehicle_types.is_empty() {
            return Err(ValidationError::MissingField("vehicle_types"));
        }
        Ok(())
    }
}

/// Body of `PUT /listings/{id}`. Unset fields are left out of the JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_long_term: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_short_term: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

/// Listing search filters, turned into the `GET /listings/` query string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilters {
    /// Matches city or state, case-insensitive substring.
    pub region: Option<String>,
    /// Bounds on the daily price.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub vehicle_type: Option<String>,
    pub long_term: Option<bool>,
    pub short_term: Option<bool>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// Largest page the backend serves.
pub const MAX_PAGE_SIZE: u32 = 100;

impl SearchFilters {
    /// Query pairs for the filters that are set, in a fixed order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref region) = self.region {
            pairs.push(("region", region.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if let Some(ref vt) = self.vehicle_type {
            pairs.push(("vehicle_type", vt.clone()));
        }
        if let Some(lt) = self.long_term {
            pairs.push(("long_term", lt.to_string()));
        }
        if let Some(st) = self.short_term {
            pairs.push(("short_term", st.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Reject filter combinations the backend would answer with a 422.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ValidationError::PageSize(limit));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ValidationError::PriceRange { min, max });
            }
        }
        if self.min_price.is_some_and(|p| p < 0.0) || self.max_price.is_some_and(|p| p < 0.0) {
            return Err(ValidationError::NegativePrice);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "declined" => Ok(BookingStatus::Declined),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A reservation of a listing for a date range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub guest_id: Uuid,
    pub listing_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "money")]
    pub total_price: f64,
    pub status: BookingStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /bookings/`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBooking {
    pub listing_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: f64,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_date < self.start_date {
            return Err(ValidationError::DateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.total_price < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        Ok(())
    }
}

/// Body of `PATCH /bookings/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

// ─────────────────────────────────────────────
// Invoices
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub booking_id: BookingId,
    pub user_id: Uuid,
    #[serde(with = "money")]
    pub amount: f64,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub vat_details: Option<serde_json::Value>,
}

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────
// Serde helpers
// ─────────────────────────────────────────────

/// Parse an ISO-8601 timestamp: RFC 3339 with an offset, or a naive
/// date-time which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|n| n.and_utc())
}

pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw:?}")))
    }
}

pub mod money {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(t) => t
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid decimal: {t:?}"))),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
