//! Typed client for the Parkshare REST API.
//!
//! One `reqwest::Client` is shared by every call. Authenticated endpoints
//! take the bearer token explicitly so the same client can serve several
//! users.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use parkshare_core::config::ApiConfig;
use parkshare_core::types::{
    Booking, BookingStatus, BookingStatusUpdate, Invoice, Listing, ListingInput, ListingUpdate,
    MessageResponse, NewBooking, RegisterData, SearchFilters, TokenResponse, User,
};
use parkshare_core::BookingId;

use crate::error::ApiError;

// ─────────────────────────────────────────────
// ApiClient
// ─────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}{path}`; `path` starts with `/`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON response, mapping non-2xx to `ApiError::Http`.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(method = %method, path = %path, "API request");

        let response = self.client.execute(request).await.map_err(|e| {
            error!(method = %method, path = %path, error = %e, "API request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(method = %method, path = %path, status = %status, body = %body, "API error");
            return Err(ApiError::from_response(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(method = %method, path = %path, error = %e, "Failed to parse API response");
            ApiError::Decode(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path, token)).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(method, path, Some(token)).json(body))
            .await
    }

    // ── Auth ──

    /// Exchange email and password for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let form = [("username", username), ("password", password)];
        self.execute(self.request(Method::POST, "/token", None).form(&form))
            .await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        self.execute(self.request(Method::POST, "/users/", None).json(data))
            .await
    }

    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.get("/users/me/", Some(token)).await
    }

    // ── Listings ──

    /// Search listings. Only the filters that are set go into the query.
    pub async fn list_listings(&self, filters: &SearchFilters) -> Result<Vec<Listing>, ApiError> {
        filters.validate()?;
        let query = filters.to_query_pairs();
        self.execute(self.request(Method::GET, "/listings/", None).query(&query))
            .await
    }

    pub async fn get_listing(&self, listing_id: i64) -> Result<Listing, ApiError> {
        self.get(&format!("/listings/{listing_id}"), None).await
    }

    pub async fn create_listing(&self, token: &str, input: &ListingInput) -> Result<Listing, ApiError> {
        input.validate()?;
        self.send_json(Method::POST, "/listings/", token, input).await
    }

    pub async fn update_listing(
        &self,
        token: &str,
        listing_id: i64,
        update: &ListingUpdate,
    ) -> Result<Listing, ApiError> {
        self.send_json(Method::PUT, &format!("/listings/{listing_id}"), token, update)
            .await
    }

    pub async fn delete_listing(&self, token: &str, listing_id: i64) -> Result<MessageResponse, ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/listings/{listing_id}"), Some(token)))
            .await
    }

    pub async fn my_listings(&self, token: &str) -> Result<Vec<Listing>, ApiError> {
        self.get("/users/me/listings/", Some(token)).await
    }

    // ── Bookings ──

    pub async fn create_booking(&self, token: &str, booking: &NewBooking) -> Result<Booking, ApiError> {
        booking.validate()?;
        self.send_json(Method::POST, "/bookings/", token, booking).await
    }

    /// Bookings made by the current user as a guest.
    pub async fn my_bookings(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        self.get("/bookings/me/bookings", Some(token)).await
    }

    /// Bookings on listings the current user owns.
    pub async fn my_rents(&self, token: &str) -> Result<Vec<Booking>, ApiError> {
        self.get("/bookings/me/rents", Some(token)).await
    }

    /// Owner-only status change.
    pub async fn update_booking_status(
        &self,
        token: &str,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("/bookings/{booking_id}"),
            token,
            &BookingStatusUpdate { status },
        )
        .await
    }

    // ── Invoices ──

    pub async fn my_invoices(&self, token: &str) -> Result<Vec<Invoice>, ApiError> {
        self.get("/users/me/invoices/", Some(token)).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
