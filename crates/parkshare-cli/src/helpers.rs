//! Shared CLI helpers: client construction, token lookup, row formatting.

use anyhow::{bail, Result};
use colored::Colorize;
use uuid::Uuid;

use parkshare_api::ApiClient;
use parkshare_core::config::Config;
use parkshare_core::types::{Booking, BookingStatus, Invoice, Listing};
use parkshare_core::utils::{format_price, format_price_with_period, truncate_string, PricePeriod};
use parkshare_core::{BookingId, ChatMessage};

pub fn api_client(config: &Config) -> Result<ApiClient> {
    Ok(ApiClient::new(&config.api)?)
}

/// Stored token, or an error telling the user to log in.
pub fn require_token(config: &Config) -> Result<String> {
    match config.auth.token() {
        Some(token) => Ok(token.to_string()),
        None => bail!("not logged in; run `parkshare login -u EMAIL` first"),
    }
}

pub fn print_banner(booking_id: BookingId) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}",
        format!("🅿 Parkshare chat · booking #{booking_id}").cyan().bold(),
        version.dimmed()
    );
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    println!();
}

pub fn print_empty(what: &str) {
    println!("{}", format!("(no {what})").dimmed());
}

// ─────────────────────────────────────────────
// Row formatting
// ─────────────────────────────────────────────

pub fn listing_row(listing: &Listing) -> String {
    let availability = if listing.is_available {
        "available".green().to_string()
    } else {
        "unavailable".red().to_string()
    };
    format!(
        "{:>5}  {:<32} {:<16} {:>14} {:>14}  {}",
        format!("#{}", listing.id),
        truncate_string(&listing.title, 32),
        truncate_string(&listing.city, 16),
        format_price_with_period(listing.price_per_day, PricePeriod::Day),
        format_price_with_period(listing.price_per_hour, PricePeriod::Hour),
        availability,
    )
}

pub fn print_listing_detail(listing: &Listing) {
    println!("{}", format!("#{} {}", listing.id, listing.title).bold());
    if let Some(ref description) = listing.description {
        println!("  {description}");
    }
    println!(
        "  {:<14} {}, {} {}, {}, {}",
        "Address:".bold(),
        listing.address,
        listing.zip_code,
        listing.city,
        listing.state,
        listing.country
    );
    println!(
        "  {:<14} {} · {}",
        "Price:".bold(),
        format_price_with_period(listing.price_per_day, PricePeriod::Day),
        format_price_with_period(listing.price_per_hour, PricePeriod::Hour)
    );
    println!("  {:<14} {}", "Vehicles:".bold(), listing.vehicle_types.join(", "));
    let mut terms = Vec::new();
    if listing.is_short_term {
        terms.push("short-term");
    }
    if listing.is_long_term {
        terms.push("long-term");
    }
    println!("  {:<14} {}", "Terms:".bold(), terms.join(", "));
}

fn status_label(status: BookingStatus) -> String {
    match status {
        BookingStatus::Pending => status.as_str().yellow().to_string(),
        BookingStatus::Confirmed => status.as_str().green().to_string(),
        BookingStatus::Declined => status.as_str().red().to_string(),
        BookingStatus::Completed => status.as_str().dimmed().to_string(),
    }
}

pub fn booking_row(booking: &Booking) -> String {
    format!(
        "{:>5}  listing #{:<5} {} → {}  {:>12}  {}",
        format!("#{}", booking.id),
        booking.listing_id,
        booking.start_date,
        booking.end_date,
        format_price(booking.total_price, true),
        status_label(booking.status),
    )
}

pub fn invoice_row(invoice: &Invoice) -> String {
    let due = invoice
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>5}  booking #{:<5} issued {}  due {:<10}  {:>12}",
        format!("#{}", invoice.id),
        invoice.booking_id,
        invoice.issue_date,
        due,
        format_price(invoice.amount, true),
    )
}

/// One chat line: `[HH:MM] you: text` or `[HH:MM] them: text`.
pub fn chat_line(message: &ChatMessage, me: Option<Uuid>) -> String {
    let time = message.sent_at.format("%H:%M");
    let who = if Some(message.sender_id) == me {
        "you".cyan().bold()
    } else {
        "them".magenta().bold()
    };
    format!("[{time}] {who}: {}", message.content)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
