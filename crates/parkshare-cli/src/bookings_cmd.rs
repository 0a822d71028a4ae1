//! `parkshare bookings` and `parkshare invoices`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::Colorize;

use parkshare_core::config::load_config;
use parkshare_core::types::{BookingStatus, NewBooking};
use parkshare_core::BookingId;

use crate::helpers;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

#[derive(Subcommand)]
pub enum BookingsCommands {
    /// Your bookings (as guest), or bookings on your listings with --rents
    List {
        #[arg(long)]
        rents: bool,
    },

    /// Book a listing
    Create {
        #[arg(long = "listing")]
        listing_id: i64,

        /// First day (YYYY-MM-DD)
        #[arg(long = "from")]
        start_date: NaiveDate,

        /// Last day (YYYY-MM-DD)
        #[arg(long = "to")]
        end_date: NaiveDate,

        /// Total price in euros
        #[arg(long)]
        price: f64,
    },

    /// Change a booking's status (listing owner only)
    Status {
        booking_id: BookingId,

        /// pending | confirmed | declined | completed
        status: BookingStatus,
    },
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

pub async fn dispatch(cmd: BookingsCommands) -> Result<()> {
    let config = load_config(None);
    let token = helpers::require_token(&config)?;
    let client = helpers::api_client(&config)?;

    match cmd {
        BookingsCommands::List { rents } => {
            let bookings = if rents {
                client.my_rents(&token).await
            } else {
                client.my_bookings(&token).await
            }
            .context("failed to fetch bookings")?;
            if bookings.is_empty() {
                helpers::print_empty("bookings");
            }
            for booking in &bookings {
                println!("{}", helpers::booking_row(booking));
            }
        }
        BookingsCommands::Create {
            listing_id,
            start_date,
            end_date,
            price,
        } => {
            let booking = client
                .create_booking(
                    &token,
                    &NewBooking {
                        listing_id,
                        start_date,
                        end_date,
                        total_price: price,
                    },
                )
                .await
                .context("booking failed")?;
            println!("{} Booking created", "✓".green());
            println!("{}", helpers::booking_row(&booking));
        }
        BookingsCommands::Status { booking_id, status } => {
            let booking = client
                .update_booking_status(&token, booking_id, status)
                .await
                .with_context(|| format!("failed to update booking #{booking_id}"))?;
            println!("{}", helpers::booking_row(&booking));
        }
    }
    Ok(())
}

/// `parkshare invoices`
pub async fn invoices() -> Result<()> {
    let config = load_config(None);
    let token = helpers::require_token(&config)?;
    let invoices = helpers::api_client(&config)?
        .my_invoices(&token)
        .await
        .context("failed to fetch invoices")?;

    if invoices.is_empty() {
        helpers::print_empty("invoices");
    }
    for invoice in &invoices {
        println!("{}", helpers::invoice_row(invoice));
    }
    Ok(())
}
