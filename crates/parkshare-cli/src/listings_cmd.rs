//! `parkshare listings`: search and inspect parking listings.

use anyhow::{Context, Result};
use clap::Subcommand;

use parkshare_core::config::load_config;
use parkshare_core::types::SearchFilters;

use crate::helpers;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ListingsCommands {
    /// Search available listings
    Search {
        /// City or region
        #[arg(long)]
        region: Option<String>,

        /// Minimum daily price
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum daily price
        #[arg(long)]
        max_price: Option<f64>,

        /// Vehicle type (e.g. car, motorcycle, van)
        #[arg(long)]
        vehicle_type: Option<String>,

        /// Only listings offered long-term
        #[arg(long)]
        long_term: bool,

        /// Only listings offered short-term
        #[arg(long)]
        short_term: bool,

        #[arg(long)]
        skip: Option<u32>,

        /// Page size (1-100)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show one listing
    Show {
        listing_id: i64,
    },

    /// Listings owned by the logged-in user
    Mine,
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

pub async fn dispatch(cmd: ListingsCommands) -> Result<()> {
    let config = load_config(None);
    let client = helpers::api_client(&config)?;

    match cmd {
        ListingsCommands::Search {
            region,
            min_price,
            max_price,
            vehicle_type,
            long_term,
            short_term,
            skip,
            limit,
        } => {
            let filters = SearchFilters {
                region,
                min_price,
                max_price,
                vehicle_type,
                long_term: long_term.then_some(true),
                short_term: short_term.then_some(true),
                skip,
                limit,
            };
            let listings = client
                .list_listings(&filters)
                .await
                .context("listing search failed")?;
            if listings.is_empty() {
                helpers::print_empty("listings match");
            }
            for listing in &listings {
                println!("{}", helpers::listing_row(listing));
            }
        }
        ListingsCommands::Show { listing_id } => {
            let listing = client
                .get_listing(listing_id)
                .await
                .with_context(|| format!("failed to fetch listing #{listing_id}"))?;
            helpers::print_listing_detail(&listing);
        }
        ListingsCommands::Mine => {
            let token = helpers::require_token(&config)?;
            let listings = client
                .my_listings(&token)
                .await
                .context("failed to fetch your listings")?;
            if listings.is_empty() {
                helpers::print_empty("listings");
            }
            for listing in &listings {
                println!("{}", helpers::listing_row(listing));
            }
        }
    }
    Ok(())
}
