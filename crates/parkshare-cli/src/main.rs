//! Parkshare CLI: entry point.
//!
//! # Commands
//!
//! - `parkshare login | logout | whoami`: manage the stored token
//! - `parkshare listings search | show | mine`: browse parking listings
//! - `parkshare bookings list | create | status`: bookings as guest or host
//! - `parkshare invoices`: invoices for the current user
//! - `parkshare chat BOOKING_ID`: realtime chat for one booking
//! - `parkshare status`: show configuration

mod auth_cmd;
mod bookings_cmd;
mod chat_repl;
mod helpers;
mod listings_cmd;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

use parkshare_core::BookingId;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parkshare: rent and share parking spaces from the terminal
#[derive(Parser)]
#[command(name = "parkshare", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the access token
    Login {
        /// Account email
        #[arg(short, long)]
        username: String,

        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse parking listings
    Listings {
        #[command(subcommand)]
        action: listings_cmd::ListingsCommands,
    },

    /// Manage bookings
    Bookings {
        #[command(subcommand)]
        action: bookings_cmd::BookingsCommands,
    },

    /// List invoices for the logged-in user
    Invoices,

    /// Chat with the other party of a booking
    Chat {
        /// Booking whose chat to join
        booking_id: BookingId,
    },

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Login { username, password } => auth_cmd::login(&username, password).await,
        Commands::Logout => auth_cmd::logout(),
        Commands::Whoami => auth_cmd::whoami().await,
        Commands::Listings { action } => listings_cmd::dispatch(action).await,
        Commands::Bookings { action } => bookings_cmd::dispatch(action).await,
        Commands::Invoices => bookings_cmd::invoices().await,
        Commands::Chat { booking_id } => chat_repl::run(booking_id).await,
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parkshare=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
