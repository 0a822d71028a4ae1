//! `parkshare status`: show configuration.

use anyhow::Result;
use colored::Colorize;

use parkshare_core::config::{get_config_path, load_config};

pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🅿 Parkshare Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<18} {}", "API:".bold(), config.api.base_url);
    println!(
        "  {:<18} {}",
        "Timeout:".bold(),
        format!("{}s", config.api.timeout_secs).dimmed()
    );
    println!("  {:<18} {}", "Chat:".bold(), config.chat.ws_url);

    let auth_status = if config.auth.is_logged_in() {
        format!("{} (token stored)", "✓".green())
    } else {
        format!("{}", "· not logged in".dimmed())
    };
    println!("  {:<18} {}", "Auth:".bold(), auth_status);
    println!();

    Ok(())
}
