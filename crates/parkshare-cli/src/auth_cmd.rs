//! `parkshare login | logout | whoami`.

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::DefaultEditor;
use tracing::info;

use parkshare_core::config::{load_config, save_config};

use crate::helpers;

/// `parkshare login -u EMAIL [-p PASSWORD]`
pub async fn login(username: &str, password: Option<String>) -> Result<()> {
    let mut config = load_config(None);
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    let client = helpers::api_client(&config)?;
    let token = client
        .login(username, &password)
        .await
        .context("login failed")?;

    config.auth.token = token.access_token;
    save_config(&config, None).context("failed to save config")?;
    info!(user = username, "token stored");

    println!("{} Logged in as {}", "✓".green(), username.bold());
    Ok(())
}

fn prompt_password() -> Result<String> {
    let mut editor = DefaultEditor::new()?;
    let line = editor.readline("Password: ")?;
    Ok(line.trim_end().to_string())
}

/// `parkshare logout`
pub fn logout() -> Result<()> {
    let mut config = load_config(None);
    if !config.auth.is_logged_in() {
        println!("{}", "Not logged in.".dimmed());
        return Ok(());
    }
    config.auth.token.clear();
    save_config(&config, None).context("failed to save config")?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

/// `parkshare whoami`
pub async fn whoami() -> Result<()> {
    let config = load_config(None);
    let token = helpers::require_token(&config)?;
    let user = helpers::api_client(&config)?
        .current_user(&token)
        .await
        .context("failed to fetch current user")?;

    println!("{} <{}>", user.full_name().bold(), user.email);
    println!("  {:<10} {}", "Id:".bold(), user.id);
    println!(
        "  {:<10} {}",
        "Since:".bold(),
        user.created_at.format("%Y-%m-%d")
    );
    if !user.is_active {
        println!("  {}", "account inactive".red());
    }
    Ok(())
}
