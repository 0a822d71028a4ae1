//! Utility helpers: data paths, price formatting, string truncation.

use std::path::PathBuf;

/// Get the Parkshare data directory (e.g. `~/.parkshare/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".parkshare")
}

/// Get the history directory used by the interactive chat.
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Billing period shown next to a price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PricePeriod {
    Hour,
    Day,
}

/// Format a euro amount with Croatian grouping: `1.234,50 €`.
pub fn format_price(price: f64, show_symbol: bool) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };
    let formatted = format!("{sign}{grouped},{frac_part}");
    if show_symbol {
        format!("{formatted} €")
    } else {
        formatted
    }
}

/// Format a price with its billing period: `2,00 €/sat`.
pub fn format_price_with_period(price: f64, period: PricePeriod) -> String {
    let period_text = match period {
        PricePeriod::Hour => "sat",
        PricePeriod::Day => "dan",
    };
    format!("{}/{}", format_price(price, true), period_text)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
