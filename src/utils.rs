// src/utils.rs
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Read an env var as bool (“1” or “true” = true).
pub fn get_env_bool(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Read an env var or return `default`.
pub fn get_env_with_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an env var, falling back to `default` when it is unset or
/// does not parse.
pub fn get_env_parsed<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring invalid value {:?} for {}", raw, name);
                default
            }
        },
        Err(_) => default,
    }
}

/// Shorten `text` to `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Human readable distance between `posted` and `now`.
///
/// Anything older than a week falls back to the calendar date.
pub fn time_delta(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(posted);

    // Clock skew can put a post slightly in the future
    if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    }
    if elapsed.num_hours() < 1 {
        return format!("{} minutes ago", elapsed.num_minutes());
    }
    if elapsed.num_days() < 1 {
        return format!("{} hours ago", elapsed.num_hours());
    }
    if elapsed.num_days() <= 7 {
        return format!("{} days ago", elapsed.num_days());
    }

    posted.format("%Y.%m.%d").to_string()
}
