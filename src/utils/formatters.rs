// Formatting utilities

use chrono::{DateTime, Utc};

/// Replace every `{name}` placeholder with its value
pub fn render_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

/// Truncate to at most `max` characters (not bytes)
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn role_mention(id: &str) -> String {
    format!("<@&{}>", id)
}

pub fn channel_mention(id: &str) -> String {
    format!("<#{}>", id)
}

/// Display value for an optional setting in `/config view`
pub fn or_not_set(value: Option<String>) -> String {
    value.unwrap_or_else(|| "❌ Not set".to_string())
}

/// Format epoch milliseconds as `2024-01-31 18:04:05 UTC`
pub fn format_epoch_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
