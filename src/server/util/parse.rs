use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Parses a u64 value from a string slice, trimming surrounding whitespace.
///
/// # Arguments
/// - `value` - The string to attempt to parse into `u64`
///
/// # Returns
/// - `Some(u64)` - Successfully parsed the value
/// - `None` - The value is empty or not a valid `u64`
pub fn parse_u64_from_str(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Splits a comma separated environment value into its non-empty, trimmed parts.
///
/// # Arguments
/// - `raw` - The raw variable value, if the variable is set
///
/// # Returns
/// - `Vec<String>` - Trimmed entries in their original order; empty when unset
pub fn parse_env_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parses an RFC 3339 timestamp from the panel API into UTC.
///
/// # Arguments
/// - `value` - Raw timestamp such as `2025-11-30T18:04:11+00:00` or `...Z`
///
/// # Returns
/// - `Some(DateTime<Utc>)` - Parsed timestamp normalized to UTC
/// - `None` - Value is missing, empty or unparsable
pub fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Expands a leading `~` in a path using the provided home directory.
pub fn expand_home(raw: &str, home: Option<&str>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            PathBuf::from(format!("{}{}", home.trim_end_matches('/'), rest))
        }
        _ => PathBuf::from(raw),
    }
}

/// Truncates a string to at most `max` characters, ending truncated text with `...`.
pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }

    let keep = max.saturating_sub(3);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
