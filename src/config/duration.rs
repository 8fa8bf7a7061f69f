//! Duration and date parsing utilities.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

/// Parse a duration string like "1d", "1h", "30m", "300s", "300".
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
/// - Days suffix: "1d"
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (num_str, unit, multiplier) = if let Some(num_str) = s.strip_suffix('d') {
        (num_str, "days", 86_400)
    } else if let Some(num_str) = s.strip_suffix('h') {
        (num_str, "hours", 3_600)
    } else if let Some(num_str) = s.strip_suffix('m') {
        (num_str, "minutes", 60)
    } else if let Some(num_str) = s.strip_suffix('s') {
        (num_str, "seconds", 1)
    } else {
        (s, "duration", 1)
    };

    let value: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid {unit} value: {num_str}"))?;
    let secs = value
        .checked_mul(multiplier)
        .with_context(|| format!("Duration too large: {s}"))?;
    if secs == 0 {
        anyhow::bail!("Duration must be positive: {s}");
    }
    Ok(Duration::from_secs(secs))
}

/// `parse_duration` for clap's value parser.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| format!("{e:#}"))
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD or RFC 3339): {s}"))?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

/// `parse_datetime` for clap's value parser.
pub fn parse_datetime_arg(s: &str) -> Result<DateTime<Utc>, String> {
    parse_datetime(s).map_err(|e| format!("{e:#}"))
}
