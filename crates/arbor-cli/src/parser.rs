use anyhow::{anyhow, Result};
use arbor_core::date::parse_day;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses a calendar day: `YYYY-MM-DD`, or natural language such as
/// "tomorrow" or "next friday" relative to `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    if let Ok(day) = parse_day(input) {
        return Ok(day);
    }

    let noon = today
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| anyhow!("Invalid reference date {today}"))?;
    let base = Utc.from_utc_datetime(&noon);
    parse_date_string(input, base, Dialect::Uk)
        .map(|parsed| parsed.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}
