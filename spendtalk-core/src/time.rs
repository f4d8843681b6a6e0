//! Reference-date helpers: the only place a wall clock is consulted.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Calendar date of `instant` in an IANA tz like "Asia/Ho_Chi_Minh".
pub fn local_date_at(instant: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(instant.with_timezone(&tz).date_naive())
}

/// Today's date in `tz`.
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    local_date_at(Utc::now(), tz)
}

/// Parse a "YYYY-MM-DD" reference date.
pub fn parse_reference_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_crosses_midnight() {
        // 18:30 UTC is already 01:30 the next day in Vietnam (UTC+7)
        let instant = Utc.with_ymd_and_hms(2025, 6, 19, 18, 30, 0).unwrap();
        assert_eq!(
            local_date_at(instant, "Asia/Ho_Chi_Minh").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
        );
        assert_eq!(
            local_date_at(instant, "UTC").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 19).unwrap()
        );
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(local_date_at(Utc::now(), "Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse_reference_date() {
        assert_eq!(
            parse_reference_date("2025-06-20").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
        );
        assert!(parse_reference_date("20/06/2025").is_err());
    }
}
