/// Calendar-date parsing for planner views
///
/// Two inbound date shapes exist:
///
/// - URL day tokens: exactly 8 digits, `YYYYMMDD` (e.g. `20250615`),
///   used by the dashboard and create-for-date routes. Anything else is
///   rejected before a query runs.
/// - Payload date fields: full ISO-8601 datetimes or bare `YYYY-MM-DD`
///   dates, which are promoted to midnight UTC. Empty strings mean
///   "absent", never an invalid date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Error type for date parsing
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    /// Day token is not exactly 8 digits
    #[error("Date must be an 8-digit YYYYMMDD value, got {0:?}")]
    BadToken(String),

    /// Token is well-formed but not a real calendar date
    #[error("{0:?} is not a valid calendar date")]
    InvalidDate(String),

    /// Payload value is neither ISO-8601 nor YYYY-MM-DD
    #[error("Could not parse {0:?} as a date")]
    Unparseable(String),
}

/// Parses an 8-digit `YYYYMMDD` day token
///
/// Rejects tokens of the wrong length, tokens with non-digits, and
/// impossible dates such as `20250230`.
///
/// # Example
///
/// ```
/// use planboard_shared::dates::parse_day_token;
///
/// let day = parse_day_token("20250615").unwrap();
/// assert_eq!(day.to_string(), "2025-06-15");
/// assert!(parse_day_token("2025061").is_err());
/// ```
pub fn parse_day_token(token: &str) -> Result<NaiveDate, DateError> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::BadToken(token.to_string()));
    }

    // Slicing is safe: all-ASCII checked above
    let year: i32 = token[0..4]
        .parse()
        .map_err(|_| DateError::BadToken(token.to_string()))?;
    let month: u32 = token[4..6]
        .parse()
        .map_err(|_| DateError::BadToken(token.to_string()))?;
    let day: u32 = token[6..8]
        .parse()
        .map_err(|_| DateError::BadToken(token.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateError::InvalidDate(token.to_string()))
}

/// Returns the half-open UTC window [day 00:00, next day 00:00)
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Parses a payload date value
///
/// Accepts full ISO-8601 / RFC 3339 datetimes and bare `YYYY-MM-DD`
/// dates; the latter are promoted to midnight UTC.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DateError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(DateError::Unparseable(value.to_string()))
}

/// Parses an optional payload date field
///
/// `None` and empty/whitespace strings are "absent"; anything else must
/// parse.
pub fn parse_optional_datetime(value: Option<&str>) -> Result<Option<DateTime<Utc>>, DateError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => parse_datetime(s).map(Some),
    }
}
