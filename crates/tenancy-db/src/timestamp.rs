//! Conversions for `timestamp (P) with time zone` columns.

use chrono::{DateTime, SubsecRound, Utc};

use crate::error::DbError;
use crate::schema::DEFAULT_TIMESTAMP_PRECISION;

/// PostgreSQL's text output for `timestamptz`, e.g.
/// `2024-05-01 10:20:30.123+00`.
const PG_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Parse a timestamp returned by the driver as a string.
///
/// Accepts PostgreSQL's text representation (any offset, with or
/// without fractional seconds) and RFC 3339.
pub fn from_driver(value: &str) -> Result<DateTime<Utc>, DbError> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    DateTime::parse_from_str(trimmed, PG_TEXT_FORMAT)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| DbError::Timestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Drop sub-second digits the column cannot store, so a value written
/// and read back compares equal.
pub fn truncate(value: DateTime<Utc>, precision: u8) -> DateTime<Utc> {
    value.trunc_subsecs(u16::from(precision))
}

/// [`truncate`] at the default column precision (milliseconds).
pub fn to_column_precision(value: DateTime<Utc>) -> DateTime<Utc> {
    truncate(value, DEFAULT_TIMESTAMP_PRECISION)
}
