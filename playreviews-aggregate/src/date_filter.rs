//! The `date` query parameter: a cutoff below which reviews are dropped.

use crate::{timestamp, CanonicalReview};
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// A `date` expression that is neither relative nor a date.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid date format: {expr}. Use YYYY-MM-DD or relative format (7d, 1w, 1m, 1y)")]
pub struct DateParseError {
    /// The expression as the client sent it.
    pub expr: String,
}

/// Resolve a `date` expression against the current time.
///
/// `None` and blank expressions mean "no cutoff".
///
/// # Errors
/// If the expression can't be read as a cutoff.
pub fn parse_cutoff(expr: Option<&str>) -> Result<Option<DateTime<Utc>>, DateParseError> {
    match expr {
        Some(expr) => parse_cutoff_at(expr, Utc::now()),
        None => Ok(None),
    }
}

/// Resolve a `date` expression relative to `now`.
///
/// Accepted forms are `Nd`, `Nw`, `Nm` (30 days) and `Ny` (365 days) back
/// from `now`, a `YYYY-MM-DD` date (midnight UTC) or any other ISO-8601
/// instant.
///
/// # Errors
/// If the expression can't be read as a cutoff, including relative amounts
/// too large to subtract from `now`.
pub fn parse_cutoff_at(
    expr: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, DateParseError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let invalid = || DateParseError {
        expr: expr.to_string(),
    };

    if let Some(days) = relative_days(trimmed) {
        return days
            .and_then(TimeDelta::try_days)
            .and_then(|delta| now.checked_sub_signed(delta))
            .map(Some)
            .ok_or_else(invalid);
    }

    timestamp::parse_str(trimmed).map(Some).ok_or_else(invalid)
}

/// `Some` when `expr` has the relative shape, holding the day count if it
/// fits.
fn relative_days(expr: &str) -> Option<Option<i64>> {
    let unit = expr.chars().last()?;
    let days_per_unit = match unit {
        'd' => 1,
        'w' => 7,
        'm' => 30,
        'y' => 365,
        _ => return None,
    };
    let amount = &expr[..expr.len() - unit.len_utf8()];
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        amount
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(days_per_unit)),
    )
}

/// Keep reviews written at or after `cutoff`.
pub fn filter_since(
    reviews: Vec<CanonicalReview>,
    cutoff: Option<DateTime<Utc>>,
) -> Vec<CanonicalReview> {
    match cutoff {
        Some(cutoff) => reviews.into_iter().filter(|r| r.date >= cutoff).collect(),
        None => reviews,
    }
}
