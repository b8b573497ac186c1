//! Resolving a user's "when" expression into a fire time
//!
//! Absolute dates are tried first (interpreted in the local timezone, with `+`
//! read as a space so `2024-05-01+18:00` works), then relative durations.
//! A lone word with no digits in it is neither, and is reported as a bad
//! expression rather than a bad duration segment.

use chrono::{DateTime, Local, Utc};
use std::time::Duration;

use super::duration::{parse_compound_duration, SEGMENT_SEPARATOR};
use super::error::ReminderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireTime {
    /// A calendar date/time
    Absolute(DateTime<Utc>),
    /// An offset from the moment the reminder is created
    Relative(Duration),
}

impl FireTime {
    /// Resolve an expression, preferring the absolute reading
    pub fn parse(expr: &str) -> Result<Self, ReminderError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(ReminderError::InvalidTimeExpression(expr.to_string()));
        }

        let as_date = expr.replace(SEGMENT_SEPARATOR, " ");
        if let Ok(at) = dateparser::parse_with_timezone(&as_date, &Local) {
            return Ok(FireTime::Absolute(at));
        }

        if !expr.contains(SEGMENT_SEPARATOR) && !expr.chars().any(|c| c.is_ascii_digit()) {
            return Err(ReminderError::InvalidTimeExpression(expr.to_string()));
        }

        parse_compound_duration(expr).map(FireTime::Relative)
    }

    /// The absolute instant this fire time refers to, given the current time
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ReminderError> {
        match *self {
            FireTime::Absolute(at) => Ok(at),
            FireTime::Relative(offset) => chrono::Duration::from_std(offset)
                .ok()
                .and_then(|offset| now.checked_add_signed(offset))
                .ok_or_else(|| {
                    ReminderError::InvalidTimeExpression(format!("{}s from now", offset.as_secs()))
                }),
        }
    }
}
