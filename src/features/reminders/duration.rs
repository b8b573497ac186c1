//! Relative time expressions like `14h`, `2d+30m` or `12months`
//!
//! A segment is scanned character by character: ASCII letters form the unit and
//! ASCII digits form the quantity, wherever they appear. `h14` and `14h` are the
//! same segment, and `1h3` reads as thirteen hours.

use std::time::Duration;

use super::error::{ReminderError, SegmentError};

/// Separator between segments of a compound expression
pub const SEGMENT_SEPARATOR: char = '+';

const MINUTE: Duration = Duration::from_secs(60);
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fixed-length time units. Months and years are not calendar aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Nanosecond,
}

impl TimeUnit {
    /// Look up a unit by one of its spellings (English or Norwegian, case-insensitive).
    /// An empty unit means minutes.
    pub fn from_name(name: &str) -> Option<Self> {
        let unit = match name.to_ascii_lowercase().as_str() {
            "y" | "yr" | "yrs" | "year" | "years" | "aar" => TimeUnit::Year,
            "mo" | "mnth" | "month" | "months" | "mnd" | "maned" | "maneder" => TimeUnit::Month,
            "w" | "wk" | "wks" | "week" | "weeks" | "uke" | "uker" => TimeUnit::Week,
            "d" | "day" | "days" | "dag" | "dager" => TimeUnit::Day,
            "h" | "hr" | "hrs" | "hour" | "hours" | "time" | "timer" => TimeUnit::Hour,
            "" | "m" | "min" | "mins" | "minute" | "minutes" | "minutt" | "minutter" => {
                TimeUnit::Minute
            }
            "s" | "sec" | "secs" | "second" | "seconds" | "sekund" | "sekunder" => TimeUnit::Second,
            "ms" | "millisecond" | "milliseconds" | "millisekund" | "millisekunder" => {
                TimeUnit::Millisecond
            }
            "ns" | "nanosecond" | "nanoseconds" | "nanosekund" | "nanosekunder" => {
                TimeUnit::Nanosecond
            }
            _ => return None,
        };
        Some(unit)
    }

    pub fn duration(self) -> Duration {
        match self {
            TimeUnit::Year => MINUTE * 525_600,
            TimeUnit::Month => MINUTE * 43_800,
            TimeUnit::Week => MINUTE * 10_080,
            TimeUnit::Day => MINUTE * 1_440,
            TimeUnit::Hour => MINUTE * 60,
            TimeUnit::Minute => MINUTE,
            TimeUnit::Second => Duration::from_secs(1),
            TimeUnit::Millisecond => Duration::from_millis(1),
            TimeUnit::Nanosecond => Duration::from_nanos(1),
        }
    }
}

/// Parse a single `<quantity><unit>` segment
pub fn parse_segment(segment: &str) -> Result<Duration, SegmentError> {
    let mut letters = String::new();
    let mut digits = String::new();
    for c in segment.chars() {
        if c.is_ascii_alphabetic() {
            letters.push(c);
        } else if c.is_ascii_digit() {
            digits.push(c);
        }
    }

    if digits.is_empty() {
        return Err(SegmentError::MissingQuantity);
    }
    let quantity: u64 = digits
        .parse()
        .map_err(|_| SegmentError::InvalidQuantity(digits.clone()))?;
    if quantity < 1 {
        return Err(SegmentError::NonPositiveQuantity);
    }

    let unit = TimeUnit::from_name(&letters).ok_or(SegmentError::UnknownUnit(letters))?;
    let nanos = unit
        .duration()
        .as_nanos()
        .checked_mul(u128::from(quantity))
        .ok_or(SegmentError::Overflow)?;
    duration_from_nanos(nanos).ok_or(SegmentError::Overflow)
}

/// `Duration::from_nanos` for totals past `u64::MAX` nanoseconds
fn duration_from_nanos(nanos: u128) -> Option<Duration> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    // Always below one second, fits in u32
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, subsec))
}

/// Parse a `+`-joined expression into the sum of its segments
pub fn parse_compound_duration(expr: &str) -> Result<Duration, ReminderError> {
    let mut total = Duration::ZERO;
    for segment in expr.split(SEGMENT_SEPARATOR) {
        let invalid = |reason| ReminderError::InvalidDurationSegment {
            segment: segment.to_string(),
            reason,
        };
        let part = parse_segment(segment).map_err(invalid)?;
        total = total
            .checked_add(part)
            .ok_or_else(|| invalid(SegmentError::Overflow))?;
    }
    Ok(total)
}
