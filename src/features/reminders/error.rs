//! Reminder error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Why a single `<quantity><unit>` segment was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("no number given")]
    MissingQuantity,
    #[error("{0:?} is not a valid number")]
    InvalidQuantity(String),
    #[error("number must be at least 1")]
    NonPositiveQuantity,
    #[error("unknown time unit {0:?}")]
    UnknownUnit(String),
    #[error("duration is too large")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum ReminderError {
    /// The expression is neither a date nor a usable duration
    #[error("could not understand {0:?} as a date or a duration")]
    InvalidTimeExpression(String),

    #[error("invalid time segment {segment:?}: {reason}")]
    InvalidDurationSegment {
        segment: String,
        reason: SegmentError,
    },

    #[error("reminder file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deliver reminder to channel {channel_id}: {reason}")]
    Delivery { channel_id: u64, reason: String },
}

impl ReminderError {
    /// Errors caused by what the user typed, safe to echo back to them
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReminderError::InvalidTimeExpression(_) | ReminderError::InvalidDurationSegment { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_names_segment() {
        let err = ReminderError::InvalidDurationSegment {
            segment: "0h".to_string(),
            reason: SegmentError::NonPositiveQuantity,
        };
        let text = err.to_string();
        assert!(text.contains("\"0h\""));
        assert!(text.contains("at least 1"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_runtime_errors_are_not_user_errors() {
        let err = ReminderError::Delivery {
            channel_id: 7,
            reason: "missing access".to_string(),
        };
        assert!(!err.is_user_error());

        let err = ReminderError::Persistence {
            path: PathBuf::from("reminds.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("reminds.json"));
    }
}
