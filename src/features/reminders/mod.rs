//! # Reminders Feature
//!
//! One-shot channel reminders persisted to a JSON file and replayed on restart.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: JSON file store, per-reminder timers owned by the scheduler, absolute date support
//! - 1.0.0: Initial release

pub mod duration;
pub mod error;
pub mod scheduler;
pub mod sink;
pub mod store;
pub mod when;

pub use duration::{parse_compound_duration, parse_segment, TimeUnit};
pub use error::{ReminderError, SegmentError};
pub use scheduler::ReminderScheduler;
pub use sink::{NotificationSink, SerenitySink};
pub use store::{ReminderId, ReminderStore, ReminderTask};
pub use when::FireTime;
