//! # Features Layer
//!
//! Self-contained bot features. Each module documents its own version history.

pub mod channel_names;
pub mod reminders;
pub mod word_count;

pub use channel_names::ChannelNameScheduler;
pub use reminders::{NotificationSink, ReminderError, ReminderScheduler, ReminderStore, SerenitySink};
pub use word_count::WordCounter;
