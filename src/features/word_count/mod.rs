//! # Word Count Feature
//!
//! Tracks how often each user says each word, seeded from channel history at
//! startup and kept current from new messages.
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0
//! - **Toggleable**: false

pub mod counter;
pub mod history;

pub use counter::{WordCounter, TOP_LIMIT};
pub use history::build_from_history;
