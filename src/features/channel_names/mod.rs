//! # Channel Names Feature
//!
//! Weekly channel renaming: coffee becomes beer on Friday afternoon and turns
//! back into coffee early Monday, when there is also a small chance every `n`
//! becomes an `m`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0
//! - **Toggleable**: true

pub mod schedule;

pub use schedule::{next_occurrence, rename, ChannelNameScheduler, RenameRule, RULES};
