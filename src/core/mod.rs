//! # Core Module
//!
//! Configuration and shared Discord response helpers.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Drop file download helpers, embeds no longer persona-styled
//! - 1.1.0: Add response module with Discord message chunking utilities
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod embeds;
pub mod response;

pub use config::Config;
pub use embeds::titled_embed;
pub use response::{
    truncate_for_embed, truncate_for_message, truncate_to, EMBED_LIMIT, MESSAGE_LIMIT,
};
