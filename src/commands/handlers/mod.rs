//! Per-command handler implementations
//!
//! - **Version**: 3.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.1.0: Add RoleHandler (roles, members)
//! - 3.0.0: Reminder, word count and utility handlers only
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod count;
pub mod remind;
pub mod roles;
pub mod utility;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(utility::UtilityHandler),
        Arc::new(remind::RemindHandler),
        Arc::new(count::CountHandler),
        Arc::new(roles::RoleHandler),
    ]
}
