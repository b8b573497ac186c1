//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Reminder scheduler and word counter replace the database-backed services
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;
use std::time::Instant;

use crate::features::reminders::ReminderScheduler;
use crate::features::word_count::WordCounter;

/// Shared context for all command handlers
///
/// Contains the services the handlers need:
/// - ReminderScheduler for /remind and /reminders
/// - WordCounter for /count
/// - Bot start time for uptime reporting
#[derive(Clone)]
pub struct CommandContext {
    pub scheduler: ReminderScheduler,
    pub word_counter: Arc<WordCounter>,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(scheduler: ReminderScheduler, word_counter: Arc<WordCounter>) -> Self {
        Self {
            scheduler,
            word_counter,
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_context_clone() {
        // CommandContext should be Clone for sharing across handlers
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }
}
