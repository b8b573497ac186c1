// Core layer - configuration and shared response helpers
pub mod core;

// Features layer - reminders, word counts, channel renaming
pub mod features;

// Application layer
pub mod command_handler;
pub mod commands;

pub use core::Config;

pub use features::{
    ChannelNameScheduler, NotificationSink, ReminderError, ReminderScheduler, ReminderStore,
    SerenitySink, WordCounter,
};
