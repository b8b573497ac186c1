//! # Utility Commands
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serenity::builder::CreateApplicationCommand;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    let mut ping = CreateApplicationCommand::default();
    ping.name("ping").description("Check that the bot is alive");

    let mut help = CreateApplicationCommand::default();
    help.name("help").description("Show available commands");

    vec![ping, help]
}
