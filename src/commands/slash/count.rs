//! # Count Command
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_count_command()]
}

fn create_count_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("count")
        .description("How often a word was said, or a user's favourite words")
        .create_option(|option| {
            option
                .name("word")
                .description("The word to look up")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(200)
        })
        .create_option(|option| {
            option
                .name("target")
                .description("The user to look up")
                .kind(CommandOptionType::User)
                .required(false)
        });
    command
}
