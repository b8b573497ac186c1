//! # Reminder Commands
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: `when` accepts dates, optional target channel, `/forget` removed
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::channel::ChannelType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_remind_command(), create_reminders_command()]
}

fn create_remind_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("remind")
        .description("Post a message in a channel later")
        .create_option(|option| {
            option
                .name("when")
                .description("A date (2024-12-24 18:00) or durations joined with + (1d+2h)")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(100)
        })
        .create_option(|option| {
            option
                .name("message")
                .description("What to post")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(1900)
        })
        .create_option(|option| {
            option
                .name("channel")
                .description("Where to post it (defaults to this channel)")
                .kind(CommandOptionType::Channel)
                .channel_types(&[ChannelType::Text])
                .required(false)
        });
    command
}

fn create_reminders_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("reminders")
        .description("List pending reminders in this channel");
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_remind_commands() {
        let commands = create_commands();
        assert_eq!(commands.len(), 2);

        let remind = &commands[0];
        assert_eq!(remind.0.get("name").unwrap().as_str().unwrap(), "remind");

        let options = remind.0.get("options").unwrap().as_array().unwrap();
        let names: Vec<&str> = options
            .iter()
            .map(|o| o.get("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["when", "message", "channel"]);
    }
}
