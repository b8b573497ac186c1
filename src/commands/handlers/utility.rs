//! Utility command handlers
//!
//! Handles: ping, help
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Drop status/version commands, uptime folded into /ping
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use std::time::Duration;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;

const HELP_TEXT: &str = r#"**Commands:**
`/remind <when> <message> [channel]` - Post a message later
`/reminders` - List pending reminders in this channel
`/count [word] [target]` - Who says what, and how often
`/roles <target>` - List a user's roles
`/members <role>` - List everyone with a role
`/ping` - Check that the bot is alive
`/help` - Show this help message

**Reminder times:**
- Durations joined with `+`: `30m`, `2h`, `1d+12h`, `1uke`
- A bare number means minutes: `15`
- Dates: `2024-12-24 18:00` or `2024-12-24+18:00`"#;

/// Handler for utility commands: ping, help
pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ping", "help"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let content = match command.data.name.as_str() {
            "ping" => format!("Pong! ⏱️ Up for {}", format_uptime(ctx.start_time.elapsed())),
            "help" => HELP_TEXT.to_string(),
            _ => return Ok(()),
        };

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.content(content))
            })
            .await?;

        info!(
            "{} command completed for user {}",
            command.data.name, command.user.id
        );
        Ok(())
    }
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_handler_commands() {
        let names = UtilityHandler.command_names();
        assert!(names.contains(&"ping"));
        assert!(names.contains(&"help"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 5)), "3h 0m 5s");
        assert_eq!(format_uptime(Duration::from_secs(86400 + 61)), "1d 0h 1m 1s");
    }

    #[test]
    fn test_help_mentions_every_command() {
        for name in ["/remind", "/reminders", "/count", "/roles", "/members", "/ping", "/help"] {
            assert!(HELP_TEXT.contains(name), "help is missing {name}");
        }
    }
}
