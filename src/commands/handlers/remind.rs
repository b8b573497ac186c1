//! Reminder command handlers
//!
//! Handles: remind, reminders
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Backed by the reminder scheduler, accepts dates as well as durations,
//!   `/reminders` lists per channel and no longer cancels
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_channel_option, get_string_option};
use crate::core::{titled_embed, truncate_for_message};
use crate::features::reminders::{ReminderError, ReminderTask};

/// Handler for reminder commands
pub struct RemindHandler;

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["remind", "reminders"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "remind" => self.handle_remind(&ctx, serenity_ctx, command).await,
            "reminders" => self.handle_reminders(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Handle /remind command - schedule a message for a channel
    async fn handle_remind(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let when = get_string_option(&command.data.options, "when")
            .ok_or_else(|| anyhow!("Missing when parameter"))?;
        let message = get_string_option(&command.data.options, "message")
            .ok_or_else(|| anyhow!("Missing message parameter"))?;
        let channel_id = get_channel_option(&command.data.options, "channel")
            .unwrap_or(command.channel_id.0);

        let (content, ephemeral) = match ctx
            .scheduler
            .create_reminder(&when, &message, channel_id)
            .await
        {
            Ok(id) => {
                let fire_at = ctx.scheduler.get(id).await.map(|task| task.fire_at);
                info!(
                    "Reminder {id} requested by user {} for channel {channel_id}",
                    command.user.id
                );
                (confirmation_text(fire_at, channel_id, &message), false)
            }
            Err(e) => {
                if !e.is_user_error() {
                    error!("Failed to create reminder for '{when}': {e}");
                }
                (rejection_text(&e), true)
            }
        };

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| {
                        msg.content(truncate_for_message(&content))
                            .ephemeral(ephemeral)
                    })
            })
            .await?;

        Ok(())
    }

    /// Handle /reminders command - list what is pending in this channel
    async fn handle_reminders(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let tasks = ctx
            .scheduler
            .pending_in_channel(command.channel_id.0)
            .await;

        if tasks.is_empty() {
            command
                .create_interaction_response(&serenity_ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|msg| {
                            msg.content("📭 No pending reminders in this channel.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        let embed = titled_embed(
            &format!("⏰ Pending reminders ({})", tasks.len()),
            &reminder_list(&tasks),
        );

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| msg.add_embed(embed))
            })
            .await?;

        Ok(())
    }
}

/// Discord timestamp markup, rendered in each reader's own timezone
fn discord_timestamp(at: DateTime<Utc>, style: char) -> String {
    format!("<t:{}:{style}>", at.timestamp())
}

fn confirmation_text(fire_at: Option<DateTime<Utc>>, channel_id: u64, message: &str) -> String {
    match fire_at {
        Some(at) => format!(
            "⏰ Reminding <#{channel_id}> {} ({}):\n> {message}",
            discord_timestamp(at, 'R'),
            discord_timestamp(at, 'f'),
        ),
        // Already fired and retired before we looked it up
        None => format!("⏰ Reminder for <#{channel_id}> delivered:\n> {message}"),
    }
}

fn rejection_text(e: &ReminderError) -> String {
    if e.is_user_error() {
        format!(
            "❌ {e}\nUse a date like `2024-12-24 18:00` or durations like `30m`, `2h`, `1d+12h`."
        )
    } else {
        "❌ Couldn't schedule that reminder, please try again later.".to_string()
    }
}

fn reminder_list(tasks: &[ReminderTask]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                "{}: {}",
                discord_timestamp(task.fire_at, 'R'),
                task.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::SegmentError;
    use chrono::TimeZone;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_remind_handler_commands() {
        let handler = RemindHandler;
        assert_eq!(handler.command_names(), &["remind", "reminders"]);
    }

    #[test]
    fn test_confirmation_uses_relative_timestamp() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let text = confirmation_text(Some(at), 42, "stand up");

        assert!(text.contains(&format!("<t:{}:R>", at.timestamp())));
        assert!(text.contains("<#42>"));
        assert!(text.contains("> stand up"));
    }

    #[test]
    fn test_confirmation_after_early_delivery() {
        let text = confirmation_text(None, 42, "now");
        assert!(text.contains("delivered"));
    }

    #[test]
    fn test_rejection_explains_user_errors() {
        let e = ReminderError::InvalidDurationSegment {
            segment: "0h".to_string(),
            reason: SegmentError::NonPositiveQuantity,
        };
        let text = rejection_text(&e);
        assert!(text.contains("0h"));
        assert!(text.contains("`30m`"));
    }

    #[test]
    fn test_rejection_hides_internal_errors() {
        let e = ReminderError::Persistence {
            path: PathBuf::from("/secret/reminds.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = rejection_text(&e);
        assert!(!text.contains("/secret"));
    }

    #[test]
    fn test_reminder_list_one_line_per_task() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let tasks = vec![
            ReminderTask::new(at, "first", 1),
            ReminderTask::new(at, "second", 1),
        ];
        let list = reminder_list(&tasks);

        assert_eq!(list.lines().count(), 2);
        assert!(list.starts_with(&format!("<t:{}:R>: first", at.timestamp())));
    }
}
