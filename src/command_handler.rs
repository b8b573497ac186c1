//! Gateway event dispatch for commands and messages
//!
//! - **Version**: 3.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.1.0: Only messages from the counted guild feed the word counter
//! - 3.0.0: All slash commands route through the handler registry, messages feed the word counter
//! - 2.0.0: Slash-only command system
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::handlers::create_all_handlers;
use crate::commands::{CommandContext, CommandRegistry};

pub struct CommandHandler {
    registry: CommandRegistry,
    context: Arc<CommandContext>,
    /// Guild whose messages feed the word counter; none means nothing is counted
    counted_guild: Option<u64>,
}

impl CommandHandler {
    pub fn new(context: CommandContext) -> Self {
        Self::with_registry(
            context,
            CommandRegistry::with_handlers(create_all_handlers()),
        )
    }

    pub fn with_registry(context: CommandContext, registry: CommandRegistry) -> Self {
        Self {
            registry,
            context: Arc::new(context),
            counted_guild: None,
        }
    }

    pub fn with_counted_guild(mut self, guild_id: Option<u64>) -> Self {
        self.counted_guild = guild_id;
        self
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.context
    }

    /// Count the words of human messages posted in the counted guild
    pub fn handle_message(&self, msg: &Message) {
        if !counts_message(self.counted_guild, msg.guild_id.map(|id| id.0), msg.author.bot) {
            return;
        }
        debug!(
            "Counting words of message {} from user {}",
            msg.id, msg.author.id
        );
        self.context
            .word_counter
            .record_message(msg.author.id.0, &msg.content);
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let guild_id = command
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "DM".to_string());

        info!(
            "[{}] 📥 Slash command received | Command: {} | User: {} | Channel: {} | Guild: {}",
            request_id, command.data.name, command.user.id, command.channel_id, guild_id
        );

        let Some(handler) = self.registry.get(&command.data.name) else {
            warn!(
                "[{request_id}] ❓ No handler registered for /{}",
                command.data.name
            );
            return Ok(());
        };

        handler
            .handle(Arc::clone(&self.context), ctx, command)
            .await?;

        info!("[{request_id}] ✅ /{} completed", command.data.name);
        Ok(())
    }
}

/// DMs and other guilds stay out of the counts, same as the history scan
fn counts_message(counted_guild: Option<u64>, message_guild: Option<u64>, from_bot: bool) -> bool {
    !from_bot && counted_guild.is_some() && message_guild == counted_guild
}
