use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lunde::commands::{register_global_commands, register_guild_commands, CommandContext, CommandHandler};
use lunde::core::config::DEFAULT_REMINDS_FILE;
use lunde::core::Config;
use lunde::features::reminders::{ReminderScheduler, ReminderStore, SerenitySink};
use lunde::features::word_count::{build_from_history, WordCounter};
use lunde::features::ChannelNameScheduler;

struct Handler {
    command_handler: Arc<CommandHandler>,
    guild_id: Option<GuildId>,
    messages_to_fetch: u64,
    channel_names_enabled: bool,
    /// Set on the first ready; reconnects must not restart the background jobs
    jobs_started: AtomicBool,
}

impl Handler {
    fn start_background_jobs(&self, ctx: &Context) {
        let Some(guild_id) = self.guild_id else {
            warn!("DISCORD_GUILD_ID not set: word counts stay empty and channels are not renamed");
            self.command_handler.context().word_counter.mark_ready();
            return;
        };

        let http = ctx.http.clone();
        let counter = Arc::clone(&self.command_handler.context().word_counter);
        let per_channel = self.messages_to_fetch;
        tokio::spawn(async move {
            build_from_history(http, guild_id, counter, per_channel).await;
        });

        if self.channel_names_enabled {
            let renamer = ChannelNameScheduler::new(ctx.http.clone(), guild_id);
            tokio::spawn(renamer.run());
            info!("🍻 Channel renaming scheduled for guild {guild_id}");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        self.command_handler.handle_message(&msg);
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        // Guild commands show up instantly, global ones can take up to an hour
        if let Some(guild_id) = self.guild_id {
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else if let Err(e) = register_global_commands(&ctx).await {
            error!("❌ Failed to register global slash commands: {e}");
        }

        if !self.jobs_started.swap(true, Ordering::SeqCst) {
            self.start_background_jobs(&ctx);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };

        if let Err(e) = self
            .command_handler
            .handle_slash_command(&ctx, &command)
            .await
        {
            error!(
                "Error handling slash command '{}': {}",
                command.data.name, e
            );
            let result = command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content("❌ Sorry, something went wrong with that command.")
                                .ephemeral(true)
                        })
                })
                .await;
            if let Err(why) = result {
                error!("Failed to send error response: {why}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Lunde Discord Bot...");
    if config.reminds_file_path == Path::new(DEFAULT_REMINDS_FILE) {
        warn!("REMINDS_FILE_PATH not set, keeping reminders in {DEFAULT_REMINDS_FILE}");
    }

    // Reminders go out over their own REST client so they can be armed before the gateway connects
    let http = Arc::new(Http::new(&config.discord_token));
    let scheduler = ReminderScheduler::new(
        ReminderStore::new(&config.reminds_file_path),
        Arc::new(SerenitySink::new(http)),
    );
    match scheduler.start().await {
        Ok(armed) => info!("⏰ {armed} reminders armed from {}", config.reminds_file_path.display()),
        Err(e) => error!(
            "❌ Failed to load reminders, starting with none and leaving {} as is until repaired: {e}",
            config.reminds_file_path.display()
        ),
    }

    let command_handler = CommandHandler::new(CommandContext::new(
        scheduler.clone(),
        Arc::new(WordCounter::new()),
    ))
    .with_counted_guild(config.discord_guild_id);

    let handler = Handler {
        command_handler: Arc::new(command_handler),
        guild_id: config.discord_guild_id.map(GuildId),
        messages_to_fetch: config.messages_to_fetch,
        channel_names_enabled: config.channel_names_enabled,
        jobs_started: AtomicBool::new(false),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        info!("🛑 Ctrl-C received, shutting down...");
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");
    let result = client.start().await;

    scheduler.shutdown().await;
    info!("👋 Reminders saved, bye");

    if let Err(why) = result {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
