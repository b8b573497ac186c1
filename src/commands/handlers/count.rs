//! Word count command handler
//!
//! Handles: count
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_string_option, get_user_option};
use crate::core::titled_embed;
use crate::features::word_count::{WordCounter, TOP_LIMIT};

/// What a /count invocation resolved to
enum CountReply {
    Embed { title: String, body: String },
    Text(String),
}

pub struct CountHandler;

#[async_trait]
impl SlashCommandHandler for CountHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["count"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let word = get_string_option(&command.data.options, "word")
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        let target = get_user_option(&command.data.options, "target");

        debug!("Count lookup: word={word:?} target={target:?}");

        let reply = build_reply(&ctx.word_counter, word.as_deref(), target);

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| match reply {
                        CountReply::Embed { title, body } => {
                            msg.add_embed(titled_embed(&title, &body))
                        }
                        CountReply::Text(text) => msg.content(text).ephemeral(true),
                    })
            })
            .await?;

        Ok(())
    }
}

fn build_reply(counter: &WordCounter, word: Option<&str>, target: Option<u64>) -> CountReply {
    if !counter.is_ready() {
        return CountReply::Text(
            "⏳ Still reading the message history, try again in a little while.".to_string(),
        );
    }

    match (word, target) {
        (Some(word), Some(user)) => match counter.count_for_user(user, word) {
            Some(count) => CountReply::Text(format!("<@{user}> has said **{word}** {count} times.")),
            None => unknown_user(user),
        },
        (Some(word), None) => {
            let top = counter.top_users_for_word(word, TOP_LIMIT);
            if top.is_empty() {
                return CountReply::Text(format!("Nobody has said **{word}** yet."));
            }
            CountReply::Embed {
                title: format!(
                    "Top {TOP_LIMIT} users of \"{word}\" ({} in total)",
                    counter.total_for_word(word)
                ),
                body: ranked_lines(top.iter().map(|(user, count)| (format!("<@{user}>"), *count))),
            }
        }
        (None, Some(user)) => match counter.top_words_for_user(user, TOP_LIMIT) {
            Some(top) => CountReply::Embed {
                title: format!("Top {TOP_LIMIT} words"),
                body: format!(
                    "<@{user}>\n{}",
                    ranked_lines(top.into_iter().map(|(word, count)| (format!("`{word}`"), count)))
                ),
            },
            None => unknown_user(user),
        },
        (None, None) => CountReply::Text("❌ Give me a word, a user, or both.".to_string()),
    }
}

fn unknown_user(user: u64) -> CountReply {
    CountReply::Text(format!("❌ I haven't seen <@{user}> say anything."))
}

fn ranked_lines(entries: impl Iterator<Item = (String, u64)>) -> String {
    entries
        .enumerate()
        .map(|(i, (label, count))| format!("{}. {label}: {count}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
