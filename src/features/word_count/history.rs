//! Seeding word counts from guild channel history

use anyhow::Result;
use log::{debug, error, info};
use serenity::http::Http;
use serenity::model::channel::{ChannelType, GuildChannel, Message};
use serenity::model::id::{GuildId, MessageId};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use super::counter::WordCounter;

/// Discord returns at most this many messages per request
const PAGE_SIZE: u64 = 100;

/// Scan up to `per_channel` recent messages of every text channel in the guild,
/// channels in parallel, then mark the counter ready.
pub async fn build_from_history(
    http: Arc<Http>,
    guild_id: GuildId,
    counter: Arc<WordCounter>,
    per_channel: u64,
) {
    let started = Instant::now();

    let channels = match guild_id.channels(&http).await {
        Ok(channels) => channels,
        Err(e) => {
            error!("Word count: failed to list channels for guild {guild_id}: {e}");
            // Live messages still count
            counter.mark_ready();
            return;
        }
    };

    let text_channels: Vec<GuildChannel> = channels
        .into_values()
        .filter(|c| c.kind == ChannelType::Text)
        .collect();
    info!(
        "📚 Fetching up to {per_channel} messages from {} channels for word counts",
        text_channels.len()
    );

    let mut scans = JoinSet::new();
    for channel in text_channels {
        let http = Arc::clone(&http);
        let counter = Arc::clone(&counter);
        scans.spawn(async move {
            match fetch_recent_messages(&http, &channel, per_channel).await {
                Ok(messages) => {
                    debug!("Found {} messages in #{}", messages.len(), channel.name);
                    for message in messages.iter().filter(|m| !m.author.bot) {
                        counter.record_message(message.author.id.0, &message.content);
                    }
                }
                Err(e) => error!("Failed to fetch messages for #{}: {e}", channel.name),
            }
        });
    }
    while scans.join_next().await.is_some() {}

    counter.mark_ready();
    info!(
        "✅ Word counts ready for {} users, took {:?}",
        counter.user_count(),
        started.elapsed()
    );
}

/// Page backwards through a channel until `limit` messages or the start of the channel
async fn fetch_recent_messages(
    http: &Http,
    channel: &GuildChannel,
    limit: u64,
) -> Result<Vec<Message>> {
    let mut messages: Vec<Message> = Vec::new();
    let mut before: Option<MessageId> = None;

    while (messages.len() as u64) < limit {
        let page_size = (limit - messages.len() as u64).min(PAGE_SIZE);
        let page = channel
            .id
            .messages(http, |retriever| {
                if let Some(id) = before {
                    retriever.before(id);
                }
                retriever.limit(page_size)
            })
            .await?;

        let Some(oldest) = page.last() else {
            break;
        };
        before = Some(oldest.id);
        let exhausted = (page.len() as u64) < page_size;
        messages.extend(page);
        if exhausted {
            break;
        }
    }

    Ok(messages)
}
