//! Outbound delivery of fired reminders

use anyhow::Result;
use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::core::truncate_for_message;

/// Something that can post text to a channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, channel_id: u64, text: &str) -> Result<()>;
}

/// Delivers reminders through the Discord REST API
#[derive(Clone)]
pub struct SerenitySink {
    http: Arc<Http>,
}

impl SerenitySink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationSink for SerenitySink {
    async fn send(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId(channel_id)
            .say(&self.http, truncate_for_message(text))
            .await?;
        Ok(())
    }
}
