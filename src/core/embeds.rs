//! Embed builders for Discord responses
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Plain titled embeds for word counts and reminder listings
//! - 1.0.0: Initial release

use crate::core::truncate_for_embed;
use serenity::builder::CreateEmbed;

/// Accent color used on every embed the bot sends
pub const ACCENT_COLOR: u32 = 0x3B88C3;

/// Build an accent-colored embed with an optional title and a truncated description.
///
/// Empty titles and descriptions are left unset so Discord doesn't reject the embed.
pub fn titled_embed(title: &str, text: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.color(ACCENT_COLOR);
    if !title.is_empty() {
        embed.title(title);
    }
    if !text.is_empty() {
        embed.description(truncate_for_embed(text));
    }
    embed
}
