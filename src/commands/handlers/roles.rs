//! Role lookup command handlers
//!
//! Handles: roles, members
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::guild::Member;
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_role_option, get_user_option};
use crate::core::{truncate_to, MESSAGE_LIMIT};

/// Discord's cap on members per list request
const MEMBER_PAGE: u64 = 1000;

/// Handler for role lookups: a user's roles, a role's members
pub struct RoleHandler;

#[async_trait]
impl SlashCommandHandler for RoleHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["roles", "members"]
    }

    async fn handle(
        &self,
        _ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let (content, ephemeral) = match command.guild_id {
            None => ("❌ This only works in a server.".to_string(), true),
            Some(guild_id) => match command.data.name.as_str() {
                "roles" => (self.roles_of(serenity_ctx, command, guild_id).await?, false),
                "members" => (self.members_of(serenity_ctx, command, guild_id).await?, false),
                _ => return Ok(()),
            },
        };

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| msg.content(content).ephemeral(ephemeral))
            })
            .await?;

        Ok(())
    }
}

impl RoleHandler {
    /// Handle /roles command - list the roles of one member
    async fn roles_of(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        guild_id: GuildId,
    ) -> Result<String> {
        let target = get_user_option(&command.data.options, "target")
            .ok_or_else(|| anyhow!("Missing target parameter"))?;

        let member = guild_id.member(&serenity_ctx.http, UserId(target)).await?;
        let guild_roles = role_names_by_id(&serenity_ctx.http, guild_id).await?;

        debug!(
            "User {} has {} roles in guild {guild_id}",
            member.user.id,
            member.roles.len()
        );

        Ok(code_block_listing(
            &format!("Roles for user {}:", member.user.name),
            role_mentions(&member.roles, &guild_roles),
        ))
    }

    /// Handle /members command - list everyone holding one role
    async fn members_of(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        guild_id: GuildId,
    ) -> Result<String> {
        let role_id = get_role_option(&command.data.options, "role")
            .map(RoleId)
            .ok_or_else(|| anyhow!("Missing role parameter"))?;

        let guild_roles = role_names_by_id(&serenity_ctx.http, guild_id).await?;
        let role_name = guild_roles
            .get(&role_id)
            .cloned()
            .ok_or_else(|| anyhow!("Role {role_id} not found in guild {guild_id}"))?;

        let members = all_members(&serenity_ctx.http, guild_id).await?;
        let labels = members
            .iter()
            .filter(|m| m.roles.contains(&role_id))
            .map(|m| member_label(&m.user.name, m.nick.as_deref()))
            .collect();

        Ok(code_block_listing(
            &format!("Members in role {role_name}:"),
            labels,
        ))
    }
}

async fn role_names_by_id(http: &Http, guild_id: GuildId) -> Result<HashMap<RoleId, String>> {
    Ok(guild_id
        .roles(http)
        .await?
        .into_iter()
        .map(|(id, role)| (id, role.name))
        .collect())
}

/// Every member of the guild, fetched page by page
async fn all_members(http: &Http, guild_id: GuildId) -> Result<Vec<Member>> {
    let mut members: Vec<Member> = Vec::new();
    let mut after: Option<UserId> = None;

    loop {
        let page = guild_id.members(http, Some(MEMBER_PAGE), after).await?;
        let exhausted = (page.len() as u64) < MEMBER_PAGE;
        after = page.last().map(|m| m.user.id);
        members.extend(page);
        if exhausted || after.is_none() {
            break;
        }
    }

    Ok(members)
}

/// `@name` for each of the member's roles the guild still knows about
fn role_mentions(member_roles: &[RoleId], guild_roles: &HashMap<RoleId, String>) -> Vec<String> {
    member_roles
        .iter()
        .filter_map(|id| guild_roles.get(id))
        .map(|name| format!("@{name}"))
        .collect()
}

fn member_label(username: &str, nick: Option<&str>) -> String {
    match nick.filter(|n| !n.is_empty()) {
        Some(nick) => format!("@{username} ({nick})"),
        None => format!("@{username}"),
    }
}

/// Header followed by the sorted entries in a code block, kept within one message
fn code_block_listing(header: &str, mut entries: Vec<String>) -> String {
    entries.sort();
    let fence = "```";
    let room = MESSAGE_LIMIT.saturating_sub(header.len() + 2 * fence.len() + 2);
    let body = truncate_to(&entries.join("\n"), room);
    format!("{header}\n{fence}\n{body}{fence}")
}
