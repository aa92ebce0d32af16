use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::models::guild::{keys, ConfigMap, ConfigValue};
use crate::utils::config::colors;
use crate::utils::formatters::{channel_mention, or_not_set, role_mention};
use crate::{Context, Error};

/// Settings editable through `/config set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum SettingKey {
    #[name = "Support Role"]
    SupportRole,
    #[name = "Support Ticket Category"]
    SupportTicketCategory,
    #[name = "Role Request Category"]
    RoleRequestCategory,
    #[name = "Logging Channel"]
    LoggingChannel,
    #[name = "Notification Channel"]
    NotificationChannel,
    #[name = "Panel Image URL"]
    PanelImageUrl,
}

impl SettingKey {
    pub fn config_key(self) -> &'static str {
        match self {
            SettingKey::SupportRole => keys::SUPPORT_ROLE_ID,
            SettingKey::SupportTicketCategory => keys::SUPPORT_TICKET_CATEGORY_ID,
            SettingKey::RoleRequestCategory => keys::ROLE_TICKET_CATEGORY_ID,
            SettingKey::LoggingChannel => keys::LOGGING_CHANNEL_ID,
            SettingKey::NotificationChannel => keys::TICKET_NOTIFICATION_CHANNEL_ID,
            SettingKey::PanelImageUrl => keys::PANEL_IMAGE_URL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::SupportRole => "Support Role",
            SettingKey::SupportTicketCategory => "Support Ticket Category",
            SettingKey::RoleRequestCategory => "Role Request Category",
            SettingKey::LoggingChannel => "Logging Channel",
            SettingKey::NotificationChannel => "Notification Channel",
            SettingKey::PanelImageUrl => "Panel Image URL",
        }
    }
}

/// First Discord id (17 to 19 digits) inside a raw id or mention
fn extract_id(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i - start >= 17 {
            return Some(&raw[start..start + (i - start).min(19)]);
        }
    }
    None
}

/// Validate a raw `/config set` value into what gets stored
pub fn parse_setting_value(key: SettingKey, raw: &str) -> Result<ConfigValue, String> {
    let value = raw.trim();
    match key {
        SettingKey::PanelImageUrl => {
            if value.is_empty() {
                return Ok(ConfigValue::Null);
            }
            let lower = value.to_ascii_lowercase();
            let has_scheme = ["http://", "https://"]
                .iter()
                .any(|scheme| lower.starts_with(scheme) && value.len() > scheme.len());
            if has_scheme {
                Ok(value.into())
            } else {
                Err("❌ Panel image must be a valid HTTP/HTTPS URL, or empty to clear.".to_string())
            }
        }
        _ => extract_id(value)
            .map(ConfigValue::from)
            .ok_or_else(|| "❌ Invalid ID format. Please provide a valid Discord ID or mention.".to_string()),
    }
}

async fn reply(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_text(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Configure bot settings for this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD",
    subcommands("view", "set", "reset")
)]
pub async fn config(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// View current configuration
#[poise::command(slash_command, guild_only)]
pub async fn view(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let config = ctx.data().configs.get_config(&guild_id.to_string()).await;

    let role = |key: &str| or_not_set(config.str_field(key).map(role_mention));
    let channel = |key: &str| or_not_set(config.str_field(key).map(channel_mention));

    let embed = serenity::CreateEmbed::new()
        .title("🔧 Server Configuration")
        .color(colors::INFO)
        .field("Support Role", role(keys::SUPPORT_ROLE_ID), true)
        .field("Support Category", channel(keys::SUPPORT_TICKET_CATEGORY_ID), true)
        .field("Role Request Category", channel(keys::ROLE_TICKET_CATEGORY_ID), true)
        .field("Logging Channel", channel(keys::LOGGING_CHANNEL_ID), true)
        .field("Notification Channel", channel(keys::TICKET_NOTIFICATION_CHANNEL_ID), true)
        .field(
            "Panel Image",
            or_not_set(config.str_field(keys::PANEL_IMAGE_URL).map(str::to_string)),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new("Use /config set to change settings"));

    reply(ctx, embed).await
}

/// Set a configuration value
#[poise::command(slash_command, guild_only)]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Which setting to configure"] setting: SettingKey,
    #[description = "The value to set (use channel/role ID or URL)"] value: String,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let parsed = match parse_setting_value(setting, &value) {
        Ok(parsed) => parsed,
        Err(message) => return reply_text(ctx, message).await,
    };

    let mut partial = ConfigMap::new();
    partial.insert(setting.config_key().to_string(), parsed);

    let guild = guild_id.to_string();
    match ctx.data().configs.update_config(&guild, partial).await {
        Ok(_) => {
            info!(guild_id = %guild, key = setting.config_key(), "Setting updated via /config");
            let embed = serenity::CreateEmbed::new()
                .title("Configuration Updated")
                .description(format!("✅ **{}** has been updated!", setting.label()))
                .color(colors::SUCCESS);
            reply(ctx, embed).await
        }
        Err(e) => {
            error!(guild_id = %guild, key = setting.config_key(), "Failed to save setting: {}", e);
            reply_text(ctx, "❌ Failed to save configuration, your change was not saved.").await
        }
    }
}

/// Reset embeds and messages to defaults
#[poise::command(slash_command, guild_only)]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let guild = guild_id.to_string();
    match ctx.data().configs.reset_sections(&guild).await {
        Ok(_) => {
            info!(guild_id = %guild, "Configuration sections reset via /config");
            reply_text(ctx, "✅ Configuration has been reset to defaults!").await
        }
        Err(e) => {
            error!(guild_id = %guild, "Failed to reset configuration: {}", e);
            reply_text(ctx, "❌ Failed to reset configuration, your change was not saved.").await
        }
    }
}
