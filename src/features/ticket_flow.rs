// Opening, closing and editing tickets
// Shared by the slash commands and the panel buttons

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use crate::features::components::ticket_buttons;
use crate::features::notifications::{render_section, ticket_header};
use crate::features::role_form::RoleRequestForm;
use crate::features::tickets::{
    allocate_ticket_name, category_for, classify_ticket, deletion_delay, initial_message,
    parse_snowflake, support_role_ids, ticket_opener, ticket_overwrites, TicketKind,
};
use crate::models::guild::{keys, GuildConfig};
use crate::utils::config::{colors, parse_color};
use crate::utils::formatters::{channel_mention, render_placeholders};
use crate::{Data, Error};

/// Result of an open attempt, turned into the user's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened(serenity::ChannelId),
    MissingCategory,
    NoNumber,
    ChannelFailed,
}

impl OpenOutcome {
    pub fn message(self, kind: TicketKind) -> String {
        match self {
            OpenOutcome::Opened(channel) => {
                let mention = channel_mention(&channel.to_string());
                match kind {
                    TicketKind::Support => format!("✅ Created your support ticket: {}", mention),
                    TicketKind::RoleRequest => format!("✅ Submitted your role request: {}", mention),
                }
            }
            OpenOutcome::MissingCategory => {
                format!("❌ `{}` is not set in config.", kind.category_key())
            }
            OpenOutcome::NoNumber => {
                "❌ Could not assign a ticket number right now. Please try again later.".to_string()
            }
            OpenOutcome::ChannelFailed => "❌ Failed to create the ticket channel.".to_string(),
        }
    }
}

pub const COOLDOWN_MESSAGE: &str = "⏳ Please wait a few seconds before creating another ticket.";
pub const NOT_A_TICKET: &str = "❌ This is not a ticket channel.";

/// Result of a close attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Deleted after this many seconds
    Closing(u64),
    NotATicket,
}

impl CloseOutcome {
    pub fn message(self) -> String {
        match self {
            CloseOutcome::Closing(delay) => {
                format!("🔒 Ticket will be deleted in {} seconds.", delay)
            }
            CloseOutcome::NotATicket => NOT_A_TICKET.to_string(),
        }
    }
}

/// Post an embed to the guild's notification and logging channels
async fn notify_staff(http: &serenity::Http, config: &GuildConfig, embed: serenity::CreateEmbed) {
    let mut targets: Vec<u64> = Vec::new();
    for key in [keys::TICKET_NOTIFICATION_CHANNEL_ID, keys::LOGGING_CHANNEL_ID] {
        if let Some(id) = config.str_field(key).and_then(parse_snowflake) {
            if !targets.contains(&id) {
                targets.push(id);
            }
        }
    }

    for id in targets {
        let result = serenity::ChannelId::new(id)
            .send_message(http, serenity::CreateMessage::new().embed(embed.clone()))
            .await;
        if let Err(e) = result {
            warn!(channel_id = id, "Failed to send ticket notification: {:?}", e);
        }
    }
}

/// Embeds of a role request: the configured header, then the answers
fn request_embeds(
    config: &GuildConfig,
    kind: TicketKind,
    user: &serenity::User,
    form: Option<&RoleRequestForm>,
) -> Vec<serenity::CreateEmbed> {
    let header = ticket_header(config, kind.embed_key())
        .map(|header| header.to_embed())
        .unwrap_or_else(|| serenity::CreateEmbed::new().color(colors::TICKET))
        .author(serenity::CreateEmbedAuthor::new(user.display_name()).icon_url(user.face()));

    let mut embeds = vec![header];
    if let Some(form) = form {
        let color = config
            .section_str(kind.embed_key(), "embedColor")
            .and_then(parse_color)
            .unwrap_or(colors::TICKET);
        let mut details = serenity::CreateEmbed::new().title("Request Details").color(color);
        for (label, answer, inline) in form.fields(config) {
            details = details.field(label, answer, inline);
        }
        embeds.push(details);
    }
    embeds
}

/// Create a ticket channel for `user` and announce it
pub async fn open_ticket(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    kind: TicketKind,
    form: Option<&RoleRequestForm>,
) -> OpenOutcome {
    let guild = guild_id.to_string();
    let config = data.configs.get_config(&guild).await;

    let Some(category) = category_for(&config, kind).and_then(parse_snowflake) else {
        return OpenOutcome::MissingCategory;
    };

    let battalion = form.map(|f| f.battalion.as_str());
    let (number, name) = match allocate_ticket_name(&data.counters, Some(&guild), kind, battalion).await {
        Ok(allocated) => allocated,
        Err(e) => {
            error!(guild_id = %guild, key = kind.counter_key(), "No ticket number: {}", e);
            return OpenOutcome::NoNumber;
        }
    };

    let bot_id = ctx.cache.current_user().id;
    let overwrites = ticket_overwrites(guild_id, user.id, bot_id, &support_role_ids(&config, kind));
    let reason = format!("Ticket opened by {}", user.name);
    let builder = serenity::CreateChannel::new(name.as_str())
        .kind(serenity::ChannelType::Text)
        .category(serenity::ChannelId::new(category))
        .permissions(overwrites)
        .audit_log_reason(&reason);

    let channel = match guild_id.create_channel(ctx, builder).await {
        Ok(channel) => channel,
        Err(e) => {
            error!(guild_id = %guild, "Failed to create ticket channel {}: {:?}", name, e);
            return OpenOutcome::ChannelFailed;
        }
    };

    info!(guild_id = %guild, ticket = %name, number, "Ticket opened by {}", user.name);

    let user_mention = format!("<@{}>", user.id);
    let opening = serenity::CreateMessage::new()
        .content(initial_message(&config, kind, &user_mention))
        .embeds(request_embeds(&config, kind, user, form))
        .components(vec![ticket_buttons(kind)]);
    if let Err(e) = channel.id.send_message(ctx, opening).await {
        warn!(channel_id = %channel.id, "Failed to post the opening message: {:?}", e);
    }

    let number_text = number.to_string();
    let ticket_channel = channel_mention(&channel.id.to_string());
    let values = [
        ("user", user_mention.as_str()),
        ("ticketName", name.as_str()),
        ("ticketType", kind.label()),
        ("ticketChannel", ticket_channel.as_str()),
        ("ticketNumber", number_text.as_str()),
    ];
    if let Some(rendered) = render_section(&config, keys::TICKET_CREATION_NOTIFICATION_EMBED, &values) {
        notify_staff(&ctx.http, &config, rendered.to_embed()).await;
    }

    OpenOutcome::Opened(channel.id)
}

/// Announce, DM the opener and schedule deletion of a ticket channel
pub async fn close_ticket(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    closer: &serenity::User,
) -> Result<CloseOutcome, Error> {
    let Some(channel) = channel_id.to_channel(ctx).await?.guild() else {
        return Ok(CloseOutcome::NotATicket);
    };

    let guild = guild_id.to_string();
    let config = data.configs.get_config(&guild).await;

    let parent = channel.parent_id.map(|id| id.get());
    let Some((kind, number)) = classify_ticket(&config, &channel.name, parent) else {
        return Ok(CloseOutcome::NotATicket);
    };

    let closed_by = format!("<@{}>", closer.id);
    let bot_id = ctx.cache.current_user().id;
    let opener = ticket_opener(&channel.permission_overwrites, bot_id).unwrap_or(closer.id);
    let opener_mention = format!("<@{}>", opener);

    info!(guild_id = %guild, ticket = %channel.name, number, "Ticket closed by {}", closer.name);

    let number_text = number.to_string();
    let created_at = format!("<t:{}:f>", channel.id.created_at().unix_timestamp());
    let closed_at = format!("<t:{}:f>", chrono::Utc::now().timestamp());
    let values = [
        ("user", opener_mention.as_str()),
        ("closedBy", closed_by.as_str()),
        ("ticketName", channel.name.as_str()),
        ("ticketType", kind.label()),
        ("ticketNumber", number_text.as_str()),
        ("createdAt", created_at.as_str()),
        ("closedAt", closed_at.as_str()),
    ];

    if let Some(rendered) = render_section(&config, keys::TICKET_CLOSURE_NOTIFICATION_EMBED, &values) {
        notify_staff(&ctx.http, &config, rendered.to_embed()).await;
    }

    if let Some(rendered) = render_section(&config, keys::TICKET_CLOSURE_DM_EMBED, &values) {
        let dm = serenity::CreateMessage::new().embed(rendered.to_embed());
        if let Err(e) = opener.direct_message(ctx, dm).await {
            warn!(user_id = %opener, "Failed to DM ticket owner: {:?}", e);
        }
    }

    let delay = deletion_delay(&config);
    let delay_text = delay.to_string();
    let notice = match render_section(&config, keys::DELETION_EMBED, &[]) {
        Some(mut rendered) => {
            rendered.description = render_placeholders(
                &rendered.description,
                &[("user", closed_by.as_str()), ("delay", delay_text.as_str())],
            );
            rendered.to_embed()
        }
        None => serenity::CreateEmbed::new()
            .title("Ticket Closing")
            .description(format!("Closing this ticket in {} seconds...", delay))
            .color(colors::TICKET),
    };
    if let Err(e) = channel
        .id
        .send_message(ctx, serenity::CreateMessage::new().embed(notice))
        .await
    {
        warn!(channel_id = %channel.id, "Failed to post the deletion notice: {:?}", e);
    }

    let http = ctx.http.clone();
    let reason = format!("Ticket closed by {}", closer.name);
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
        if let Err(e) = http.delete_channel(channel_id, Some(reason.as_str())).await {
            error!(channel_id = %channel_id, "Failed to delete ticket channel after delay: {:?}", e);
        }
    });

    Ok(CloseOutcome::Closing(delay))
}

/// Rewrite the embeds of a role request's opening message with new answers
pub async fn edit_request(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    user: &serenity::User,
    form: &RoleRequestForm,
) -> Result<(), Error> {
    let config = data.configs.get_config(&guild_id.to_string()).await;
    let embeds = request_embeds(&config, TicketKind::RoleRequest, user, Some(form));
    channel_id
        .edit_message(ctx, message_id, serenity::EditMessage::new().embeds(embeds))
        .await?;
    info!(guild_id = %guild_id, channel_id = %channel_id, "Role request edited by {}", user.name);
    Ok(())
}
