use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::features::components::panel_button;
use crate::features::notifications::panel_embed;
use crate::features::tickets::TicketKind;
use crate::models::guild::GuildConfig;
use crate::utils::config::colors;
use crate::{Context, Error};

/// Which panels `/setup-panels` posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum PanelChoice {
    #[name = "Support"]
    Support,
    #[name = "Role Requests"]
    RoleRequests,
    #[name = "Both"]
    Both,
}

impl PanelChoice {
    /// Ticket kinds in posting order
    pub fn kinds(self) -> &'static [TicketKind] {
        match self {
            PanelChoice::Support => &[TicketKind::Support],
            PanelChoice::RoleRequests => &[TicketKind::RoleRequest],
            PanelChoice::Both => &[TicketKind::Support, TicketKind::RoleRequest],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelChoice::Support => "Support",
            PanelChoice::RoleRequests => "Role Requests",
            PanelChoice::Both => "Both",
        }
    }
}

/// Panel message for one ticket kind: embed plus its open button
pub fn panel_message(config: &GuildConfig, kind: TicketKind) -> serenity::CreateMessage {
    let embed = panel_embed(config, kind.embed_key())
        .map(|panel| panel.to_embed())
        .unwrap_or_else(|| serenity::CreateEmbed::new().color(colors::TICKET));
    serenity::CreateMessage::new()
        .embed(embed)
        .components(vec![serenity::CreateActionRow::Buttons(vec![panel_button(kind)])])
}

/// Post ticket panels with their open buttons
#[poise::command(
    slash_command,
    guild_only,
    rename = "setup-panels",
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
pub async fn setup_panels(
    ctx: Context<'_>,
    #[description = "Which panel(s) to post"] panel: PanelChoice,
    #[description = "Channel to post the panel(s) in"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    if channel.kind != serenity::ChannelType::Text {
        ctx.send(
            poise::CreateReply::default()
                .content("❌ Please choose a text channel.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let config = ctx.data().configs.get_config(&guild_id.to_string()).await;
    for kind in panel.kinds() {
        if let Err(e) = channel.id.send_message(ctx.http(), panel_message(&config, *kind)).await {
            error!(guild_id = %guild_id, channel_id = %channel.id, "Failed to post {} panel: {:?}", kind.label(), e);
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ Could not post panels in <#{}>.", channel.id))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    }

    info!(guild_id = %guild_id, channel_id = %channel.id, "{} panel(s) posted by {}", panel.label(), ctx.author().name);
    ctx.send(
        poise::CreateReply::default()
            .content(format!("✅ {} panel(s) posted in <#{}>.", panel.label(), channel.id))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
