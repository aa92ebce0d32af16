use poise::serenity_prelude as serenity;

use crate::features::components::modal_id;
use crate::features::role_form::role_request_modal;
use crate::features::ticket_flow::{close_ticket, open_ticket, COOLDOWN_MESSAGE};
use crate::features::tickets::TicketKind;
use crate::{Context, Error};

async fn reply_text(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Open or close tickets
#[poise::command(slash_command, guild_only, subcommands("support", "role", "close"))]
pub async fn ticket(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Open a support ticket
#[poise::command(slash_command, guild_only)]
pub async fn support(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let kind = TicketKind::Support;

    if !ctx.data().cooldowns.check(ctx.author().id.get(), kind.action()) {
        return reply_text(ctx, COOLDOWN_MESSAGE).await;
    }

    ctx.defer_ephemeral().await?;
    let outcome = open_ticket(ctx.serenity_context(), ctx.data(), guild_id, ctx.author(), kind, None).await;
    reply_text(ctx, outcome.message(kind)).await
}

/// Open a role request ticket through the request form
#[poise::command(slash_command, guild_only)]
pub async fn role(ctx: Context<'_>) -> Result<(), Error> {
    let (Some(guild_id), poise::Context::Application(app)) = (ctx.guild_id(), ctx) else {
        return Ok(());
    };

    if !ctx.data().cooldowns.check(ctx.author().id.get(), TicketKind::RoleRequest.action()) {
        return reply_text(ctx, COOLDOWN_MESSAGE).await;
    }

    // The submitted form is handled with the panel's modal submissions
    let config = ctx.data().configs.get_config(&guild_id.to_string()).await;
    let modal = role_request_modal(&config, modal_id(None), None);
    app.interaction
        .create_response(ctx.http(), serenity::CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Close the ticket this command is used in
#[poise::command(slash_command, guild_only)]
pub async fn close(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    ctx.defer_ephemeral().await?;
    let outcome = close_ticket(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        ctx.channel_id(),
        ctx.author(),
    )
    .await?;
    reply_text(ctx, outcome.message()).await
}
