// Panel buttons, ticket buttons and role request modal submissions

use poise::serenity_prelude as serenity;
use tracing::{error, warn};

use crate::features::components::{modal_id, parse_modal_id, ComponentAction};
use crate::features::role_form::{modal_inputs, role_request_modal, RoleRequestForm};
use crate::features::ticket_flow::{close_ticket, edit_request, open_ticket, COOLDOWN_MESSAGE};
use crate::features::tickets::TicketKind;
use crate::{Data, Error};

const FAILED: &str = "❌ An error occurred while processing your request.";

fn ephemeral(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

fn deferred() -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Defer(
        serenity::CreateInteractionResponseMessage::new().ephemeral(true),
    )
}

/// Gateway events the command framework does not handle itself
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let serenity::FullEvent::InteractionCreate { interaction } = event else {
        return Ok(());
    };

    match interaction {
        serenity::Interaction::Component(component) => {
            let Some(action) = ComponentAction::parse(&component.data.custom_id) else {
                return Ok(());
            };
            if let Err(e) = handle_button(ctx, component, action, data).await {
                error!(custom_id = %component.data.custom_id, "Button failed: {:?}", e);
                let _ = component
                    .edit_response(ctx, serenity::EditInteractionResponse::new().content(FAILED))
                    .await;
            }
        }
        serenity::Interaction::Modal(modal) => {
            let Some(target) = parse_modal_id(&modal.data.custom_id) else {
                return Ok(());
            };
            if let Err(e) = handle_modal(ctx, modal, target, data).await {
                error!(custom_id = %modal.data.custom_id, "Modal submit failed: {:?}", e);
                let _ = modal
                    .edit_response(ctx, serenity::EditInteractionResponse::new().content(FAILED))
                    .await;
            }
        }
        _ => {}
    }

    Ok(())
}

async fn handle_button(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    action: ComponentAction,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };
    let user = &interaction.user;

    match action {
        ComponentAction::Open(kind) => {
            if !data.cooldowns.check(user.id.get(), kind.action()) {
                interaction.create_response(ctx, ephemeral(COOLDOWN_MESSAGE)).await?;
                return Ok(());
            }

            if kind == TicketKind::RoleRequest {
                let config = data.configs.get_config(&guild_id.to_string()).await;
                let modal = role_request_modal(&config, modal_id(None), None);
                interaction
                    .create_response(ctx, serenity::CreateInteractionResponse::Modal(modal))
                    .await?;
                return Ok(());
            }

            interaction.create_response(ctx, deferred()).await?;
            let outcome = open_ticket(ctx, data, guild_id, user, kind, None).await;
            interaction
                .edit_response(ctx, serenity::EditInteractionResponse::new().content(outcome.message(kind)))
                .await?;
        }
        ComponentAction::Close => {
            interaction.create_response(ctx, deferred()).await?;
            let outcome = close_ticket(ctx, data, guild_id, interaction.channel_id, user).await?;
            interaction
                .edit_response(ctx, serenity::EditInteractionResponse::new().content(outcome.message()))
                .await?;
        }
        ComponentAction::EditRequest => {
            let config = data.configs.get_config(&guild_id.to_string()).await;
            let answers: Vec<(String, String)> = interaction
                .message
                .embeds
                .iter()
                .find(|embed| !embed.fields.is_empty())
                .map(|embed| {
                    embed
                        .fields
                        .iter()
                        .map(|field| (field.name.clone(), field.value.clone()))
                        .collect()
                })
                .unwrap_or_default();
            let prefill = RoleRequestForm::from_embed_fields(&config, &answers);
            let modal = role_request_modal(&config, modal_id(Some(interaction.message.id)), Some(&prefill));
            interaction
                .create_response(ctx, serenity::CreateInteractionResponse::Modal(modal))
                .await?;
        }
    }

    Ok(())
}

async fn handle_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    target: Option<serenity::MessageId>,
    data: &Data,
) -> Result<(), Error> {
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };
    let user = &interaction.user;

    interaction.create_response(ctx, deferred()).await?;

    let form = RoleRequestForm::from_inputs(&modal_inputs(&interaction.data.components));

    if let Some(message_id) = target {
        match edit_request(ctx, data, guild_id, interaction.channel_id, message_id, user, &form).await {
            Ok(()) => {
                interaction
                    .edit_response(ctx, serenity::EditInteractionResponse::new().content("✅ Your request has been updated."))
                    .await?;
                return Ok(());
            }
            // The message is gone, so the answers open a fresh request instead
            Err(e) => warn!(message_id = %message_id, "Could not edit role request: {:?}", e),
        }
    }

    let kind = TicketKind::RoleRequest;
    let outcome = open_ticket(ctx, data, guild_id, user, kind, Some(&form)).await;
    interaction
        .edit_response(ctx, serenity::EditInteractionResponse::new().content(outcome.message(kind)))
        .await?;
    Ok(())
}
