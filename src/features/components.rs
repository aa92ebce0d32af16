// Button and modal ids used by ticket panels and ticket channels
// Ids are versioned so old panels keep working if the layout changes

use poise::serenity_prelude as serenity;

use crate::features::tickets::TicketKind;

pub const OPEN_SUPPORT: &str = "ticket:open:support:v1";
pub const OPEN_ROLE_REQUEST: &str = "ticket:open:role_request:v1";
pub const CLOSE: &str = "ticket:close:v1";
pub const EDIT_REQUEST: &str = "ticket:role:edit:v1";
pub const ROLE_REQUEST_MODAL: &str = "role_request_modal:v1";

/// What a pressed button asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentAction {
    Open(TicketKind),
    Close,
    EditRequest,
}

impl ComponentAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        match custom_id {
            OPEN_SUPPORT => Some(ComponentAction::Open(TicketKind::Support)),
            OPEN_ROLE_REQUEST => Some(ComponentAction::Open(TicketKind::RoleRequest)),
            CLOSE => Some(ComponentAction::Close),
            EDIT_REQUEST => Some(ComponentAction::EditRequest),
            _ => None,
        }
    }
}

/// Modal id; `target` is the ticket message an edit should rewrite
pub fn modal_id(target: Option<serenity::MessageId>) -> String {
    match target {
        Some(id) => format!("{}:{}", ROLE_REQUEST_MODAL, id),
        None => ROLE_REQUEST_MODAL.to_string(),
    }
}

/// `None` for foreign modals, `Some(None)` for a new request and
/// `Some(Some(id))` for an edit of message `id`
pub fn parse_modal_id(custom_id: &str) -> Option<Option<serenity::MessageId>> {
    let rest = custom_id.strip_prefix(ROLE_REQUEST_MODAL)?;
    if rest.is_empty() {
        return Some(None);
    }
    let id = rest.strip_prefix(':')?.parse::<u64>().ok().filter(|id| *id != 0)?;
    Some(Some(serenity::MessageId::new(id)))
}

/// Button placed under a panel
pub fn panel_button(kind: TicketKind) -> serenity::CreateButton {
    match kind {
        TicketKind::Support => serenity::CreateButton::new(OPEN_SUPPORT)
            .label("Open Support Ticket")
            .emoji('🎫')
            .style(serenity::ButtonStyle::Primary),
        TicketKind::RoleRequest => serenity::CreateButton::new(OPEN_ROLE_REQUEST)
            .label("Request a Role")
            .emoji('📝')
            .style(serenity::ButtonStyle::Success),
    }
}

/// Buttons under the opening message of a ticket
pub fn ticket_buttons(kind: TicketKind) -> serenity::CreateActionRow {
    let mut buttons = vec![serenity::CreateButton::new(CLOSE)
        .label("Close")
        .emoji('🔒')
        .style(serenity::ButtonStyle::Danger)];
    if kind == TicketKind::RoleRequest {
        buttons.push(
            serenity::CreateButton::new(EDIT_REQUEST)
                .label("Edit Request")
                .emoji('✏')
                .style(serenity::ButtonStyle::Secondary),
        );
    }
    serenity::CreateActionRow::Buttons(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_ids() {
        assert_eq!(
            ComponentAction::parse(OPEN_SUPPORT),
            Some(ComponentAction::Open(TicketKind::Support))
        );
        assert_eq!(
            ComponentAction::parse(OPEN_ROLE_REQUEST),
            Some(ComponentAction::Open(TicketKind::RoleRequest))
        );
        assert_eq!(ComponentAction::parse(CLOSE), Some(ComponentAction::Close));
        assert_eq!(ComponentAction::parse(EDIT_REQUEST), Some(ComponentAction::EditRequest));
        assert_eq!(ComponentAction::parse("ticket_open_support"), None);
        assert_eq!(ComponentAction::parse("novel_next"), None);
    }

    #[test]
    fn test_modal_ids() {
        assert_eq!(parse_modal_id(&modal_id(None)), Some(None));
        let target = serenity::MessageId::new(1234567890123456789);
        assert_eq!(parse_modal_id(&modal_id(Some(target))), Some(Some(target)));

        assert_eq!(parse_modal_id("raid_modal"), None);
        assert_eq!(parse_modal_id("role_request_modal:v1:abc"), None);
        assert_eq!(parse_modal_id("role_request_modal:v1:0"), None);
        assert_eq!(parse_modal_id("role_request_modal:v10"), None);
    }
}
