// Ticket embeds rendered from a guild's configured templates
// Templates live in config sections like `ticketCreationNotificationEmbed`

use poise::serenity_prelude as serenity;

use crate::models::guild::{keys, ConfigValue, GuildConfig};
use crate::utils::config::parse_color;
use crate::utils::formatters::render_placeholders;

/// Embed content with placeholders already filled in
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmbed {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
    pub fields: Vec<(String, String, bool)>,
    pub image: Option<String>,
}

impl RenderedEmbed {
    pub fn to_embed(&self) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new();
        if !self.title.is_empty() {
            embed = embed.title(&self.title);
        }
        if !self.description.is_empty() {
            embed = embed.description(&self.description);
        }
        if let Some(color) = self.color {
            embed = embed.color(color);
        }
        for (name, value, inline) in &self.fields {
            embed = embed.field(name, value, *inline);
        }
        if let Some(image) = &self.image {
            embed = embed.image(image);
        }
        embed
    }
}

/// Render a configured embed section; `None` when the section is missing
pub fn render_section(
    config: &GuildConfig,
    section: &str,
    values: &[(&str, &str)],
) -> Option<RenderedEmbed> {
    let template = config.section(section)?;
    let text = |field: &str| {
        template
            .get(field)
            .and_then(ConfigValue::as_str)
            .map(|s| render_placeholders(s, values))
            .unwrap_or_default()
    };

    let fields = match template.get("fields") {
        Some(ConfigValue::List(items)) => items
            .iter()
            .filter_map(ConfigValue::as_map)
            .filter_map(|field| {
                let name = field.get("name")?.as_str()?;
                let value = field.get("value")?.as_str()?;
                let inline = matches!(field.get("inline"), Some(ConfigValue::Bool(true)));
                Some((
                    render_placeholders(name, values),
                    render_placeholders(value, values),
                    inline,
                ))
            })
            .collect(),
        _ => Vec::new(),
    };

    Some(RenderedEmbed {
        title: text("title"),
        description: text("description"),
        color: template
            .get("embedColor")
            .and_then(ConfigValue::as_str)
            .and_then(parse_color),
        fields,
        image: None,
    })
}

/// Title, color and one description field of a ticket embed section
fn section_embed(config: &GuildConfig, section: &str, description: &str) -> Option<RenderedEmbed> {
    let template = config.section(section)?;
    let get = |field: &str| {
        template
            .get(field)
            .and_then(ConfigValue::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(RenderedEmbed {
        title: get("title"),
        description: get(description),
        color: parse_color(&get("embedColor")),
        fields: Vec::new(),
        image: None,
    })
}

/// Header shown at the top of a freshly opened ticket
pub fn ticket_header(config: &GuildConfig, section: &str) -> Option<RenderedEmbed> {
    section_embed(config, section, "openDescription")
}

/// Panel advertising a ticket kind, with the guild's panel image
pub fn panel_embed(config: &GuildConfig, section: &str) -> Option<RenderedEmbed> {
    let mut panel = section_embed(config, section, "panelDescription")?;
    panel.image = config.str_field(keys::PANEL_IMAGE_URL).map(str::to_string);
    Some(panel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_creation_notification() {
        let config = GuildConfig::defaults();
        let rendered = render_section(
            &config,
            keys::TICKET_CREATION_NOTIFICATION_EMBED,
            &[("user", "<@1>"), ("ticketNumber", "12")],
        )
        .unwrap();

        assert_eq!(rendered.title, "Ticket Created");
        assert_eq!(rendered.description, "<@1> has created a ticket.");
        assert_eq!(rendered.color, Some(0x08aad1));
        assert_eq!(
            rendered.fields,
            vec![("Ticket".to_string(), "#12".to_string(), true)]
        );
    }

    #[test]
    fn test_render_closure_dm_fields() {
        let config = GuildConfig::defaults();
        let rendered = render_section(
            &config,
            keys::TICKET_CLOSURE_DM_EMBED,
            &[
                ("ticketName", "support-12"),
                ("createdAt", "<t:1:f>"),
                ("closedAt", "<t:2:f>"),
                ("closedBy", "<@3>"),
            ],
        )
        .unwrap();

        assert_eq!(rendered.fields.len(), 4);
        assert_eq!(rendered.fields[0].1, "``support-12``");
        assert_eq!(rendered.fields[3], ("Closed by".to_string(), "<@3>".to_string(), false));
    }

    #[test]
    fn test_missing_section() {
        assert!(render_section(&GuildConfig::default(), keys::DELETION_EMBED, &[]).is_none());
        assert!(ticket_header(&GuildConfig::default(), keys::SUPPORT_TICKET_EMBED).is_none());
    }

    #[test]
    fn test_ticket_header() {
        let header = ticket_header(&GuildConfig::defaults(), keys::ROLE_REQUEST_EMBED).unwrap();
        assert_eq!(header.title, "Role Request Ticket");
        assert!(header.description.starts_with("Thank you for creating a Role Request."));
        assert_eq!(header.color, Some(0x940000));
    }

    #[test]
    fn test_panel_embed_uses_panel_settings() {
        let panel = panel_embed(&GuildConfig::defaults(), keys::SUPPORT_TICKET_EMBED).unwrap();
        assert_eq!(panel.title, "Support Ticket");
        assert!(panel.description.starts_with("Do you need help"));
        assert_eq!(panel.image, None);

        let config = GuildConfig::from_map(crate::utils::merge::deep_merge(
            GuildConfig::defaults().as_map(),
            GuildConfig::from_value(serde_json::json!({
                "panelImageUrl": "https://example.com/logo.png",
                "roleRequestEmbed": { "panelDescription": "Ask for roles here" },
            }))
            .unwrap()
            .as_map(),
        ));
        let panel = panel_embed(&config, keys::ROLE_REQUEST_EMBED).unwrap();
        assert_eq!(panel.description, "Ask for roles here");
        assert_eq!(panel.title, "Role Request Ticket");
        assert_eq!(panel.image.as_deref(), Some("https://example.com/logo.png"));
    }
}
