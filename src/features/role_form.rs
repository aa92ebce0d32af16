// Role request form: modal layout, answers and the details embed

use poise::serenity_prelude as serenity;

use crate::features::tickets::sanitize_form_input;
use crate::models::guild::{keys, GuildConfig};
use crate::utils::config::{FORM_FIELD_MAX, FORM_ROLES_MAX};
use crate::utils::formatters::truncate_chars;

/// Discord caps modal input labels at this many characters
const MODAL_LABEL_MAX: usize = 45;

/// Shown for a blank answer in the details embed
const NO_ANSWER: &str = "N/A";

struct FormField {
    id: &'static str,
    fallback_label: &'static str,
    placeholder: &'static str,
    paragraph: bool,
    max: usize,
}

const FORM_FIELDS: [FormField; 4] = [
    FormField {
        id: "ingame_name",
        fallback_label: "In-Game Name",
        placeholder: "Nova PVT Red",
        paragraph: false,
        max: FORM_FIELD_MAX,
    },
    FormField {
        id: "steamid64",
        fallback_label: "SteamID64",
        placeholder: "76561198894758216",
        paragraph: false,
        max: FORM_FIELD_MAX,
    },
    FormField {
        id: "battalion",
        fallback_label: "Battalion",
        placeholder: "Nova",
        paragraph: false,
        max: FORM_FIELD_MAX,
    },
    FormField {
        id: "roles",
        fallback_label: "Roles",
        placeholder: "Nova Trooper, Defence Regiment, Army Sector",
        paragraph: true,
        max: FORM_ROLES_MAX,
    },
];

fn label(config: &GuildConfig, field: &FormField) -> String {
    config
        .section_str(keys::MODAL_LABELS, field.id)
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(field.fallback_label)
        .to_string()
}

/// Answers to the role request form, already sanitised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRequestForm {
    pub ingame_name: String,
    pub steamid64: String,
    pub battalion: String,
    pub roles: String,
}

impl RoleRequestForm {
    /// Build from raw answers, flattening and capping each one
    pub fn new(ingame_name: &str, steamid64: &str, battalion: &str, roles: &str) -> Self {
        Self {
            ingame_name: sanitize_form_input(ingame_name, FORM_FIELD_MAX),
            steamid64: sanitize_form_input(steamid64, FORM_FIELD_MAX),
            battalion: sanitize_form_input(battalion, FORM_FIELD_MAX),
            roles: sanitize_form_input(roles, FORM_ROLES_MAX),
        }
    }

    fn answer(&self, id: &str) -> &str {
        match id {
            "ingame_name" => &self.ingame_name,
            "steamid64" => &self.steamid64,
            "battalion" => &self.battalion,
            "roles" => &self.roles,
            _ => "",
        }
    }

    /// From submitted `(input id, value)` pairs; missing inputs are blank
    pub fn from_inputs(inputs: &[(String, String)]) -> Self {
        let get = |id: &str| {
            inputs
                .iter()
                .find(|(input, _)| input == id)
                .map(|(_, value)| value.as_str())
                .unwrap_or("")
        };
        Self::new(get("ingame_name"), get("steamid64"), get("battalion"), get("roles"))
    }

    /// Recover answers from a details embed's `(label, value)` fields
    pub fn from_embed_fields(config: &GuildConfig, fields: &[(String, String)]) -> Self {
        let get = |field: &FormField| {
            let label = label(config, field);
            fields
                .iter()
                .find(|(name, _)| *name == label)
                .map(|(_, value)| value.as_str())
                .filter(|value| *value != NO_ANSWER)
                .unwrap_or("")
                .to_string()
        };
        let [ingame, steam, battalion, roles] = &FORM_FIELDS;
        Self::new(&get(ingame), &get(steam), &get(battalion), &get(roles))
    }

    /// `(label, answer, inline)` rows for the details embed
    pub fn fields(&self, config: &GuildConfig) -> Vec<(String, String, bool)> {
        FORM_FIELDS
            .iter()
            .map(|field| {
                let answer = self.answer(field.id);
                let answer = if answer.is_empty() { NO_ANSWER } else { answer };
                (label(config, field), answer.to_string(), false)
            })
            .collect()
    }
}

/// The role request modal, optionally pre-filled for an edit
pub fn role_request_modal(
    config: &GuildConfig,
    custom_id: String,
    prefill: Option<&RoleRequestForm>,
) -> serenity::CreateModal {
    let rows = FORM_FIELDS
        .iter()
        .map(|field| {
            let style = if field.paragraph {
                serenity::InputTextStyle::Paragraph
            } else {
                serenity::InputTextStyle::Short
            };
            let mut input = serenity::CreateInputText::new(
                style,
                truncate_chars(&label(config, field), MODAL_LABEL_MAX),
                field.id,
            )
            .placeholder(field.placeholder)
            .max_length(field.max as u16)
            .required(true);
            if let Some(answer) = prefill.map(|form| form.answer(field.id)).filter(|a| !a.is_empty()) {
                input = input.value(answer);
            }
            serenity::CreateActionRow::InputText(input)
        })
        .collect();

    serenity::CreateModal::new(custom_id, "Role Request Form").components(rows)
}

/// `(input id, value)` pairs from a submitted modal
pub fn modal_inputs(rows: &[serenity::ActionRow]) -> Vec<(String, String)> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) => Some((
                input.custom_id.clone(),
                input.value.clone().unwrap_or_default(),
            )),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_from_inputs_sanitises() {
        let form = RoleRequestForm::from_inputs(&inputs(&[
            ("ingame_name", " Nova\nPVT Red "),
            ("steamid64", "76561198894758216"),
            ("roles", &"r".repeat(600)),
        ]));
        assert_eq!(form.ingame_name, "Nova PVT Red");
        assert_eq!(form.steamid64, "76561198894758216");
        assert_eq!(form.battalion, "");
        assert_eq!(form.roles.len(), FORM_ROLES_MAX);
    }

    #[test]
    fn test_fields_use_configured_labels() {
        let form = RoleRequestForm::new("Red", "7656", "", "Trooper");
        let fields = form.fields(&GuildConfig::defaults());
        assert_eq!(
            fields[0],
            ("What is your In-Game Name?".to_string(), "Red".to_string(), false)
        );
        assert_eq!(fields[2].1, "N/A");
        assert_eq!(fields[3].0, "List all the roles you are requesting:");
    }

    #[test]
    fn test_labels_fall_back_when_missing() {
        let config = GuildConfig::from_value(json!({ "MODAL_LABELS": { "roles": "  " } })).unwrap();
        let fields = RoleRequestForm::default().fields(&config);
        let labels: Vec<&str> = fields.iter().map(|(label, _, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["In-Game Name", "SteamID64", "Battalion", "Roles"]);
    }

    #[test]
    fn test_edit_recovers_answers_from_details_embed() {
        let config = GuildConfig::defaults();
        let original = RoleRequestForm::new("Red", "7656", "Nova", "Trooper, Medic");
        let embed_fields: Vec<(String, String)> = original
            .fields(&config)
            .into_iter()
            .map(|(name, value, _)| (name, value))
            .collect();
        assert_eq!(RoleRequestForm::from_embed_fields(&config, &embed_fields), original);

        let partial = RoleRequestForm::new("Red", "", "Nova", "");
        let embed_fields: Vec<(String, String)> = partial
            .fields(&config)
            .into_iter()
            .map(|(name, value, _)| (name, value))
            .collect();
        assert_eq!(RoleRequestForm::from_embed_fields(&config, &embed_fields), partial);
    }
}
