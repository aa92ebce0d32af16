// Guild configuration document model
// Matches the JSON stored in the guild_configs table

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Nested mapping of setting names to values
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigMap),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => ConfigValue::Number(n),
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => ConfigValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                ConfigValue::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(b) => Value::Bool(b),
            ConfigValue::Number(n) => Value::Number(n),
            ConfigValue::String(s) => Value::String(s),
            ConfigValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            ConfigValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

/// Setting names used by the bot
pub mod keys {
    pub const SUPPORT_ROLE_ID: &str = "supportRoleId";
    pub const TICKET_CATEGORY_ID: &str = "ticketCategoryId";
    pub const SUPPORT_TICKET_CATEGORY_ID: &str = "supportTicketCategoryId";
    pub const ROLE_TICKET_CATEGORY_ID: &str = "roleTicketCategoryId";
    pub const TICKET_NOTIFICATION_CHANNEL_ID: &str = "ticketNotificationChannelId";
    pub const LOGGING_CHANNEL_ID: &str = "loggingChannelId";
    pub const PANEL_IMAGE_URL: &str = "panelImageUrl";
    pub const ROLE_REQUEST_SUPPORT_ROLE_IDS: &str = "roleRequestSupportRoleIds";
    pub const ROLE_REQUEST_INITIAL_MESSAGE: &str = "roleRequestInitialMessage";
    pub const SUPPORT_INITIAL_MESSAGE: &str = "supportInitialMessage";
    pub const DELETION_DELAY_SECONDS: &str = "deletionDelaySeconds";

    pub const ROLE_REQUEST_EMBED: &str = "roleRequestEmbed";
    pub const SUPPORT_TICKET_EMBED: &str = "supportTicketEmbed";
    pub const MODAL_LABELS: &str = "MODAL_LABELS";
    pub const DELETION_EMBED: &str = "deletionEmbed";
    pub const TICKET_CLOSURE_DM_EMBED: &str = "ticketClosureDmEmbed";
    pub const TICKET_CREATION_NOTIFICATION_EMBED: &str = "ticketCreationNotificationEmbed";
    pub const TICKET_CLOSURE_NOTIFICATION_EMBED: &str = "ticketClosureNotificationEmbed";
}

/// Template every effective guild configuration is merged onto
pub static DEFAULT_CONFIG: Lazy<GuildConfig> = Lazy::new(|| {
    GuildConfig::from_value(json!({
        "supportRoleId": null,
        "ticketCategoryId": null,
        "supportTicketCategoryId": null,
        "roleTicketCategoryId": null,
        "ticketNotificationChannelId": null,
        "loggingChannelId": null,
        "roleRequestSupportRoleIds": [],

        "roleRequestEmbed": {
            "title": "Role Request Ticket",
            "embedColor": "#940000",
            "panelDescription": "Need a role assigned? Click below to create a role request ticket.",
            "openDescription": "Thank you for creating a Role Request. A staff member will assist you shortly.\n\nPlease note this may take up to 24 hours, so please be patient.",
        },

        "supportTicketEmbed": {
            "title": "Support Ticket",
            "embedColor": "#940000",
            "panelDescription": "Do you need help with Discord issues, in-game issues, or maybe you wish to appeal a warning? You are free to make a support ticket and members of the support team might be able to assist you.",
            "openDescription": "Thank you for contacting support. A member of our support team will be with you shortly.\n\nPlease describe your issue in detail so we can assist you as quickly as possible.",
        },

        "panelImageUrl": null,
        "roleRequestInitialMessage": "{user} has created a new role request ticket.",
        "supportInitialMessage": "{moderators} {user} has opened a support ticket.",

        "MODAL_LABELS": {
            "ingame_name": "What is your In-Game Name?",
            "steamid64": "What is your SteamID64?",
            "battalion": "What battalion/Spec are you requesting for?",
            "roles": "List all the roles you are requesting:",
        },

        "deletionEmbed": {
            "title": "Ticket Closing",
            "description": "Closing this ticket in {delay} seconds...",
            "embedColor": "#940000",
        },

        "deletionDelaySeconds": 5,

        "ticketClosureDmEmbed": {
            "title": "Your ticket has been Closed",
            "description": "If you require further assistance, feel free to open a new ticket at any time.",
            "embedColor": "#FF0000",
            "fields": [
                { "name": "Ticket", "value": "``{ticketName}``", "inline": true },
                { "name": "Created at", "value": "{createdAt}", "inline": true },
                { "name": "Closed at", "value": "{closedAt}", "inline": true },
                { "name": "Closed by", "value": "{closedBy}", "inline": false },
            ],
        },

        "ticketCreationNotificationEmbed": {
            "title": "Ticket Created",
            "description": "{user} has created a ticket.",
            "embedColor": "#08aad1",
            "fields": [
                { "name": "Ticket", "value": "#{ticketNumber}", "inline": true },
            ],
        },

        "ticketClosureNotificationEmbed": {
            "title": "Ticket Closed",
            "description": "{closedBy} has closed a ticket.",
            "embedColor": "#067894",
            "fields": [
                { "name": "Ticket", "value": "#{ticketNumber}", "inline": true },
            ],
        },
    }))
    .expect("default config is an object")
});

/// Effective configuration of one guild
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildConfig(ConfigMap);

impl GuildConfig {
    /// Fresh copy of the default template
    pub fn defaults() -> Self {
        DEFAULT_CONFIG.clone()
    }

    pub fn from_map(map: ConfigMap) -> Self {
        Self(map)
    }

    /// Convert parsed JSON; `None` unless the top level is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match ConfigValue::from(value) {
            ConfigValue::Map(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        ConfigValue::Map(self.0.clone()).into()
    }

    pub fn as_map(&self) -> &ConfigMap {
        &self.0
    }

    pub fn into_map(self) -> ConfigMap {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// String setting; null and blank strings read as unset
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(ConfigValue::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn section(&self, key: &str) -> Option<&ConfigMap> {
        self.get(key).and_then(ConfigValue::as_map)
    }

    /// String field inside a nested section, e.g. `roleRequestEmbed.title`
    pub fn section_str(&self, section: &str, field: &str) -> Option<&str> {
        self.section(section)?.get(field)?.as_str()
    }

    /// List of string ids, skipping anything that is not a string
    pub fn id_list(&self, key: &str) -> Vec<&str> {
        match self.get(key) {
            Some(ConfigValue::List(items)) => items.iter().filter_map(ConfigValue::as_str).collect(),
            _ => Vec::new(),
        }
    }
}
