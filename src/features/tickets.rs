// Ticket naming, numbering and channel setup helpers

use poise::serenity_prelude as serenity;

use crate::models::guild::{keys, ConfigValue, GuildConfig};
use crate::services::CounterService;
use crate::storage::{Store, StoreError};
use crate::utils::config::{DEFAULT_DELETION_DELAY_SECS, GLOBAL_SCOPE, MAX_CHANNEL_NAME_LEN};
use crate::utils::formatters::{render_placeholders, role_mention, truncate_chars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Support,
    RoleRequest,
}

impl TicketKind {
    /// Counter key numbering this kind of ticket
    pub fn counter_key(self) -> &'static str {
        match self {
            TicketKind::Support => "support_ticket",
            TicketKind::RoleRequest => "role_request",
        }
    }

    /// Cooldown action name
    pub fn action(self) -> &'static str {
        match self {
            TicketKind::Support => "open_support",
            TicketKind::RoleRequest => "open_role",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TicketKind::Support => "support",
            TicketKind::RoleRequest => "role",
        }
    }

    pub fn category_key(self) -> &'static str {
        match self {
            TicketKind::Support => keys::SUPPORT_TICKET_CATEGORY_ID,
            TicketKind::RoleRequest => keys::ROLE_TICKET_CATEGORY_ID,
        }
    }

    pub fn embed_key(self) -> &'static str {
        match self {
            TicketKind::Support => keys::SUPPORT_TICKET_EMBED,
            TicketKind::RoleRequest => keys::ROLE_REQUEST_EMBED,
        }
    }

    fn initial_message_key(self) -> &'static str {
        match self {
            TicketKind::Support => keys::SUPPORT_INITIAL_MESSAGE,
            TicketKind::RoleRequest => keys::ROLE_REQUEST_INITIAL_MESSAGE,
        }
    }
}

/// Lowercase, anything outside `[a-z0-9-]` becomes `-`
fn clean_channel_chars(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' { c } else { '-' })
        .collect()
}

/// `support`, or the battalion for role requests (`role` when blank)
pub fn ticket_prefix(kind: TicketKind, battalion: Option<&str>) -> &str {
    match (kind, battalion.map(str::trim)) {
        (TicketKind::RoleRequest, Some(b)) if !b.is_empty() => b,
        _ => kind.label(),
    }
}

/// Channel name for ticket `number`, e.g. `support--7` from `support-#7`.
///
/// Only the prefix is shortened to fit, the number always survives.
pub fn ticket_channel_name(kind: TicketKind, number: u64, battalion: Option<&str>) -> String {
    let suffix = clean_channel_chars(&format!("-#{}", number));
    let room = MAX_CHANNEL_NAME_LEN.saturating_sub(suffix.len());
    let prefix = truncate_chars(&clean_channel_chars(ticket_prefix(kind, battalion)), room);
    format!("{}{}", prefix, suffix)
}

/// Ticket number from a channel name ending in `-12` or `-#12`
pub fn extract_ticket_number(name: &str) -> Option<u64> {
    let (_, tail) = name.rsplit_once('-')?;
    let digits = tail.strip_prefix('#').unwrap_or(tail);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Number and name a new ticket.
///
/// Counter failures are returned as-is; callers must not open a ticket
/// without a number.
pub async fn allocate_ticket_name<S: Store>(
    counters: &CounterService<S>,
    guild_id: Option<&str>,
    kind: TicketKind,
    battalion: Option<&str>,
) -> Result<(u64, String), StoreError> {
    let scope = guild_id.unwrap_or(GLOBAL_SCOPE);
    let number = counters.next(scope, kind.counter_key()).await?;
    Ok((number, ticket_channel_name(kind, number, battalion)))
}

/// Category for new tickets of `kind`, falling back to `ticketCategoryId`
pub fn category_for(config: &GuildConfig, kind: TicketKind) -> Option<&str> {
    config
        .str_field(kind.category_key())
        .or_else(|| config.str_field(keys::TICKET_CATEGORY_ID))
}

/// Roles with access to tickets of `kind`
pub fn support_role_ids(config: &GuildConfig, kind: TicketKind) -> Vec<String> {
    let mut ids: Vec<String> = config
        .str_field(keys::SUPPORT_ROLE_ID)
        .map(|id| vec![id.to_string()])
        .unwrap_or_default();
    if kind == TicketKind::RoleRequest {
        for id in config.id_list(keys::ROLE_REQUEST_SUPPORT_ROLE_IDS) {
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

/// Message posted when a ticket opens, with `{user}` and `{moderators}` filled in
pub fn initial_message(config: &GuildConfig, kind: TicketKind, user_mention: &str) -> String {
    let roles = support_role_ids(config, kind);
    let moderators = if roles.is_empty() {
        "moderators".to_string()
    } else {
        roles.iter().map(|id| role_mention(id)).collect::<Vec<_>>().join(" ")
    };

    let template = config.str_field(kind.initial_message_key()).unwrap_or("");
    let rendered = render_placeholders(template, &[("user", user_mention), ("moderators", &moderators)]);
    let rendered = rendered.trim();
    if rendered.is_empty() {
        format!("{} {}", moderators, user_mention)
    } else {
        rendered.to_string()
    }
}

/// Seconds to wait before deleting a closed ticket, rounded to whole seconds
pub fn deletion_delay(config: &GuildConfig) -> u64 {
    config
        .get(keys::DELETION_DELAY_SECONDS)
        .and_then(ConfigValue::as_f64)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u64)
        .unwrap_or(DEFAULT_DELETION_DELAY_SECS)
}

/// Kind and number of the ticket living in a channel, `None` when the
/// channel is not under a ticket category or its name carries no number
pub fn classify_ticket(
    config: &GuildConfig,
    channel_name: &str,
    parent: Option<u64>,
) -> Option<(TicketKind, u64)> {
    let parent = parent?;
    let number = extract_ticket_number(channel_name)?;
    [TicketKind::Support, TicketKind::RoleRequest]
        .into_iter()
        .find(|kind| category_for(config, *kind).and_then(parse_snowflake) == Some(parent))
        .map(|kind| (kind, number))
}

/// Single-line form answer: control whitespace flattened, capped, trimmed
pub fn sanitize_form_input(input: &str, max: usize) -> String {
    let flat: String = input
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect();
    truncate_chars(&flat, max).trim().to_string()
}

/// Overwrites for a new ticket channel: hidden from everyone, visible to
/// the opener, the bot and support roles
pub fn ticket_overwrites(
    guild_id: serenity::GuildId,
    opener: serenity::UserId,
    bot: serenity::UserId,
    support_roles: &[String],
) -> Vec<serenity::PermissionOverwrite> {
    let access = serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY;

    let mut overwrites = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
            // @everyone shares the guild's id
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
        },
        serenity::PermissionOverwrite {
            allow: access,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(opener),
        },
        serenity::PermissionOverwrite {
            allow: access | serenity::Permissions::MANAGE_CHANNELS,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(bot),
        },
    ];

    for role in support_roles.iter().filter_map(|id| parse_snowflake(id)) {
        overwrites.push(serenity::PermissionOverwrite {
            allow: access,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(role)),
        });
    }

    overwrites
}

/// Member the ticket was opened for, read back from the channel overwrites
pub fn ticket_opener(
    overwrites: &[serenity::PermissionOverwrite],
    bot: serenity::UserId,
) -> Option<serenity::UserId> {
    overwrites.iter().find_map(|overwrite| match overwrite.kind {
        serenity::PermissionOverwriteType::Member(id)
            if id != bot && overwrite.allow.contains(serenity::Permissions::VIEW_CHANNEL) =>
        {
            Some(id)
        }
        _ => None,
    })
}

/// Non-zero Discord id from its decimal form
pub fn parse_snowflake(id: &str) -> Option<u64> {
    id.trim().parse::<u64>().ok().filter(|n| *n != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use crate::utils::config::FORM_FIELD_MAX;
    use serde_json::json;
    use std::sync::Arc;

    fn config(value: serde_json::Value) -> GuildConfig {
        let overrides = GuildConfig::from_value(value).unwrap();
        GuildConfig::from_map(crate::utils::merge::deep_merge(
            GuildConfig::defaults().as_map(),
            overrides.as_map(),
        ))
    }

    #[test]
    fn test_ticket_names() {
        assert_eq!(ticket_channel_name(TicketKind::Support, 7, None), "support--7");
        assert_eq!(ticket_channel_name(TicketKind::Support, 7, Some("Nova")), "support--7");
        assert_eq!(ticket_channel_name(TicketKind::RoleRequest, 3, Some("Nova")), "nova--3");
        assert_eq!(ticket_channel_name(TicketKind::RoleRequest, 3, Some("  ")), "role--3");
        assert_eq!(ticket_channel_name(TicketKind::RoleRequest, 3, None), "role--3");
        assert_eq!(ticket_prefix(TicketKind::RoleRequest, Some(" 501st ")), "501st");
    }

    #[test]
    fn test_long_battalion_keeps_ticket_number() {
        let battalion = sanitize_form_input(&"b".repeat(120), FORM_FIELD_MAX);
        assert_eq!(battalion.len(), FORM_FIELD_MAX);

        let first = ticket_channel_name(TicketKind::RoleRequest, 1, Some(&battalion));
        let second = ticket_channel_name(TicketKind::RoleRequest, 12345, Some(&battalion));
        assert_eq!(first.len(), MAX_CHANNEL_NAME_LEN);
        assert_eq!(second.len(), MAX_CHANNEL_NAME_LEN);
        assert_ne!(first, second);
        assert_eq!(extract_ticket_number(&first), Some(1));
        assert_eq!(extract_ticket_number(&second), Some(12345));
    }

    #[tokio::test]
    async fn test_allocated_names_stay_unique_for_long_battalions() {
        let counters = CounterService::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
        let battalion = sanitize_form_input(&"b".repeat(120), FORM_FIELD_MAX);
        let (n1, name1) = allocate_ticket_name(&counters, Some("1"), TicketKind::RoleRequest, Some(&battalion))
            .await
            .unwrap();
        let (n2, name2) = allocate_ticket_name(&counters, Some("1"), TicketKind::RoleRequest, Some(&battalion))
            .await
            .unwrap();

        assert_ne!(name1, name2);
        assert_eq!(extract_ticket_number(&name1), Some(n1));
        assert_eq!(extract_ticket_number(&name2), Some(n2));
    }

    #[test]
    fn test_classify_ticket() {
        let cfg = config(json!({ "supportTicketCategoryId": "10", "roleTicketCategoryId": "20" }));
        assert_eq!(classify_ticket(&cfg, "support--4", Some(10)), Some((TicketKind::Support, 4)));
        assert_eq!(classify_ticket(&cfg, "nova--9", Some(20)), Some((TicketKind::RoleRequest, 9)));
        assert_eq!(classify_ticket(&cfg, "general", Some(10)), None);
        assert_eq!(classify_ticket(&cfg, "support--4", Some(30)), None);
        assert_eq!(classify_ticket(&cfg, "support--4", None), None);
    }

    #[test]
    fn test_channel_chars_cleaned() {
        assert_eq!(clean_channel_chars("Nova-#3"), "nova--3");
        assert_eq!(clean_channel_chars("501st Legion!"), "501st-legion-");
        assert_eq!(
            ticket_channel_name(TicketKind::RoleRequest, 3, Some("501st Legion!")),
            "501st-legion---3"
        );
    }

    #[test]
    fn test_extract_ticket_number() {
        assert_eq!(extract_ticket_number("support-#12"), Some(12));
        assert_eq!(extract_ticket_number("support--12"), Some(12));
        assert_eq!(extract_ticket_number("support-123"), Some(123));
        assert_eq!(extract_ticket_number("general"), None);
        assert_eq!(extract_ticket_number("support-abc"), None);
        assert_eq!(extract_ticket_number("support-"), None);
    }

    #[tokio::test]
    async fn test_allocate_ticket_name_numbers_per_kind() {
        let counters = CounterService::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
        let first = allocate_ticket_name(&counters, Some("1"), TicketKind::Support, None).await;
        let second = allocate_ticket_name(&counters, Some("1"), TicketKind::Support, None).await;
        let role = allocate_ticket_name(&counters, Some("1"), TicketKind::RoleRequest, Some("Nova")).await;
        let global = allocate_ticket_name(&counters, None, TicketKind::Support, None).await;

        assert_eq!(first.unwrap(), (1, "support--1".to_string()));
        assert_eq!(second.unwrap(), (2, "support--2".to_string()));
        assert_eq!(role.unwrap(), (1, "nova--1".to_string()));
        assert_eq!(global.unwrap(), (1, "support--1".to_string()));
    }

    #[tokio::test]
    async fn test_allocate_ticket_name_propagates_failure() {
        use crate::services::test_support::FlakyStore;

        let store = Arc::new(FlakyStore::new());
        FlakyStore::set(&store.fail_writes, true);
        let counters = CounterService::new(store);
        assert!(allocate_ticket_name(&counters, Some("1"), TicketKind::Support, None)
            .await
            .is_err());
    }

    #[test]
    fn test_category_fallback() {
        let cfg = config(json!({ "ticketCategoryId": "10", "roleTicketCategoryId": "20" }));
        assert_eq!(category_for(&cfg, TicketKind::RoleRequest), Some("20"));
        assert_eq!(category_for(&cfg, TicketKind::Support), Some("10"));

        let cfg = config(json!({ "ticketCategoryId": "", "supportTicketCategoryId": "" }));
        assert_eq!(category_for(&cfg, TicketKind::Support), None);
    }

    #[test]
    fn test_initial_message() {
        let cfg = config(json!({ "supportRoleId": "5" }));
        assert_eq!(
            initial_message(&cfg, TicketKind::Support, "<@1>"),
            "<@&5> <@1> has opened a support ticket."
        );

        let cfg = config(json!({ "supportInitialMessage": "   " }));
        assert_eq!(initial_message(&cfg, TicketKind::Support, "<@1>"), "moderators <@1>");

        let cfg = config(json!({ "supportRoleId": "5", "roleRequestSupportRoleIds": ["6", "5"] }));
        assert_eq!(
            initial_message(&cfg, TicketKind::RoleRequest, "<@1>"),
            "<@1> has created a new role request ticket."
        );
        assert_eq!(support_role_ids(&cfg, TicketKind::RoleRequest), vec!["5", "6"]);
        assert_eq!(support_role_ids(&cfg, TicketKind::Support), vec!["5"]);
    }

    #[test]
    fn test_deletion_delay() {
        assert_eq!(deletion_delay(&GuildConfig::defaults()), 5);
        assert_eq!(deletion_delay(&config(json!({ "deletionDelaySeconds": 30 }))), 30);
        assert_eq!(deletion_delay(&config(json!({ "deletionDelaySeconds": "soon" }))), 5);
        assert_eq!(deletion_delay(&config(json!({ "deletionDelaySeconds": -1 }))), 5);
        assert_eq!(deletion_delay(&config(json!({ "deletionDelaySeconds": 2.5 }))), 3);
        assert_eq!(deletion_delay(&config(json!({ "deletionDelaySeconds": 0.2 }))), 0);
    }

    #[test]
    fn test_sanitize_form_input() {
        assert_eq!(sanitize_form_input("  Nova\nPVT\tRed  ", 100), "Nova PVT Red");
        assert_eq!(sanitize_form_input("abcdef", 3), "abc");
    }

    #[test]
    fn test_overwrites() {
        let guild = serenity::GuildId::new(100);
        let user = serenity::UserId::new(200);
        let bot = serenity::UserId::new(999);
        let overwrites = ticket_overwrites(guild, user, bot, &["300".to_string(), "bad".to_string()]);
        assert_eq!(overwrites.len(), 4);
        assert!(matches!(
            overwrites[0].kind,
            serenity::PermissionOverwriteType::Role(id) if id.get() == 100
        ));
        assert!(overwrites[0].deny.contains(serenity::Permissions::VIEW_CHANNEL));
        assert!(matches!(
            overwrites[1].kind,
            serenity::PermissionOverwriteType::Member(id) if id == user
        ));
        assert!(matches!(
            overwrites[2].kind,
            serenity::PermissionOverwriteType::Member(id) if id == bot
        ));
        assert!(overwrites[3].allow.contains(serenity::Permissions::SEND_MESSAGES));

        assert_eq!(ticket_opener(&overwrites, bot), Some(user));
        assert_eq!(ticket_opener(&overwrites[2..], bot), None);
    }

    #[test]
    fn test_parse_snowflake() {
        assert_eq!(parse_snowflake(" 123456789012345678 "), Some(123456789012345678));
        assert_eq!(parse_snowflake("0"), None);
        assert_eq!(parse_snowflake("abc"), None);
    }
}
