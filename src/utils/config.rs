// Centralized constants for RedTickets

use std::time::Duration;

/// Database file used when neither `--database` nor `DATABASE_PATH` is given
pub const DEFAULT_DATABASE_PATH: &str = "data/RedTickets.db";

/// Counter scope used when an interaction carries no guild
pub const GLOBAL_SCOPE: &str = "global";

/// Minimum gap between two ticket openings of the same kind by one user
pub const TICKET_COOLDOWN: Duration = Duration::from_secs(5);

/// Seconds before a closed ticket channel is deleted, unless configured
pub const DEFAULT_DELETION_DELAY_SECS: u64 = 5;

/// Discord channel names are capped well below this, keep room for the number
pub const MAX_CHANNEL_NAME_LEN: usize = 90;

/// Role-request form field limits
pub const FORM_FIELD_MAX: usize = 100;
pub const FORM_ROLES_MAX: usize = 500;

/// Discord embed colors
pub mod colors {
    pub const INFO: u32 = 0x0099ff;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const TICKET: u32 = 0x940000;
}

/// Parse a configured color such as `#940000` or `08aad1`
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    u32::from_str_radix(hex, 16).ok().filter(|c| *c <= 0xffffff)
}
