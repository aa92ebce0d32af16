// Offline management of stored guild configurations

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use serde_json::Value;

use crate::storage::SqliteStore;
use crate::utils::formatters::format_epoch_millis;

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List configured guilds, most recently updated first
    List,

    /// Print a guild's stored configuration
    View {
        /// Guild ID
        guild_id: String,
    },

    /// Write a guild's stored configuration to a file
    Export {
        /// Guild ID
        guild_id: String,

        /// Output file (defaults to config_<guild_id>.json)
        output: Option<PathBuf>,
    },

    /// Replace a guild's stored configuration with a JSON file
    Import {
        /// Guild ID
        guild_id: String,

        /// JSON file to import
        input: PathBuf,
    },
}

/// Run one admin command against the database, printing to `out`
pub fn run(store: &SqliteStore, command: AdminCommand, out: &mut impl Write) -> Result<()> {
    match command {
        AdminCommand::List => list(store, out),
        AdminCommand::View { guild_id } => view(store, &guild_id, out),
        AdminCommand::Export { guild_id, output } => {
            let output = output.unwrap_or_else(|| default_export_path(&guild_id));
            export(store, &guild_id, &output, out)
        }
        AdminCommand::Import { guild_id, input } => import(store, &guild_id, &input, out),
    }
}

pub fn default_export_path(guild_id: &str) -> PathBuf {
    PathBuf::from(format!("config_{}.json", guild_id))
}

fn list(store: &SqliteStore, out: &mut impl Write) -> Result<()> {
    let docs = store.list_documents()?;
    writeln!(out, "📋 Configured Servers:")?;
    if docs.is_empty() {
        writeln!(out, "  No servers configured yet.")?;
    }
    for doc in docs {
        writeln!(
            out,
            "  🔹 {} (updated: {})",
            doc.guild_id,
            format_epoch_millis(doc.updated_at)
        )?;
    }
    Ok(())
}

fn view(store: &SqliteStore, guild_id: &str, out: &mut impl Write) -> Result<()> {
    let Some(raw) = store.get_raw_document(guild_id)? else {
        writeln!(out, "❌ No configuration found for guild: {}", guild_id)?;
        writeln!(out, "   This server is using default configuration.")?;
        return Ok(());
    };

    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("stored configuration for {} is not valid JSON", guild_id))?;
    writeln!(out, "📊 Configuration for guild: {}", guild_id)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

fn export(store: &SqliteStore, guild_id: &str, output: &Path, out: &mut impl Write) -> Result<()> {
    let Some(raw) = store.get_raw_document(guild_id)? else {
        bail!("No configuration found for guild: {}", guild_id);
    };

    std::fs::write(output, raw)
        .with_context(|| format!("failed to write {}", output.display()))?;
    writeln!(out, "✅ Configuration exported to: {}", output.display())?;
    Ok(())
}

fn import(store: &SqliteStore, guild_id: &str, input: &Path, out: &mut impl Write) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    store
        .put_raw_document(guild_id, &json)
        .with_context(|| format!("invalid JSON in {}", input.display()))?;
    writeln!(out, "✅ Configuration imported for guild: {}", guild_id)?;
    Ok(())
}
