// RedTickets - Rust Edition
// A Discord ticket bot with per-guild configuration and ticket numbering

mod admin;
mod commands;
mod features;
mod models;
mod services;
mod storage;
mod utils;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use poise::serenity_prelude as serenity;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::features::cooldown::Cooldowns;
use crate::services::{CounterService, GuildConfigStore};
use crate::storage::SqliteStore;
use crate::utils::config::{DEFAULT_DATABASE_PATH, TICKET_COOLDOWN};

#[derive(Parser)]
#[command(name = "redtickets", about = "Discord ticket bot", version)]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or edit stored guild configurations without starting the bot
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommand,
    },
}

/// User data shared across all commands
pub struct Data {
    pub configs: GuildConfigStore<SqliteStore>,
    pub counters: CounterService<SqliteStore>,
    pub cooldowns: Cooldowns,
}

// Manual Debug impl since the services wrap a database connection
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("configs", &"GuildConfigStore<SqliteStore>")
            .field("counters", &"CounterService<SqliteStore>")
            .field("cooldowns", &self.cooldowns.len())
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::config::config(),
        commands::panels::setup_panels(),
        commands::ticket::ticket(),
    ]
}

fn database_path(cli: &Cli) -> PathBuf {
    cli.database
        .clone()
        .or_else(|| env::var("DATABASE_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "redtickets=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let db_path = database_path(&cli);

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    match cli.command {
        Some(Command::Admin { command }) => {
            admin::run(&store, command, &mut std::io::stdout().lock())
        }
        None => run_bot(store).await,
    }
}

async fn run_bot(store: SqliteStore) -> anyhow::Result<()> {
    let token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;
    let dev_guild = match env::var("GUILD_ID") {
        Ok(id) => Some(
            id.trim()
                .parse::<u64>()
                .map(serenity::GuildId::new)
                .context("GUILD_ID must be a numeric guild id")?,
        ),
        Err(_) => None,
    };

    info!("Starting RedTickets (Rust Edition)...");

    let store = Arc::new(store);
    let data = Data {
        configs: GuildConfigStore::new(Arc::clone(&store)),
        counters: CounterService::new(store),
        cooldowns: Cooldowns::new(TICKET_COOLDOWN),
    };

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(features::interactions::handle_event(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx
                                .send(
                                    poise::CreateReply::default()
                                        .content("❌ Something went wrong while handling that command.")
                                        .ephemeral(true),
                                )
                                .await;
                        }
                        err => {
                            if let Err(e) = poise::builtins::on_error(err).await {
                                error!("Error while handling error: {:?}", e);
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}. Registering commands...", ready.user.name);
                match dev_guild {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                            .await?;
                        info!("Commands registered in guild {}", guild_id);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                        info!("Commands registered globally");
                    }
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("failed to create client")?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {:?}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
