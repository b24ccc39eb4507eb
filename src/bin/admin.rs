//! CLI administration tool for shortlinks.
//!
//! Manages links, their history and click counters directly against the
//! store, without an HTTP layer.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (prompts for the acting user if --user is omitted)
//! cargo run --bin admin -- --user alice@example.com create docs https://docs.rs
//!
//! # Point it elsewhere and look at the history
//! cargo run --bin admin -- --user alice@example.com update docs https://docs.rs/tokio
//! cargo run --bin admin -- history docs
//!
//! # Listings and search
//! cargo run --bin admin -- --user alice@example.com list --sort destination --scope all
//! cargo run --bin admin -- search tokio
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Try a single command without PostgreSQL or Redis; the store starts
//! # empty and is discarded when the process exits
//! cargo run --bin admin -- --memory --user demo create docs https://docs.rs
//! ```
//!
//! # Environment Variables
//!
//! See [`shortlinks::config`]. `--memory` needs none.

use shortlinks::application::services::SearchIndexer;
use shortlinks::config::load_from_env;
use shortlinks::domain::entities::{CurrentUser, ShortLink};
use shortlinks::domain::repositories::{
    ClickStatsRepository, LinkRepository, SiteConfigRepository, VersionRepository,
};
use shortlinks::dto::{DEFAULT_PAGE_SIZE, ListParams};
use shortlinks::infrastructure::memory::MemoryStore;
use shortlinks::infrastructure::search::MemorySearchIndex;
use shortlinks::runtime::{Runtime, init_tracing};
use shortlinks::state::{AppState, MemoryAppState};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlinks.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Acting user's email; prompted for when a command needs it
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Use an in-memory store and search index that live for this one command
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a shortlink
    Create {
        name: String,
        destination: String,

        /// Owner (defaults to the acting user)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Point a shortlink at a new destination
    Update { name: String, destination: String },

    /// Hand a shortlink over to another owner
    Transfer {
        name: String,
        new_owner: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Count a click and print the destination
    Click { name: String },

    /// Delete a shortlink with its history and click counter
    Delete {
        name: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show one shortlink
    Show {
        name: String,

        /// Print the serialized view
        #[arg(long)]
        json: bool,
    },

    /// Show previous states of a shortlink, newest first
    History {
        #[arg(required_unless_present = "by", conflicts_with = "by")]
        name: Option<String>,

        /// Show every version recorded for links created by this user instead
        #[arg(long)]
        by: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the click counter of a shortlink
    Clicks {
        #[arg(required_unless_present = "key", conflicts_with = "key")]
        name: Option<String>,

        /// Look the counter up by its external key instead
        #[arg(long)]
        key: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Print every shortlink as JSON, one view per line
    Export {
        /// `name` or `destination`
        #[arg(long, default_value = "name")]
        sort: String,
    },

    /// List shortlinks page by page
    List {
        /// Zero-based page number
        #[arg(short, long, default_value_t = 0)]
        page: i64,

        /// `name` or `destination`
        #[arg(long, default_value = "name")]
        sort: String,

        /// `mine` or `all`
        #[arg(long, default_value = "mine")]
        scope: String,

        #[arg(long)]
        page_size: Option<i64>,
    },

    /// Search names and destinations
    Search {
        query: String,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show statistics
    Stats,

    /// Site configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Store the site domain and administrator list
    Set {
        domain: String,

        /// Comma-separated administrator emails
        #[arg(long)]
        admins: Option<String>,
    },

    Show,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.memory {
        init_tracing("warn", "text");
        let indexer = Arc::new(SearchIndexer::new(Arc::new(MemorySearchIndex::new())));
        let state = MemoryAppState::in_memory(Arc::new(MemoryStore::new()), indexer, DEFAULT_PAGE_SIZE);

        if let Commands::Db { .. } = cli.command {
            anyhow::bail!("Database commands are not available with --memory");
        }
        return run(&state, cli.user, cli.command).await;
    }

    let config = load_from_env()?;
    init_tracing("warn", &config.log_format);
    config.print_summary();

    let runtime = Runtime::build(&config).await?;

    let result = match cli.command {
        Commands::Db { action } => handle_db_action(action, &runtime.pool).await,
        command => run(&runtime.state, cli.user, command).await,
    };

    runtime.shutdown().await;
    result
}

/// Dispatches every command that works through the services.
async fn run<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    user: Option<String>,
    command: Commands,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    match command {
        Commands::Create {
            name,
            destination,
            owner,
        } => {
            let user = acting_user(user)?;
            let owner = owner.unwrap_or_else(|| user.clone());
            create_link(state, &name, &user, &owner, &destination).await
        }
        Commands::Update { name, destination } => {
            let user = acting_user(user)?;
            update_link(state, &name, &destination, &user).await
        }
        Commands::Transfer {
            name,
            new_owner,
            yes,
        } => transfer_link(state, &name, &new_owner, yes).await,
        Commands::Click { name } => {
            let link = require_link(state, &name).await?;
            let destination = state.links.click(&link).await;
            println!("{}", destination.bright_green());
            Ok(())
        }
        Commands::Delete { name, yes } => delete_link(state, &name, yes).await,
        Commands::Show { name, json } => {
            let current = match user {
                Some(email) => Some(state.current_user(&email).await),
                None => None,
            };
            show_link(state, &name, current.as_ref(), json).await
        }
        Commands::History { name, by, json } => match (name, by) {
            (_, Some(creator)) => show_versions_by(state, &creator, json).await,
            (Some(name), None) => show_history(state, &name, json).await,
            (None, None) => anyhow::bail!("Give a link name or --by <user>"),
        },
        Commands::Clicks { name, key, json } => show_clicks(state, name, key, json).await,
        Commands::Export { sort } => {
            let current = match user {
                Some(email) => Some(state.current_user(&email).await),
                None => None,
            };
            export_links(state, &sort, current.as_ref()).await
        }
        Commands::List {
            page,
            sort,
            scope,
            page_size,
        } => {
            let user = acting_user(user)?;
            let current = state.current_user(&user).await;
            let params = ListParams::parse(&sort, &scope);
            list_links(
                state,
                page,
                params,
                &current,
                page_size.unwrap_or(state.page_size),
            )
            .await
        }
        Commands::Search { query, limit } => search_links(state, &query, limit).await,
        Commands::Stats => handle_stats(state).await,
        Commands::Config { action } => handle_config_action(state, action).await,
        Commands::Db { .. } => anyhow::bail!("Database commands need a database connection"),
    }
}

/// Returns `--user`, or asks for it.
fn acting_user(user: Option<String>) -> Result<String> {
    match user {
        Some(u) if !u.trim().is_empty() => Ok(u),
        _ => Ok(Input::new().with_prompt("Your email").interact_text()?),
    }
}

async fn require_link<L, V, C, S>(state: &AppState<L, V, C, S>, name: &str) -> Result<ShortLink>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    state
        .links
        .get_by_name(name)
        .await
        .with_context(|| format!("Shortlink '{}' not found", name))
}

async fn create_link<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: &str,
    user: &str,
    owner: &str,
    destination: &str,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let created = state
        .links
        .create_shortlink(name, user, owner, destination)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create shortlink: {}", e))?;

    match created {
        Some(link) => {
            println!("{}", "✅ Shortlink created".green().bold());
            println!("  {} → {}", link.name.cyan(), link.destination.bright_white());
            println!("  Link id: {}", link.link_id.bright_black());
        }
        None => {
            println!(
                "{}",
                format!("⚠️  The name '{}' is already taken", name).yellow()
            );
        }
    }

    Ok(())
}

async fn update_link<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: &str,
    destination: &str,
    user: &str,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let mut link = require_link(state, name).await?;
    let previous = link.destination.clone();

    let rejected = state
        .links
        .update_link(&mut link, destination, user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update shortlink: {}", e))?;

    if let Some(result) = rejected {
        println!(
            "{}",
            format!("❌ {} ({})", result.message, result.code).red()
        );
        return Ok(());
    }

    println!("{}", "✅ Shortlink updated".green().bold());
    println!("  {} {}", "was:".bright_black(), previous.bright_black());
    println!("  {} {}", "now:".bright_white(), link.destination.bright_white());
    Ok(())
}

async fn transfer_link<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: &str,
    new_owner: &str,
    skip_confirm: bool,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let mut link = require_link(state, name).await?;

    println!("  Link:      {}", link.name.cyan());
    println!("  Owner:     {}", link.owner.bright_white());
    println!("  New owner: {}", new_owner.bright_yellow());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Transfer this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let rejected = state
        .links
        .transfer_ownership(&mut link, new_owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to transfer shortlink: {}", e))?;

    match rejected {
        Some(result) => println!("{}", format!("❌ {} ({})", result.message, result.code).red()),
        None => println!("{}", "✅ Ownership transferred".green().bold()),
    }
    Ok(())
}

async fn delete_link<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: &str,
    skip_confirm: bool,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let link = require_link(state, name).await?;
    let versions = state.links.history(&link).await.len();
    let clicks = state.links.clicks(&link).await;

    println!("  Link:     {}", link.name.cyan());
    println!("  Versions: {}", versions.to_string().bright_white());
    println!("  Clicks:   {}", clicks.to_string().bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link and its history?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = state
        .links
        .delete_link(&link)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete shortlink: {}", e))?;

    if deleted {
        println!("{}", "✅ Shortlink deleted".green().bold());
    } else {
        println!("{}", "⚠️  Shortlink was already gone".yellow());
    }
    Ok(())
}

async fn show_link<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: &str,
    user: Option<&CurrentUser>,
    json: bool,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let link = require_link(state, name).await?;
    let view = state.queries.link_view(&link, user).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", format!("🔗 {}", view.name).bright_blue().bold());
    println!();
    println!("  Destination: {}", view.destination.bright_white());
    println!("  Owner:       {}", view.owner.cyan());
    println!("  Created by:  {}", view.created_by);
    println!("  Modified by: {}", view.modified_by);
    println!("  Clicks:      {}", view.clicks.to_string().bright_green().bold());
    println!("  Editable:    {}", if view.editable { "yes".green() } else { "no".red() });
    println!(
        "  Key:         {}",
        view.meta.id.unwrap_or_default().bright_black()
    );
    println!();
    Ok(())
}

async fn show_history<L, V, C, S>(state: &AppState<L, V, C, S>, name: &str, json: bool) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let link = require_link(state, name).await?;
    let versions = state.links.history(&link).await;

    let mut views = Vec::with_capacity(versions.len());
    for version in &versions {
        views.push(state.queries.version_view(version).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("{}", format!("📜 History of {}", link.name).bright_blue().bold());
    println!();

    if versions.is_empty() {
        println!("{}", "  No previous versions".yellow());
        return Ok(());
    }

    println!(
        "  {:<20} {:<40} {:<25}",
        "Recorded".bright_white().bold(),
        "Destination".bright_white().bold(),
        "Owner".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    for version in &versions {
        println!(
            "  {:<20} {:<40} {}",
            version
                .created
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            version.destination,
            version.owner.cyan()
        );
    }
    println!();
    Ok(())
}

async fn show_versions_by<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    creator: &str,
    json: bool,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let versions = state.queries.versions_created_by(creator).await;

    if json {
        let mut views = Vec::with_capacity(versions.len());
        for version in &versions {
            views.push(state.queries.version_view(version).await);
        }
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("📜 Versions of links created by {}", creator).bright_blue().bold()
    );
    println!();

    if versions.is_empty() {
        println!("{}", "  No versions recorded".yellow());
        return Ok(());
    }

    for version in &versions {
        println!(
            "  {:<20} {:<40} {}",
            version
                .created
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            version.destination,
            version.link_id.bright_black()
        );
    }
    println!();
    Ok(())
}

async fn show_clicks<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    name: Option<String>,
    key: Option<String>,
    json: bool,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let view = match (name, key) {
        (_, Some(key)) => state.queries.click_stats_by_key(&key).await,
        (Some(name), None) => {
            let link = require_link(state, &name).await?;
            state.queries.click_stats_for(&link).await
        }
        (None, None) => anyhow::bail!("Give a link name or --key <key>"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        Some(view) => {
            println!("  Link id: {}", view.link_id.bright_black());
            println!("  Clicks:  {}", view.count.to_string().bright_green().bold());
            println!("  Key:     {}", view.meta.id.unwrap_or_default().bright_black());
        }
        None => println!("{}", "  No clicks recorded".yellow()),
    }
    Ok(())
}

async fn export_links<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    sort: &str,
    user: Option<&CurrentUser>,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let params = ListParams::parse(sort, "all");

    for link in state.queries.fetch_all(params.sort).await {
        let view = state.queries.link_view(&link, user).await;
        println!("{}", serde_json::to_string(&view)?);
    }
    Ok(())
}

async fn list_links<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    page: i64,
    params: ListParams,
    user: &CurrentUser,
    page_size: i64,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    let links = state
        .queries
        .fetch_sorted(page, params, Some(user), page_size)
        .await;

    println!(
        "{}",
        format!("📋 Shortlinks (page {}, {:?} by {:?})", page, params.scope, params.sort)
            .bright_blue()
            .bold()
    );
    println!();

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<24} {:<48} {:<8}",
        "Name".bright_white().bold(),
        "Destination".bright_white().bold(),
        "Clicks".bright_white().bold()
    );
    println!("  {}", "─".repeat(82).bright_black());

    for link in &links {
        let view = state.queries.link_view(link, Some(user)).await;
        let name = if view.editable {
            view.name.cyan()
        } else {
            view.name.normal()
        };
        println!(
            "  {:<24} {:<48} {}",
            name,
            view.destination,
            view.clicks.to_string().bright_green()
        );
    }
    println!();
    Ok(())
}

async fn search_links<L, V, C, S>(state: &AppState<L, V, C, S>, query: &str, limit: usize) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    println!("{}", format!("🔍 Searching for '{}'", query).bright_blue());
    println!();

    let hits = state.indexer.search(query, limit).await;
    if hits.is_empty() {
        println!("{}", "  No matches".yellow());
        return Ok(());
    }

    for hit in &hits {
        println!("  {:<24} {}", hit.name.cyan(), hit.destination);
    }
    println!();
    println!("  Matches: {}", hits.len().to_string().bright_white().bold());
    Ok(())
}

/// Displays link totals and search index health.
async fn handle_stats<L, V, C, S>(state: &AppState<L, V, C, S>) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count = state.queries.count_all().await;
    let search = if state.indexer.health_check().await {
        "healthy".green()
    } else {
        "unavailable".red()
    };

    println!(
        "  Links:        {}",
        links_count.to_string().bright_green().bold()
    );
    println!("  Search index: {}", search);
    println!();

    Ok(())
}

async fn handle_config_action<L, V, C, S>(
    state: &AppState<L, V, C, S>,
    action: ConfigAction,
) -> Result<()>
where
    L: LinkRepository,
    V: VersionRepository,
    C: ClickStatsRepository,
    S: SiteConfigRepository,
{
    match action {
        ConfigAction::Set { domain, admins } => {
            let saved = state
                .site_config
                .save(domain, admins)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to save site configuration: {}", e))?;
            println!("{}", "✅ Site configuration saved".green().bold());
            println!("  Domain: {}", saved.domain.cyan());
        }
        ConfigAction::Show => {
            let config = state
                .site_config
                .get()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load site configuration: {}", e))?;

            match config {
                Some(config) => {
                    println!("  Domain: {}", config.domain.cyan());
                    println!(
                        "  Admins: {}",
                        config.admin_users.unwrap_or_default().bright_white()
                    );
                }
                None => println!("{}", "  No site configuration stored".yellow()),
            }
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_versions")
                .fetch_one(pool)
                .await?;
            let clicks: Option<i64> =
                sqlx::query_scalar("SELECT SUM(count)::bigint FROM click_stats")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Versions:   {}", versions.to_string().bright_white());
            println!(
                "  Clicks:     {}",
                clicks.unwrap_or(0).to_string().bright_white()
            );
            println!();
        }
    }

    Ok(())
}
