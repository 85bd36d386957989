//! CLI administration tool for linkshrinker.
//!
//! Drives the registry operations against a JSON snapshot file: every
//! invocation loads the snapshot, runs one command and writes the snapshot
//! back if the command changed anything.
//!
//! # Usage
//!
//! ```bash
//! # Register a URL for 30 minutes with a generated code
//! cargo run --bin admin -- create https://example.com/a --ttl 30
//!
//! # Register with a custom code
//! cargo run --bin admin -- create https://example.com/docs --code docs --ttl 1440
//!
//! # Resolve a code (records a click)
//! cargo run --bin admin -- resolve docs --referrer https://google.com
//!
//! # List live entries, most clicked first
//! cargo run --bin admin -- list --status active --sort most_clicks
//!
//! # Analytics for the last 7 days
//! cargo run --bin admin -- analytics 1 --range 7d
//! ```
//!
//! # Environment Variables
//!
//! See [`linkshrinker::config`]. `SNAPSHOT_PATH` can be overridden with `--snapshot`.

use linkshrinker::application::services::{
    ActivityKind, CategoryCount, CreateShortUrl, ListQuery, Metrics, Outcome, SortOrder,
    StatusFilter, TimeRange, TimeWindow,
};
use linkshrinker::config::load_from_env;
use linkshrinker::domain::clock::{Clock, SystemClock};
use linkshrinker::domain::entities::{ClickContext, Entry, EntryStatus};
use linkshrinker::infrastructure::persistence::Snapshot;
use linkshrinker::logging::init_tracing;
use linkshrinker::state::AppState;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing a linkshrinker registry.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snapshot file (overrides SNAPSHOT_PATH)
    #[arg(short, long, global = true)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new short code
    Create {
        /// Destination URL (http or https)
        url: String,

        /// Custom short code (3-32 chars of A-Z a-z 0-9 _ -)
        #[arg(short, long)]
        code: Option<String>,

        /// Time to live in minutes
        #[arg(short, long, default_value_t = 30)]
        ttl: i64,
    },

    /// Resolve a short code as a visitor would
    Resolve {
        code: String,

        /// User-Agent used to classify device, browser and OS
        #[arg(long)]
        user_agent: Option<String>,

        #[arg(long)]
        referrer: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Stable visitor identifier for unique-visitor counting
        #[arg(long)]
        visitor: Option<String>,
    },

    /// Delete an entry
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Stop an entry from resolving
    Pause { id: i64 },

    /// Let a paused entry resolve again
    Resume { id: i64 },

    /// List entries
    List {
        /// all, active, expired or paused
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// newest, oldest, most_clicks or expiring_soon
        #[arg(long, default_value = "newest")]
        sort: SortOrder,

        /// Substring of the URL or code
        #[arg(long)]
        search: Option<String>,
    },

    /// Show click analytics for an entry
    Analytics {
        id: i64,

        /// 7d, 30d, 90d or 1y
        #[arg(short, long, default_value = "30d")]
        range: TimeRange,
    },

    /// Show registry totals
    Stats,

    /// Show recent activity
    Activity,

    /// Drop the click log of an entry
    Purge {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Log the effective configuration
    Config,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_from_env().context("Invalid configuration")?;
    if let Some(path) = cli.snapshot {
        config.snapshot_path = path;
    }
    init_tracing(&config)?;

    let snapshot = Snapshot::load(&config.snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", config.snapshot_path))?;
    let state = AppState::from_snapshot(&config, snapshot, Arc::new(SystemClock))
        .context("Snapshot is inconsistent")?;

    let changed = match cli.command {
        Commands::Create { url, code, ttl } => create(&state, url, code, ttl)?,
        Commands::Resolve {
            code,
            user_agent,
            referrer,
            country,
            city,
            visitor,
        } => {
            let mut context = user_agent
                .as_deref()
                .map(ClickContext::from_user_agent)
                .unwrap_or_default();
            if let Some(referrer) = referrer {
                context = context.with_referrer(referrer);
            }
            if country.is_some() || city.is_some() {
                context = context.with_location(
                    country.unwrap_or_else(|| "Unknown".to_string()),
                    city.unwrap_or_else(|| "Unknown".to_string()),
                );
            }
            if let Some(visitor) = visitor {
                context = context.with_visitor(visitor);
            }
            resolve(&state, &code, context)?
        }
        Commands::Delete { id, yes } => delete(&state, id, yes)?,
        Commands::Pause { id } => {
            let entry = state.links.pause(id)?;
            println!("{} {}", "⏸️  Paused".yellow().bold(), entry.short_code.cyan());
            true
        }
        Commands::Resume { id } => {
            let entry = state.links.resume(id)?;
            println!("{} {}", "▶️  Resumed".green().bold(), entry.short_code.cyan());
            true
        }
        Commands::List {
            status,
            sort,
            search,
        } => {
            let mut query = ListQuery::new(status, sort);
            if let Some(search) = search {
                query = query.with_search(search);
            }
            list(&state, &query)?;
            false
        }
        Commands::Analytics { id, range } => {
            let metrics = state.analytics.summarize_range(id, range)?;
            print_metrics(&metrics);
            false
        }
        Commands::Stats => {
            stats(&state)?;
            false
        }
        Commands::Activity => {
            activity(&state)?;
            false
        }
        Commands::Purge { id, yes } => purge(&state, id, yes)?,
        Commands::Config => {
            config.print_summary();
            false
        }
    };

    if changed {
        state
            .shutdown()
            .save(&config.snapshot_path)
            .with_context(|| format!("Failed to save snapshot {}", config.snapshot_path))?;
    }

    Ok(())
}

fn create(state: &AppState, url: String, code: Option<String>, ttl: i64) -> Result<bool> {
    let mut request = CreateShortUrl::new(url, ttl);
    if let Some(code) = code {
        request = request.with_custom_code(code);
    }

    let entry = state.create_short_url(request)?;

    println!("{}", "✅ Short URL created".green().bold());
    println!();
    println!(
        "  Short URL: {}",
        entry.short_url(&state.base_url).bright_yellow().bold()
    );
    println!("  Target:    {}", entry.original_url.cyan());
    println!("  ID:        {}", entry.id.to_string().bright_black());
    println!(
        "  Expires:   {}",
        entry.expires_at.format("%Y-%m-%d %H:%M UTC").to_string().bright_black()
    );
    println!();

    Ok(true)
}

fn resolve(state: &AppState, code: &str, context: ClickContext) -> Result<bool> {
    let outcome = state.resolve_short_url(code, context)?;

    match &outcome {
        Outcome::Redirect { destination, entry } => {
            println!("{} {}", "➡️  Redirecting to".green().bold(), destination.cyan());
            println!(
                "  Clicks: {}",
                entry.click_count.to_string().bright_white().bold()
            );
            Ok(true)
        }
        Outcome::Expired { short_code } => {
            println!("{} {}", "⌛ Link expired:".yellow().bold(), short_code);
            Ok(false)
        }
        Outcome::Invalid { short_code } => {
            println!("{} {}", "❌ Link not found:".red().bold(), short_code);
            Ok(false)
        }
    }
}

/// Deletes an entry after confirmation (default: No).
fn delete(state: &AppState, id: i64, skip_confirm: bool) -> Result<bool> {
    let entry = state.links.get(id)?;

    println!("{}", "🗑️  Delete Short URL".bright_blue().bold());
    println!();
    println!("  Code:   {}", entry.short_code.cyan());
    println!("  Target: {}", entry.original_url);
    println!("  Clicks: {}", entry.click_count);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this entry?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(false);
        }
    }

    state.delete_short_url(id)?;
    println!("{}", "✅ Entry deleted".green().bold());

    Ok(true)
}

fn purge(state: &AppState, id: i64, skip_confirm: bool) -> Result<bool> {
    let entry = state.links.get(id)?;

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Drop every click event of '{}'?", entry.short_code))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(false);
        }
    }

    let removed = state.analytics.purge_clicks(id)?;
    println!(
        "{} {} events",
        "✅ Purged".green().bold(),
        removed.to_string().bright_white().bold()
    );

    Ok(removed > 0)
}

fn status_label(entry: &Entry, now: DateTime<Utc>) -> ColoredString {
    match entry.status(now) {
        EntryStatus::Active => "ACTIVE".green(),
        EntryStatus::Paused => "PAUSED".yellow(),
        EntryStatus::Expired => "EXPIRED".red(),
    }
}

/// Lists entries as a table.
///
/// # Output Format
///
/// ```text
/// 📋 Short URLs
///
///   ID  Code         Clicks  Expires            Status   Target
///   ──────────────────────────────────────────────────────────────
///   1   abc123       15      2024-07-24 14:00   ACTIVE   https://example.com
/// ```
fn list(state: &AppState, query: &ListQuery) -> Result<()> {
    println!("{}", "📋 Short URLs".bright_blue().bold());
    println!();

    let entries = state.list_short_urls(query)?;
    let now = state.clock.now();

    if entries.is_empty() {
        println!("{}", "  No entries found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<12} {:<7} {:<18} {:<8} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Status".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for entry in &entries {
        println!(
            "  {:<4} {:<12} {:<7} {:<18} {:<8} {}",
            entry.id.to_string().bright_black(),
            entry.short_code.cyan(),
            entry.click_count,
            entry
                .expires_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status_label(entry, now),
            entry.original_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        entries.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

fn stats(state: &AppState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let overview = state.links.overview()?;

    println!(
        "  Total URLs:   {}",
        overview.total.to_string().bright_white().bold()
    );
    println!("  Active:       {}", overview.active.to_string().green());
    println!("  Expired:      {}", overview.expired.to_string().red());
    println!("  Paused:       {}", overview.paused.to_string().yellow());
    println!(
        "  Total clicks: {}",
        overview.total_clicks.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

fn activity(state: &AppState) -> Result<()> {
    println!("{}", "🕒 Recent Activity".bright_blue().bold());
    println!();

    let feed = state.analytics.recent_activity()?;
    if feed.is_empty() {
        println!("{}", "  Nothing yet".yellow());
        return Ok(());
    }

    for item in &feed {
        let kind = match item.kind {
            ActivityKind::Created => "created".green(),
            ActivityKind::Clicked => "clicked".cyan(),
            ActivityKind::Expired => "expired".red(),
        };
        println!(
            "  {}  {:<8} {}",
            item.at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            kind,
            item.short_code
        );
    }
    println!();

    Ok(())
}

fn print_breakdown(title: &str, rows: &[CategoryCount]) {
    println!("  {}", title.bright_white().bold());
    if rows.is_empty() {
        println!("    {}", "-".bright_black());
    }
    for row in rows.iter().take(5) {
        println!(
            "    {:<24} {:>6} {:>6.1}%",
            row.name, row.count, row.percentage
        );
    }
}

fn format_window(window: &TimeWindow) -> String {
    format!(
        "{} → {}",
        window.start().format("%Y-%m-%d"),
        window.end().format("%Y-%m-%d")
    )
}

fn print_metrics(metrics: &Metrics) {
    println!(
        "{} {}",
        "📈 Analytics for".bright_blue().bold(),
        metrics.short_code.cyan().bold()
    );
    println!("  Window: {}", format_window(&metrics.window).bright_black());
    println!();
    println!(
        "  Total clicks:    {}",
        metrics.total_clicks.to_string().bright_white().bold()
    );
    println!("  Unique visitors: {}", metrics.unique_visitors);
    println!("  Click rate:      {:.1}%", metrics.click_rate);
    println!("  Daily average:   {:.1}", metrics.average_daily);
    match metrics.peak_day {
        Some(day) => println!("  Peak day:        {} ({} clicks)", day, metrics.peak_clicks),
        None => println!("  Peak day:        {}", "N/A".bright_black()),
    }
    match metrics.last_click_at {
        Some(at) => println!("  Last click:      {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("  Last click:      {}", "never".bright_black()),
    }
    println!();

    print_breakdown("Referrers", &metrics.referrers);
    print_breakdown("Devices", &metrics.devices);
    print_breakdown("Browsers", &metrics.browsers);
    print_breakdown("Operating systems", &metrics.operating_systems);
    print_breakdown("Countries", &metrics.countries);
    print_breakdown("Cities", &metrics.cities);
    println!();
}
