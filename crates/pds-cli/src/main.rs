mod app;
mod http;
mod server;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pds_core::{Chart, Date, DiamondChart, FamilyReport, FixedClock};
use pds_store::roster::{EntryId, Tab};
use pds_store::{Account, DataDir, Draw, JournalEntry, JournalInput, Mood, ProfileInput};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rmcp::{ServiceExt, transport::stdio};
use serde::Serialize;
use uuid::Uuid;

use crate::app::{
    App, ChartRequest, DiamondRequest, DrawOutcome, FamilyRequest, MemberRequest, ProfilesRequest,
};

#[derive(Parser)]
#[command(name = "pds", about = "PDS energy charts: CLI, MCP server and HTTP API")]
struct Cli {
    /// Account whose roster is used (defaults to config `default_user`)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a birth chart
    Chart {
        /// Birth date, YYYY-MM-DD
        date: String,

        /// Latin-letter name for soul, persona and destiny
        #[arg(long)]
        name: Option<String>,

        /// Compute as of this date instead of today
        #[arg(long)]
        today: Option<String>,
    },

    /// Compute the pinnacle/challenge diamond chart
    Diamond {
        /// Birth date, YYYY-MM-DD
        date: String,
    },

    /// Analyze family dynamics (ad-hoc members, or the saved roster)
    Family {
        /// NAME=YYYY-MM-DD[:LATIN], repeatable; the first is the reference
        #[arg(long = "member")]
        members: Vec<String>,

        /// Restrict the roster to one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show or update your own account
    Me {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        english: Option<String>,

        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Manage saved profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Write and review journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Draw today's guidance card (once per day)
    Draw {
        /// Show the past week of draws instead
        #[arg(long)]
        history: bool,

        /// Draw as of this date instead of today
        #[arg(long)]
        today: Option<String>,
    },

    /// Show or change config.toml
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Start MCP server on stdio transport
    Serve,

    /// Start the JSON HTTP API
    Http {
        /// Port to listen on (defaults to config `http.port`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Save a new profile
    Add {
        #[arg(long)]
        name: String,

        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "")]
        english: String,

        #[arg(long)]
        category: Option<String>,
    },

    /// List profiles grouped into category tabs
    List,

    /// Edit a saved profile; omitted fields keep their value
    Edit {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        english: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a saved profile
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum JournalCommand {
    /// Write a new entry
    Add {
        content: String,

        /// good, bad or neutral
        #[arg(long, default_value = "good")]
        mood: Mood,

        #[arg(long, default_value = "")]
        emoji: String,
    },

    /// List entries, newest first
    List,

    /// Edit an entry; omitted fields keep their value
    Edit {
        id: Uuid,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        mood: Option<Mood>,

        #[arg(long)]
        emoji: Option<String>,
    },

    /// Delete an entry
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Set one key, e.g. `chart.utc_offset_minutes -300`
    Set { key: String, value: String },
}

fn open_data_dir() -> Result<DataDir> {
    DataDir::open(None).context("failed to open data directory")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Chart { date, name, today } => {
            cmd_chart(&cli, date, name.as_deref(), today.as_deref())
        }
        Commands::Diamond { date } => cmd_diamond(&cli, date),
        Commands::Family { members, category } => cmd_family(&cli, members, category.as_deref()),
        Commands::Me {
            name,
            english,
            date,
        } => cmd_me(&cli, name.as_deref(), english.as_deref(), date.as_deref()),
        Commands::Profile(command) => cmd_profile(&cli, command),
        Commands::Journal(command) => cmd_journal(&cli, command),
        Commands::Draw { history, today } => cmd_draw(&cli, *history, today.as_deref()),
        Commands::Config(command) => cmd_config(&cli, command),
        Commands::Serve => cmd_serve().await,
        Commands::Http { port } => cmd_http(*port).await,
    }
}

fn emit<T: Serialize>(cli: &Cli, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

/// An `App` on the system clock, or pinned to `--today`.
fn open_app(today: Option<&str>) -> Result<App> {
    let data = open_data_dir()?;
    Ok(match today {
        Some(today) => {
            let today = Date::parse(today).context("invalid --today")?;
            App::with_clock(data, FixedClock(today))
        }
        None => App::new(data),
    })
}

fn cmd_chart(cli: &Cli, date: &str, name: Option<&str>, today: Option<&str>) -> Result<()> {
    let app = open_app(today)?;
    let chart = app.chart(&ChartRequest {
        birth_date: date.to_string(),
        name: name.map(str::to_string),
    })?;
    emit(cli, &chart, print_chart)
}

fn cmd_diamond(cli: &Cli, date: &str) -> Result<()> {
    let app = App::new(open_data_dir()?);
    let diamond = app.diamond(&DiamondRequest {
        birth_date: date.to_string(),
    })?;
    emit(cli, &diamond, print_diamond)
}

fn cmd_family(cli: &Cli, members: &[String], category: Option<&str>) -> Result<()> {
    let app = App::new(open_data_dir()?);
    let members = members
        .iter()
        .map(|m| parse_member(m))
        .collect::<Result<Vec<_>>>()?;
    let report = app.family(&FamilyRequest {
        members,
        user: cli.user.clone(),
        category: category.map(str::to_string),
    })?;
    emit(cli, &report, print_family)
}

/// `NAME=YYYY-MM-DD[:LATIN]`
fn parse_member(arg: &str) -> Result<MemberRequest> {
    let Some((name, rest)) = arg.split_once('=') else {
        bail!("expected NAME=YYYY-MM-DD[:LATIN], got '{arg}'");
    };
    let (date, latin) = match rest.split_once(':') {
        Some((date, latin)) => (date, Some(latin.trim().to_string())),
        None => (rest, None),
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("member name must not be empty in '{arg}'");
    }
    Ok(MemberRequest {
        name: name.to_string(),
        birth_date: date.trim().to_string(),
        latin_name: latin,
    })
}

fn cmd_me(
    cli: &Cli,
    name: Option<&str>,
    english: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let app = App::new(open_data_dir()?);
    let user = app.user(cli.user.as_deref());
    let store = app.data().store();

    let existing = store.account(&user)?;
    let account = if name.is_some() || english.is_some() || date.is_some() {
        let mut account = existing.unwrap_or_else(|| Account {
            user_id: user.clone(),
            full_name: String::new(),
            english_name: String::new(),
            birth_date: None,
        });
        if let Some(name) = name {
            account.full_name = name.trim().to_string();
        }
        if let Some(english) = english {
            account.english_name = english.trim().to_string();
        }
        if let Some(date) = date {
            account.birth_date = Some(Date::parse_birth(date)?);
        }
        app.save_account(&account)?;
        tracing::info!("updated account {user}");
        Some(account)
    } else {
        existing
    };

    let entry = pds_store::roster::self_entry(account.as_ref(), &user);
    emit(cli, &entry, |e| {
        println!("user:       {user}");
        println!("name:       {}", e.name);
        println!("english:    {}", e.english_name);
        println!("birth date: {}", e.birth_date);
        println!("life path:  {}", e.life_path_number());
    })
}

fn cmd_profile(cli: &Cli, command: &ProfileCommand) -> Result<()> {
    let app = App::new(open_data_dir()?);
    let user = app.user(cli.user.as_deref());
    let store = app.data().store();

    match command {
        ProfileCommand::Add {
            name,
            date,
            english,
            category,
        } => {
            let profile = app.add_profile(
                &user,
                &ProfileInput {
                    name: name.clone(),
                    english_name: english.clone(),
                    birth_date: Some(Date::parse_birth(date)?),
                    category: category.clone(),
                },
            )?;
            emit(cli, &profile, |p| {
                println!("added {} ({}, {})", p.id, p.name, p.category)
            })
        }
        ProfileCommand::List => {
            let view = app.profiles(&ProfilesRequest {
                user: Some(user.clone()),
            })?;
            emit(cli, &view, |v| print_tabs(&v.tabs))
        }
        ProfileCommand::Edit {
            id,
            name,
            date,
            english,
            category,
        } => {
            let Some(current) = store.profile(*id)? else {
                bail!("profile {id} not found");
            };
            let birth_date = match date {
                Some(date) => Date::parse_birth(date)?,
                None => current.birth_date,
            };
            let profile = app.update_profile(
                *id,
                &ProfileInput {
                    name: name.clone().unwrap_or(current.name),
                    english_name: english.clone().unwrap_or(current.english_name),
                    birth_date: Some(birth_date),
                    category: Some(category.clone().unwrap_or(current.category)),
                },
            )?;
            emit(cli, &profile, |p| println!("updated {} ({})", p.id, p.name))
        }
        ProfileCommand::Delete { id } => {
            store.delete_profile(*id)?;
            emit(cli, &serde_json::json!({ "deleted": id }), |_| {
                println!("deleted {id}")
            })
        }
    }
}

fn cmd_journal(cli: &Cli, command: &JournalCommand) -> Result<()> {
    let app = App::new(open_data_dir()?);
    let user = app.user(cli.user.as_deref());
    let store = app.data().store();

    match command {
        JournalCommand::Add {
            content,
            mood,
            emoji,
        } => {
            let entry = store.add_journal(
                &user,
                &JournalInput {
                    content: content.clone(),
                    mood: *mood,
                    emoji: emoji.clone(),
                },
            )?;
            emit(cli, &entry, |e| println!("added {} {}", e.id, e.emoji))
        }
        JournalCommand::List => {
            let entries = store.list_journals(&user)?;
            emit(cli, &entries, |entries| print_journal(entries))
        }
        JournalCommand::Edit {
            id,
            content,
            mood,
            emoji,
        } => {
            let Some(current) = store.journal(*id)? else {
                bail!("journal entry {id} not found");
            };
            let entry = store.update_journal(
                *id,
                &JournalInput {
                    content: content.clone().unwrap_or(current.content),
                    mood: mood.unwrap_or(current.mood),
                    emoji: emoji.clone().unwrap_or(current.emoji),
                },
            )?;
            emit(cli, &entry, |e| println!("updated {} {}", e.id, e.emoji))
        }
        JournalCommand::Delete { id } => {
            store.delete_journal(*id)?;
            emit(cli, &serde_json::json!({ "deleted": id }), |_| {
                println!("deleted {id}")
            })
        }
    }
}

fn cmd_draw(cli: &Cli, history: bool, today: Option<&str>) -> Result<()> {
    let app = open_app(today)?;
    let user = app.user(cli.user.as_deref());

    if history {
        let draws = app.draw_history(&user)?;
        return emit(cli, &draws, |draws| print_draw_history(draws));
    }

    let mut rng = SmallRng::from_os_rng();
    let outcome = app.draw(&user, &mut rng)?;
    emit(cli, &outcome, print_draw)
}

fn cmd_config(cli: &Cli, command: &ConfigCommand) -> Result<()> {
    let mut data = open_data_dir()?;
    match command {
        ConfigCommand::Show => {
            let config = data.config();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                print!("{}", config.to_toml()?);
            }
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut config = data.config().clone();
            config.set(key, value)?;
            data.save_config(config)?;
            tracing::info!("set {key} in {}", data.path().display());
            emit(cli, data.config(), |_| println!("set {key} = {}", value.trim()))
        }
    }
}

async fn cmd_serve() -> Result<()> {
    let data = open_data_dir()?;
    tracing::info!("starting MCP server with data dir {}", data.path().display());

    let server = server::PdsServer::new(App::new(data));
    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

async fn cmd_http(port: Option<u16>) -> Result<()> {
    let data = open_data_dir()?;
    let port = port.unwrap_or(data.config().http.port);
    http::serve(App::new(data), port).await
}

// --- Text output ---

fn print_chart(c: &Chart) {
    println!("birth date:    {}", c.birth_date);
    println!("age:           {}", c.age);
    println!("life path:     {}", c.life_path);
    println!("soul:          {}", c.soul.path);
    println!("persona:       {}", c.persona.path);
    println!("destiny:       {}", c.destiny.path);
    println!("maturity:      {}", c.maturity);
    println!("temperament:   {}", c.temperament);
    println!("inner:         {}", c.inner);
    println!("personal year: {}", c.personal_year);
    println!("anchor:        {}", c.anchor);
    println!("restrict:      {}", c.restrict);
    println!("thinking:      {}", c.triangle.thinking);
    println!("subconscious:  {}", c.triangle.subconscious);
    println!("peak:          {}", c.triangle.peak);
    println!("relationship:  {}", c.triangle.relationship);
    println!("missing:       {}", c.triangle.missing_display());
}

fn print_diamond(d: &DiamondChart) {
    println!("birthday:  {}", d.birthday);
    println!("life path: {}", d.life_path);
    for stage in &d.stages {
        println!(
            "{}. {:<16} {:>8}  pinnacle {}  challenge {}",
            stage.index,
            stage.label,
            stage.ages.to_string(),
            stage.pinnacle,
            stage.challenge
        );
    }
}

fn print_family(r: &FamilyReport) {
    for tip in &r.tips {
        println!("{} [{}]: {}", tip.to, tip.kind.as_str(), tip.script);
    }
    let radar: Vec<String> = r.radar.iter().map(|(d, pct)| format!("{d}:{pct:.1}%")).collect();
    println!("radar: {}", radar.join(" "));
}

fn print_journal(entries: &[JournalEntry]) {
    if entries.is_empty() {
        println!("no journal entries yet");
    }
    for e in entries {
        println!("{} {} [{}] {}", e.emoji, e.created_at, e.mood, e.id);
        println!("  {}", e.preview());
    }
}

fn print_draw(outcome: &DrawOutcome) {
    let d = &outcome.draw;
    if outcome.fresh {
        println!("today's card ({})", d.draw_date);
    } else {
        println!("already drawn today ({})", d.draw_date);
    }
    println!("{}", d.title);
    println!("{}", d.poem);
    println!("{}", d.guidance);
}

fn print_draw_history(draws: &[Draw]) {
    if draws.is_empty() {
        println!("no draws yet");
    }
    for d in draws {
        println!("{}  {} - {}", d.draw_date, d.title, d.poem);
    }
}

fn print_tabs(tabs: &[Tab]) {
    for tab in tabs {
        println!("[{}] {}", tab.name, tab.entries.len());
        for e in &tab.entries {
            let id = match e.id {
                EntryId::Me => "me".to_string(),
                EntryId::Saved(id) => id.to_string(),
            };
            println!(
                "  ({}) {}  {}  {}",
                e.life_path_number(),
                e.name,
                e.birth_date,
                id
            );
        }
    }
}
