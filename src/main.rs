use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frc_scout::api::{build_router, state::AppState};
use frc_scout::calculate::filter::parse_flags;
use frc_scout::calculate::ranking::parse_columns;
use frc_scout::calculate::{
    filter_teams, home_matches, is_full_match, match_summary, overview, picklist_scouting,
    predict, predict_match, rank_teams, scouting_assignments, team_detail, Comparison,
    FilteredTeam, LeaderboardEntry, ScoutingPlan, Slot, SlotResult, SortKey, ALLIANCE_SIZE,
};
use frc_scout::config::AppConfig;
use frc_scout::ingest::DatasetKind;
use frc_scout::models::{
    parse_team_list, ClimbLevel, FieldPosition, ListKind, TeamId, TeamList, TeamStatistics,
};
use frc_scout::storage::{CursorKind, ScoutStore, StorageConfig};

#[derive(Parser)]
#[command(name = "frc-scout")]
#[command(about = "FRC scouting analytics from event, pit, schedule and OPR CSV exports")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory path
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Team whose schedule drives targeted scouting
    #[arg(long)]
    home_team: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store a CSV export
    Load {
        /// Dataset kind: event, pit, schedule or opr
        kind: String,

        /// CSV file to load
        file: PathBuf,
    },

    /// Remove a stored dataset
    Delete {
        /// Dataset kind: event, pit, schedule or opr
        kind: String,
    },

    /// Team rankings table
    Rankings {
        /// Include hidden teams
        #[arg(long)]
        show_hidden: bool,

        /// Columns to show (comma-separated tokens); saved for later runs
        #[arg(long)]
        columns: Option<String>,
    },

    /// Filter teams by capability flags
    Filter {
        /// Filter tokens, e.g. autoClimb climbLevel3 trench
        tokens: Vec<String>,

        /// Sort key: epa or opr
        #[arg(long, default_value = "epa")]
        sort: String,

        /// Include hidden teams
        #[arg(long)]
        show_hidden: bool,
    },

    /// Detail view for one team
    Team {
        id: String,

        /// Only show auto paths from this starting position (C, D or O)
        #[arg(long)]
        position: Option<String>,
    },

    /// Compare two teams side by side
    Compare { left: String, right: String },

    /// Predict a match outcome
    Predict {
        /// Scheduled match number
        #[arg(long = "match", conflicts_with_all = ["red", "blue"])]
        match_number: Option<u32>,

        /// Red alliance teams (comma-separated)
        #[arg(long, requires = "blue")]
        red: Option<String>,

        /// Blue alliance teams (comma-separated)
        #[arg(long, requires = "red")]
        blue: Option<String>,
    },

    /// Matches to scout ahead of the home team's matches
    Scout {
        /// First match to plan from (defaults to the saved cursor)
        #[arg(long)]
        cursor: Option<u32>,
    },

    /// Matches to scout for picklist teams
    PicklistScout {
        /// First match to plan from (defaults to the saved cursor)
        #[arg(long)]
        cursor: Option<u32>,
    },

    /// Manage hidden teams
    Hide {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage isolated teams
    Isolate {
        #[command(subcommand)]
        action: IsolateAction,
    },

    /// Manage the picklist
    Picklist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Save a scouting cursor
    Cursor {
        match_number: u32,

        /// Set the picklist cursor instead of the home-team cursor
        #[arg(long)]
        picklist: bool,
    },

    /// Event-wide EPA and OPR leaderboards
    Overview {
        /// Team to highlight
        #[arg(long)]
        highlight: Option<String>,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct TeamsArg {
    /// Team numbers (space or comma separated)
    #[arg(required = true)]
    teams: Vec<String>,
}

impl TeamsArg {
    fn parse(&self) -> Vec<TeamId> {
        self.teams.iter().flat_map(|t| parse_team_list(t)).collect()
    }
}

#[derive(Subcommand)]
enum ListAction {
    /// Add teams to the list
    Add(TeamsArg),
    /// Remove teams from the list
    Remove(TeamsArg),
    /// Clear the list
    Reset,
    /// Print the list
    Show,
}

#[derive(Subcommand)]
enum IsolateAction {
    #[command(flatten)]
    List(ListAction),
    /// Switch isolate mode on or off
    Toggle,
}

fn parse_kind(raw: &str) -> Result<DatasetKind> {
    DatasetKind::parse(raw).ok_or_else(|| {
        anyhow!(
            "Unknown dataset kind '{}' (expected event, pit, schedule or opr)",
            raw
        )
    })
}

fn parse_team_arg(raw: &str) -> Result<TeamId> {
    TeamId::normalize(raw).ok_or_else(|| anyhow!("Team number must not be empty"))
}

fn resolve_cursor(
    store: &ScoutStore,
    config: &AppConfig,
    kind: CursorKind,
    requested: Option<u32>,
) -> Result<u32> {
    if let Some(cursor) = requested {
        return Ok(cursor);
    }
    Ok(store.cursor(kind)?.unwrap_or(config.default_cursor))
}

fn format_list(list: &TeamList) -> String {
    if list.is_empty() {
        return "(empty)".to_string();
    }
    list.iter().map(TeamId::as_str).collect::<Vec<_>>().join(", ")
}

fn format_match_number(number: Option<u32>) -> String {
    number.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
}

fn format_teams(teams: &[TeamId]) -> String {
    teams.iter().map(TeamId::as_str).collect::<Vec<_>>().join(", ")
}

fn format_level(level: Option<ClimbLevel>) -> String {
    level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_time(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}s", v)).unwrap_or_else(|| "-".to_string())
}

fn print_statistics(stats: &TeamStatistics) {
    let caps = &stats.capabilities;
    println!("Matches scouted:    {}", stats.match_count);
    println!("EPA:                {:.1}", stats.epa);
    println!("Avg total points:   {:.1}", stats.avg_total_points);
    println!(
        "OPR:                {:.1} (auto {:.1}, tele {:.1})",
        stats.opr.total, stats.opr.auto, stats.opr.tele
    );
    println!(
        "Auto climb:         {}/{}",
        stats.auto_climb.successes, stats.auto_climb.attempts
    );
    println!(
        "Tele climb:         {}/{} ({:.1}%)",
        stats.tele_climb.successes, stats.tele_climb.attempts, stats.climb_success_rate
    );
    println!("Most common climb:  {}", format_level(stats.most_common_climb));
    println!(
        "Climb time:         L1 {}  L2 {}  L3 {}",
        format_time(stats.climb_time_by_level.l1),
        format_time(stats.climb_time_by_level.l2),
        format_time(stats.climb_time_by_level.l3)
    );
    println!("Avg climb points:   {:.1}", stats.avg_climb_points);
    println!("Shooting accuracy:  {:.1}", stats.shooting_accuracy);
    println!("Driver skill:       {:.1}", stats.driver_skill);
    println!(
        "Defense:            {} rated, max {:.1}, avg {:.1}",
        stats.defense_rating_count, stats.max_defense_rating, stats.avg_defense_rating
    );
    println!("Died rate:          {:.1}%", stats.died_rate);
    if !stats.death_matches.is_empty() {
        let matches: Vec<String> = stats.death_matches.iter().map(|m| format!("Q{}", m)).collect();
        println!("Died in:            {}", matches.join(", "));
    }
    println!(
        "Pit:                trench={} ground_intake={} shoot_on_fly={} swerve={} ({})",
        caps.trench,
        caps.ground_intake,
        caps.shoot_on_fly,
        caps.swerve,
        caps.drivetrain.as_deref().unwrap_or("no drivetrain listed")
    );
}

fn print_filtered(title: &str, teams: &[FilteredTeam]) {
    println!("=== {} ({}) ===", title, teams.len());
    for team in teams {
        let hidden = if team.is_hidden { " [hidden]" } else { "" };
        println!(
            "  {:>6}  EPA {:>6.1}  OPR {:>6.1}{}",
            team.team, team.epa, team.opr, hidden
        );
    }
}

fn print_plan(plan: &ScoutingPlan) {
    if plan.is_empty() {
        println!("  Nothing to scout from this match onward.");
        return;
    }
    for block in &plan.blocks {
        println!("  Q{:<4} {}", block.match_number, format_teams(&block.teams));
    }
}

fn print_leaderboard(title: &str, entries: &[LeaderboardEntry]) {
    println!("=== {} ===", title);
    for (i, entry) in entries.iter().enumerate() {
        let marker = match (entry.is_home, entry.is_highlighted) {
            (true, _) => " [home]",
            (_, true) => " [highlight]",
            _ => "",
        };
        println!("  {:>3}. {:>6}  {:>6.1}{}", i + 1, entry.team, entry.value, marker);
    }
}

fn run_list_action(store: &ScoutStore, kind: ListKind, action: ListAction) -> Result<()> {
    let list = match action {
        ListAction::Add(arg) => store.add_to_list(kind, &arg.parse())?,
        ListAction::Remove(arg) => store.remove_from_list(kind, &arg.parse())?,
        ListAction::Reset => {
            store.reset_list(kind)?;
            TeamList::new()
        }
        ListAction::Show => store.list(kind)?,
    };
    println!("{:?}: {}", kind, format_list(&list));
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }
    if let Some(home_team) = cli.home_team {
        config.home_team = home_team;
    }
    config.validate()?;

    init_tracing(&config.log_level, cli.json_logs);
    tracing::debug!("Starting frc-scout v{}", env!("CARGO_PKG_VERSION"));

    let store = ScoutStore::open(&StorageConfig::new(config.data_dir.clone()));
    let home = parse_team_arg(&config.home_team)?;

    match cli.command {
        Commands::Load { kind, file } => {
            let kind = parse_kind(&kind)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let meta = store.save_dataset(kind, &file_name, &text)?;
            println!("Loaded {} rows of {} data from {}", meta.rows, kind, meta.file_name);
        }
        Commands::Delete { kind } => {
            let kind = parse_kind(&kind)?;
            store.delete_dataset(kind)?;
            println!("Deleted {} data", kind);
        }
        Commands::Rankings {
            show_hidden,
            columns,
        } => {
            if let Some(raw) = columns {
                let selected = parse_columns(raw.split(',').map(str::trim));
                store.set_ranking_columns(&selected)?;
            }
            let snapshot = store.snapshot()?;
            let selection = store.ranking_columns()?;
            let table = rank_teams(
                &snapshot.dataset,
                &snapshot.visibility(show_hidden),
                selection.as_deref(),
            );

            if table.rows.is_empty() {
                println!("No teams to rank. Load event data with `frc-scout load event <file>`.");
                return Ok(());
            }
            let header: Vec<String> = table
                .columns
                .iter()
                .map(|c| format!("{:>12}", c.label()))
                .collect();
            println!("{:>4}  {:>6}  {}", "#", "Team", header.join(" "));
            for row in &table.rows {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .map(|c| format!("{:>12.2}", c.value))
                    .collect();
                println!("{:>4}  {:>6}  {}", row.rank, row.team, cells.join(" "));
            }
        }
        Commands::Filter {
            tokens,
            sort,
            show_hidden,
        } => {
            let sort =
                SortKey::parse(&sort).ok_or_else(|| anyhow!("Unknown sort key '{}'", sort))?;
            let selected = parse_flags(tokens.iter().map(String::as_str));
            if selected.len() < tokens.len() {
                tracing::warn!(
                    "Ignored {} unknown filter tokens",
                    tokens.len() - selected.len()
                );
            }
            store.set_filter_selections(&selected)?;

            let snapshot = store.snapshot()?;
            let result = filter_teams(
                &snapshot.dataset,
                &selected,
                &snapshot.hidden,
                show_hidden,
                sort,
            );
            print_filtered("Matching", &result.matching);
            print_filtered("Not matching", &result.non_matching);
        }
        Commands::Team { id, position } => {
            let team = parse_team_arg(&id)?;
            let position = match position {
                Some(raw) => Some(FieldPosition::parse(&raw).ok_or_else(|| {
                    anyhow!("Unknown position '{}' (expected C, D or O)", raw)
                })?),
                None => None,
            };
            let snapshot = store.snapshot()?;
            let Some(detail) = team_detail(&team, &snapshot.dataset, position) else {
                bail!("No match data for team {}", team);
            };

            println!("=== Team {} ===", team);
            print_statistics(&detail.statistics);

            println!("\n=== Flagged Matches ===");
            for m in &detail.flagged_matches {
                let mut reasons = Vec::new();
                if m.died {
                    reasons.push("died");
                }
                if m.played_defense {
                    reasons.push("played defense");
                }
                if m.was_defended {
                    reasons.push("defended");
                }
                let number = format_match_number(m.match_number);
                println!("  Q{:<4} {}", number, reasons.join(", "));
            }

            println!("\n=== Comments ===");
            for comment in &detail.comments {
                let number = format_match_number(comment.match_number);
                println!("  Q{:<4} {}", number, comment.text);
            }

            println!("\n=== Auto Paths ===");
            for path in &detail.auto_paths {
                let number = format_match_number(path.match_number);
                let start = path.starting_position.map(|p| p.code()).unwrap_or("-");
                println!(
                    "  Q{:<4} [{}] travel: {}  fuel: {}",
                    number,
                    start,
                    path.travel.as_deref().unwrap_or("-"),
                    path.fuel_collection.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Compare { left, right } => {
            let snapshot = store.snapshot()?;
            let mut comparison = Comparison::new();
            comparison.search(Slot::Left, &parse_team_arg(&left)?, &snapshot.dataset);
            comparison.search(Slot::Right, &parse_team_arg(&right)?, &snapshot.dataset);

            for slot in [Slot::Left, Slot::Right] {
                match comparison.slot(slot) {
                    SlotResult::Found(stats) => {
                        println!("=== Team {} ===", stats.team);
                        print_statistics(stats);
                    }
                    SlotResult::NoData { team } => {
                        println!("=== Team {} ===\n  No data found", team)
                    }
                    SlotResult::Empty => {}
                }
                println!();
            }
        }
        Commands::Predict {
            match_number,
            red,
            blue,
        } => {
            let snapshot = store.snapshot()?;
            let data = &snapshot.dataset;
            let prediction = match (match_number, red, blue) {
                (Some(n), _, _) => predict_match(n, data)
                    .ok_or_else(|| anyhow!("Match {} is not in the schedule", n))?,
                (None, Some(red), Some(blue)) => {
                    let (red, blue) = (parse_team_list(&red), parse_team_list(&blue));
                    if !is_full_match(&red, &blue) {
                        bail!("Each alliance needs exactly {} teams", ALLIANCE_SIZE);
                    }
                    predict(&red, &blue, data)
                }
                _ => bail!("Specify --match or both --red and --blue"),
            };

            if let Some(n) = prediction.match_number {
                println!("=== Qualification {} ===", n);
            }
            for side in [&prediction.red, &prediction.blue] {
                println!(
                    "{:<5} {:<20} EPA {:>6.1}  win {:>5.1}%  auto OPR {:>5.1} ({:.1}%)",
                    side.alliance.to_string(),
                    format_teams(&side.teams),
                    side.epa,
                    side.win_percentage,
                    side.auto_opr,
                    side.auto_percentage
                );
            }
            match prediction.winner {
                Some(winner) => println!("Predicted winner: {}", winner),
                None => println!("Predicted winner: tie"),
            }
            println!("First active shift: {}", prediction.first_shift);

            let summary = match_summary(&prediction.red.teams, &prediction.blue.teams, data);
            println!("\n=== Match Summary ===");
            for row in &summary.rows {
                if !row.has_data {
                    println!("  {:<4} {:>6}  no data", row.alliance.to_string(), row.team);
                    continue;
                }
                println!(
                    "  {:<4} {:>6}  climb {:>5.1}%  acc {:>4.1}  common {}  \
                     died {:>5.1}%  def {:.1}",
                    row.alliance.to_string(),
                    row.team,
                    row.climb_success_rate,
                    row.shooting_accuracy,
                    format_level(row.most_common_climb),
                    row.died_rate,
                    row.avg_defense_rating
                );
            }
        }
        Commands::Scout { cursor } => {
            let cursor = resolve_cursor(&store, &config, CursorKind::Home, cursor)?;
            let snapshot = store.snapshot()?;
            let schedule = &snapshot.dataset.schedule;

            println!("=== Team {} matches from Q{} ===", home, cursor);
            for m in home_matches(schedule, &home, cursor) {
                println!(
                    "  Q{:<4} {:<4} with {}  vs {}",
                    m.match_number,
                    m.alliance.to_string(),
                    format_teams(&m.partners),
                    format_teams(&m.opponents)
                );
            }
            println!("\n=== Scouting Assignments ===");
            print_plan(&scouting_assignments(schedule, &home, cursor));
        }
        Commands::PicklistScout { cursor } => {
            let cursor = resolve_cursor(&store, &config, CursorKind::Picklist, cursor)?;
            let snapshot = store.snapshot()?;
            println!("=== Picklist Scouting from Q{} ===", cursor);
            print_plan(&picklist_scouting(&snapshot.dataset.schedule, &snapshot.picklist, cursor));
        }
        Commands::Hide { action } => run_list_action(&store, ListKind::Hidden, action)?,
        Commands::Picklist { action } => run_list_action(&store, ListKind::Picklist, action)?,
        Commands::Isolate { action } => match action {
            IsolateAction::List(action) => run_list_action(&store, ListKind::Isolated, action)?,
            IsolateAction::Toggle => {
                let enabled = store.toggle_isolate_mode()?;
                println!("Isolate mode {}", if enabled { "on" } else { "off" });
            }
        },
        Commands::Cursor {
            match_number,
            picklist,
        } => {
            let kind = if picklist { CursorKind::Picklist } else { CursorKind::Home };
            store.set_cursor(kind, match_number)?;
            println!("{:?} cursor set to Q{}", kind, match_number);
        }
        Commands::Overview { highlight } => {
            let highlight = highlight.as_deref().map(parse_team_arg).transpose()?;
            let snapshot = store.snapshot()?;
            let board = overview(&snapshot.dataset, &home, highlight.as_ref());

            match board.latest_match {
                Some(n) => println!("Data up till Q{}\n", n),
                None => println!("No event data loaded\n"),
            }
            print_leaderboard("EPA", &board.epa);
            println!();
            print_leaderboard("OPR", &board.opr);

            println!("\n=== Datasets ===");
            for kind in DatasetKind::ALL {
                match store.dataset_meta(kind)? {
                    Some(meta) => println!(
                        "  {:<8} {} ({} rows, {})",
                        kind.to_string(),
                        meta.file_name,
                        meta.rows,
                        meta.uploaded_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                    None => println!("  {:<8} not loaded", kind.to_string()),
                }
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let app = build_router(AppState::new(store, config));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
