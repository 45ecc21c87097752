use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scoreboard_store::{global, ScoreRecord, StoreConfig, DEFAULT_LIMIT};
use scoreboard_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "scoreboard", version, about = "Local high score leaderboard")]
struct Cli {
    /// Directory holding the score database
    #[arg(long, env = "SCOREBOARD_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Database file name inside the data directory
    #[arg(long, env = "SCOREBOARD_DB_NAME", global = true)]
    db_name: Option<String>,

    /// Default log level (RUST_LOG overrides)
    #[arg(long, default_value = "warn", global = true)]
    log_level: tracing::Level,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print leaderboards as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a score
    Add {
        player: String,
        #[arg(allow_hyphen_values = true)]
        score: i64,
        #[arg(long)]
        level: Option<String>,
    },
    /// Show the best scores overall
    Top {
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },
    /// Show the best scores for one level
    Level {
        name: String,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },
    /// Print the number of stored scores
    Count,
    /// Delete every stored score
    Clear,
    /// Print the database file path
    Path,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        let mut config = match &self.data_dir {
            Some(dir) => StoreConfig::new(dir),
            None => StoreConfig::from_env(),
        };
        if let Some(name) = &self.db_name {
            config = config.with_database_name(name);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig {
        log_level: cli.log_level,
        json: cli.json_logs,
        ..Default::default()
    });

    let config = cli.store_config();
    tracing::debug!(path = %config.database_path().display(), "using score database");
    global::configure(config);

    let result = run(&cli);
    global::shutdown();
    result
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let store = global::store().context("failed to open score database")?;

    match &cli.command {
        Command::Add {
            player,
            score,
            level,
        } => {
            let record = store.try_add_high_score(player, *score, level.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string(&record)?);
            } else {
                println!("#{} {record}", record.id);
            }
        }
        Command::Top { limit } => print_board(&store.top_high_scores(*limit), cli.json)?,
        Command::Level { name, limit } => {
            print_board(&store.high_scores_for_level(name, *limit), cli.json)?;
        }
        Command::Count => println!("{}", store.high_score_count()),
        Command::Clear => {
            let removed = store.try_clear_all_high_scores()?;
            println!("removed {removed} scores");
        }
        Command::Path => println!("{}", store.path().display()),
    }

    let diagnostics = store.diagnostics();
    if let Some(failure) = diagnostics.last_failure {
        anyhow::bail!("{} failed: {}", failure.operation, failure.message);
    }
    Ok(())
}

fn print_board(records: &[ScoreRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no scores yet");
    }
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>10}  {:<12} {}",
            rank + 1,
            record.player_name,
            record.score,
            record.level_name,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
