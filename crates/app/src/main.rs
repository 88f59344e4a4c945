mod console;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use services::leaderboard::{DEFAULT_REBUILD_PERIOD, spawn_report_logger, spawn_ticker};
use services::{Clock, QuizServices, UserAction};
use storage::layout::{
    DEFAULT_INSTRUCTOR_TABLE, DEFAULT_LEADERBOARD_TABLE, INSTRUCTOR_FIELDS, QUESTION_REGION,
    ReservedTables,
};
use storage::{Storage, TableStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use console::{ConsoleTransport, parse_line};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidRebuildSecs { raw: String },
    InvalidTable { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRebuildSecs { raw } => {
                write!(f, "invalid --rebuild-secs value (expected seconds > 0): {raw}")
            }
            ArgsError::InvalidTable { flag } => write!(f, "{flag} must not be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreChoice {
    Sqlite(String),
    /// Throwaway store with one demo quiz.
    Memory,
}

#[derive(Debug, Clone)]
struct Args {
    store: StoreChoice,
    rebuild_period: Duration,
    leaderboard_table: String,
    instructor_table: String,
}

fn parse_rebuild_secs(raw: String) -> Result<Duration, ArgsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ArgsError::InvalidRebuildSecs { raw }),
    }
}

fn non_empty(value: String, flag: &'static str) -> Result<String, ArgsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArgsError::InvalidTable { flag });
    }
    Ok(trimmed.to_string())
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store = StoreChoice::Sqlite(
            std::env::var("QUIZ_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url),
        );
        let mut rebuild_period = match std::env::var("QUIZ_REBUILD_SECS") {
            Ok(raw) => parse_rebuild_secs(raw)?,
            Err(_) => DEFAULT_REBUILD_PERIOD,
        };
        let mut leaderboard_table = std::env::var("QUIZ_LEADERBOARD_TABLE")
            .unwrap_or_else(|_| DEFAULT_LEADERBOARD_TABLE.into());
        let mut instructor_table = std::env::var("QUIZ_INSTRUCTOR_TABLE")
            .unwrap_or_else(|_| DEFAULT_INSTRUCTOR_TABLE.into());

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    store = StoreChoice::Sqlite(normalize_sqlite_url(value));
                }
                "--memory" => store = StoreChoice::Memory,
                "--rebuild-secs" => {
                    rebuild_period = parse_rebuild_secs(require_value(&mut args, "--rebuild-secs")?)?;
                }
                "--leaderboard-table" => {
                    leaderboard_table = require_value(&mut args, "--leaderboard-table")?;
                }
                "--instructor-table" => {
                    instructor_table = require_value(&mut args, "--instructor-table")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            store,
            rebuild_period,
            leaderboard_table: non_empty(leaderboard_table, "--leaderboard-table")?,
            instructor_table: non_empty(instructor_table, "--instructor-table")?,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>             SQLite URL (default: sqlite://quiz.sqlite3)");
    eprintln!("  --memory                      Use an in-memory store with a demo quiz");
    eprintln!("  --rebuild-secs <n>            Leaderboard rebuild period (default: 300)");
    eprintln!("  --leaderboard-table <name>    Leaderboard table (default: Leaderboard)");
    eprintln!("  --instructor-table <name>     Instructor table (default: Teacher)");
    eprintln!("  -h, --help                    Show this help");
    eprintln!();
    eprintln!("Environment (same as flags, .env is read first):");
    eprintln!("  QUIZ_DB_URL, QUIZ_REBUILD_SECS, QUIZ_LEADERBOARD_TABLE, QUIZ_INSTRUCTOR_TABLE");
    eprintln!();
    eprintln!("Input, one action per line on stdin:");
    eprintln!("  <user_id>[:<handle>] start_tests | select_<quiz> | answer_<q>|<c> | <c>");
    eprintln!("  <user_id>[:<handle>] show_lk | show_teacher | show_start_menu");
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn seed_demo(tables: &dyn TableStore, instructor_table: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cells = |line: &[&str]| line.iter().map(|c| (*c).to_string()).collect::<Vec<_>>();
    tables.ensure_table("Demo").await?;
    tables
        .write_range(
            "Demo",
            QUESTION_REGION,
            vec![
                cells(&["d1", "2 + 2 = ?", "3", "4", "5", "2"]),
                cells(&["d2", "Largest planet?", "Jupiter", "Mars", "Venus", "1"]),
            ],
        )
        .await?;
    tables.ensure_table(instructor_table).await?;
    tables
        .write_range(instructor_table, INSTRUCTOR_FIELDS, vec![cells(&["Demo Instructor"])])
        .await?;
    Ok(())
}

/// Forward stdin lines as actions until EOF or until the dispatcher is gone.
fn spawn_stdin_reader(actions: mpsc::Sender<UserAction>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("[CONSOLE] reading stdin failed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(action) => {
                    if actions.send(action).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::debug!("[CONSOLE] dropped {line:?}: {err}");
                    eprintln!("{err}");
                }
            }
        }
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = match &args.store {
        StoreChoice::Sqlite(db_url) => {
            // Open + migrate SQLite at startup. Keep this in the binary glue so services stay pure.
            prepare_sqlite_file(db_url)?;
            Storage::sqlite(db_url).await?
        }
        StoreChoice::Memory => {
            let storage = Storage::in_memory();
            seed_demo(storage.tables.as_ref(), &args.instructor_table).await?;
            storage
        }
    };

    let reserved = ReservedTables::new(args.leaderboard_table.clone(), args.instructor_table.clone());
    let (services, reports) = QuizServices::start(&storage, Clock::default_clock(), reserved).await?;
    let _reports = spawn_report_logger(reports);
    let _ticker = spawn_ticker(services.rebuilds(), args.rebuild_period);

    let dispatcher = services.dispatcher(Arc::new(ConsoleTransport::new(tokio::io::stdout())));
    let (actions, inbox) = mpsc::channel(64);
    let _stdin = spawn_stdin_reader(actions);

    log::info!(
        "[APP] ready, leaderboard rebuilt every {}s",
        args.rebuild_period.as_secs()
    );
    dispatcher.run(inbox).await;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
