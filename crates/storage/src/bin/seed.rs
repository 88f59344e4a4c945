use std::fmt;

use storage::layout::{
    DEFAULT_INSTRUCTOR_TABLE, DEFAULT_LEADERBOARD_TABLE, INSTRUCTOR_DESCRIPTION,
    INSTRUCTOR_FIELDS, LEADERBOARD_REGION, QUESTION_REGION, RESULTS_REGION,
};
use storage::{CellRange, Rows, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    reset_results: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut reset_results = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--reset-results" => reset_results = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            reset_results,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3)");
    eprintln!("  --reset-results           Blank stored results and the leaderboard");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL");
}

fn rows(lines: &[&[&str]]) -> Rows {
    lines
        .iter()
        .map(|line| line.iter().map(|cell| (*cell).to_string()).collect())
        .collect()
}

/// Row 1 of a table, `A1` onwards.
fn header(width: u32) -> CellRange {
    CellRange::bounded(0, 0, width - 1, 0)
}

const QUIZ_HEADER: &[&str] = &[
    "id", "question", "option 1", "option 2", "option 3", "correct", "", "user id", "name",
    "result", "recorded at",
];

const SAMPLE_QUIZZES: &[(&str, &[&[&str]])] = &[
    (
        "Geography",
        &[
            &["g1", "Capital of France?", "Rome", "Paris", "Oslo", "2"],
            &["g2", "Longest river in Africa?", "Nile", "Congo", "Niger", "1"],
            &["g3", "Which ocean is the largest?", "Atlantic", "Indian", "Pacific", "3"],
        ],
    ),
    (
        "Science",
        &[
            &["s1", "Chemical symbol for gold?", "Au", "Ag", "Gd", "1"],
            &["s2", "Planet closest to the Sun?", "Venus", "Mercury", "Mars", "2"],
        ],
    ),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let tables = &storage.tables;

    for (name, questions) in SAMPLE_QUIZZES {
        tables.ensure_table(name).await?;
        tables
            .write_range(name, header(11), rows(&[QUIZ_HEADER]))
            .await?;
        tables.clear_range(name, QUESTION_REGION).await?;
        tables
            .write_range(name, QUESTION_REGION, rows(questions))
            .await?;
        if args.reset_results {
            tables.clear_range(name, RESULTS_REGION).await?;
        }
    }

    tables.ensure_table(DEFAULT_LEADERBOARD_TABLE).await?;
    tables
        .write_range(
            DEFAULT_LEADERBOARD_TABLE,
            header(4),
            rows(&[&["user id", "name", "total score", "quizzes passed"]]),
        )
        .await?;
    if args.reset_results {
        tables
            .clear_range(DEFAULT_LEADERBOARD_TABLE, LEADERBOARD_REGION)
            .await?;
    }

    tables.ensure_table(DEFAULT_INSTRUCTOR_TABLE).await?;
    tables
        .write_range(
            DEFAULT_INSTRUCTOR_TABLE,
            INSTRUCTOR_FIELDS,
            rows(&[
                &["Ada Lovelace"],
                &[""],
                &["https://example.org/ada.jpg"],
                &[""],
                &[""],
                &[""],
                &[""],
                &[""],
                &["ada@example.org"],
            ]),
        )
        .await?;
    tables
        .write_range(
            DEFAULT_INSTRUCTOR_TABLE,
            INSTRUCTOR_DESCRIPTION,
            rows(&[
                &["Teaches geography and general science."],
                &["Office hours on Fridays."],
            ]),
        )
        .await?;

    println!(
        "Seeded {} quizzes, {} and {} into {}",
        SAMPLE_QUIZZES.len(),
        DEFAULT_LEADERBOARD_TABLE,
        DEFAULT_INSTRUCTOR_TABLE,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
