mod terminal;

use std::fmt;

use services::question_source::QuestionQuery;
use services::{AppServices, Clock};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trivia_core::countdown::DEFAULT_QUESTION_SECONDS;
use trivia_core::model::{Difficulty, QuestionDraft, QuestionId};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDifficulty { raw: String },
    InvalidSource { raw: String },
    InvalidDbUrl { raw: String },
    InvalidId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(sub) => write!(f, "unknown subcommand: {sub}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (easy|medium|hard|any)")
            }
            ArgsError::InvalidSource { raw } => {
                write!(f, "invalid --source value: {raw} (api|bank)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid --id value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play [--amount N] [--category C|any] [--difficulty D|any]");
    eprintln!("                           [--timer SECS] [--source api|bank] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- bank list   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- bank add    --question TEXT --correct TEXT");
    eprintln!("                                  --incorrect A,B,C [--category TEXT]");
    eprintln!("                                  [--difficulty easy|medium|hard] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- bank edit   --id ID <same flags as add>");
    eprintln!("  cargo run -p app -- bank delete --id ID [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --amount 10, --category 17, --difficulty easy, --timer {DEFAULT_QUESTION_SECONDS}");
    eprintln!("  --source api, --db sqlite://trivia.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIVIA_DB_URL, TRIVIA_API_URL, RUST_LOG");
}

//
// ─── ARGUMENT PARSING ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizSource {
    Api,
    Bank,
}

#[derive(Debug)]
struct PlayArgs {
    db_url: String,
    query: QuestionQuery,
    timer_secs: u32,
    source: QuizSource,
}

#[derive(Debug)]
enum BankCommand {
    List,
    Add(QuestionDraft),
    Edit(QuestionId, QuestionDraft),
    Delete(QuestionId),
}

#[derive(Debug)]
struct BankArgs {
    db_url: String,
    command: BankCommand,
}

fn default_db_url() -> String {
    std::env::var("TRIVIA_DB_URL")
        .ok()
        .map_or_else(|| "sqlite://trivia.sqlite3".into(), normalize_sqlite_url)
}

fn parse_u32(flag: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_play(args: &mut impl Iterator<Item = String>) -> Result<PlayArgs, ArgsError> {
    let mut db_url = default_db_url();
    let mut query = QuestionQuery::default();
    let mut timer_secs = DEFAULT_QUESTION_SECONDS;
    let mut source = QuizSource::Api;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--amount" => {
                query.amount = parse_u32("--amount", require_value(args, "--amount")?)?;
            }
            "--category" => {
                let value = require_value(args, "--category")?;
                query.category = if value == "any" {
                    None
                } else {
                    Some(parse_u32("--category", value)?)
                };
            }
            "--difficulty" => {
                let value = require_value(args, "--difficulty")?;
                query.difficulty = if value == "any" {
                    None
                } else {
                    Some(
                        value
                            .parse::<Difficulty>()
                            .map_err(|_| ArgsError::InvalidDifficulty { raw: value })?,
                    )
                };
            }
            "--timer" => {
                timer_secs = parse_u32("--timer", require_value(args, "--timer")?)?;
            }
            "--source" => {
                let value = require_value(args, "--source")?;
                source = match value.as_str() {
                    "api" => QuizSource::Api,
                    "bank" => QuizSource::Bank,
                    _ => return Err(ArgsError::InvalidSource { raw: value }),
                };
            }
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(PlayArgs {
        db_url,
        query,
        timer_secs,
        source,
    })
}

fn parse_bank(
    sub: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<BankArgs, ArgsError> {
    let mut db_url = default_db_url();
    let mut id = None;
    let mut text = String::new();
    let mut correct_answer = String::new();
    let mut incorrect_answers = Vec::new();
    let mut category = String::from("General Knowledge");
    let mut difficulty = Difficulty::Easy;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--id" => {
                let value = require_value(args, "--id")?;
                id = Some(
                    value
                        .parse::<QuestionId>()
                        .map_err(|_| ArgsError::InvalidId { raw: value })?,
                );
            }
            "--question" => text = require_value(args, "--question")?,
            "--correct" => correct_answer = require_value(args, "--correct")?,
            "--incorrect" => {
                incorrect_answers = require_value(args, "--incorrect")?
                    .split(',')
                    .map(|answer| answer.trim().to_string())
                    .filter(|answer| !answer.is_empty())
                    .collect();
            }
            "--category" => category = require_value(args, "--category")?,
            "--difficulty" => {
                let value = require_value(args, "--difficulty")?;
                difficulty = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidDifficulty { raw: value })?;
            }
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    let draft = QuestionDraft {
        text,
        correct_answer,
        incorrect_answers,
        category,
        difficulty,
    };

    let command = match sub {
        "list" => BankCommand::List,
        "add" => BankCommand::Add(draft),
        "edit" => BankCommand::Edit(id.ok_or(ArgsError::MissingValue { flag: "--id" })?, draft),
        "delete" => BankCommand::Delete(id.ok_or(ArgsError::MissingValue { flag: "--id" })?),
        other => return Err(ArgsError::UnknownSubcommand(other.to_string())),
    };

    Ok(BankArgs { db_url, command })
}

//
// ─── SQLITE GLUE ───────────────────────────────────────────────────────────────
//

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

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn run_play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let services =
        AppServices::new_sqlite(&args.db_url, Clock::default(), args.timer_secs).await?;
    info!(db = %args.db_url, timer = args.timer_secs, "services ready");

    loop {
        let started = match args.source {
            QuizSource::Api => services.quiz().start_quiz(args.query).await,
            QuizSource::Bank => {
                let bank = services.question_bank();
                services.quiz().start_from_bank(&bank).await
            }
        };

        let controller = match started {
            Ok(controller) => controller,
            Err(err) => {
                eprintln!("Could not load questions: {err}");
                return Err(err.into());
            }
        };

        if !terminal::run_quiz(controller).await? {
            return Ok(());
        }
    }
}

async fn run_bank(args: BankArgs) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let services =
        AppServices::new_sqlite(&args.db_url, Clock::default(), DEFAULT_QUESTION_SECONDS).await?;
    let bank = services.question_bank();

    match args.command {
        BankCommand::List => {
            let questions = bank.list().await?;
            if questions.is_empty() {
                println!("The question bank is empty.");
                return Ok(());
            }
            for question in questions {
                let record = question.record();
                println!(
                    "{} · [{}] {} · {}",
                    question.id(),
                    record.difficulty(),
                    record.category(),
                    record.text()
                );
                println!("    correct:   {}", record.correct_answer());
                println!("    incorrect: {}", record.incorrect_answers().join(", "));
            }
        }
        BankCommand::Add(draft) => {
            let id = bank.create(draft).await?;
            println!("Created question {id}.");
        }
        BankCommand::Edit(id, draft) => {
            bank.update(id, draft).await?;
            println!("Updated question {id}.");
        }
        BankCommand::Delete(id) => {
            bank.delete(id).await?;
            println!("Deleted question {id}.");
        }
    }

    Ok(())
}

//
// ─── ENTRY POINT ───────────────────────────────────────────────────────────────
//

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let first = args.next();

    match first.as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some("play") => {
            let parsed = parse_play(&mut args).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            run_play(parsed).await
        }
        Some("bank") => {
            let sub = args.next().unwrap_or_else(|| "list".into());
            let parsed = parse_bank(&sub, &mut args).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            run_bank(parsed).await
        }
        Some(other) => {
            let err = ArgsError::UnknownSubcommand(other.to_string());
            eprintln!("{err}");
            print_usage();
            Err(err.into())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
