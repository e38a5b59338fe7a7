use std::fmt;
use std::sync::Arc;

use services::{AppServices, Clock, ProgressService};
use tracing_subscriber::EnvFilter;

mod catalog;

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

struct Args {
    db_url: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- status     [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- lessons    [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- challenges [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Lessons,
    Challenges,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "lessons" => Some(Self::Lessons),
            "challenges" => Some(Self::Challenges),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("LEARN_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into()),
        );

        while let Some(arg) = args.next() {
            match arg.as_str() {
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

        Ok(Self { db_url })
    }
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

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── REPORTS ───────────────────────────────────────────────────────────────────
//

fn format_secs(secs: f64) -> String {
    // Whole seconds are enough for a listing.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

async fn print_status(app: &AppServices) {
    let progress = app.progress();
    match app.accounts().current_user().await {
        Some(user) => println!("Signed in as {} <{}>", user.name(), user.email()),
        None => println!("Not signed in"),
    }

    let overall = progress.overall_progress().await;
    println!(
        "Lessons completed: {}/{} ({}%)",
        overall.completed,
        overall.total,
        overall.percent()
    );
    for section in progress.catalog().sections() {
        let count = progress.section_progress(section.id()).await;
        println!(
            "  {:<32} {}/{} ({}%)",
            section.title(),
            count.completed,
            count.total,
            count.percent()
        );
    }

    println!(
        "Challenges solved: {}/{} ({} points)",
        progress.completed_challenges().await,
        progress.catalog().challenges().len(),
        progress.total_points().await
    );

    let stats = progress.stats().await;
    println!("Average improvement: {}%", stats.average_improvement);
    println!("Study time: {} min", stats.total_study_minutes);
    println!("Streak: {}", stats.streak);
    if !stats.recently_completed.is_empty() {
        println!("Recently completed:");
        for lesson_id in &stats.recently_completed {
            if let Some(lesson) = progress.catalog().lesson(lesson_id) {
                println!("  {}", lesson.title());
            }
        }
    }
}

async fn print_lessons(progress: &ProgressService) {
    for section in progress.catalog().sections() {
        println!("{}", section.title());
        for lesson in progress.catalog().lessons_in_section(section.id()) {
            let record = progress.lesson_progress(lesson.id()).await;
            let marker = if record.is_completed() {
                "done"
            } else if progress.is_lesson_unlocked(lesson.id()).await {
                "open"
            } else {
                "locked"
            };
            let scores = match (record.pre_test_score(), record.post_test_score()) {
                (Some(pre), Some(post)) => format!("pre {pre}, post {post}"),
                (Some(pre), None) => format!("pre {pre}"),
                (None, Some(post)) => format!("post {post}"),
                (None, None) => String::new(),
            };
            println!(
                "  {:>2}. {:<32} {:<6} {:>3} min  {scores}",
                lesson.order(),
                lesson.title(),
                marker,
                lesson.estimated_minutes()
            );
        }
    }
}

async fn print_challenges(progress: &ProgressService) {
    for challenge in progress.catalog().challenges() {
        let record = progress.challenge_progress(challenge.id()).await;
        let marker = if record.is_completed() {
            "done"
        } else if progress.is_challenge_unlocked(challenge.id()).await {
            "open"
        } else {
            "locked"
        };
        let best = record
            .best_time_secs()
            .map(|secs| format!("best {}", format_secs(secs)))
            .unwrap_or_default();
        println!(
            "  {:>2}. {:<24} {:<6} {:<6} {:>3} pts  {best}",
            challenge.order(),
            challenge.title(),
            challenge.difficulty(),
            marker,
            challenge.points()
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Status,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Status,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging();

    let catalog = Arc::new(catalog::builtin_course()?);
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), catalog).await?;
    tracing::debug!(db = %parsed.db_url, ?cmd, "services ready");

    match cmd {
        Command::Status => print_status(&app).await,
        Command::Lessons => print_lessons(app.progress()).await,
        Command::Challenges => print_challenges(app.progress()).await,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
