mod console;

use std::fmt;
use std::sync::Arc;

use quiz_core::model::{ParticipantEmail, QuizReport, Theme};
use services::{
    BackupQuestionSource, Clock, OpenTdbSource, QuestionOrigin, QuestionSource, QuizCommand,
    QuizConfig, QuizController, QuizOutcome, QuizService, QuizUpdate, QuizView, SettingsService,
    SubmitReason,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::Input;

type StdinLines = Lines<BufReader<Stdin>>;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTimeLimit { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--time-limit <secs>] [--email <address>] [--offline]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --time-limit {}", services::quiz::DEFAULT_TIME_LIMIT_SECS);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_TIME_LIMIT_SECS, QUIZ_QUESTION_URL, QUIZ_QUESTION_COUNT");
    eprintln!("  RUST_LOG (log filter, default \"info\")");
}

struct Args {
    db_url: String,
    time_limit_secs: u64,
    email: Option<String>,
    offline: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut time_limit_secs = std::env::var("QUIZ_TIME_LIMIT_SECS")
            .ok()
            .as_deref()
            .and_then(parse_time_limit)
            .unwrap_or(services::quiz::DEFAULT_TIME_LIMIT_SECS);
        let mut email = None;
        let mut offline = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    time_limit_secs = parse_time_limit(&value)
                        .ok_or(ArgsError::InvalidTimeLimit { raw: value })?;
                }
                "--email" => email = Some(require_value(args, "--email")?),
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            time_limit_secs,
            email,
            offline,
        })
    }
}

/// A time limit must be a positive number of seconds.
fn parse_time_limit(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_participant(
    lines: &mut StdinLines,
    preset: Option<String>,
) -> Result<ParticipantEmail, Box<dyn std::error::Error>> {
    if let Some(raw) = preset {
        return Ok(ParticipantEmail::parse(&raw)?);
    }

    loop {
        println!("Enter your email to start the quiz:");
        let Some(line) = lines.next_line().await? else {
            return Err("no email entered".into());
        };
        match ParticipantEmail::parse(&line) {
            Ok(email) => return Ok(email),
            Err(err) => println!("{err}"),
        }
    }
}

/// Pump stdin into the runner and print its updates until the quiz ends.
async fn play(
    service: &QuizService,
    settings: &SettingsService,
    controller: QuizController,
    lines: &mut StdinLines,
) -> Result<QuizOutcome, Box<dyn std::error::Error>> {
    let mut theme = settings.load().await?.theme();
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (upd_tx, mut updates) = mpsc::unbounded_channel();
    let runner = service.runner();
    let task = tokio::spawn(async move { runner.run(controller, cmd_rx, upd_tx).await });

    let mut view: Option<QuizView> = None;
    let mut pending_confirm = false;
    let mut commands = Some(cmd_tx);

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update {
                    QuizUpdate::View(next) => {
                        print!("{}", console::render_view(&next, theme));
                        view = Some(next);
                    }
                    QuizUpdate::Rejected(err) => println!("{err}"),
                    QuizUpdate::ConfirmSubmit(check) => {
                        pending_confirm = true;
                        println!("{}", console::render_confirm(check));
                    }
                    QuizUpdate::Tick { remaining_secs } => {
                        if let Some(line) = console::render_tick(remaining_secs) {
                            println!("{line}");
                        }
                    }
                }
            }
            line = lines.next_line(), if commands.is_some() => {
                let Some(line) = line? else {
                    // stdin closed: dropping the sender abandons the quiz
                    commands = None;
                    continue;
                };
                let input = console::parse_input(&line, view.as_ref(), pending_confirm);
                pending_confirm = false;
                match input {
                    Input::Quiz(command) => {
                        if let Some(tx) = &commands {
                            if tx.send(command).await.is_err() {
                                commands = None;
                            }
                        }
                    }
                    Input::ToggleTheme => {
                        theme = settings.toggle_theme().await?.theme();
                        println!("theme: {theme}");
                    }
                    Input::Overview => {
                        if let Some(view) = &view {
                            println!("{}", console::render_overview(view));
                        }
                    }
                    Input::Help => println!("{}", console::HELP),
                    Input::Invalid(message) => println!("{message}"),
                }
            }
        }
    }

    Ok(task.await??)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let settings = SettingsService::new(Arc::clone(&storage.settings));
    let theme: Theme = settings.load().await?.theme();
    info!(db = %parsed.db_url, theme = %theme, "storage ready");

    let source: Arc<dyn QuestionSource> = if parsed.offline {
        Arc::new(BackupQuestionSource)
    } else {
        Arc::new(OpenTdbSource::from_env())
    };
    let service = QuizService::new(Clock::default_clock(), source)
        .with_config(QuizConfig::default().with_time_limit_secs(parsed.time_limit_secs));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let participant = read_participant(&mut lines, parsed.email).await?;
    let email = participant.as_str().to_owned();

    let (controller, origin) = service.start_quiz(participant).await?;
    if origin == QuestionOrigin::Backup {
        println!("Could not load fresh questions, using the built-in set.");
    }
    println!(
        "{} questions, {} to finish. Type 'h' for help.",
        controller.state().len(),
        services::quiz::format_remaining(parsed.time_limit_secs)
    );

    let outcome = play(&service, &settings, controller, &mut lines).await?;
    if outcome.reason == SubmitReason::TimeExpired {
        println!("\nTime is up! Your answers were submitted automatically.");
    }
    let report = QuizReport::from_snapshot(&outcome.snapshot);
    print!("{}", console::render_report(&report, &email));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|a| (*a).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--time-limit",
            "60",
            "--email",
            "a@b.co",
            "--offline",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.time_limit_secs, 60);
        assert_eq!(args.email.as_deref(), Some("a@b.co"));
        assert!(args.offline);
    }

    #[test]
    fn bad_flags_are_reported() {
        assert!(matches!(
            parse(&["--time-limit", "0"]),
            Err(ArgsError::InvalidTimeLimit { .. })
        ));
        assert!(matches!(
            parse(&["--time-limit"]),
            Err(ArgsError::MissingValue { flag: "--time-limit" })
        ));
        assert!(matches!(parse(&["--deck"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn zero_time_limit_is_never_accepted() {
        assert_eq!(parse_time_limit("0"), None);
        assert_eq!(parse_time_limit("abc"), None);
        assert_eq!(parse_time_limit(" 90 "), Some(90));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite://x.db".into()),
            "sqlite://x.db"
        );
    }
}
