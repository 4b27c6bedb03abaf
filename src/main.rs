use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use feasibility::banner::{SessionStats, print_banner, print_session_summary};
use feasibility::cancel;
use feasibility::client::FeasibilityService;
use feasibility::client::http::HttpClient;
use feasibility::commands::{CommandRegistry, CommandResult, SessionInfo, StateChange};
use feasibility::config::{Config, ConfigKey, Overrides, Settings, Source};
use feasibility::consts::{BASE_URL_ENV, LOG_ENV, default_db_path, format_secs};
use feasibility::controller::{Controller, Rejection, StateKind, Submission};
use feasibility::render::{OutputFormat, render};
use feasibility::spinner::Spinner;

#[derive(Parser)]
#[command(
    name = "feasibility",
    version,
    about = "Ask whether a league scenario can still happen."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Feasibility service base URL (overrides FEASIBILITY_API_URL and stored config)
    #[arg(short, long)]
    url: Option<String>,

    /// Seconds to wait for a verdict before giving up
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// SQLite settings store (use :memory: for ephemeral)
    #[arg(short, long)]
    db: Option<String>,

    /// How to print verdicts
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Ask a single scenario and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Read or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one stored setting, or all of them
    Get { key: Option<String> },
    /// Store a setting (base_url or timeout_secs)
    Set { key: String, value: String },
    /// Remove a stored setting
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let db_path = resolve_db_path(cli.db.as_deref())?;
    let store = Config::open(&db_path)?;

    if let Some(Command::Config { action }) = &cli.command {
        handle_config(action, &store)?;
        return Ok(ExitCode::SUCCESS);
    }

    let flags = Overrides {
        base_url: cli.url.clone(),
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let env_url = std::env::var(BASE_URL_ENV).ok();
    let mut settings = Settings::resolve(&flags, env_url, Some(&store))?;
    let mut format = cli.format;

    let mut controller = Controller::new(build_service(&settings)?);

    // Single scenario mode
    if let Some(scenario) = cli.run {
        let submission = ask(&mut controller, &scenario, format, settings.timeout).await;
        return Ok(match submission {
            Submission::Settled(StateKind::Success) => ExitCode::SUCCESS,
            Submission::Rejected(Rejection::Empty) => {
                eprintln!("error: scenario is empty");
                ExitCode::from(2)
            }
            _ => ExitCode::FAILURE,
        });
    }

    let store_label = if db_path == ":memory:" {
        "ephemeral"
    } else {
        db_path.as_str()
    };
    print_banner(&settings, store_label);

    let registry = CommandRegistry::new();
    let mut stats = SessionStats::default();

    // REPL — async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nscenario> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let result = {
            let info = SessionInfo {
                settings: &settings,
                format,
                db_path: Some(store_label),
                controller: Some(&controller),
            };
            registry.dispatch(input, &info).await
        };

        match result {
            CommandResult::NotACommand => {
                match ask(&mut controller, input, format, settings.timeout).await {
                    Submission::Settled(kind) => {
                        stats.submitted += 1;
                        if kind == StateKind::Success {
                            stats.succeeded += 1;
                        } else {
                            stats.failed += 1;
                        }
                    }
                    Submission::Rejected(_) => {}
                }
            }
            CommandResult::Handled => {}
            CommandResult::StateChanged(change) => {
                if let Err(e) =
                    apply_change(change, &mut settings, &mut format, &mut controller, &store)
                {
                    eprintln!("  ✗ {e:#}");
                }
            }
            CommandResult::Quit => break,
        }
    }

    print_session_summary(&stats);
    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so `--format json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_db_path(flag: Option<&str>) -> Result<String> {
    if let Some(path) = flag {
        return Ok(path.to_string());
    }
    let Some(path) = default_db_path() else {
        tracing::warn!("cannot determine home directory, settings will not persist");
        return Ok(":memory:".to_string());
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(path_str(&path)?.to_string())
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("database path is not valid UTF-8: {}", path.display()))
}

fn build_service(settings: &Settings) -> Result<Arc<dyn FeasibilityService>> {
    Ok(Arc::new(HttpClient::new(
        &settings.base_url,
        settings.timeout,
    )?))
}

/// Submit one scenario and print the settled view. Ctrl+C cancels the
/// request instead of abandoning it, so the controller always settles.
async fn ask(
    controller: &mut Controller,
    scenario: &str,
    format: OutputFormat,
    timeout: Duration,
) -> Submission {
    let (handle, token) = cancel::pair();
    let spinner = io::stderr()
        .is_terminal()
        .then(|| Spinner::start("simulating", timeout));

    let submission = {
        let submit = controller.submit(scenario, &token);
        tokio::pin!(submit);
        tokio::select! {
            submission = &mut submit => submission,
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                submit.await
            }
        }
    };

    if let Some(spinner) = spinner {
        spinner.stop().await;
    }
    if let Submission::Settled(_) = submission {
        println!("{}", render(controller.view(), format));
    }
    submission
}

fn apply_change(
    change: StateChange,
    settings: &mut Settings,
    format: &mut OutputFormat,
    controller: &mut Controller,
    store: &Config,
) -> Result<()> {
    match change {
        StateChange::BaseUrl(url) => {
            let stored = store.set(ConfigKey::BaseUrl, &url)?;
            let next = Settings {
                base_url: stored,
                base_url_source: Source::Stored,
                ..settings.clone()
            };
            controller.set_service(build_service(&next)?);
            *settings = next;
            println!("  ✓ service URL set to {}", settings.base_url);
        }
        StateChange::Timeout(timeout) => {
            store.set(ConfigKey::TimeoutSecs, &timeout.as_secs().to_string())?;
            let next = Settings {
                timeout,
                timeout_source: Source::Stored,
                ..settings.clone()
            };
            controller.set_service(build_service(&next)?);
            *settings = next;
            println!("  ✓ timeout set to {}", format_secs(timeout));
        }
        StateChange::Format(next) => *format = next,
        StateChange::Clear => {
            controller.reset();
            println!("{}", render(controller.view(), *format));
        }
    }
    Ok(())
}

fn handle_config(action: &ConfigAction, store: &Config) -> Result<()> {
    match action {
        ConfigAction::Get { key: Some(key) } => {
            let key: ConfigKey = key.parse()?;
            match store.get(key)? {
                Some(value) => println!("{value}"),
                None => println!("{key} is not set"),
            }
        }
        ConfigAction::Get { key: None } => {
            let entries = store.entries()?;
            if entries.is_empty() {
                println!("no settings stored");
            }
            for (key, value) in entries {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            let stored = store.set(key, value)?;
            println!("✓ {key} = {stored}");
        }
        ConfigAction::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            store.remove(key)?;
            println!("✓ {key} removed");
        }
    }
    Ok(())
}
