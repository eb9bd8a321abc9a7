use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use construction_core::ValidationError;
use construction_sqlite::{Store, StoreError};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;
mod format;
mod materials;
mod project;
mod prompt;

use config::Config;
use materials::MaterialsArgs;
use project::ProjectArgs;
use prompt::Prompter;

/// Environment variable holding the log filter (e.g. `debug`).
const LOG_ENV: &str = "BUILDCLI_LOG";

#[derive(Debug, Parser)]
#[command(name = "buildcli", version)]
#[command(about = "Construction project, materials, and order tracking")]
struct Cli {
    /// SQLite database file (overrides the config file).
    #[arg(long, global = true, env = "BUILDCLI_DB")]
    db: Option<PathBuf>,
    /// YAML config file (default: ./buildcli.yaml when present).
    #[arg(long, global = true, env = "BUILDCLI_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Projects, phases, and milestones.
    Project(ProjectArgs),
    /// Materials, suppliers, inventory, and orders.
    Materials(MaterialsArgs),
    /// Database setup and status.
    Db(DbArgs),
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    operation: DbOperation,
}

#[derive(Debug, Subcommand)]
enum DbOperation {
    /// Create any missing tables.
    Init,
    /// Show table presence and row counts.
    Status,
}

type Console = Prompter<StdinLock<'static>, Stdout>;

/// State shared by every command handler.
pub(crate) struct Context<'a> {
    pub store: &'a Store,
    pub config: &'a Config,
    pub db_path: &'a Path,
    pub prompter: Console,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config::resolve(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let db_path = cli.db.unwrap_or_else(|| config.database.clone());

    let store = Store::open(&db_path)
        .map_err(|err| format!("Failed to open database '{}': {err}", db_path.display()))?;
    store
        .init()
        .map_err(|err| format!("Failed to initialize database '{}': {err}", db_path.display()))?;

    let mut ctx = Context {
        store: &store,
        config: &config,
        db_path: &db_path,
        prompter: Prompter::new(io::stdin().lock(), io::stdout()),
    };
    let result = match cli.command {
        Command::Project(args) => project::run_project(args, &mut ctx),
        Command::Materials(args) => materials::run_materials(args, &mut ctx),
        Command::Db(args) => run_db(args, &ctx),
    };
    drop(ctx);

    store
        .close()
        .map_err(|err| format!("Failed to close database '{}': {err}", db_path.display()))?;
    result
}

fn run_db(args: DbArgs, ctx: &Context<'_>) -> Result<(), String> {
    match args.operation {
        DbOperation::Init => {
            println!("Database initialized at {}", ctx.db_path.display());
            Ok(())
        }
        DbOperation::Status => run_db_status(ctx),
    }
}

fn run_db_status(ctx: &Context<'_>) -> Result<(), String> {
    let status = ctx
        .store
        .status()
        .map_err(|err| format!("Failed to read database status: {err}"))?;

    println!("Database Status:");
    println!("  Path: {}", ctx.db_path.display());
    println!(
        "  Tables: {}",
        if status.tables_exist { "present" } else { "missing" }
    );
    println!("  Projects: {}", status.projects);
    println!("  Phases: {}", status.phases);
    println!("  Milestones: {}", status.milestones);
    println!("  Suppliers: {}", status.suppliers);
    println!("  Materials: {}", status.materials);
    println!("  Inventory records: {}", status.inventory);
    println!("  Orders: {}", status.orders);
    Ok(())
}

/// Splits a service result into a value, a reported outcome, or a fatal
/// error.
///
/// Non-fatal errors are printed to stdout and yield `Ok(None)`. A missing
/// row prints as `"{Entity} not found"`; the rest as
/// `"Failed to {action}: {err}"`.
pub(crate) fn settle<T>(
    result: construction_sqlite::Result<T>,
    action: &str,
) -> Result<Option<T>, String> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(format!("Failed to {action}: {err}")),
        Err(err @ StoreError::NotFound { .. }) => {
            println!("{err}");
            Ok(None)
        }
        Err(err) => {
            println!("Failed to {action}: {err}");
            Ok(None)
        }
    }
}

/// Parses an optional flag value, dropping it with a warning if malformed.
pub(crate) fn optional_flag<T>(
    field: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(field, %err, "ignoring invalid value");
            None
        }
    }
}

/// Resolves an optional field. A passed flag wins; otherwise the user is
/// asked only when the command is running interactively.
pub(crate) fn optional_field<T, R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    interactive: bool,
    label: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
) -> Result<Option<T>, String> {
    match raw {
        Some(_) => Ok(optional_flag(label, raw, parse)),
        None if interactive => prompter.optional(label, parse).map_err(input_error),
        None => Ok(None),
    }
}

/// Resolves a required value from its flag, or asks for it.
///
/// A malformed flag value is reported as `Invalid {label}: ...` and yields
/// `Ok(None)`.
pub(crate) fn required_field<T, R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    label: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
) -> Result<Option<T>, String> {
    match raw {
        Some(raw) => match parse(raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                println!("Invalid {}: {err}", label.to_lowercase());
                Ok(None)
            }
        },
        None => prompter.required(label, parse).map(Some).map_err(input_error),
    }
}

/// Accepts any answer as free text.
pub(crate) fn plain_text(raw: &str) -> Result<String, ValidationError> {
    Ok(raw.to_string())
}

/// Maps a prompt failure to the command's fatal error.
pub(crate) fn input_error(err: io::Error) -> String {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        "input ended before all prompts were answered; nothing was saved".to_string()
    } else {
        format!("Failed to read input: {err}")
    }
}
