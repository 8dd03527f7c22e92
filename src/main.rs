mod terminal;

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use rollbook::{Config, HttpAuthClient, RecordStore, SqliteKv, Student};
use std::path::PathBuf;
use terminal::Terminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollbook")]
#[command(about = "Rollbook - Student records with on-device persistence and remote login")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (default: <config_dir>/rollbook/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the login endpoint
    #[arg(long)]
    login_url: Option<String>,

    /// Override the SQLite storage file
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session, starting at the login screen
    Run,

    /// Print stored students without logging in
    List,
}

fn main() -> Result<()> {
    // Setup tracing; stderr keeps log lines out of the prompts
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.login_url {
        config.auth.login_url = url;
    }
    if let Some(db) = cli.db {
        config.storage.path = db;
    }

    let mut kv = SqliteKv::open(&config.storage.path)
        .with_context(|| format!("Failed to open store at {}", config.storage.path.display()))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut term = Terminal::new(stdin.lock(), stdout.lock());

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let client = HttpAuthClient::new(config.auth.login_url.clone(), config.auth.timeout());
            terminal::run_session(&mut term, &client, &mut kv)?;
        }
        Commands::List => {
            let store: RecordStore<Student, _> = RecordStore::open(&mut kv);
            term.print_records(store.records())?;
        }
    }

    Ok(())
}
