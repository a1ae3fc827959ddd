//! skillspace-server binary.
//!
//! Without flags, loads `config.toml` (or `--config`), opens the SQLite
//! store and serves the enrollment API. Two maintenance modes exit instead
//! of serving:
//!
//! ```
//! cargo run -p skillspace-server -- --hash-password
//! cargo run -p skillspace-server -- --import-courses courses.json
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use skillspace_server::{AppState, ServerConfig, auth, import};
use skillspace_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SkillSpace enrollment server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long, conflicts_with = "import_courses")]
  hash_password: bool,

  /// Load a JSON array of courses into the store and exit.
  #[arg(long, value_name = "FILE")]
  import_courses: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  // Needs neither config nor store.
  if cli.hash_password {
    let hash = auth::hash_password(&read_password()?)?;
    println!("{hash}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  let store = open_store(&cfg).await?;

  match cli.import_courses {
    Some(file) => import_from(&store, file).await,
    None => serve(store, &cfg).await,
  }
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let path = cfg.resolved_store_path();
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

async fn import_from(store: &SqliteStore, file: PathBuf) -> anyhow::Result<()> {
  let json = tokio::fs::read_to_string(&file)
    .await
    .with_context(|| format!("failed to read {file:?}"))?;
  let courses = import::parse_courses(&json)
    .with_context(|| format!("failed to load courses from {file:?}"))?;
  let count = import::import_courses(store, &courses).await?;
  tracing::info!(count, file = %file.display(), "course import finished");
  Ok(())
}

async fn serve(store: SqliteStore, cfg: &ServerConfig) -> anyhow::Result<()> {
  let state = AppState::new(store, cfg).context("invalid account configuration")?;
  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  tracing::info!("Listening on http://{address}");
  axum::serve(listener, skillspace_server::router(state))
    .await
    .context("server error")
}

/// Read one line from stdin, without the trailing newline.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
