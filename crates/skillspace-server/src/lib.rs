//! HTTP server wiring for SkillSpace.
//!
//! Binds the JSON API from `skillspace-api` to a SQLite store, authenticates
//! callers with HTTP Basic against configured accounts, and wraps everything
//! in request tracing.

pub mod auth;
pub mod error;
pub mod import;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use serde::Deserialize;
use skillspace_core::{EngineConfig, EnrollmentEngine, engine::DEFAULT_MAX_WRITE_ATTEMPTS};
use skillspace_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

use auth::{AccountConfig, BasicAuthIdentity};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SKILLSPACE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Load-apply-save cycles per operation before a concurrent update is
  /// reported as a conflict.
  #[serde(default = "default_max_write_attempts")]
  pub max_write_attempts: usize,
  #[serde(default)]
  pub accounts:           Vec<AccountConfig>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_max_write_attempts() -> usize { DEFAULT_MAX_WRITE_ATTEMPTS }

impl ServerConfig {
  /// Read the TOML file at `path` if it exists, then overlay `SKILLSPACE_*`
  /// environment variables.
  pub fn load(path: &Path) -> Result<Self> {
    let cfg = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SKILLSPACE"))
      .build()?
      .try_deserialize()?;
    Ok(cfg)
  }

  /// `store_path` with a leading `~/` expanded to `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig { max_write_attempts: self.max_write_attempts }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
  pub store:         Arc<SqliteStore>,
  pub identity:      Arc<BasicAuthIdentity>,
  pub engine_config: EngineConfig,
}

impl AppState {
  pub fn new(store: SqliteStore, config: &ServerConfig) -> Result<Self> {
    let identity = BasicAuthIdentity::new(config.accounts.iter().cloned())?;
    if identity.is_empty() {
      tracing::warn!("no accounts configured; every request will be rejected");
    }
    Ok(Self {
      store:         Arc::new(store),
      identity:      Arc::new(identity),
      engine_config: config.engine_config(),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router(state: AppState) -> Router {
  let engine =
    EnrollmentEngine::new(state.store.clone(), state.store).with_config(state.engine_config);
  skillspace_api::api_router(engine, state.identity).layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
