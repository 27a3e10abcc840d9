//! HTTP server wiring for subtrack.
//!
//! Loads [`ServerConfig`] and wraps the JSON API router from `subtrack-api`
//! in panic recovery, a per-request deadline, and request logging.

use std::{any::Any, path::Path, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::json;
use subtrack_core::store::SubscriptionStore;
use tower_http::{
  LatencyUnit,
  catch_panic::CatchPanicLayer,
  timeout::TimeoutLayer,
  trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Sources, lowest priority first: built-in defaults, the TOML file,
/// `SUBTRACK_*` environment variables, and finally `DB_URL`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  /// Store connection string, see
  /// [`SqliteStore::connect`](subtrack_store_sqlite::SqliteStore::connect).
  pub db_url:               String,
  /// Requests running longer than this are cancelled.
  pub request_timeout_secs: u64,
}

impl ServerConfig {
  /// Load from an optional TOML file at `path` plus the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_layers(
      File::from(path).required(false),
      std::env::var("DB_URL").ok(),
    )
  }

  fn from_layers<F>(file: F, db_url: Option<String>) -> Result<Self, ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
  {
    Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080)?
      .set_default("request_timeout_secs", 10)?
      .add_source(file)
      .add_source(Environment::with_prefix("SUBTRACK"))
      .set_override_option("db_url", db_url.filter(|url| !url.trim().is_empty()))?
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with the server middleware applied.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SubscriptionStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  with_middleware(subtrack_api::router(store), config.request_timeout())
}

/// Innermost first: panic recovery, the request deadline, request logging.
///
/// A request past its deadline gets `408` and its handler future is dropped.
/// A statement already queued on the SQLite connection thread still runs to
/// completion.
fn with_middleware(router: Router, timeout: Duration) -> Router {
  router
    .layer(CatchPanicLayer::custom(panic_response))
    .layer(TimeoutLayer::new(timeout))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
          DefaultOnResponse::new()
            .level(Level::INFO)
            .latency_unit(LatencyUnit::Millis),
        ),
    )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
  let detail = panic
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| panic.downcast_ref::<&str>().copied())
    .unwrap_or("unknown panic");
  tracing::error!(panic = detail, "request handler panicked");

  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "internal server error" })),
  )
    .into_response()
}
