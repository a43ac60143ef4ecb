//! Ôn tập AI · Study Assistant Backend
//!
//! - Axum HTTP + WebSocket API
//! - Structured study packages and suggestions from an OpenAI-compatible model
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables generation if present
//!   OPENAI_BASE_URL     : default "https://generativelanguage.googleapis.com/v1beta/openai"
//!   OPENAI_MODEL        : default "gemini-2.5-flash"
//!   OPENAI_TIMEOUT_SECS : request timeout, default 90
//!   STUDY_CONFIG_PATH   : path to TOML config (prompts + option catalog)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod schema;
mod prompt;
mod generation;
mod openai;
mod postprocess;
mod logic;
mod session;
mod export;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (model client, prompts, option catalog).
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "ontap_backend", %addr, backend = %state.client.describe(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "ontap_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "ontap_backend", error = %e, "Failed to listen for Ctrl+C");
  }
}
