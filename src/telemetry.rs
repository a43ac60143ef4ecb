//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,study=debug,ontap_backend=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! `study` carries generation/session events; `ontap_backend` carries server and transport events.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,study=debug,ontap_backend=debug,tower_http=info,axum=info";

fn env_filter(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let raw = std::env::var("LOG_LEVEL").ok();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(raw.as_deref()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
