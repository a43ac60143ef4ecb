//! Application state: prompts, form catalog, and the structured generation client.
//!
//! This module owns:
//!   - the prompts struct (from TOML or defaults)
//!   - the catalog of subjects/grades/textbooks/difficulties and form defaults
//!   - the generation client (OpenAI-compatible backend, or a disabled one without a key)
//!
//! Nothing here is mutable; per-caller state lives in `session::StudySession`.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::{load_study_config_from_env, Catalog, Prompts};
use crate::generation::{DisabledBackend, ModelBackend, StructuredClient};
use crate::openai::OpenAI;

#[derive(Clone)]
pub struct AppState {
    pub client: StructuredClient,
    pub prompts: Prompts,
    pub catalog: Catalog,
}

impl AppState {
    /// Build state from env: load config, init the model backend.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + catalog).
        let cfg = load_study_config_from_env().unwrap_or_default();

        let backend = select_backend(OpenAI::from_env());

        info!(
            target: "ontap_backend",
            subjects = cfg.catalog.subjects.len(),
            grades = cfg.catalog.grades.len(),
            textbooks = cfg.catalog.textbooks.len(),
            "Catalog loaded"
        );

        Self::with_backend(backend, cfg.prompts, cfg.catalog)
    }

    pub fn with_backend(backend: Arc<dyn ModelBackend>, prompts: Prompts, catalog: Catalog) -> Self {
        Self { client: StructuredClient::new(backend), prompts, catalog }
    }
}

/// Pick the model backend; anything short of a usable client falls back to `DisabledBackend`.
fn select_backend(found: Result<Option<OpenAI>, reqwest::Error>) -> Arc<dyn ModelBackend> {
    match found {
        Ok(Some(oa)) => {
            info!(target: "ontap_backend", base_url = %oa.base_url, model = %oa.model, "Model backend enabled.");
            Arc::new(oa)
        }
        Ok(None) => {
            warn!(target: "ontap_backend", "Model backend disabled (no OPENAI_API_KEY). Every generation request will fail.");
            Arc::new(DisabledBackend)
        }
        Err(e) => {
            error!(target: "ontap_backend", error = %e, "Failed to build the model HTTP client; model backend disabled.");
            Arc::new(DisabledBackend)
        }
    }
}
