//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::config::Catalog;
use crate::domain::{McqDifficulty, RequestKind, StudyConfiguration, StudyPackage};
use crate::error::StudyError;
use crate::session::SessionSnapshot;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetState,
    UpdateConfig {
        config: StudyConfiguration,
    },
    RequestSummary {
        config: StudyConfiguration,
    },
    SuggestTopic {
        subject: String,
        grade: String,
        textbook: String,
    },
    SuggestObjectives {
        subject: String,
        grade: String,
        textbook: String,
        #[serde(rename = "mainTopic")]
        main_topic: String,
    },
    ClearSummary,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        state: SessionSnapshot,
    },
    Summary {
        summary: StudyPackage,
    },
    TopicSuggestion {
        topic: String,
    },
    ObjectivesSuggestion {
        objectives: String,
    },
    Error {
        request: Option<RequestKind>,
        kind: String,
        message: String,
    },
}

impl ServerWsMessage {
    pub fn from_error(request: RequestKind, e: &StudyError) -> Self {
        Self::Error {
            request: Some(request),
            kind: e.kind().to_string(),
            message: e.user_message(request),
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct TopicIn {
    pub subject: String,
    pub grade: String,
    pub textbook: String,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicOut {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectivesIn {
    pub subject: String,
    pub grade: String,
    pub textbook: String,
    #[serde(default)]
    pub main_topic: String,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectivesOut {
    pub objectives: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIn {
    #[serde(default)]
    pub main_topic: String,
    pub summary: StudyPackage,
}

/// Option lists for the form.
#[derive(Debug, Serialize)]
pub struct OptionsOut {
    pub subjects: Vec<String>,
    pub grades: Vec<String>,
    pub textbooks: Vec<String>,
    pub difficulties: Vec<McqDifficulty>,
    pub defaults: StudyConfiguration,
}

impl From<&Catalog> for OptionsOut {
    fn from(c: &Catalog) -> Self {
        Self {
            subjects: c.subjects.clone(),
            grades: c.grades.clone(),
            textbooks: c.textbooks.clone(),
            difficulties: c.difficulties.clone(),
            defaults: c.defaults.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub kind: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
