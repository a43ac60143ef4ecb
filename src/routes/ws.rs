//! WebSocket upgrade + message loop. Each connection owns one study session.
//! Quick messages are answered inline; generation requests run on their own task
//! and report back through a channel, so a slow summary never blocks a suggestion.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, Instrument};
use uuid::Uuid;

use crate::domain::RequestKind;
use crate::error::StudyError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::StudySession;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "ontap_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(session = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "ontap_backend", "WebSocket connected");
  let session = StudySession::new(state);
  let (tx, mut rx) = mpsc::unbounded_channel::<ServerWsMessage>();

  loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                debug!(target: "ontap_backend", "WS received: {:?}", &incoming);
                handle_client_ws(incoming, &session, &tx).await
              }
              Err(e) => Some(ServerWsMessage::Error {
                request: None,
                kind: "invalid_message".into(),
                message: format!("Invalid JSON: {}", e),
              }),
            };
            if let Some(reply) = reply {
              if !send_json(&mut socket, &reply).await { break; }
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      Some(reply) = rx.recv() => {
        if !send_json(&mut socket, &reply).await { break; }
      }
    }
  }
  info!(target: "ontap_backend", "WebSocket disconnected");
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "kind": "internal", "message": format!("Serialization error: {}", e) }).to_string()
  });
  match socket.send(Message::Text(out)).await {
    Ok(()) => true,
    Err(e) => {
      error!(target: "ontap_backend", error = %e, "WS send error");
      false
    }
  }
}

/// Answers quick messages directly; generation requests are spawned and reply through `tx`.
async fn handle_client_ws(
  msg: ClientWsMessage,
  session: &StudySession,
  tx: &mpsc::UnboundedSender<ServerWsMessage>,
) -> Option<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => Some(ServerWsMessage::Pong),

    ClientWsMessage::GetState => Some(ServerWsMessage::State { state: session.snapshot().await }),

    ClientWsMessage::UpdateConfig { config } => {
      session.update_config(config).await;
      Some(ServerWsMessage::State { state: session.snapshot().await })
    }

    ClientWsMessage::ClearSummary => {
      session.clear_summary().await;
      Some(ServerWsMessage::State { state: session.snapshot().await })
    }

    ClientWsMessage::RequestSummary { config } => {
      let session = session.clone();
      spawn_reply(tx, RequestKind::Summary, async move {
        session.request_summary(config).await.map(|summary| ServerWsMessage::Summary { summary })
      });
      None
    }

    ClientWsMessage::SuggestTopic { subject, grade, textbook } => {
      let session = session.clone();
      spawn_reply(tx, RequestKind::TopicSuggestion, async move {
        session
          .request_topic_suggestion(&subject, &grade, &textbook)
          .await
          .map(|topic| ServerWsMessage::TopicSuggestion { topic })
      });
      None
    }

    ClientWsMessage::SuggestObjectives { subject, grade, textbook, main_topic } => {
      let session = session.clone();
      spawn_reply(tx, RequestKind::ObjectivesSuggestion, async move {
        session
          .request_objectives_suggestion(&subject, &grade, &textbook, &main_topic)
          .await
          .map(|objectives| ServerWsMessage::ObjectivesSuggestion { objectives })
      });
      None
    }
  }
}

fn spawn_reply<F>(tx: &mpsc::UnboundedSender<ServerWsMessage>, request: RequestKind, fut: F)
where
  F: std::future::Future<Output = Result<ServerWsMessage, StudyError>> + Send + 'static,
{
  let tx = tx.clone();
  let span = tracing::info_span!(target: "ontap_backend", "ws_request", request = request.as_str());
  tokio::spawn(
    async move {
      let reply = match fut.await {
        Ok(msg) => msg,
        Err(StudyError::Superseded) => {
          debug!(target: "study", "stale completion dropped");
          return;
        }
        Err(e) => ServerWsMessage::from_error(request, &e),
      };
      // The receiver is gone once the socket closes.
      let _ = tx.send(reply);
    }
    .instrument(span),
  );
}
