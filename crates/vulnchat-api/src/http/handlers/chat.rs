//! SSE streaming chat endpoint.
//!
//! POST /api/v1/chats/{id}/stream (and POST /api/v1/chats/stream for a
//! fresh session)
//!
//! Submits one user turn and streams the reply as Server-Sent Events.
//! Authentication is optional: anonymous exchanges run but are never
//! persisted.
//!
//! SSE event types:
//! - `session` — initial event with `{ "session_id": "..." }`
//! - `text` — the accumulated reply so far: `{ "text": "..." }`. Latest
//!   wins; intermediate events may be skipped under load, the final value is
//!   always delivered.
//! - `done` — stream complete: `{}`
//! - `error` — the exchange failed; nothing was appended or persisted:
//!   `{ "message": "..." }`

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use secrecy::SecretString;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use vulnchat_core::chat::service::{SubmitRequest, Submission};
use vulnchat_infra::llm::openai::OpenAiProvider;
use vulnchat_infra::secret::env::resolve_api_key;
use vulnchat_types::prompt::{PromptMode, Topic};

use crate::http::error::AppError;
use crate::http::extractors::auth::MaybeAuthenticated;
use crate::state::AppState;

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    /// The user message to submit.
    pub content: String,
    /// Demo topic; absent means the general assistant prompt.
    pub topic: Option<String>,
    /// Hardened (true) or deliberately permissive (false) prompting.
    #[serde(default)]
    pub secure: bool,
    /// Per-request OpenAI API key overriding the environment key.
    pub api_key: Option<SecretString>,
}

/// POST /api/v1/chats/{id}/stream — continue an existing session.
pub async fn stream_chat(
    State(state): State<AppState>,
    MaybeAuthenticated(actor): MaybeAuthenticated,
    Path(session_id): Path<String>,
    Json(body): Json<StreamChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session_id = session_id
        .parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {session_id}")))?;
    run_stream(state, actor, Some(session_id), body).await
}

/// POST /api/v1/chats/stream — start a fresh session.
pub async fn stream_new_chat(
    State(state): State<AppState>,
    MaybeAuthenticated(actor): MaybeAuthenticated,
    Json(body): Json<StreamChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    run_stream(state, actor, None, body).await
}

async fn run_stream(
    state: AppState,
    actor: Option<vulnchat_types::identity::Identity>,
    session_id: Option<Uuid>,
    body: StreamChatRequest,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // An absent topic is the explicit general default; an unrecognized one
    // is a caller error, never a silent fallback.
    let topic = match body.topic.as_deref() {
        None | Some("") => Topic::General,
        Some(raw) => raw.parse().map_err(AppError::Validation)?,
    };
    let mode = PromptMode::from_secure_flag(body.secure);

    // Credential precondition: resolved before any provider call is opened.
    let api_key = resolve_api_key(body.api_key)?;
    let provider = OpenAiProvider::new(&api_key);

    let Submission {
        session_id,
        mut live,
        completion,
    } = state
        .chat_service
        .submit(
            &provider,
            actor.as_ref(),
            SubmitRequest {
                session_id,
                content: body.content,
                topic,
                mode,
            },
        )
        .await?;

    // The completion future is driven inside the response stream: if the
    // client disconnects, the stream is dropped and the exchange is
    // cancelled with it -- no detached work survives the request.
    let sse_stream = async_stream::stream! {
        let session_json = serde_json::json!({ "session_id": session_id });
        yield Ok::<_, Infallible>(Event::default().event("session").data(session_json.to_string()));

        let mut completion = completion;
        let mut live_open = true;
        let outcome = loop {
            let update = tokio::select! {
                result = &mut completion => break result,
                changed = live.changed(), if live_open => {
                    if changed {
                        Some(live.latest())
                    } else {
                        live_open = false;
                        None
                    }
                }
            };
            if let Some(text) = update {
                let data = serde_json::json!({ "text": text });
                yield Ok(Event::default().event("text").data(data.to_string()));
            }
        };

        match outcome {
            Ok(turn) => {
                // The final value is always observable, even if every
                // intermediate update was skipped.
                let data = serde_json::json!({ "text": turn.content });
                yield Ok(Event::default().event("text").data(data.to_string()));
                yield Ok(Event::default().event("done").data("{}"));
            }
            Err(e) => {
                let data = serde_json::json!({ "message": e.to_string() });
                yield Ok(Event::default().event("error").data(data.to_string()));
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
