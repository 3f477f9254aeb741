//! Stream relay: bridges a provider streaming call to the session store.
//!
//! The relay is an explicit two-channel contract. [`relay`] returns:
//!
//! 1. a [`LiveReply`] handle -- a watch channel carrying the accumulated
//!    reply text. Latest value wins; consumers are not required to observe
//!    every intermediate value, but the final value is always observable
//!    before the handle closes.
//! 2. a completion future with exactly one terminal outcome. On success the
//!    accumulated text has been appended to the session as a single
//!    assistant turn. On provider error -- or if the future is dropped
//!    before completion -- nothing is appended and the handle closes without
//!    a final update.
//!
//! The future does not run detached: the caller drives it, so abandoning the
//! calling context abandons the provider call with it.

use std::future::Future;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use vulnchat_types::error::RelayError;
use vulnchat_types::llm::{ChatMessage, CompletionRequest, ModelConfig, StreamEvent};
use vulnchat_types::turn::Turn;

use crate::llm::provider::LlmProvider;
use crate::session::SessionStore;

/// Read side of the live reply channel. "Latest wins": [`latest`] always
/// returns the most recent accumulated text, skipping anything the consumer
/// missed.
///
/// [`latest`]: LiveReply::latest
#[derive(Debug, Clone)]
pub struct LiveReply {
    rx: watch::Receiver<String>,
}

impl LiveReply {
    fn new(rx: watch::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Wait for the next update. Returns `false` once the relay has closed
    /// the channel (completion or failure) -- after a final [`latest`] call
    /// the consumer is done.
    ///
    /// [`latest`]: LiveReply::latest
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// The most recent accumulated reply text, marking it as seen.
    pub fn latest(&mut self) -> String {
        self.rx.borrow_and_update().clone()
    }

    /// Peek at the current value without consuming the change notification.
    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }
}

/// Open exactly one provider call for `history` and bridge it to the
/// session store.
///
/// `history` must already include the user turn that triggered this
/// exchange; it is forwarded in full (role, content, optional name) together
/// with `system_prompt`. The returned future owns the provider stream, so it
/// stays valid after the `provider` borrow ends.
pub fn relay<P: LlmProvider>(
    provider: &P,
    sessions: SessionStore,
    session_id: Uuid,
    history: Vec<Turn>,
    system_prompt: &str,
    config: &ModelConfig,
) -> (
    LiveReply,
    impl Future<Output = Result<Turn, RelayError>> + Send + 'static,
) {
    let request = CompletionRequest {
        model: config.model.clone(),
        messages: history
            .iter()
            .map(|t| ChatMessage {
                role: t.role,
                content: t.content.clone(),
                name: t.name.clone(),
            })
            .collect(),
        system: Some(system_prompt.to_string()),
        max_tokens: config.max_tokens,
        temperature: Some(config.temperature),
    };

    let mut stream = provider.stream(request);
    let provider_name = provider.name().to_string();
    let (tx, rx) = watch::channel(String::new());

    let completion = async move {
        let mut accumulated = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Connected => {
                    debug!(%session_id, provider = %provider_name, "provider stream opened");
                }
                StreamEvent::TextDelta { text } => {
                    accumulated.push_str(&text);
                    // Receivers may be gone (client disconnected mid-read);
                    // the exchange still completes and persists.
                    let _ = tx.send(accumulated.clone());
                }
                StreamEvent::Done => break,
            }
        }

        // A stream that produced no text would yield an invalid empty turn;
        // validate() surfaces that before anything is appended.
        let turn = Turn::assistant(accumulated);
        turn.validate()?;
        sessions.append(session_id, turn.clone())?;
        debug!(%session_id, chars = turn.content.len(), "assistant turn appended");

        drop(tx);
        Ok(turn)
    };

    (LiveReply::new(rx), completion)
}
