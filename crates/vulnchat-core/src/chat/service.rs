//! Chat service orchestrating the submit -> relay -> checkpoint pipeline.
//!
//! `ChatService` coordinates the session store, prompt catalog, stream
//! relay, and chat store to run one conversation exchange: append the user
//! turn, open the provider stream, and -- once the stream completes --
//! finalize the session and checkpoint it for authenticated owners.
//!
//! Generic over `ChatStore` to maintain clean architecture (vulnchat-core
//! never depends on vulnchat-infra).

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use vulnchat_types::chat::{ChatRecord, Visibility};
use vulnchat_types::error::{RelayError, RepositoryError, SessionError, SubmitError};
use vulnchat_types::identity::Identity;
use vulnchat_types::llm::ModelConfig;
use vulnchat_types::prompt::{PromptMode, Topic};
use vulnchat_types::turn::Turn;

use crate::chat::repository::ChatStore;
use crate::llm::provider::LlmProvider;
use crate::prompt;
use crate::relay::{relay, LiveReply};
use crate::session::SessionStore;

/// One user turn submitted to a conversation.
///
/// Topic and mode are explicit parameters: the pipeline's inputs are fully
/// determined by its arguments, never read from ambient state.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Existing session to continue; a fresh session is created if absent.
    pub session_id: Option<Uuid>,
    pub content: String,
    pub topic: Topic,
    pub mode: PromptMode,
}

/// An accepted submission: the live reply handle plus the completion future
/// the caller must drive. Dropping `completion` cancels the exchange --
/// nothing is appended or persisted.
pub struct Submission {
    pub session_id: Uuid,
    pub live: LiveReply,
    pub completion: BoxFuture<'static, Result<Turn, RelayError>>,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("session_id", &self.session_id)
            .field("completion", &"<boxed future>")
            .finish_non_exhaustive()
    }
}

/// Orchestrates chat exchanges and owner-scoped record access.
pub struct ChatService<S: ChatStore> {
    store: Arc<S>,
    sessions: SessionStore,
    /// Per-session exchange locks; the guard is carried by the completion
    /// future so it spans the whole exchange.
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
    /// Who opened each in-memory session (`None` for anonymous). A live
    /// session can only be continued by the identity that opened it; the
    /// durable ownership check alone cannot cover never-persisted sessions.
    session_owners: DashMap<Uuid, Option<Uuid>>,
    model: ModelConfig,
}

impl<S: ChatStore + 'static> ChatService<S> {
    pub fn new(store: S, model: ModelConfig) -> Self {
        Self {
            store: Arc::new(store),
            sessions: SessionStore::new(),
            locks: DashMap::new(),
            session_owners: DashMap::new(),
            model,
        }
    }

    /// Access the chat store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the in-memory session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Submit one user turn and open the provider stream for it.
    ///
    /// At most one exchange per session may be in flight; a second
    /// submission fails with [`SessionError::ExchangeInFlight`] instead of
    /// racing the first. A live session can only be continued by the
    /// identity that opened it. If the relay fails, the session is rolled
    /// back to its pre-exchange state so the caller may retry the whole
    /// call.
    pub async fn submit<P: LlmProvider>(
        &self,
        provider: &P,
        actor: Option<&Identity>,
        request: SubmitRequest,
    ) -> Result<Submission, SubmitError> {
        let session_id = request.session_id.unwrap_or_else(Uuid::now_v7);
        let owner_key = actor.map(|a| a.user_id);

        let lock = self
            .locks
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock
            .try_lock_owned()
            .map_err(|_| SessionError::ExchangeInFlight)?;

        if let Some(opened_by) = self.session_owners.get(&session_id) {
            if *opened_by != owner_key {
                return Err(RepositoryError::Unauthorized.into());
            }
        }

        // Continue a checkpointed conversation after the in-memory state is
        // gone (e.g. process restart). A foreign-owned record surfaces as
        // Unauthorized; an absent one starts the session fresh.
        if !self.sessions.contains(&session_id) {
            if let Some(actor) = actor {
                if let Some(record) = self.store.get_chat(&session_id, &actor.user_id).await? {
                    self.sessions.hydrate(session_id, record.turns);
                }
            }
        }
        self.session_owners.insert(session_id, owner_key);

        let restore_len = self.sessions.len(&session_id);
        self.sessions.append(session_id, Turn::user(&request.content))?;
        let history = self.sessions.snapshot(&session_id);
        debug!(%session_id, turns = history.len(), topic = %request.topic, mode = %request.mode, "exchange opened");

        let system_prompt = prompt::system_prompt(request.topic, request.mode);
        let (live, relay_completion) = relay(
            provider,
            self.sessions.clone(),
            session_id,
            history,
            system_prompt,
            &self.model,
        );

        let store = Arc::clone(&self.store);
        let sessions = self.sessions.clone();
        let owner = actor.cloned();
        let (topic, mode) = (request.topic, request.mode);

        let completion = async move {
            let _guard = guard;
            match relay_completion.await {
                Ok(turn) => {
                    let turns = sessions.finalize(&session_id);
                    match owner {
                        Some(owner) => {
                            let record = ChatRecord {
                                id: session_id,
                                owner_id: owner.user_id,
                                title: ChatRecord::derive_title(&turns),
                                turns,
                                topic,
                                mode,
                                // Applies on first insert only; updates keep
                                // the stored share state.
                                visibility: Visibility::Private,
                                created_at: Utc::now(),
                            };
                            match store.save_chat(&record).await {
                                Ok(()) => info!(%session_id, "chat checkpointed"),
                                Err(e) => {
                                    warn!(%session_id, error = %e, "chat checkpoint failed")
                                }
                            }
                        }
                        None => {
                            debug!(%session_id, "anonymous exchange; nothing persisted");
                        }
                    }
                    Ok(turn)
                }
                Err(e) => {
                    sessions.truncate(&session_id, restore_len);
                    warn!(%session_id, error = %e, "relay failed; session rolled back");
                    Err(e)
                }
            }
        }
        .boxed();

        Ok(Submission {
            session_id,
            live,
            completion,
        })
    }

    // --- Owner-scoped record access ---

    /// All chats for the actor, newest first.
    pub async fn list_chats(&self, actor: &Identity) -> Result<Vec<ChatRecord>, RepositoryError> {
        self.store.list_chats(&actor.user_id).await
    }

    /// A single chat, owner-scoped.
    pub async fn get_chat(
        &self,
        actor: &Identity,
        id: &Uuid,
    ) -> Result<Option<ChatRecord>, RepositoryError> {
        self.store.get_chat(id, &actor.user_id).await
    }

    /// A shared chat, readable by anyone holding its link.
    pub async fn get_shared_chat(&self, id: &Uuid) -> Result<Option<ChatRecord>, RepositoryError> {
        self.store.get_shared_chat(id).await
    }

    /// Delete a chat and drop its in-memory session state.
    pub async fn remove_chat(&self, actor: &Identity, id: &Uuid) -> Result<(), RepositoryError> {
        self.store.remove_chat(id, &actor.user_id).await?;
        self.sessions.evict(id);
        self.locks.remove(id);
        self.session_owners.remove(id);
        Ok(())
    }

    /// Delete all of the actor's chats. Returns the number removed.
    pub async fn clear_chats(&self, actor: &Identity) -> Result<u64, RepositoryError> {
        self.store.clear_chats(&actor.user_id).await
    }

    /// Share a chat, returning its stable share path. Idempotent.
    pub async fn share_chat(&self, actor: &Identity, id: &Uuid) -> Result<String, RepositoryError> {
        match self
            .store
            .set_visibility(id, &actor.user_id, &Visibility::shared(id))
            .await?
        {
            Visibility::Shared(path) => Ok(path),
            Visibility::Private => Err(RepositoryError::Query(
                "share left the record private".to_string(),
            )),
        }
    }

    /// Set a chat's visibility in either direction.
    pub async fn set_visibility(
        &self,
        actor: &Identity,
        id: &Uuid,
        shared: bool,
    ) -> Result<Visibility, RepositoryError> {
        let visibility = if shared {
            Visibility::shared(id)
        } else {
            Visibility::Private
        };
        self.store
            .set_visibility(id, &actor.user_id, &visibility)
            .await
    }
}
