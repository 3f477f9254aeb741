//! LlmProvider trait definition.
//!
//! The single abstraction the stream relay talks to. The provider is
//! constructed per request (the API key may be supplied per submission), so
//! the trait surface is just the streaming call.

use std::pin::Pin;

use futures_util::Stream;

use vulnchat_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// A boxed stream of provider events, `'static` so the relay's completion
/// future can own it beyond the call that opened it.
pub type ProviderStream =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for streaming text-generation backends.
///
/// Returns a boxed stream rather than using RPITIT so providers stay
/// object-safe. Opening the underlying network call may be lazy (first
/// poll); the contract is one provider call per `stream` invocation, ordered
/// deltas, and at most one terminal outcome.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Open a streaming completion call for `request`.
    fn stream(&self, request: CompletionRequest) -> ProviderStream;
}
