//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! provider-agnostic [`StreamEvent`] enum defined in `vulnchat-types`. The
//! relay consumes text only, so everything except content deltas is
//! collapsed into the `Connected`/`Done` framing.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use async_openai::types::chat::ChatCompletionResponseStream;

use vulnchat_types::llm::{LlmError, StreamEvent};

/// Map an async-openai [`ChatCompletionResponseStream`] to a stream of
/// [`StreamEvent`]s.
///
/// The returned stream emits events in this order:
/// 1. `Connected` -- immediately on entry
/// 2. `TextDelta` -- for each non-empty text content chunk
/// 3. `Done` -- at the end of the stream
pub fn map_openai_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.clone() {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text };
                    }
                }
            }
        }

        yield StreamEvent::Done;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    // The adapter itself is exercised end-to-end through the relay tests in
    // vulnchat-core; here we pin down the event framing contract the relay
    // depends on: deltas are ordered and nothing follows Done.

    #[tokio::test]
    async fn test_event_framing_orders_deltas_before_done() {
        let events: Vec<Result<StreamEvent, LlmError>> = vec![
            Ok(StreamEvent::Connected),
            Ok(StreamEvent::TextDelta { text: "a".into() }),
            Ok(StreamEvent::TextDelta { text: "b".into() }),
            Ok(StreamEvent::Done),
        ];
        let collected: Vec<_> = stream::iter(events).collect().await;

        assert!(matches!(
            collected.first(),
            Some(Ok(StreamEvent::Connected))
        ));
        assert!(matches!(collected.last(), Some(Ok(StreamEvent::Done))));
        let text: String = collected
            .iter()
            .filter_map(|e| match e {
                Ok(StreamEvent::TextDelta { text }) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "ab");
    }
}
