//! LLM provider implementations.
//!
//! Only the OpenAI-compatible backend exists; the demo is a thin proxy to
//! one provider, constructed per request with the resolved API key.

pub mod openai;
