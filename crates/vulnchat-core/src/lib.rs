//! Business logic and repository trait definitions for VulnChat.
//!
//! This crate defines the "ports" (the `ChatStore` and `LlmProvider` traits)
//! that the infrastructure layer implements, plus the three cooperating
//! pieces of the chat pipeline: the in-memory session store, the stream
//! relay, and the chat service orchestrating them. It depends only on
//! `vulnchat-types` -- never on `vulnchat-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod prompt;
pub mod relay;
pub mod session;
