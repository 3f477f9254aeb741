//! Shared domain types for VulnChat.
//!
//! This crate contains the core domain types used across the VulnChat demo:
//! conversation turns, durable chat records, prompt topics, LLM request and
//! stream shapes, identities, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod error;
pub mod identity;
pub mod llm;
pub mod prompt;
pub mod turn;
