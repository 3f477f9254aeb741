//! LLM provider abstraction for VulnChat.
//!
//! This module defines the `LlmProvider` trait that the infrastructure
//! layer implements for the OpenAI-compatible completion backend.

pub mod provider;
