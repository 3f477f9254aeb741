//! Prompt selection keys: OWASP LLM Top-10 topics and the secure/insecure mode.
//!
//! Both enums are closed so the system-prompt catalog can be a total match:
//! every `(Topic, PromptMode)` pair the API can produce resolves statically,
//! with [`Topic::General`] as the single explicit default variant.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// OWASP LLM Top-10 demo topic, plus a general-purpose default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Prompt injection.
    Llm01,
    /// Insecure output handling.
    Llm02,
    /// Training data poisoning.
    Llm03,
    /// Model denial of service.
    Llm04,
    /// Supply chain vulnerabilities.
    Llm05,
    /// Sensitive information disclosure.
    Llm06,
    /// Insecure plugin design.
    Llm07,
    /// Excessive agency.
    Llm08,
    /// Overreliance.
    Llm09,
    /// Model theft.
    Llm10,
    /// No topic selected: the general assistant prompt.
    General,
}

impl Topic {
    /// All topic variants, in catalog order.
    pub const ALL: [Topic; 11] = [
        Topic::Llm01,
        Topic::Llm02,
        Topic::Llm03,
        Topic::Llm04,
        Topic::Llm05,
        Topic::Llm06,
        Topic::Llm07,
        Topic::Llm08,
        Topic::Llm09,
        Topic::Llm10,
        Topic::General,
    ];
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Llm01 => write!(f, "llm01"),
            Topic::Llm02 => write!(f, "llm02"),
            Topic::Llm03 => write!(f, "llm03"),
            Topic::Llm04 => write!(f, "llm04"),
            Topic::Llm05 => write!(f, "llm05"),
            Topic::Llm06 => write!(f, "llm06"),
            Topic::Llm07 => write!(f, "llm07"),
            Topic::Llm08 => write!(f, "llm08"),
            Topic::Llm09 => write!(f, "llm09"),
            Topic::Llm10 => write!(f, "llm10"),
            Topic::General => write!(f, "general"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "llm01" => Ok(Topic::Llm01),
            "llm02" => Ok(Topic::Llm02),
            "llm03" => Ok(Topic::Llm03),
            "llm04" => Ok(Topic::Llm04),
            "llm05" => Ok(Topic::Llm05),
            "llm06" => Ok(Topic::Llm06),
            "llm07" => Ok(Topic::Llm07),
            "llm08" => Ok(Topic::Llm08),
            "llm09" => Ok(Topic::Llm09),
            "llm10" => Ok(Topic::Llm10),
            "general" => Ok(Topic::General),
            other => Err(format!("invalid topic: '{other}'")),
        }
    }
}

/// Whether the demo runs with hardened or deliberately permissive prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Secure,
    Insecure,
}

impl PromptMode {
    /// Map the submission form's boolean toggle onto a mode.
    pub fn from_secure_flag(secure: bool) -> Self {
        if secure {
            PromptMode::Secure
        } else {
            PromptMode::Insecure
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptMode::Secure => write!(f, "secure"),
            PromptMode::Insecure => write!(f, "insecure"),
        }
    }
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "secure" => Ok(PromptMode::Secure),
            "insecure" => Ok(PromptMode::Insecure),
            other => Err(format!("invalid prompt mode: '{other}'")),
        }
    }
}
