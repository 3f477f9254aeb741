//! Provider credential resolution.
//!
//! The relay's precondition: an API key must resolve from either an explicit
//! per-request value or the process-wide environment fallback, before any
//! network call is attempted. Resolution order is explicit-first, mirroring
//! the submission form's optional key field.

use secrecy::SecretString;

use vulnchat_types::error::RelayError;

/// Environment variable holding the process-wide provider key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// All credentials the service requires.
const REQUIRED_KEYS: [&str; 1] = [OPENAI_API_KEY];

/// Resolve the provider API key: the explicit per-request value wins,
/// otherwise fall back to `OPENAI_API_KEY`. Fails fast with
/// [`RelayError::MissingCredential`] when neither is present.
pub fn resolve_api_key(explicit: Option<SecretString>) -> Result<SecretString, RelayError> {
    if let Some(key) = explicit {
        return Ok(key);
    }
    match std::env::var(OPENAI_API_KEY) {
        Ok(val) if !val.is_empty() => Ok(SecretString::from(val)),
        _ => Err(RelayError::MissingCredential),
    }
}

/// Names of required credentials absent from the environment.
///
/// Used by the configuration endpoint so the front end can prompt for a
/// per-session key instead of failing on first submission.
pub fn missing_keys() -> Vec<String> {
    REQUIRED_KEYS
        .iter()
        .filter(|key| std::env::var(key).map(|v| v.is_empty()).unwrap_or(true))
        .map(|key| key.to_string())
        .collect()
}
