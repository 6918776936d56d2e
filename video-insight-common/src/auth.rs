//! API key credential for the Gemini Developer API.
//!
//! The Gemini Files and `generateContent` endpoints used by this app accept a
//! plain API key sent in the `x-goog-api-key` header. The key is read once at
//! startup and never printed: its `Debug` and `Display` output is redacted.

use std::fmt;

use crate::error::ConfigError;

/// Header carrying the API key on every Gemini request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Immutable Gemini API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the key is empty or only whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::invalid_value(
                "GOOGLE_API_KEY",
                "API key cannot be empty",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw key, for use in request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
