//! Configuration module for loading environment variables and settings.

use crate::auth::ApiKey;
use crate::error::ConfigError;
use crate::models::{DEFAULT_GEMINI_MODEL, ModelRegistry};

/// Default Gemini Developer API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default downloader executable, resolved through `PATH`.
pub const DEFAULT_YT_DLP_PATH: &str = "yt-dlp";

/// Default number of downloaded videos kept in memory for the inline player.
pub const DEFAULT_MEDIA_CACHE_ENTRIES: usize = 8;

/// Default byte budget of the preview store (256 MiB).
pub const DEFAULT_MEDIA_CACHE_MAX_BYTES: u64 = 256 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (required)
    pub api_key: ApiKey,
    /// Canonical Gemini model identifier used by the agent
    pub model: String,
    /// Base URL for the Gemini API (overridable for testing)
    pub api_base_url: String,
    /// Path or name of the yt-dlp executable
    pub yt_dlp_path: String,
    /// HTTP bind host
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Maximum number of preview videos held in memory
    pub media_cache_entries: usize,
    /// Maximum total size of the preview videos held in memory
    pub media_cache_max_bytes: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if GOOGLE_API_KEY is not set, or
    /// `ConfigError::InvalidValue` if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .ok_or_else(|| ConfigError::missing_env_var("GOOGLE_API_KEY"))
            .and_then(ApiKey::new)?;

        let model = match lookup("GEMINI_MODEL") {
            Some(name) => match ModelRegistry::resolve_gemini(&name) {
                Some(model) => model.id.to_string(),
                None => {
                    tracing::warn!(
                        model = %name,
                        known = %ModelRegistry::known_ids(),
                        "Unknown Gemini model, using it verbatim"
                    );
                    name
                }
            },
            None => DEFAULT_GEMINI_MODEL.to_string(),
        };

        let api_base_url = lookup("GEMINI_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let yt_dlp_path =
            lookup("YT_DLP_PATH").unwrap_or_else(|| DEFAULT_YT_DLP_PATH.to_string());

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| ConfigError::invalid_value("PORT", format!("'{}' is not a port", p)))?,
            None => 8080,
        };

        let media_cache_entries = match lookup("MEDIA_CACHE_ENTRIES") {
            Some(n) => n.parse().map_err(|_| {
                ConfigError::invalid_value("MEDIA_CACHE_ENTRIES", format!("'{}' is not a count", n))
            })?,
            None => DEFAULT_MEDIA_CACHE_ENTRIES,
        };

        let media_cache_max_bytes = match lookup("MEDIA_CACHE_MAX_BYTES") {
            Some(n) => n.parse().map_err(|_| {
                ConfigError::invalid_value("MEDIA_CACHE_MAX_BYTES", format!("'{}' is not a byte count", n))
            })?,
            None => DEFAULT_MEDIA_CACHE_MAX_BYTES,
        };

        Ok(Self {
            api_key,
            model,
            api_base_url,
            yt_dlp_path,
            host,
            port,
            media_cache_entries,
            media_cache_max_bytes,
        })
    }

    /// Get the `generateContent` endpoint for the configured model.
    pub fn generate_content_endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, self.model
        )
    }

    /// Get the resumable upload endpoint of the Files API.
    pub fn upload_endpoint(&self) -> String {
        format!("{}/upload/v1beta/files", self.api_base_url)
    }

    /// Get the metadata endpoint for an uploaded file (`files/abc123`).
    pub fn file_endpoint(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.api_base_url, name)
    }
}
