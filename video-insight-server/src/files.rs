//! Gemini Files API client.
//!
//! Videos are uploaded with the resumable upload protocol and then refreshed
//! by name until the service finishes processing them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument};
use video_insight_common::auth::API_KEY_HEADER;
use video_insight_common::config::Config;
use video_insight_common::error::Error;

use crate::download::VIDEO_MIME_TYPE;

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// The service has not reported a state.
    #[default]
    StateUnspecified,
    /// Still being preprocessed; not usable yet.
    Processing,
    /// Ready for inference.
    Active,
    /// Preprocessing failed.
    Failed,
    /// A state this client does not know about.
    #[serde(other)]
    Unknown,
}

impl FileState {
    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::StateUnspecified => "STATE_UNSPECIFIED",
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a file stored by the Files API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name (`files/abc123`)
    pub name: String,
    /// URI passed to `generateContent` as `fileData.fileUri`
    #[serde(default)]
    pub uri: String,
    /// MIME type recorded at upload time
    #[serde(default)]
    pub mime_type: String,
    /// Processing state
    #[serde(default)]
    pub state: FileState,
}

/// Upload and status operations on remote files.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Upload a local video and return its initial handle.
    async fn upload(&self, path: &Path) -> Result<RemoteFile, Error>;

    /// Re-fetch a file by resource name.
    async fn get(&self, name: &str) -> Result<RemoteFile, Error>;
}

/// Response body of the finalize step of an upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

/// Metadata sent when starting a resumable upload.
#[derive(Debug, Serialize)]
struct StartUploadRequest<'a> {
    file: StartUploadFile<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartUploadFile<'a> {
    display_name: &'a str,
}

/// Files API client backed by `reqwest`.
pub struct GeminiFiles {
    /// Application configuration.
    config: Config,
    /// HTTP client for API requests.
    http: reqwest::Client,
}

impl GeminiFiles {
    /// Create a new client.
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    async fn start_upload(&self, display_name: &str, size: usize) -> Result<String, Error> {
        let endpoint = self.config.upload_endpoint();
        debug!(endpoint = %endpoint, size, "Starting resumable upload");

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", VIDEO_MIME_TYPE)
            .json(&StartUploadRequest {
                file: StartUploadFile { display_name },
            })
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&endpoint, status.as_u16(), body));
        }

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::api(&endpoint, status.as_u16(), "No upload URL in response"))
    }
}

#[async_trait]
impl FileService for GeminiFiles {
    #[instrument(level = "info", name = "gemini_file_upload", skip(self, path), fields(path = %path.display()))]
    async fn upload(&self, path: &Path) -> Result<RemoteFile, Error> {
        let data = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");

        let upload_url = self.start_upload(display_name, data.len()).await?;
        let size = data.len();

        let response = self
            .http
            .post(&upload_url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await
            .map_err(|e| Error::api(&upload_url, 0, format!("Upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&upload_url, status.as_u16(), body));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            Error::api(&upload_url, status.as_u16(), format!("Failed to parse upload response: {}", e))
        })?;

        info!(file = %uploaded.file.name, state = %uploaded.file.state, bytes = size, "Video uploaded");
        Ok(uploaded.file)
    }

    #[instrument(level = "debug", name = "gemini_file_get", skip(self))]
    async fn get(&self, name: &str) -> Result<RemoteFile, Error> {
        let endpoint = self.config.file_endpoint(name);

        let response = self
            .http
            .get(&endpoint)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .send()
            .await
            .map_err(|e| Error::api(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&endpoint, status.as_u16(), body));
        }

        response.json().await.map_err(|e| {
            Error::api(&endpoint, status.as_u16(), format!("Failed to parse file status: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_wire_names() {
        let states: Vec<FileState> =
            serde_json::from_str(r#"["STATE_UNSPECIFIED","PROCESSING","ACTIVE","FAILED"]"#).unwrap();
        assert_eq!(
            states,
            vec![
                FileState::StateUnspecified,
                FileState::Processing,
                FileState::Active,
                FileState::Failed
            ]
        );
        for state in states {
            assert_eq!(serde_json::to_value(state).unwrap(), state.as_str());
        }
    }

    #[test]
    fn test_unknown_state_is_tolerated() {
        let state: FileState = serde_json::from_str(r#""ARCHIVED""#).unwrap();
        assert_eq!(state, FileState::Unknown);
    }

    #[test]
    fn test_remote_file_from_api_json() {
        let file: RemoteFile = serde_json::from_value(serde_json::json!({
            "name": "files/abc123",
            "displayName": "video.mp4",
            "mimeType": "video/mp4",
            "sizeBytes": "1024",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
            "state": "PROCESSING"
        }))
        .unwrap();

        assert_eq!(file.name, "files/abc123");
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.state, FileState::Processing);
    }

    #[test]
    fn test_missing_state_defaults_to_unspecified() {
        let file: RemoteFile = serde_json::from_str(r#"{"name": "files/x"}"#).unwrap();
        assert_eq!(file.state, FileState::StateUnspecified);
    }
}
