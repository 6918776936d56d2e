//! Test doubles for the downloader, Files API, and agent seams.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;
use video_insight_common::config::Config;
use video_insight_common::error::Error;

use crate::agent::{AgentResponse, AnalysisAgent};
use crate::download::VideoDownloader;
use crate::files::{FileService, FileState, RemoteFile};

pub const TEST_API_KEY: &str = "test-api-key-12345";

/// Configuration pointing at `base_url` with a fixed test key.
pub fn test_config(base_url: &str) -> Config {
    let vars = HashMap::from([
        ("GOOGLE_API_KEY", TEST_API_KEY.to_string()),
        ("GEMINI_API_BASE_URL", base_url.to_string()),
    ]);
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

// =============================================================================
// Downloader
// =============================================================================

/// Downloader that writes fixed bytes or fails with a fixed message.
pub struct MockDownloader {
    outcome: Result<Vec<u8>, String>,
    paths: Mutex<Vec<PathBuf>>,
}

impl MockDownloader {
    pub fn succeeding(bytes: &[u8]) -> Self {
        Self {
            outcome: Ok(bytes.to_vec()),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Output paths seen so far.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoDownloader for MockDownloader {
    async fn download(&self, _url: &str, output: &Path) -> Result<(), Error> {
        self.paths.lock().unwrap().push(output.to_path_buf());
        match &self.outcome {
            Ok(bytes) => {
                tokio::fs::write(output, bytes).await?;
                Ok(())
            }
            Err(message) => Err(Error::download(message.clone())),
        }
    }
}

// =============================================================================
// Files API
// =============================================================================

/// File service that replays a script of states on each refresh.
///
/// Once the script is exhausted the last state repeats. With no script at
/// all, refreshes fail with an API error.
pub struct ScriptedFiles {
    upload_state: FileState,
    fail_upload: bool,
    script: Mutex<VecDeque<FileState>>,
    last: Mutex<Option<FileState>>,
    uploads: AtomicUsize,
    uploaded_paths: Mutex<Vec<PathBuf>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedFiles {
    pub fn new(states: Vec<FileState>) -> Self {
        Self {
            upload_state: FileState::Processing,
            fail_upload: false,
            script: Mutex::new(states.into()),
            last: Mutex::new(None),
            uploads: AtomicUsize::new(0),
            uploaded_paths: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(state: FileState) -> Self {
        Self::new(vec![state])
    }

    pub fn failing_get() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing_upload() -> Self {
        let mut files = Self::new(Vec::new());
        files.fail_upload = true;
        files
    }

    /// State reported by the upload response.
    pub fn with_upload_state(mut self, state: FileState) -> Self {
        self.upload_state = state;
        self
    }

    pub fn get_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.uploaded_paths.lock().unwrap().clone()
    }

    fn file(state: FileState) -> RemoteFile {
        RemoteFile {
            name: "files/test-video".to_string(),
            uri: "https://generativelanguage.googleapis.com/v1beta/files/test-video".to_string(),
            mime_type: "video/mp4".to_string(),
            state,
        }
    }
}

#[async_trait]
impl FileService for ScriptedFiles {
    async fn upload(&self, path: &Path) -> Result<RemoteFile, Error> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.uploaded_paths.lock().unwrap().push(path.to_path_buf());
        if self.fail_upload {
            return Err(Error::api("mock://upload", 500, "upload rejected"));
        }
        assert!(path.exists(), "upload called with a missing file");
        Ok(Self::file(self.upload_state))
    }

    async fn get(&self, _name: &str) -> Result<RemoteFile, Error> {
        self.calls.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        let state = match next.or(*last) {
            Some(state) => state,
            None => return Err(Error::api("mock://files", 503, "service unavailable")),
        };
        *last = Some(state);
        Ok(Self::file(state))
    }
}

// =============================================================================
// Agent
// =============================================================================

/// Agent that records prompts and returns a canned answer or error.
pub struct MockAgent {
    outcome: Result<String, String>,
    prompts: Mutex<Vec<String>>,
    videos: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn answering(answer: &str) -> Self {
        Self {
            outcome: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
            videos: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
            videos: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn video_names(&self) -> Vec<String> {
        self.videos.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisAgent for MockAgent {
    async fn run(&self, prompt: &str, videos: &[RemoteFile]) -> Result<AgentResponse, Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.videos
            .lock()
            .unwrap()
            .extend(videos.iter().map(|v| v.name.clone()));
        match &self.outcome {
            Ok(answer) => Ok(AgentResponse {
                content: answer.clone(),
            }),
            Err(message) => Err(Error::api("mock://generate", 500, message.clone())),
        }
    }
}
