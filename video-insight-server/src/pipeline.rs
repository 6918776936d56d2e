//! One page submission, end to end.
//!
//! Every submission re-runs the whole flow: download the linked video, keep a
//! preview, and when asked, upload it, wait for it to become active, and ask
//! the agent. The temp file is removed on every exit path.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use video_insight_common::error::Error;

use crate::agent::AnalysisAgent;
use crate::download::{LocalVideo, VIDEO_MIME_TYPE, VideoDownloader};
use crate::files::{FileService, RemoteFile};
use crate::media::MediaStore;
use crate::prompt::{Question, analysis_prompt};
use crate::readiness::{PollPolicy, wait_until_active};

pub const EMPTY_LINK_MESSAGE: &str = "Enter a YouTube video link to begin analysis.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question or insight to analyze the video.";
pub const DOWNLOAD_ERROR_PREFIX: &str = "An error occurred while downloading the video";
pub const ANALYSIS_ERROR_PREFIX: &str = "An error occurred during analysis";
pub const UPLOADING_MESSAGE: &str = "Uploading video for processing...";
pub const STILL_PROCESSING_MESSAGE: &str =
    "The video is still being processed. Try analyzing it again in a moment.";

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Downloading,
    Downloaded,
    Uploading,
    Polling,
    Ready,
    Analyzing,
    Done,
    ErrorDisplayed,
}

/// Which button submitted the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Load,
    Analyze,
}

/// Form fields of the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub video_url: String,
    pub question: String,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Warning,
    Error,
}

impl BannerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerKind::Info => "info",
            BannerKind::Warning => "warning",
            BannerKind::Error => "error",
        }
    }
}

/// A message shown above the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the page needs to render a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub stage: Stage,
    pub banners: Vec<Banner>,
    /// Status lines written while uploading and polling
    pub progress: Vec<String>,
    /// Preview id in the media store
    pub video_id: Option<Uuid>,
    /// Markdown answer from the agent
    pub answer: Option<String>,
}

impl PageOutcome {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            banners: Vec::new(),
            progress: Vec::new(),
            video_id: None,
            answer: None,
        }
    }

    /// Landing page state.
    pub fn idle() -> Self {
        let mut outcome = Self::new(Stage::Idle);
        outcome.banners.push(Banner::info(EMPTY_LINK_MESSAGE));
        outcome
    }

    fn fail(&mut self, prefix: &str, err: &Error) {
        self.stage = Stage::ErrorDisplayed;
        self.banners.push(Banner::error(format!("{}: {}", prefix, err)));
    }
}

/// Download, upload, poll, and analyze collaborators for one app.
pub struct Pipeline {
    downloader: Arc<dyn VideoDownloader>,
    files: Arc<dyn FileService>,
    agent: Arc<dyn AnalysisAgent>,
    media: MediaStore,
    policy: PollPolicy,
    temp_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        downloader: Arc<dyn VideoDownloader>,
        files: Arc<dyn FileService>,
        agent: Arc<dyn AnalysisAgent>,
        media: MediaStore,
    ) -> Self {
        Self {
            downloader,
            files,
            agent,
            media,
            policy: PollPolicy::default(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Override the readiness polling policy.
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Directory for per-request temp files.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Run one submission.
    #[instrument(level = "info", name = "page_submission", skip(self, request), fields(action = ?request.action))]
    pub async fn run(&self, request: &PageRequest) -> PageOutcome {
        let url = request.video_url.trim();
        if url.is_empty() {
            return PageOutcome::idle();
        }

        let mut outcome = PageOutcome::new(Stage::Downloading);

        let video = match LocalVideo::create_in(&self.temp_dir) {
            Ok(video) => video,
            Err(e) => {
                error!(error = %e, "Could not create temporary video file");
                outcome.fail(DOWNLOAD_ERROR_PREFIX, &e);
                return outcome;
            }
        };

        self.process(url, request, &video, &mut outcome).await;
        video.cleanup();
        outcome
    }

    async fn process(
        &self,
        url: &str,
        request: &PageRequest,
        video: &LocalVideo,
        outcome: &mut PageOutcome,
    ) {
        if let Err(e) = self.downloader.download(url, video.path()).await {
            warn!(error = %e, "Video download failed");
            outcome.fail(DOWNLOAD_ERROR_PREFIX, &e);
            return;
        }
        outcome.stage = Stage::Downloaded;

        match self.media.insert_file(video.path(), VIDEO_MIME_TYPE).await {
            Ok(id) => outcome.video_id = id,
            Err(e) => warn!(error = %e, "Could not keep video preview"),
        }

        if request.action != Action::Analyze {
            return;
        }

        let question = match Question::parse(&request.question) {
            Ok(question) => question,
            Err(_) => {
                outcome.banners.push(Banner::warning(EMPTY_QUESTION_MESSAGE));
                return;
            }
        };

        match self.analyze(video, &question, outcome).await {
            Ok(answer) => {
                outcome.stage = Stage::Done;
                outcome.answer = Some(answer);
            }
            Err(e) => {
                error!(error = %e, stage = ?outcome.stage, "Video analysis failed");
                outcome.fail(ANALYSIS_ERROR_PREFIX, &e);
                if e.is_transient() {
                    outcome.banners.push(Banner::info(STILL_PROCESSING_MESSAGE));
                }
            }
        }
    }

    async fn analyze(
        &self,
        video: &LocalVideo,
        question: &Question,
        outcome: &mut PageOutcome,
    ) -> Result<String, Error> {
        outcome.stage = Stage::Uploading;
        outcome.progress.push(UPLOADING_MESSAGE.to_string());
        let file = self.files.upload(video.path()).await?;

        outcome.stage = Stage::Polling;
        outcome
            .progress
            .push(format!("Initial file state: {}", file.state));

        let progress = &mut outcome.progress;
        let file: RemoteFile = wait_until_active(self.files.as_ref(), file, self.policy, |state| {
            progress.push(format!("Current file state: {}", state))
        })
        .await?;
        outcome.stage = Stage::Ready;
        debug!(file = %file.name, stage = ?outcome.stage, "File ready for analysis");

        let prompt = analysis_prompt(question);
        outcome.stage = Stage::Analyzing;
        let response = self.agent.run(&prompt, std::slice::from_ref(&file)).await?;

        info!(file = %file.name, chars = response.content.len(), "Analysis complete");
        Ok(response.content)
    }
}
