//! Video Insight Server Library
//!
//! Answers questions about online videos: the video is downloaded with
//! `yt-dlp`, uploaded to the Gemini Files API, and analyzed by a Gemini agent
//! with Google Search grounding. The result is rendered as a single HTML page.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod agent;
pub mod download;
pub mod files;
pub mod media;
pub mod page;
pub mod pipeline;
pub mod prompt;
pub mod readiness;
pub mod server;

#[cfg(test)]
mod testing;

pub use agent::{AgentResponse, AnalysisAgent, VideoAgent};
pub use download::{LocalVideo, VideoDownloader, YtDlp};
pub use files::{FileService, FileState, GeminiFiles, RemoteFile};
pub use media::MediaStore;
pub use page::PageRenderer;
pub use pipeline::{PageOutcome, PageRequest, Pipeline, Stage};
pub use readiness::{PollPolicy, wait_until_active};
pub use server::{AppState, build_router};
