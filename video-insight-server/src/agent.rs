//! Video analysis agent backed by Gemini `generateContent`.
//!
//! The agent is a reusable handle bound to one model and one auxiliary tool,
//! Google Search grounding. It is built once at startup and shared by every
//! request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use video_insight_common::auth::{API_KEY_HEADER, ApiKey};
use video_insight_common::config::Config;
use video_insight_common::error::Error;

use crate::files::RemoteFile;

/// Display name of the agent.
pub const AGENT_NAME: &str = "Video AI Summarizer";

/// Tools an agent can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTool {
    /// Gemini's built-in web search grounding.
    GoogleSearch,
}

/// Text answer returned by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    /// Markdown content of the answer
    pub content: String,
}

/// Answers prompts about uploaded videos.
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Run `prompt` against the given videos and return the text answer.
    async fn run(&self, prompt: &str, videos: &[RemoteFile]) -> Result<AgentResponse, Error>;
}

/// Gemini-backed agent handle.
pub struct VideoAgent {
    name: String,
    model: String,
    tools: Vec<AgentTool>,
    markdown: bool,
    endpoint: String,
    api_key: ApiKey,
    http: reqwest::Client,
}

impl VideoAgent {
    /// Build the agent for the configured model with web search enabled.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            model: config.model.clone(),
            tools: vec![AgentTool::GoogleSearch],
            markdown: true,
            endpoint: config.generate_content_endpoint(),
            api_key: config.api_key.clone(),
            http,
        }
    }

    /// Agent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model identifier the agent calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Tools attached to the agent.
    pub fn tools(&self) -> &[AgentTool] {
        &self.tools
    }

    fn system_instruction(&self) -> String {
        let mut instruction = format!(
            "You are {}, an assistant that watches videos and researches the web to answer questions about them.",
            self.name
        );
        if self.markdown {
            instruction.push_str(" Use markdown to format your answers.");
        }
        instruction
    }

    /// Build the `generateContent` request body.
    pub fn build_request(&self, prompt: &str, videos: &[RemoteFile]) -> GenerateContentRequest {
        let mut parts: Vec<RequestPart> = videos
            .iter()
            .map(|video| RequestPart::FileData {
                file_data: FileData {
                    mime_type: video.mime_type.clone(),
                    file_uri: video.uri.clone(),
                },
            })
            .collect();
        parts.push(RequestPart::Text {
            text: prompt.to_string(),
        });

        GenerateContentRequest {
            system_instruction: Some(SystemInstruction {
                parts: vec![RequestPart::Text {
                    text: self.system_instruction(),
                }],
            }),
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts,
            }],
            tools: self
                .tools
                .iter()
                .map(|tool| match tool {
                    AgentTool::GoogleSearch => ToolSpec {
                        google_search: Some(GoogleSearch {}),
                    },
                })
                .collect(),
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(&self, response: &GenerateContentResponse) -> Result<String, Error> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(Error::api(
                &self.endpoint,
                200,
                format!("Prompt was blocked: {}", reason),
            ));
        }

        let text: String = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("no candidates");
            return Err(Error::api(
                &self.endpoint,
                200,
                format!("No text found in response (finish reason: {})", reason),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl AnalysisAgent for VideoAgent {
    #[instrument(level = "info", name = "agent_run", skip(self, prompt, videos), fields(model = %self.model, videos = videos.len()))]
    async fn run(&self, prompt: &str, videos: &[RemoteFile]) -> Result<AgentResponse, Error> {
        let request = self.build_request(prompt, videos);
        debug!(endpoint = %self.endpoint, "Calling Gemini generateContent");

        let response = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::api(&self.endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(&self.endpoint, status.as_u16(), body));
        }

        let response_text = response.text().await.map_err(|e| {
            Error::api(&self.endpoint, status.as_u16(), format!("Failed to read response: {}", e))
        })?;

        let api_response: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                Error::api(
                    &self.endpoint,
                    status.as_u16(),
                    format!(
                        "Failed to parse response: {}. Raw: {}",
                        e,
                        response_text.chars().take(1000).collect::<String>()
                    ),
                )
            })?;

        let content = self.extract_text(&api_response)?;
        info!(chars = content.len(), "Received analysis from Gemini");
        Ok(AgentResponse { content })
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    pub contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

/// Request content part.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

/// Reference to an uploaded file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Tool declaration.
#[derive(Debug, Serialize)]
pub struct ToolSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

/// Google Search grounding has no options.
#[derive(Debug, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
