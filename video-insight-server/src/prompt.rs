//! User questions and the analysis prompt sent to the agent.

use std::fmt;
use video_insight_common::error::Error;

/// A non-blank question about a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Accept any question with at least one non-whitespace character.
    ///
    /// The text is kept exactly as typed so the prompt embeds it verbatim.
    ///
    /// # Errors
    /// Returns `Error::Validation` for empty or whitespace-only input.
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.trim().is_empty() {
            return Err(Error::validation("question cannot be empty"));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose the instruction sent alongside the uploaded video.
pub fn analysis_prompt(question: &Question) -> String {
    format!(
        "Analyze the uploaded video for its content and context.\n\
         Answer the following question using insights from the video together with supplementary web research:\n\
         {}\n\n\
         Give a detailed, user-friendly, and actionable response. \
         Do not make up information that is not supported by the video or by your research.",
        question.as_str()
    )
}
