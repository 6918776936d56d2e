//! HTML rendering of the single page.

use minijinja::{Environment, Value, context};
use pulldown_cmark::{Event, Options, Parser, html};
use serde::Serialize;

use crate::pipeline::{PageOutcome, PageRequest};

/// Browser tab title.
pub const DOCUMENT_TITLE: &str = "Multimodal AI Agent - Video Summarizer";

/// Emoji used as the page icon.
pub const PAGE_ICON: &str = "🎥";

/// Page heading.
pub const PAGE_TITLE: &str = "Youtube Video AI Summarizer Agent 🔗🎞️⏯️";

/// Spinner text while a "Load video" submission runs.
pub const LOADING_SPINNER_TEXT: &str = "Downloading video...";

/// Spinner text while an "Analyze Video" submission runs.
pub const ANALYZING_SPINNER_TEXT: &str = "Processing video and gathering insights...";

const TEMPLATE_NAME: &str = "index.html";
const TEMPLATE: &str = include_str!("../templates/index.html");

#[derive(Debug, Serialize)]
struct BannerView<'a> {
    kind: &'static str,
    message: &'a str,
}

/// Renders submissions into the page template.
#[derive(Debug)]
pub struct PageRenderer {
    env: Environment<'static>,
    model_name: String,
}

impl PageRenderer {
    /// Compile the page template. `model_name` is shown under the title.
    pub fn new(model_name: impl Into<String>) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self {
            env,
            model_name: model_name.into(),
        })
    }

    /// Render the outcome of a submission, echoing the submitted form values.
    pub fn render(
        &self,
        request: &PageRequest,
        outcome: &PageOutcome,
    ) -> Result<String, minijinja::Error> {
        let banners: Vec<BannerView<'_>> = outcome
            .banners
            .iter()
            .map(|b| BannerView {
                kind: b.kind.as_str(),
                message: &b.message,
            })
            .collect();

        let answer = outcome
            .answer
            .as_deref()
            .map(|md| Value::from_safe_string(markdown_to_html(md)));

        self.env.get_template(TEMPLATE_NAME)?.render(context! {
            document_title => DOCUMENT_TITLE,
            page_icon => PAGE_ICON,
            title => PAGE_TITLE,
            loading_text => LOADING_SPINNER_TEXT,
            analyzing_text => ANALYZING_SPINNER_TEXT,
            model_name => &self.model_name,
            video_url => &request.video_url,
            question => &request.question,
            video_id => outcome.video_id.map(|id| id.to_string()),
            progress => &outcome.progress,
            banners => banners,
            answer => answer,
        })
    }
}

/// Convert model markdown to HTML.
///
/// Raw HTML in the markdown is emitted as escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
