//! HTTP routes of the page.

use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::media::{MediaStore, RangeRequest};
use crate::page::PageRenderer;
use crate::pipeline::{PageOutcome, PageRequest, Pipeline};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub renderer: Arc<PageRenderer>,
    pub media: MediaStore,
}

/// Build the router with all page routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/media/{id}", get(media))
        .route("/health", get(health))
        .with_state(state)
}

fn render_page(renderer: &PageRenderer, request: &PageRequest, outcome: &PageOutcome) -> Response {
    match renderer.render(request, outcome) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn index(State(state): State<AppState>) -> Response {
    render_page(&state.renderer, &PageRequest::default(), &PageOutcome::idle())
}

#[instrument(level = "debug", skip(state, request))]
async fn submit(State(state): State<AppState>, Form(request): Form<PageRequest>) -> Response {
    let outcome = state.pipeline.run(&request).await;
    debug!(stage = ?outcome.stage, banners = outcome.banners.len(), "Submission finished");
    render_page(&state.renderer, &request, &outcome)
}

/// Serve a stored preview, honoring single byte ranges so players can seek.
async fn media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let Some(entry) = state.media.get(&id).await else {
        return (StatusCode::NOT_FOUND, "Video not found").into_response();
    };

    let len = entry.data.len() as u64;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map_or(RangeRequest::Full, |v| RangeRequest::resolve(v, len));

    match range {
        RangeRequest::Full => (
            [
                (header::CONTENT_TYPE, entry.mime_type),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            entry.data,
        )
            .into_response(),
        RangeRequest::Partial { start, end } => (
            StatusCode::PARTIAL_CONTENT,
            [
                (header::CONTENT_TYPE, entry.mime_type),
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, len)),
            ],
            entry.data.slice(start as usize..=end as usize),
        )
            .into_response(),
        RangeRequest::Unsatisfiable => (
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, format!("bytes */{}", len))],
            (),
        )
            .into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileState;
    use crate::readiness::PollPolicy;
    use crate::testing::{MockAgent, MockDownloader, ScriptedFiles};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(agent: MockAgent) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(4, 1024 * 1024);
        let pipeline = Pipeline::new(
            Arc::new(MockDownloader::succeeding(b"fake-mp4")),
            Arc::new(ScriptedFiles::new(vec![FileState::Active])),
            Arc::new(agent),
            media.clone(),
        )
        .with_policy(PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts: 3,
        })
        .with_temp_dir(dir.path());

        let state = AppState {
            pipeline: Arc::new(pipeline),
            renderer: Arc::new(PageRenderer::new("Gemini 2.0 Flash Exp").unwrap()),
            media,
        };
        (state, dir)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = build_router(state).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_index_shows_idle_page() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let resp = build_router(state).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Enter a YouTube video link to begin analysis."));
    }

    #[tokio::test]
    async fn test_analyze_submission_renders_answer_and_serves_preview() {
        let (state, _dir) = test_state(MockAgent::answering("The video shows **a cat**."));
        let app = build_router(state.clone());

        let resp = app
            .clone()
            .oneshot(form_post(
                "video_url=https%3A%2F%2Fyoutu.be%2Fabc&question=What+is+it%3F&action=analyze",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Analysis Result"));
        assert!(html.contains("<strong>a cat</strong>"));

        let start = html.find("/media/").unwrap() + "/media/".len();
        let id = &html[start..start + 36];
        let req = Request::builder()
            .uri(format!("/media/{}", id))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(resp.headers()[header::ACCEPT_RANGES], "bytes");
        assert_eq!(body_text(resp).await, "fake-mp4");
    }

    async fn stored_preview(state: &AppState) -> Uuid {
        state
            .media
            .insert(b"0123456789".to_vec(), "video/mp4")
            .await
            .unwrap()
    }

    fn range_get(id: Uuid, range: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/media/{}", id))
            .header(header::RANGE, range)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_media_range_returns_partial_content() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let id = stored_preview(&state).await;

        let resp = build_router(state)
            .oneshot(range_get(id, "bytes=0-1"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes 0-1/10");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(body_text(resp).await, "01");
    }

    #[tokio::test]
    async fn test_media_open_ended_range() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let id = stored_preview(&state).await;

        let resp = build_router(state)
            .oneshot(range_get(id, "bytes=7-"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes 7-9/10");
        assert_eq!(body_text(resp).await, "789");
    }

    #[tokio::test]
    async fn test_media_range_past_end_is_not_satisfiable() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let id = stored_preview(&state).await;

        let resp = build_router(state)
            .oneshot(range_get(id, "bytes=10-"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[header::CONTENT_RANGE], "bytes */10");
    }

    #[tokio::test]
    async fn test_blank_question_submission_warns() {
        let (state, _dir) = test_state(MockAgent::answering("unused"));

        let resp = build_router(state)
            .oneshot(form_post("video_url=https%3A%2F%2Fyoutu.be%2Fabc&question=+&action=analyze"))
            .await
            .unwrap();

        let html = body_text(resp).await;
        assert!(html.contains("Please enter a question or insight to analyze the video."));
        assert!(!html.contains("Analysis Result"));
    }

    #[tokio::test]
    async fn test_unknown_media_is_not_found() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let req = Request::builder()
            .uri(format!("/media/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        let resp = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_media_id_is_rejected() {
        let (state, _dir) = test_state(MockAgent::answering("ok"));
        let req = Request::builder()
            .uri("/media/not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let resp = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
