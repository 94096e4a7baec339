//! Analysis client: the only way this service talks to the remote ATS
//! analysis API. Scoring, keyword matching and interview questions all
//! happen on the other side of this boundary.
//!
//! GETs are idempotent and retried on 429/5xx with exponential backoff.
//! POSTs (session creation, analysis, chat) are sent exactly once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod models;

use models::{
    AnalysisReport, AnalysisSummary, AnalyzeRequest, ApiErrorBody, ChatReply, ChatRequest,
    DebugParseRequest, ParseDebugReport, SessionCreated,
};

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid analysis API URL: {0}")]
    InvalidBaseUrl(String),
}

/// The remote analysis API, as seen by route handlers.
///
/// Carried in `AppState` as `Arc<dyn AnalysisApi>`.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn create_session(&self) -> Result<String, AnalysisError>;

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, AnalysisError>;

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, AnalysisError>;

    async fn get_analysis(&self, analysis_id: &str) -> Result<AnalysisReport, AnalysisError>;

    async fn session_analyses(
        &self,
        session_id: &str,
    ) -> Result<Vec<AnalysisSummary>, AnalysisError>;

    /// Never fails; an unreachable backend is simply unhealthy.
    async fn health(&self) -> bool;

    async fn debug_parse(
        &self,
        cv_text: &str,
        filename: &str,
    ) -> Result<ParseDebugReport, AnalysisError>;
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: Url,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let base_url =
            Url::parse(base_url).map_err(|e| AnalysisError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AnalysisError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, AnalysisError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let response = self.client.post(url.clone()).json(body).send().await?;
        debug!(%url, status = %response.status(), "analysis API POST");
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AnalysisError> {
        let url = self.endpoint(segments);
        let mut last_error: Option<AnalysisError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (1 << (attempt - 1)));
                warn!(
                    "Analysis API GET attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url.clone()).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AnalysisError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Analysis API returned {}: {}", status, body);
                last_error = Some(AnalysisError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            debug!(%url, %status, "analysis API GET");
            return read_json(response).await;
        }

        Err(last_error.unwrap_or(AnalysisError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            message: format!("gave up after {MAX_RETRIES} attempts"),
        }))
    }
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn create_session(&self) -> Result<String, AnalysisError> {
        let created: SessionCreated = self.post_json(&["api", "session"], &()).await?;
        Ok(created.session_id)
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, AnalysisError> {
        self.post_json(&["api", "analyze"], request).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, AnalysisError> {
        self.post_json(&["api", "chat"], request).await
    }

    async fn get_analysis(&self, analysis_id: &str) -> Result<AnalysisReport, AnalysisError> {
        self.get_json(&["api", "analysis", analysis_id]).await
    }

    async fn session_analyses(
        &self,
        session_id: &str,
    ) -> Result<Vec<AnalysisSummary>, AnalysisError> {
        self.get_json(&["api", "session", session_id, "analyses"])
            .await
    }

    async fn health(&self) -> bool {
        match self.client.get(self.endpoint(&["health"])).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "analysis API health check failed");
                false
            }
        }
    }

    async fn debug_parse(
        &self,
        cv_text: &str,
        filename: &str,
    ) -> Result<ParseDebugReport, AnalysisError> {
        self.post_json(
            &["api", "debug", "parse"],
            &DebugParseRequest { cv_text, filename },
        )
        .await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AnalysisError> {
    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::NOT_FOUND {
        return Err(AnalysisError::NotFound(error_message(body)));
    }
    if !status.is_success() {
        return Err(AnalysisError::Api {
            status: status.as_u16(),
            message: error_message(body),
        });
    }

    serde_json::from_str(&body).map_err(AnalysisError::Parse)
}

/// Pulls `error` out of `{"error": "..."}` bodies; falls back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves a canned analysis API on an ephemeral port.
    async fn spawn_stub(flaky_calls: Arc<AtomicUsize>) -> SocketAddr {
        async fn analyses(
            State(calls): State<Arc<AtomicUsize>>,
            Path(session_id): Path<String>,
        ) -> (AxumStatus, Json<Value>) {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return (
                    AxumStatus::SERVICE_UNAVAILABLE,
                    Json(json!({"error": "warming up"})),
                );
            }
            if session_id != "cv_session_1" {
                return (
                    AxumStatus::NOT_FOUND,
                    Json(json!({"error": "Session not found"})),
                );
            }
            (
                AxumStatus::OK,
                Json(json!([{
                    "id": "a1",
                    "filename": "jane.pdf",
                    "ats_score": 85,
                    "identified_role": "Software Developer",
                    "created_at": "2024-05-01T10:00:00"
                }])),
            )
        }

        let app = Router::new()
            .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
            .route(
                "/api/session",
                post(|| async { Json(json!({"session_id": "cv_session_1"})) }),
            )
            .route(
                "/api/analyze",
                post(|Json(body): Json<Value>| async move {
                    if body["cv_text"].as_str().unwrap_or_default().is_empty() {
                        return (
                            AxumStatus::BAD_REQUEST,
                            Json(json!({"error": "Missing required fields"})),
                        );
                    }
                    (
                        AxumStatus::OK,
                        Json(json!({
                            "id": "a1",
                            "session_id": body["session_id"],
                            "filename": body["filename"],
                            "file_size": body["file_size"],
                            "created_at": "2024-05-01T10:00:00",
                            "ats_score": 85,
                            "identified_role": "Software Developer",
                            "keywords": {"found": ["Rust"], "missing": ["Docker"], "role_match": 78},
                            "suggestions": ["Add a professional summary"],
                            "interview_questions": ["Tell me about a challenging project you worked on."],
                            "strengths": [],
                            "areas_to_improve": []
                        })),
                    )
                }),
            )
            .route(
                "/api/chat",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "message": format!("echo: {}", body["message"].as_str().unwrap_or_default()),
                        "timestamp": "2024-05-01T10:00:00",
                        "has_actions": body["analysis_id"].is_string()
                    }))
                }),
            )
            .route(
                "/api/analysis/:id",
                get(|Path(id): Path<String>| async move {
                    (
                        AxumStatus::NOT_FOUND,
                        Json(json!({"error": format!("Analysis {id} not found")})),
                    )
                }),
            )
            .route(
                "/api/debug/parse",
                post(|Json(body): Json<Value>| async move {
                    let text = body["cv_text"].as_str().unwrap_or_default().to_string();
                    Json(json!({
                        "filename": body["filename"],
                        "text_length": text.len(),
                        "word_count": text.split_whitespace().count(),
                        "line_count": text.split('\n').count(),
                        "first_200_chars": text,
                        "last_200_chars": text,
                        "full_text": text,
                        "success": true
                    }))
                }),
            )
            .route("/api/session/:id/analyses", get(analyses))
            .with_state(flaky_calls);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn client() -> (AnalysisClient, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let addr = spawn_stub(Arc::clone(&calls)).await;
        let client =
            AnalysisClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        (client, calls)
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = AnalysisClient::new("not a url", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, AnalysisError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments_and_keeps_base_path() {
        let client =
            AnalysisClient::new("http://localhost:5000/backend/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["api", "analysis", "a/b c"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/backend/api/analysis/a%2Fb%20c"
        );
    }

    #[test]
    fn test_error_message_extracts_error_field() {
        assert_eq!(
            error_message(r#"{"error": "Missing cv_text"}"#.to_string()),
            "Missing cv_text"
        );
        assert_eq!(error_message("Bad Gateway".to_string()), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_create_session_and_analyze() {
        let (client, _) = client().await;

        let session_id = client.create_session().await.unwrap();
        assert_eq!(session_id, "cv_session_1");

        let report = client
            .analyze(&AnalyzeRequest {
                session_id: session_id.clone(),
                cv_text: "Jane Doe Rust engineer".to_string(),
                filename: "jane.pdf".to_string(),
                file_size: 1024,
            })
            .await
            .unwrap();
        assert_eq!(report.session_id, session_id);
        assert_eq!(report.ats_score, 85);
        assert_eq!(report.file_size, Some(1024));
        assert_eq!(report.keywords.found, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_analyze_client_error_is_not_retried() {
        let (client, _) = client().await;
        let err = client
            .analyze(&AnalyzeRequest {
                session_id: "s".to_string(),
                cv_text: String::new(),
                filename: "jane.pdf".to_string(),
                file_size: 0,
            })
            .await
            .unwrap_err();
        match err {
            AnalysisError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing required fields");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let (client, _) = client().await;
        let reply = client
            .send_chat(&ChatRequest {
                session_id: "cv_session_1".to_string(),
                message: "What should I add?".to_string(),
                analysis_id: Some("a1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(reply.message, "echo: What should I add?");
        assert!(reply.has_actions);
    }

    #[tokio::test]
    async fn test_session_analyses_retries_server_error() {
        let (client, calls) = client().await;
        let summaries = client.session_analyses("cv_session_1").await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].ats_score, 85);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_analysis_is_not_found() {
        let (client, _) = client().await;
        let err = client.get_analysis("nope").await.unwrap_err();
        match err {
            AnalysisError::NotFound(message) => assert_eq!(message, "Analysis nope not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_debug_parse() {
        let (client, _) = client().await;
        let report = client
            .debug_parse("Jane Doe\nEngineer", "jane.docx")
            .await
            .unwrap();
        assert_eq!(report.word_count, 3);
        assert_eq!(report.line_count, 2);
        assert!(report.success);
    }

    #[tokio::test]
    async fn test_health() {
        let (client, _) = client().await;
        assert!(client.health().await);

        let unreachable =
            AnalysisClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert!(!unreachable.health().await);
    }
}
