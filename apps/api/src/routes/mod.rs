pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::generation::handlers as generation;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            put(session::handle_save_profile),
        )
        .route(
            "/api/v1/sessions/:id/history",
            get(session::handle_get_history),
        )
        // Tools
        .route(
            "/api/v1/sessions/:id/resume",
            post(generation::handle_generate_resume),
        )
        .route(
            "/api/v1/sessions/:id/resume/stream",
            post(generation::handle_stream_resume),
        )
        .route(
            "/api/v1/sessions/:id/cover-letter",
            post(generation::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/sessions/:id/cover-letter/stream",
            post(generation::handle_stream_cover_letter),
        )
        .route(
            "/api/v1/sessions/:id/portfolio",
            post(generation::handle_generate_portfolio),
        )
        .route(
            "/api/v1/sessions/:id/ats-scan",
            post(generation::handle_ats_scan)
                .layer(DefaultBodyLimit::max(generation::MAX_UPLOAD_BYTES)),
        )
        // Stateless
        .route("/api/v1/render/pdf", post(generation::handle_render_pdf))
        .route("/api/v1/resume-styles", get(generation::handle_list_styles))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Request, StatusCode},
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::router::testing::{router, ScriptedModel};
    use crate::render::{default_page_config, render_pdf};
    use crate::scoring::{ScorerOptions, TfIdfScorer};
    use crate::session::SessionStore;

    const RESUME_TEXT: &[&str] = &["# Jane Doe\n", "## Skills\n", "- Python\n", "- **SQL**\n"];

    fn app_with(model: ScriptedModel) -> Router {
        build_router(AppState {
            router: router(model, &["gemini-a", "gemini-b"]),
            scorer: Arc::new(TfIdfScorer::new(ScorerOptions::default()).unwrap()),
            sessions: SessionStore::new(),
            page_config: default_page_config(),
        })
    }

    fn working_app() -> Router {
        app_with(ScriptedModel::new().answer("gemini-b", RESUME_TEXT))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let (status, _, body) = send(app, empty_request("POST", "/api/v1/sessions")).await;
        assert_eq!(status, StatusCode::CREATED);
        let session: Value = serde_json::from_slice(&body).unwrap();
        session["id"].as_str().unwrap().to_string()
    }

    async fn session_with_profile(app: &Router) -> String {
        let id = new_session(app).await;
        let profile = json!({
            "name": "Jane Doe",
            "role": "Data Engineer",
            "email": "jane@example.com",
            "skills": "Python, SQL",
            "projects": "Ledger: Rust bookkeeping"
        });
        let (status, _, _) = send(
            app,
            json_request("PUT", &format!("/api/v1/sessions/{id}/profile"), profile),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    async fn history(app: &Router, id: &str) -> Vec<Value> {
        let (_, _, body) = send(app, empty_request("GET", &format!("/api/v1/sessions/{id}/history"))).await;
        serde_json::from_slice(&body).unwrap()
    }

    /// Event names of an SSE body, in order.
    fn sse_events(body: &Bytes) -> Vec<String> {
        String::from_utf8_lossy(body)
            .lines()
            .filter_map(|line| line.strip_prefix("event:"))
            .map(|name| name.trim().to_string())
            .collect()
    }

    fn error_code(body: &Bytes) -> String {
        let value: Value = serde_json::from_slice(body).unwrap();
        value["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(&working_app(), empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["models"], json!(["gemini-a", "gemini-b"]));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = working_app();
        let id = new_session(&app).await;

        let (status, _, body) = send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let session: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(session["profile"]["name"], "");

        let (status, _, _) = send(&app, empty_request("DELETE", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_resume_requires_name_and_role() {
        let app = working_app();
        let id = new_session(&app).await;
        let (status, _, body) = send(
            &app,
            json_request("POST", &format!("/api/v1/sessions/{id}/resume"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            value["error"]["message"],
            "Please fill in at least Name and Target Role."
        );
        assert!(history(&app, &id).await.is_empty());
    }

    #[tokio::test]
    async fn test_resume_returns_pdf_and_records_history() {
        let app = working_app();
        let id = session_with_profile(&app).await;

        let (status, headers, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/resume"),
                json!({ "style": "structured" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Doe_Resume.pdf\""
        );
        assert!(body.starts_with(b"%PDF"));

        let entries = history(&app, &id).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["action"], "Generated Resume");
        assert_eq!(
            entries[0]["detail"],
            "Jane Doe (Structured Professional (Project Focused))"
        );
    }

    #[tokio::test]
    async fn test_resume_name_with_newline_still_downloads() {
        let app = working_app();
        let id = new_session(&app).await;

        let (status, headers, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/resume"),
                json!({ "profile": { "name": "Jane\nDoe", "role": "SRE" } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Doe_Resume.pdf\""
        );
        assert!(body.starts_with(b"%PDF"));
        assert_eq!(history(&app, &id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_resume_with_every_model_down_is_bad_gateway() {
        let app = app_with(ScriptedModel::new());
        let id = session_with_profile(&app).await;

        let (status, _, body) = send(
            &app,
            json_request("POST", &format!("/api/v1/sessions/{id}/resume"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "MODEL_UNAVAILABLE");
        let message = value["error"]["message"].as_str().unwrap();
        assert!(message.contains("gemini-a failed"));
        assert!(message.contains("gemini-b failed"));
        assert!(history(&app, &id).await.is_empty());
    }

    #[tokio::test]
    async fn test_resume_for_unknown_session_is_not_found() {
        let uri = format!("/api/v1/sessions/{}/resume", uuid::Uuid::new_v4());
        let (status, _, body) = send(&working_app(), json_request("POST", &uri, json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_resume_stream_emits_fragments_then_done() {
        let app = working_app();
        let id = session_with_profile(&app).await;

        let (status, headers, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/resume/stream"),
                json!({ "style": "minimalist" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let mut expected = vec!["fragment"; RESUME_TEXT.len()];
        expected.push("done");
        assert_eq!(sse_events(&body), expected);

        let entries = history(&app, &id).await;
        assert_eq!(entries[0]["detail"], "Jane Doe (Minimalist Clean (ATS Friendly))");
    }

    #[tokio::test]
    async fn test_resume_stream_with_crlf_fragments_completes() {
        let app = app_with(ScriptedModel::new().answer("gemini-a", &["# Jane\r\n", "- Rust\r\n"]));
        let id = session_with_profile(&app).await;

        let (status, _, body) = send(
            &app,
            json_request("POST", &format!("/api/v1/sessions/{id}/resume/stream"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sse_events(&body), vec!["fragment", "fragment", "done"]);
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("data: - Rust") || text.contains("data:- Rust"));
        assert!(!text.contains('\r'));

        let entries = history(&app, &id).await;
        assert_eq!(entries[0]["action"], "Generated Resume");
    }

    #[tokio::test]
    async fn test_stream_failure_is_an_error_event() {
        let app = app_with(ScriptedModel::new());
        let id = session_with_profile(&app).await;

        let (status, _, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/cover-letter/stream"),
                json!({ "company": "Acme", "role": "SRE" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sse_events(&body), vec!["error"]);
        assert!(String::from_utf8_lossy(&body).contains("MODEL_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_cover_letter_pdf_records_company() {
        let app = working_app();
        let id = session_with_profile(&app).await;

        let (status, headers, _) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/cover-letter"),
                json!({ "company": "Acme", "role": "SRE", "job_description": "Run prod." }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Cover_Letter.pdf\""
        );
        let entries = history(&app, &id).await;
        assert_eq!(entries[0]["action"], "Generated Cover Letter");
        assert_eq!(entries[0]["detail"], "Acme");
    }

    #[tokio::test]
    async fn test_cover_letter_requires_company_and_role() {
        let app = working_app();
        let id = session_with_profile(&app).await;
        let (status, _, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/cover-letter"),
                json!({ "company": "Acme" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_portfolio_returns_html_with_profile_fields() {
        let app = app_with(ScriptedModel::new().answer(
            "gemini-a",
            &["```html\n<div class=\"project-card\"><h3>Ledger</h3></div>\n```"],
        ));
        let id = session_with_profile(&app).await;

        let (status, headers, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/portfolio"),
                json!({ "github": "https://github.com/janedoe" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"index.html\""
        );
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert!(html.contains("<p>Data Engineer</p>"));
        assert!(html.contains(r#"href="https://github.com/janedoe""#));
        assert!(html.contains("<h3>Ledger</h3>"));

        let entries = history(&app, &id).await;
        assert_eq!(entries[0]["action"], "Generated Portfolio");
        assert_eq!(entries[0]["detail"], "Jane Doe");
    }

    fn multipart_request(uri: &str, resume: Option<&[u8]>, job_description: &str) -> Request<Body> {
        const BOUNDARY: &str = "resumai-test-boundary";
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{job_description}\r\n"
            )
            .as_bytes(),
        );
        if let Some(pdf) = resume {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"resume.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(pdf);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ats_scan_scores_and_returns_feedback() {
        let app = app_with(ScriptedModel::new().answer("gemini-a", &["1. Missing: ", "Kafka"]));
        let id = new_session(&app).await;
        let pdf = render_pdf("python developer with sql experience", &default_page_config()).unwrap();

        let (status, _, body) = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/ats-scan"),
                Some(pdf.as_slice()),
                "looking for python developer skilled in sql",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert!(report["score"].as_f64().unwrap() >= 60.0);
        assert_eq!(report["feedback"]["status"], "completed");
        assert_eq!(report["feedback"]["text"], "1. Missing: Kafka");

        let entries = history(&app, &id).await;
        assert_eq!(entries[0]["action"], "ATS Scan Performed");
        assert!(entries[0]["detail"].as_str().unwrap().starts_with("Score: "));
    }

    #[tokio::test]
    async fn test_ats_scan_without_file_is_validation_error() {
        let app = working_app();
        let id = new_session(&app).await;
        let (status, _, body) = send(
            &app,
            multipart_request(&format!("/api/v1/sessions/{id}/ats-scan"), None, "rust engineer"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["message"], "Please upload a file and provide a JD.");
    }

    #[tokio::test]
    async fn test_ats_scan_with_non_pdf_is_extraction_error() {
        let app = working_app();
        let id = new_session(&app).await;
        let (status, _, body) = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/ats-scan"),
                Some(b"just some text".as_slice()),
                "rust engineer",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&body), "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_ats_scan_over_upload_limit_is_payload_too_large() {
        let app = working_app();
        let id = new_session(&app).await;
        let mut pdf = b"%PDF-1.5\n".to_vec();
        pdf.resize(generation::MAX_UPLOAD_BYTES + 1024, b' ');

        let (status, _, body) = send(
            &app,
            multipart_request(&format!("/api/v1/sessions/{id}/ats-scan"), Some(pdf.as_slice()), "rust engineer"),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&body), "PAYLOAD_TOO_LARGE");
        assert!(history(&app, &id).await.is_empty());
    }

    #[tokio::test]
    async fn test_render_pdf_endpoint() {
        let (status, headers, body) = send(
            &working_app(),
            json_request(
                "POST",
                "/api/v1/render/pdf",
                json!({ "text": "# Notes\n- one", "file_name": "My Notes.pdf" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"My_Notes.pdf\""
        );
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_resume_styles_listing() {
        let (status, _, body) = send(&working_app(), empty_request("GET", "/api/v1/resume-styles")).await;
        assert_eq!(status, StatusCode::OK);
        let styles: Vec<Value> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<&str> = styles.iter().map(|s| s["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["minimalist", "structured", "chronological"]);
    }
}
