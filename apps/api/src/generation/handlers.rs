//! Axum route handlers for the generation tools.

use std::convert::Infallible;

use axum::{
    extract::{Multipart, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Datelike;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{
    self, ats_scan, build_portfolio, draft_to_completion, render_document, validate_cover_letter,
    validate_resume, AtsReport, COVER_LETTER_FILE_NAME,
};
use crate::generation::prompts::{cover_letter_prompt, resume_prompt, ResumeStyle, RESUME_STYLES};
use crate::generation::{clean_file_stem, resume_file_name, Artifact};
use crate::portfolio::PortfolioFields;
use crate::session::Profile;
use crate::state::AppState;

/// Fragments buffered per SSE client before live updates are skipped.
const SSE_BUFFER: usize = 256;

/// Request body cap for the ATS upload (PDF plus job description).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_BIO: &str = "I am a passionate developer skilled in Python and Data Science...";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResumeRequest {
    pub style: ResumeStyle,
    /// Overrides the saved profile for this run only.
    pub profile: Option<Profile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoverLetterRequest {
    /// Defaults to the profile name.
    pub name: Option<String>,
    pub company: String,
    pub role: String,
    pub job_description: String,
}

/// Every field falls back to the saved profile.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub projects: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StyleInfo {
    pub id: ResumeStyle,
    pub label: &'static str,
}

/// History line written once a tool run succeeds.
struct HistoryNote {
    action: &'static str,
    detail: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume-styles
pub async fn handle_list_styles() -> Json<Vec<StyleInfo>> {
    Json(
        RESUME_STYLES
            .iter()
            .map(|s| StyleInfo {
                id: s.style,
                label: s.label,
            })
            .collect(),
    )
}

fn resume_job(profile: Profile, style: ResumeStyle) -> Result<(String, HistoryNote), AppError> {
    validate_resume(&profile)?;
    let note = HistoryNote {
        action: "Generated Resume",
        detail: format!("{} ({})", profile.name, style.label()),
    };
    Ok((resume_prompt(&profile, style), note))
}

/// POST /api/v1/sessions/:id/resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResumeRequest>,
) -> Result<Artifact, AppError> {
    let session = state.sessions.get(id).await?;
    let profile = req.profile.unwrap_or(session.profile);
    let file_name = resume_file_name(&profile.name);
    let (prompt, note) = resume_job(profile, req.style)?;

    let draft = draft_to_completion(&state.router, &prompt).await?;
    let artifact = render_document(draft.text, file_name, state.page_config.clone()).await?;

    state.sessions.record(id, note.action, note.detail).await?;
    info!("Resume generated: session={id}, model={}", draft.model);
    Ok(artifact)
}

/// POST /api/v1/sessions/:id/resume/stream
pub async fn handle_stream_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResumeRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session = state.sessions.get(id).await?;
    let profile = req.profile.unwrap_or(session.profile);
    let (prompt, note) = resume_job(profile, req.style)?;
    Ok(stream_draft(state, id, prompt, note))
}

fn cover_letter_job(profile: &Profile, req: CoverLetterRequest) -> Result<(String, HistoryNote), AppError> {
    validate_cover_letter(&req.company, &req.role)?;
    let name = req.name.unwrap_or_else(|| profile.name.clone());
    let prompt = cover_letter_prompt(&name, &req.company, &req.role, &req.job_description);
    Ok((
        prompt,
        HistoryNote {
            action: "Generated Cover Letter",
            detail: req.company,
        },
    ))
}

/// POST /api/v1/sessions/:id/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Artifact, AppError> {
    let session = state.sessions.get(id).await?;
    let (prompt, note) = cover_letter_job(&session.profile, req)?;

    let draft = draft_to_completion(&state.router, &prompt).await?;
    let artifact = render_document(
        draft.text,
        COVER_LETTER_FILE_NAME.to_string(),
        state.page_config.clone(),
    )
    .await?;

    state.sessions.record(id, note.action, note.detail).await?;
    info!("Cover letter generated: session={id}, model={}", draft.model);
    Ok(artifact)
}

/// POST /api/v1/sessions/:id/cover-letter/stream
pub async fn handle_stream_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session = state.sessions.get(id).await?;
    let (prompt, note) = cover_letter_job(&session.profile, req)?;
    Ok(stream_draft(state, id, prompt, note))
}

/// POST /api/v1/sessions/:id/portfolio
pub async fn handle_generate_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PortfolioRequest>,
) -> Result<Artifact, AppError> {
    let profile = state.sessions.get(id).await?.profile;

    let raw_projects = req.projects.unwrap_or(profile.projects);
    let fields = PortfolioFields {
        name: req.name.unwrap_or(profile.name),
        role: req.role.unwrap_or(profile.role),
        bio: req.bio.unwrap_or_else(|| DEFAULT_BIO.to_string()),
        projects: String::new(),
        email: profile.email,
        linkedin: req.linkedin.unwrap_or(profile.linkedin),
        github: req.github.unwrap_or(profile.github),
        year: chrono::Utc::now().year(),
    };
    let name = fields.name.clone();

    let artifact = build_portfolio(&state.router, &raw_projects, fields).await?;
    state.sessions.record(id, "Generated Portfolio", name).await?;
    info!("Portfolio generated: session={id}");
    Ok(artifact)
}

/// POST /api/v1/sessions/:id/ats-scan
/// Multipart: `resume` (PDF file), `job_description` (text).
pub async fn handle_ats_scan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<AtsReport>, AppError> {
    state.sessions.get(id).await?;

    let mut resume: Option<Vec<u8>> = None;
    let mut job_description: Option<String> = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("resume") => resume = Some(field.bytes().await?.to_vec()),
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let (Some(resume), Some(job_description)) = (
        resume.filter(|b| !b.is_empty()),
        job_description.filter(|t| !t.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Please upload a file and provide a JD.".to_string(),
        ));
    };

    let report = ats_scan(&state.router, state.scorer.clone(), resume, &job_description).await?;
    state
        .sessions
        .record(id, "ATS Scan Performed", format!("Score: {}%", report.scan.score))
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/render/pdf
pub async fn handle_render_pdf(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Artifact, AppError> {
    let stem = req
        .file_name
        .as_deref()
        .map(|n| clean_file_stem(n.trim_end_matches(".pdf")))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    render_document(req.text, format!("{stem}.pdf"), state.page_config.clone()).await
}

// ────────────────────────────────────────────────────────────────────────────
// SSE
// ────────────────────────────────────────────────────────────────────────────

/// SSE data lines cannot carry `\r`; CRLF and lone CR become `\n`.
fn sse_data(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Streams a draft as `fragment` events, then one `done` (full text) or `error` event.
///
/// The model stream is pulled in a spawned task. A closed channel cancels the task's
/// token, which drops the upstream stream at the next pull.
fn stream_draft(
    state: AppState,
    session_id: Uuid,
    prompt: String,
    note: HistoryNote,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Event>(SSE_BUFFER);

    tokio::spawn(async move {
        let cancel = CancellationToken::new();
        let fragment_tx = tx.clone();
        let fragment_cancel = cancel.clone();
        let on_fragment = move |fragment: &str| {
            let event = Event::default().event("fragment").data(sse_data(fragment));
            if let Err(TrySendError::Closed(_)) = fragment_tx.try_send(event) {
                fragment_cancel.cancel();
            }
        };

        let outcome = tokio::select! {
            outcome = generator::draft(&state.router, &prompt, &cancel, on_fragment) => outcome,
            _ = tx.closed() => {
                cancel.cancel();
                info!("SSE client disconnected: session={session_id}");
                return;
            }
        };

        let event = match outcome {
            Ok(Some(draft)) => {
                if let Err(e) = state.sessions.record(session_id, note.action, note.detail).await {
                    warn!("Could not record history for {session_id}: {e}");
                }
                info!("{} streamed: session={session_id}, model={}", note.action, draft.model);
                Event::default().event("done").data(sse_data(&draft.text))
            }
            Ok(None) => return,
            Err(e) => {
                let (_, code, message) = e.parts();
                Event::default()
                    .event("error")
                    .data(AppError::body(code, &message).to_string())
            }
        };
        let _ = tx.send(event).await;
    });

    Sse::new(ReceiverStream::new(rx).map(Ok)).keep_alive(KeepAlive::default())
}
