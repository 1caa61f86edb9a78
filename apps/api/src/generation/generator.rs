//! Tool pipelines.
//!
//! Flow for the PDF tools: validate → prompt → `ModelRouter::stream` → `accumulate`
//! → render. The portfolio takes the non-stream path and assembles HTML instead.
//! The ATS scan scores first and then asks the model for feedback; a model outage
//! leaves the score intact.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{ats_feedback_prompt, portfolio_cards_prompt};
use crate::generation::stream::{accumulate, Accumulated};
use crate::generation::{Artifact, HTML_CONTENT_TYPE, PDF_CONTENT_TYPE};
use crate::ingest::extract_text_blocking;
use crate::llm_client::{CandidateFailure, LlmError, ModelRouter};
use crate::portfolio::{assemble_portfolio, PortfolioFields};
use crate::render::{render_pdf, PageConfig};
use crate::sanitize::strip_code_fences;
use crate::scoring::{AtsScore, TfIdfScorer};
use crate::session::Profile;

pub const PORTFOLIO_FILE_NAME: &str = "index.html";
pub const COVER_LETTER_FILE_NAME: &str = "Cover_Letter.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

pub fn validate_resume(profile: &Profile) -> Result<(), AppError> {
    if profile.name.trim().is_empty() || profile.role.trim().is_empty() {
        return Err(AppError::Validation(
            "Please fill in at least Name and Target Role.".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_cover_letter(company: &str, role: &str) -> Result<(), AppError> {
    if company.trim().is_empty() || role.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide the Company Name and Job Role.".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Drafting
// ────────────────────────────────────────────────────────────────────────────

/// Model output for one prompt, plus the candidate that produced it.
#[derive(Debug, Clone)]
pub struct Draft {
    pub model: String,
    pub text: String,
}

/// Streams `prompt` from the first working candidate and accumulates it.
/// `Ok(None)` means the token was cancelled before the stream finished.
pub async fn draft<F>(
    router: &ModelRouter,
    prompt: &str,
    cancel: &CancellationToken,
    on_fragment: F,
) -> Result<Option<Draft>, AppError>
where
    F: FnMut(&str) + Send,
{
    let reply = router.stream(prompt).await?;

    match accumulate(reply.output, cancel, on_fragment).await? {
        Accumulated::Complete(text) if text.trim().is_empty() => {
            Err(AppError::Llm(LlmError::EmptyContent))
        }
        Accumulated::Complete(text) => Ok(Some(Draft {
            model: reply.model,
            text,
        })),
        Accumulated::Cancelled(partial) => {
            info!(
                "Generation cancelled after {} chars from {}",
                partial.len(),
                reply.model
            );
            Ok(None)
        }
    }
}

/// `draft` for request/response endpoints, where nothing cancels the token.
pub async fn draft_to_completion(router: &ModelRouter, prompt: &str) -> Result<Draft, AppError> {
    draft(router, prompt, &CancellationToken::new(), |_| {})
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("generation stopped before completion")))
}

// ────────────────────────────────────────────────────────────────────────────
// Artifacts
// ────────────────────────────────────────────────────────────────────────────

/// Renders `text` to a PDF artifact on the blocking pool.
pub async fn render_document(
    text: String,
    file_name: String,
    page_config: PageConfig,
) -> Result<Artifact, AppError> {
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&text, &page_config)).await??;
    Ok(Artifact {
        file_name,
        content_type: PDF_CONTENT_TYPE,
        bytes,
    })
}

/// Turns raw project notes into cards with one non-stream call, then fills the page shell.
pub async fn build_portfolio(
    router: &ModelRouter,
    raw_projects: &str,
    mut fields: PortfolioFields,
) -> Result<Artifact, AppError> {
    let cards = router.complete(&portfolio_cards_prompt(raw_projects)).await?;
    info!("Portfolio cards generated by {}", cards.model);

    fields.projects = strip_code_fences(&cards.output);
    Ok(Artifact {
        file_name: PORTFOLIO_FILE_NAME.to_string(),
        content_type: HTML_CONTENT_TYPE,
        bytes: assemble_portfolio(&fields).into_bytes(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// ATS scan
// ────────────────────────────────────────────────────────────────────────────

/// The AI half of an ATS scan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackOutcome {
    Completed { model: String, text: String },
    Unavailable { failures: Vec<CandidateFailure> },
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsReport {
    #[serde(flatten)]
    pub scan: AtsScore,
    pub verdict: &'static str,
    pub feedback: FeedbackOutcome,
}

pub async fn ats_scan(
    router: &ModelRouter,
    scorer: Arc<TfIdfScorer>,
    resume_pdf: Vec<u8>,
    job_description: &str,
) -> Result<AtsReport, AppError> {
    let resume_text = extract_text_blocking(resume_pdf).await?;
    let scan = scorer.score(&resume_text, job_description)?;
    info!("ATS score {} ({:?})", scan.score, scan.band);

    let feedback = ats_feedback(router, &resume_text, job_description).await;
    Ok(AtsReport {
        verdict: scan.band.verdict(),
        scan,
        feedback,
    })
}

async fn ats_feedback(router: &ModelRouter, resume_text: &str, job_description: &str) -> FeedbackOutcome {
    let prompt = ats_feedback_prompt(resume_text, job_description);
    let reply = match router.stream(&prompt).await {
        Ok(reply) => reply,
        Err(e) => return FeedbackOutcome::Unavailable { failures: e.failures },
    };

    let error = match accumulate(reply.output, &CancellationToken::new(), |_| {}).await {
        Ok(done) if !done.text().trim().is_empty() => {
            return FeedbackOutcome::Completed {
                model: reply.model,
                text: done.text().to_string(),
            }
        }
        Ok(_) => LlmError::EmptyContent,
        Err(e) => e,
    };
    warn!("ATS feedback stream from {} failed: {error}", reply.model);
    FeedbackOutcome::Unavailable {
        failures: vec![CandidateFailure {
            model: reply.model,
            error: error.to_string(),
        }],
    }
}
