//! Candidate fallback: try each configured model in order, first success wins.
//!
//! Candidates are tried strictly in sequence, never raced. When every candidate fails
//! the caller gets `AllCandidatesFailed` with one entry per candidate, so an outage
//! can never be mistaken for generated text.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{FragmentStream, LlmError, TextModel};

/// One candidate's failure, kept for the user-visible report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub model: String,
    pub error: String,
}

#[derive(Debug, Clone, Error)]
#[error("All models failed: {}", summarize(.failures))]
pub struct AllCandidatesFailed {
    pub failures: Vec<CandidateFailure>,
}

fn summarize(failures: &[CandidateFailure]) -> String {
    if failures.is_empty() {
        return "no model candidates configured".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{} failed: {}", f.model, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successful answer plus the candidate that produced it.
pub struct ModelReply<T> {
    pub model: String,
    pub output: T,
}

#[derive(Clone)]
pub struct ModelRouter {
    backend: Arc<dyn TextModel>,
    candidates: Vec<String>,
}

impl ModelRouter {
    pub fn new(backend: Arc<dyn TextModel>, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Non-stream path: the complete answer from the first candidate that succeeds.
    pub async fn complete(&self, prompt: &str) -> Result<ModelReply<String>, AllCandidatesFailed> {
        let mut failures = Vec::new();

        for model in &self.candidates {
            match self.backend.generate(model, prompt).await {
                Ok(text) => {
                    info!("Model {model} answered ({} chars)", text.len());
                    return Ok(ModelReply {
                        model: model.clone(),
                        output: text,
                    });
                }
                Err(e) => failures.push(record_failure(model, e)),
            }
        }

        Err(AllCandidatesFailed { failures })
    }

    /// Stream path: the fragment stream of the first candidate that opens one.
    ///
    /// Errors raised after the stream is open belong to the stream itself and are not
    /// retried on the next candidate.
    pub async fn stream(
        &self,
        prompt: &str,
    ) -> Result<ModelReply<FragmentStream>, AllCandidatesFailed> {
        let mut failures = Vec::new();

        for model in &self.candidates {
            match self.backend.generate_stream(model, prompt).await {
                Ok(stream) => {
                    info!("Streaming from model {model}");
                    return Ok(ModelReply {
                        model: model.clone(),
                        output: stream,
                    });
                }
                Err(e) => failures.push(record_failure(model, e)),
            }
        }

        Err(AllCandidatesFailed { failures })
    }
}

fn record_failure(model: &str, error: LlmError) -> CandidateFailure {
    warn!("Model candidate {model} failed: {error}");
    CandidateFailure {
        model: model.to_string(),
        error: error.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
