// Generation tools: resume, cover letter, portfolio, ATS feedback.
// All model calls go through llm_client::ModelRouter; nothing here talks HTTP to the model.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod stream;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("file name pattern is valid"));
static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A finished download. Always fully built before it is returned.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl IntoResponse for Artifact {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// `name` with everything but word characters, whitespace and `-` removed,
/// trimmed, each whitespace run turned into one underscore. The result is
/// always safe inside a `Content-Disposition` header.
pub fn clean_file_stem(name: &str) -> String {
    let kept = NON_NAME_CHARS.replace_all(name, "");
    WHITESPACE_RUNS.replace_all(kept.trim(), "_").into_owned()
}

/// `{CleanName}_Resume.pdf`, or `Resume.pdf` when nothing of the name survives.
pub fn resume_file_name(name: &str) -> String {
    let stem = clean_file_stem(name);
    if stem.is_empty() {
        "Resume.pdf".to_string()
    } else {
        format!("{stem}_Resume.pdf")
    }
}
