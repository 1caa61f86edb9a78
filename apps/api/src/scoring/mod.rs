// ATS scoring: lexical similarity between a resume and a job description.
// Pure CPU work, no LLM calls. The AI feedback half of an ATS scan lives in generation.

pub mod stop_words;
pub mod tfidf;

use serde::Serialize;
use thiserror::Error;

pub use tfidf::{ScorerOptions, TfIdfScorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Document {
    Resume,
    JobDescription,
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Document::Resume => f.write_str("resume"),
            Document::JobDescription => f.write_str("job description"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("The {which} is empty; nothing to score")]
    EmptyDocument { which: Document },

    #[error("No scorable terms remain after removing stop words")]
    EmptyVocabulary,

    #[error("Tokenizer setup failed: {0}")]
    Tokenizer(#[from] regex::Error),
}

/// Qualitative band for a 0–100 match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBand {
    Low,
    Average,
    High,
}

impl MatchBand {
    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            MatchBand::Low
        } else if score < 75.0 {
            MatchBand::Average
        } else {
            MatchBand::High
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            MatchBand::Low => "Low Match - Needs Work",
            MatchBand::Average => "Average Match - Optimize Keywords",
            MatchBand::High => "High Match - Ready to Apply",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsScore {
    /// 0.00 – 100.00
    pub score: f64,
    pub band: MatchBand,
    /// Terms present in both documents, alphabetical.
    pub matched_terms: Vec<String>,
    /// Highest-weighted job description terms missing from the resume.
    pub missing_terms: Vec<String>,
}
