//! TF-IDF vectorizer + cosine similarity over a two-document corpus.
//!
//! Tokenization: lowercase, runs of ≥2 word characters, English stop words removed.
//! Weighting: by default this is a TF-only cosine. Raw term frequency (optionally
//! sublinear) is L2-normalized with no IDF factor. `use_idf` multiplies in a smoothed
//! IDF fitted on the two documents, which down-weights every shared term.
//!
//! Built once at startup and shared via `AppState`.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::scoring::stop_words::ENGLISH_STOP_WORDS;
use crate::scoring::{AtsScore, Document, MatchBand, ScoringError};

const TOKEN_PATTERN: &str = r"\b\w\w+\b";
const MAX_MISSING_TERMS: usize = 20;

/// Weighting knobs, mirroring the usual vectorizer parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerOptions {
    pub use_idf: bool,
    pub smooth_idf: bool,
    pub sublinear_tf: bool,
}

impl Default for ScorerOptions {
    fn default() -> Self {
        Self {
            use_idf: false,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

type TermCounts = BTreeMap<String, u32>;

pub struct TfIdfScorer {
    token_re: Regex,
    stop_words: HashSet<&'static str>,
    options: ScorerOptions,
}

impl TfIdfScorer {
    pub fn new(options: ScorerOptions) -> Result<Self, ScoringError> {
        Ok(Self {
            token_re: Regex::new(TOKEN_PATTERN)?,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
            options,
        })
    }

    pub fn options(&self) -> ScorerOptions {
        self.options
    }

    /// Lowercased tokens with stop words removed, in document order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .map(str::to_string)
            .collect()
    }

    fn term_counts(&self, text: &str) -> TermCounts {
        let mut counts = TermCounts::new();
        for token in self.tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Scores `resume` against `job_description` as a 0–100 percentage, two decimals.
    pub fn score(&self, resume: &str, job_description: &str) -> Result<AtsScore, ScoringError> {
        if resume.trim().is_empty() {
            return Err(ScoringError::EmptyDocument {
                which: Document::Resume,
            });
        }
        if job_description.trim().is_empty() {
            return Err(ScoringError::EmptyDocument {
                which: Document::JobDescription,
            });
        }

        let resume_counts = self.term_counts(resume);
        let jd_counts = self.term_counts(job_description);

        let vocabulary: Vec<&String> = {
            let mut v: Vec<&String> = resume_counts.keys().chain(jd_counts.keys()).collect();
            v.sort();
            v.dedup();
            v
        };
        if vocabulary.is_empty() {
            return Err(ScoringError::EmptyVocabulary);
        }

        let resume_vec = self.weigh(&vocabulary, &resume_counts, &[&resume_counts, &jd_counts]);
        let jd_vec = self.weigh(&vocabulary, &jd_counts, &[&resume_counts, &jd_counts]);

        let similarity = cosine(&resume_vec, &jd_vec);
        let score = round2((similarity * 100.0).clamp(0.0, 100.0));

        let mut missing: Vec<(&String, f64)> = vocabulary
            .iter()
            .zip(&jd_vec)
            .filter(|(term, _)| !resume_counts.contains_key(term.as_str()))
            .map(|(term, weight)| (*term, *weight))
            .collect();
        missing.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let matched_terms = vocabulary
            .iter()
            .filter(|t| resume_counts.contains_key(t.as_str()) && jd_counts.contains_key(t.as_str()))
            .map(|t| t.to_string())
            .collect();

        Ok(AtsScore {
            score,
            band: MatchBand::from_score(score),
            matched_terms,
            missing_terms: missing
                .into_iter()
                .take(MAX_MISSING_TERMS)
                .map(|(t, _)| t.clone())
                .collect(),
        })
    }

    /// Weighted vector for `counts` over the shared vocabulary.
    fn weigh(&self, vocabulary: &[&String], counts: &TermCounts, corpus: &[&TermCounts]) -> Vec<f64> {
        let n = corpus.len() as f64;
        vocabulary
            .iter()
            .map(|term| {
                let tf = counts.get(term.as_str()).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                let tf = if self.options.sublinear_tf { 1.0 + tf.ln() } else { tf };

                let idf = if self.options.use_idf {
                    let df = corpus.iter().filter(|c| c.contains_key(term.as_str())).count() as f64;
                    if self.options.smooth_idf {
                        ((1.0 + n) / (1.0 + df)).ln() + 1.0
                    } else {
                        (n / df).ln() + 1.0
                    }
                } else {
                    1.0
                };

                tf * idf
            })
            .collect()
    }
}

fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
