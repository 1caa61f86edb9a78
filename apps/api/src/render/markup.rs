//! Markdown-like line grammar for model output.
//!
//! Strictly line-by-line: every non-blank line becomes exactly one `RenderLine`,
//! with no state carried between lines (no nesting, no list continuation).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BOLD_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold span pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "level")]
pub enum LineStyle {
    /// Level 1–3.
    Heading(u8),
    Bullet,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderLine {
    pub style: LineStyle,
    pub spans: Vec<Span>,
}

#[cfg(test)]
impl RenderLine {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Splits `text` into styled lines. Blank lines are dropped.
pub fn parse_markup(text: &str) -> Vec<RenderLine> {
    text.lines().filter_map(classify_line).collect()
}

/// Classifies one raw line; `None` for blank lines.
pub fn classify_line(raw: &str) -> Option<RenderLine> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let heading = |level: u8, rest: &str| RenderLine {
        style: LineStyle::Heading(level),
        spans: vec![Span {
            text: rest.replace("**", ""),
            bold: level == 3,
        }],
    };

    let rendered = if let Some(rest) = line.strip_prefix("### ") {
        heading(3, rest)
    } else if let Some(rest) = line.strip_prefix("## ") {
        heading(2, rest)
    } else if let Some(rest) = line.strip_prefix("# ") {
        heading(1, rest)
    } else if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        RenderLine {
            style: LineStyle::Bullet,
            spans: bold_spans(rest.trim()),
        }
    } else {
        RenderLine {
            style: LineStyle::Body,
            spans: bold_spans(line),
        }
    };

    Some(rendered)
}

/// Splits `**bold**` markers into spans. An unmatched `**` stays literal.
fn bold_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD_SPAN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            spans.push(Span {
                text: inner.as_str().to_string(),
                bold: true,
            });
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Span {
        Span {
            text: text.to_string(),
            bold: true,
        }
    }

    #[test]
    fn test_heading_levels() {
        let lines = parse_markup("# Jane Doe\n## Skills\n### Project | Rust");
        let styles: Vec<_> = lines.iter().map(|l| l.style).collect();
        assert_eq!(
            styles,
            vec![
                LineStyle::Heading(1),
                LineStyle::Heading(2),
                LineStyle::Heading(3)
            ]
        );
        assert_eq!(lines[0].plain_text(), "Jane Doe");
        assert_eq!(lines[2].plain_text(), "Project | Rust");
    }

    #[test]
    fn test_title_line_is_level_one_heading() {
        let line = classify_line("# Title").unwrap();
        assert_eq!(line.style, LineStyle::Heading(1));
        assert_eq!(line.plain_text(), "Title");
    }

    #[test]
    fn test_heading_drops_bold_markers() {
        let line = classify_line("## **Experience**").unwrap();
        assert_eq!(line.plain_text(), "Experience");
    }

    #[test]
    fn test_star_bullet_strips_marker() {
        let line = classify_line("* item").unwrap();
        assert_eq!(line.style, LineStyle::Bullet);
        assert_eq!(line.spans, vec![Span::plain("item")]);
    }

    #[test]
    fn test_skills_scenario() {
        let lines = parse_markup("## Skills\n- Python\n- **SQL**");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].style, LineStyle::Heading(2));
        assert_eq!(lines[0].plain_text(), "Skills");
        assert_eq!(lines[1].style, LineStyle::Bullet);
        assert_eq!(lines[1].spans, vec![Span::plain("Python")]);
        assert_eq!(lines[2].style, LineStyle::Bullet);
        assert_eq!(lines[2].spans, vec![bold("SQL")]);
    }

    #[test]
    fn test_body_inline_bold() {
        let line = classify_line("Led **Rust** migration, **2x** faster").unwrap();
        assert_eq!(line.style, LineStyle::Body);
        assert_eq!(
            line.spans,
            vec![
                Span::plain("Led "),
                bold("Rust"),
                Span::plain(" migration, "),
                bold("2x"),
                Span::plain(" faster"),
            ]
        );
    }

    #[test]
    fn test_unmatched_bold_marker_stays_literal() {
        let line = classify_line("a ** b").unwrap();
        assert_eq!(line.spans, vec![Span::plain("a ** b")]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let lines = parse_markup("\n\n   \n# A\n\n\nbody\n");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_hash_without_space_is_body() {
        let line = classify_line("#hashtag").unwrap();
        assert_eq!(line.style, LineStyle::Body);
    }

    #[test]
    fn test_lines_are_trimmed_before_classification() {
        let line = classify_line("   - indented bullet  ").unwrap();
        assert_eq!(line.style, LineStyle::Bullet);
        assert_eq!(line.plain_text(), "indented bullet");
    }

    #[test]
    fn test_total_over_odd_input() {
        let inputs = ["****", "- ", "#", "### ", "* **", "\u{0}\u{7f}", "ü**ñ**é"];
        for input in inputs {
            let _ = parse_markup(input);
        }
        let line = classify_line("ü**ñ**é").unwrap();
        assert_eq!(line.spans, vec![Span::plain("ü"), bold("ñ"), Span::plain("é")]);
    }
}
