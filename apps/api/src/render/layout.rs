//! Block layout: turns `RenderLine`s into positioned text runs on letter pages.
//!
//! Each line is one block. Words wrap greedily against the metric tables; a block
//! that runs past the bottom margin continues on the next page one line at a time.
//! Layout is total: every input, including an empty one, yields at least one page.

use serde::Serialize;

use crate::render::font_metrics::{get_metrics, PageConfig, PdfFont};
use crate::render::markup::{LineStyle, RenderLine, Span};

const BULLET_GLYPH: &str = "•";

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

/// Typography for one block style. All values in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    /// Includes the spacer that follows H1 and body blocks.
    pub space_after: f32,
    /// Indent of continuation lines relative to the first line.
    pub hanging_indent: f32,
    /// Headings set every span in the bold face.
    pub all_bold: bool,
}

pub fn block_style(style: LineStyle) -> BlockStyle {
    match style {
        LineStyle::Heading(1) => BlockStyle {
            font_size: 18.0,
            leading: 22.0,
            space_before: 0.0,
            space_after: 6.0 + 4.0,
            hanging_indent: 0.0,
            all_bold: true,
        },
        LineStyle::Heading(2) => BlockStyle {
            font_size: 12.0,
            leading: 15.0,
            space_before: 6.0,
            space_after: 4.0,
            hanging_indent: 0.0,
            all_bold: true,
        },
        LineStyle::Heading(_) => BlockStyle {
            font_size: 10.5,
            leading: 13.0,
            space_before: 4.0,
            space_after: 2.0,
            hanging_indent: 0.0,
            all_bold: true,
        },
        LineStyle::Bullet => BlockStyle {
            font_size: 9.5,
            leading: 11.0,
            space_before: 0.0,
            space_after: 1.0,
            hanging_indent: 15.0,
            all_bold: false,
        },
        LineStyle::Body => BlockStyle {
            font_size: 9.5,
            leading: 11.0,
            space_before: 0.0,
            space_after: 2.0,
            hanging_indent: 0.0,
            all_bold: false,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A run of same-font text placed at a baseline position (PDF coordinates).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedRun {
    pub x: f32,
    pub y: f32,
    pub font: PdfFont,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub runs: Vec<PlacedRun>,
}

// ────────────────────────────────────────────────────────────────────────────
// Word splitting and line breaking
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    font: PdfFont,
    /// Whitespace separated this word from the previous one.
    space_before: bool,
}

fn split_words(spans: &[Span], all_bold: bool) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for span in spans {
        let font = PdfFont::from_bold(all_bold || span.bold);
        let mut current = String::new();
        for ch in span.text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        font,
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                // A word with no whitespace before it stays glued, e.g. the comma in "**SQL**,".
                current.push(ch);
            }
        }
        if !current.is_empty() {
            words.push(Word {
                text: current,
                font,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    words
}

/// Breaks words into lines. Each line is a list of (x offset, word) pairs.
fn break_lines(words: &[Word], style: &BlockStyle, first_width: f32, rest_width: f32) -> Vec<Vec<(f32, Word)>> {
    let mut lines: Vec<Vec<(f32, Word)>> = Vec::new();
    let mut current: Vec<(f32, Word)> = Vec::new();
    let mut cursor = 0.0_f32;

    for word in words {
        let metrics = get_metrics(word.font);
        let word_w = metrics.width_pt(&word.text, style.font_size);
        let space_w = if !current.is_empty() && word.space_before {
            metrics.space_width_pt(style.font_size)
        } else {
            0.0
        };
        let available = if lines.is_empty() { first_width } else { rest_width };

        if !current.is_empty() && cursor + space_w + word_w > available {
            lines.push(std::mem::take(&mut current));
            cursor = 0.0;
            current.push((0.0, word.clone()));
            cursor += word_w;
        } else {
            current.push((cursor + space_w, word.clone()));
            cursor += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Merges adjacent same-font words into runs, re-inserting the spaces between them.
fn merge_runs(line: Vec<(f32, Word)>, x0: f32, y: f32, size: f32) -> Vec<PlacedRun> {
    let mut runs: Vec<PlacedRun> = Vec::new();
    for (offset, word) in line {
        match runs.last_mut() {
            Some(run) if run.font == word.font => {
                if word.space_before {
                    run.text.push(' ');
                }
                run.text.push_str(&word.text);
            }
            _ => runs.push(PlacedRun {
                x: x0 + offset,
                y,
                font: word.font,
                size,
                text: word.text,
            }),
        }
    }
    runs
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'a> {
    config: &'a PageConfig,
    pages: Vec<Page>,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: vec![Page::default()],
            y: config.content_top(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.y >= self.config.content_top()
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.config.content_top();
    }

    /// Reserves one line of height `leading`, breaking the page if needed.
    /// Returns the baseline y for the line.
    fn take_line(&mut self, leading: f32, font_size: f32) -> f32 {
        if self.y - leading < self.config.margin_bottom_pt && !self.at_page_top() {
            self.new_page();
        }
        let baseline = self.y - font_size;
        self.y -= leading;
        baseline
    }

    fn skip(&mut self, points: f32) {
        self.y = (self.y - points).max(self.config.margin_bottom_pt);
    }

    fn place(&mut self, runs: Vec<PlacedRun>) {
        if let Some(page) = self.pages.last_mut() {
            page.runs.extend(runs);
        }
    }
}

/// Lays out all lines onto pages.
pub fn layout_document(lines: &[RenderLine], config: &PageConfig) -> Vec<Page> {
    let mut cursor = Cursor::new(config);
    let content_width = config.content_width();

    for line in lines {
        let style = block_style(line.style);
        let mut words = split_words(&line.spans, style.all_bold);

        if line.style == LineStyle::Bullet {
            words.insert(
                0,
                Word {
                    text: BULLET_GLYPH.to_string(),
                    font: PdfFont::Helvetica,
                    space_before: false,
                },
            );
            if let Some(first) = words.get_mut(1) {
                first.space_before = true;
            }
        }

        if words.is_empty() {
            continue;
        }

        if !cursor.at_page_top() {
            cursor.skip(style.space_before);
        }

        let wrapped = break_lines(
            &words,
            &style,
            content_width,
            content_width - style.hanging_indent,
        );
        for (i, wrapped_line) in wrapped.into_iter().enumerate() {
            let x0 = if i == 0 {
                config.margin_left_pt
            } else {
                config.margin_left_pt + style.hanging_indent
            };
            let baseline = cursor.take_line(style.leading, style.font_size);
            let runs = merge_runs(wrapped_line, x0, baseline, style.font_size);
            cursor.place(runs);
        }

        cursor.skip(style.space_after);
    }

    cursor.pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
