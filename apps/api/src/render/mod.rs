// Document rendering: markdown-like model output to a paginated letter-size PDF.
// markup classifies lines, layout wraps and paginates them, pdf writes the bytes.

pub mod font_metrics;
pub mod layout;
pub mod markup;
pub mod pdf;

use thiserror::Error;

pub use font_metrics::{default_page_config, PageConfig};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders `text` into PDF bytes. Blank input yields a single empty page.
pub fn render_pdf(text: &str, config: &PageConfig) -> Result<Vec<u8>, RenderError> {
    let lines = markup::parse_markup(text);
    let pages = layout::layout_document(&lines, config);
    tracing::debug!(lines = lines.len(), pages = pages.len(), "Rendering PDF");
    pdf::write_pdf(&pages, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_render_resume_markup() {
        let text = "# Jane Doe\n## Skills\n- Python\n- **SQL**\n### Project | Rust\nBuilt things.";
        let bytes = render_pdf(text, &default_page_config()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_blank_input_renders_one_page() {
        let bytes = render_pdf("", &default_page_config()).unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_long_input_spans_pages() {
        let text = (0..200)
            .map(|i| format!("- Delivered feature {i} with **measurable** impact\n"))
            .collect::<String>();
        let bytes = render_pdf(&text, &default_page_config()).unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn test_unencodable_text_still_renders() {
        let bytes = render_pdf("# 日本語 🚀\n- ok", &default_page_config()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
