// Shared prompt fragments.
// Each tool's own templates live in generation/prompts.rs.

/// Appended to every resume prompt so the renderer sees `##` section headings.
pub const HEADING_INSTRUCTION: &str = "Ensure clear headings using ## for sections.";

/// Forbids template placeholders in prose output.
pub const NO_PLACEHOLDERS_INSTRUCTION: &str =
    "Do NOT use brackets or placeholders like [Your Name], [Date], or [Manager Name].";

/// Forbids markdown fences around code output. Models still add them sometimes;
/// `sanitize::strip_code_fences` cleans up after them.
pub const RAW_HTML_INSTRUCTION: &str =
    "Strictly return ONLY the HTML code. Do NOT include markdown backticks.";
