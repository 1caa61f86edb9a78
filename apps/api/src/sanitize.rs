//! Response sanitizer: removes markdown code fences that models wrap around code.

const HTML_FENCE: &str = "```html";
const FENCE: &str = "```";

/// Strips every code-fence marker and trims surrounding whitespace.
///
/// Removal repeats until no fence remains, because deleting one marker can join
/// stray backticks into a new one. The result is therefore fence-free and
/// `strip_code_fences(strip_code_fences(x)) == strip_code_fences(x)`.
pub fn strip_code_fences(text: &str) -> String {
    let mut cleaned = text.to_string();
    while cleaned.contains(FENCE) {
        cleaned = cleaned.replace(HTML_FENCE, "").replace(FENCE, "");
    }
    cleaned.trim().to_string()
}
