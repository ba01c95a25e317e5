//! Assistant reply formatting.
//!
//! Converts the small markdown subset the assistant uses into HTML for the
//! chat surface. The output is injected as markup, so only feed it text that
//! came from the assistant.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid regex pattern for bold"));

static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("Invalid regex pattern for italic"));

/// Triple-backtick blocks, contents included, across lines.
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("Invalid regex pattern for code blocks"));

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`(.*?)`").expect("Invalid regex pattern for inline code"));

/// Render assistant text as display HTML.
///
/// Rules apply in a fixed order: bold, italic, fenced block removal, inline
/// code. Fenced blocks go before inline code so their backticks never reach
/// the inline rule. Emoji shortcodes such as `:popcorn:` are left as written.
pub fn format_reply(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = FENCED_BLOCK.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, r#"<span class="inline-code">$1</span>"#);
    text.into_owned()
}
