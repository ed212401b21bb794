//! Warning marker for answers that look like destructive shell commands.
//!
//! This is a fixed pattern list, not an analysis of the command. A match only
//! prefixes the answer with [`WARNING_MARKER`]; the text itself is untouched.

use once_cell::sync::Lazy;
use regex::RegexSet;
use std::borrow::Cow;

pub const WARNING_MARKER: &str = "⚠️  ";

static DESTRUCTIVE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\brm\s+(-\S*\s+)*-\S*[rRf]",
        r"\bdd\s+.*\bof=",
        r"\bmkfs(\.\w+)?\b",
        r"\bshred\b",
        r"\bwipefs\b",
        r">\s*/dev/(sd|hd|nvme|disk)",
        r"\bchmod\s+(-R\s+)?[0-7]*777\s+/",
        r"\bchown\s+-R\s+\S+\s+/(\s|$)",
        r"\bgit\s+(reset\s+--hard|clean\s+-\S*f|push\s+.*(--force|-f\b))",
        r"\b(shutdown|reboot|halt|poweroff)\b",
        r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
        r"(?i)\bdrop\s+(table|database|schema)\b",
        r"(?i)\btruncate\s+table\b",
    ])
    .expect("destructive command patterns are valid")
});

/// Whether any line of `text` matches a destructive-command pattern.
pub fn is_destructive(text: &str) -> bool {
    text.lines().any(|line| DESTRUCTIVE_PATTERNS.is_match(line))
}

/// Prefix `text` with the warning marker when it looks destructive.
pub fn flag_destructive(text: &str) -> Cow<'_, str> {
    if is_destructive(text) {
        Cow::Owned(format!("{WARNING_MARKER}{text}"))
    } else {
        Cow::Borrowed(text)
    }
}
