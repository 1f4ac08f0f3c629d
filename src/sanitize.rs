//! Flattens Markdown produced by the language model into plain text that
//! can be pasted into a practice-management system.

use once_cell::sync::Lazy;
use regex::Regex;

/// Each rule runs over the whole text, in this order. Horizontal rules and
/// table separators go before bullets and emphasis, which would otherwise
/// eat their `*`, `-` and `_` runs.
///
/// Unwrapped code is not shielded from the later rules. Emphasis markers
/// must hug non-space text, so spaced operators such as `a * b` survive,
/// but code written like `*ptr*` is flattened along with the prose.
static RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // CRLF and lone CR line endings
        (r"\r\n?", "\n"),
        // fenced code blocks, info string and closing fence line dropped
        (r"(?ms)^[ \t]*```[^\n]*\n(.*?)^[ \t]*```[ \t]*$\n?", "$1"),
        // stray fence lines left by unterminated blocks
        (r"(?m)^[ \t]*```.*$", ""),
        (r"`([^`\n]+)`", "$1"),
        (r"!\[([^\]\n]*)\]\([^)\n]*\)", "$1"),
        (r"\[([^\]\n]+)\]\([^)\n]*\)", "$1"),
        (r"(?m)^[ \t]{0,3}#{1,6}[ \t]+", ""),
        (r"(?m)^[ \t]*(?:>[ \t]?)+", ""),
        // table separator rows, newline included
        (
            r"(?m)^[ \t]*\|?[ \t]*:?-{3,}:?[ \t]*(?:\|[ \t]*:?-{3,}:?[ \t]*)*\|?[ \t]*(?:\n|\z)",
            "",
        ),
        // horizontal rules
        (r"(?m)^[ \t]*(?:(?:\*[ \t]*){3,}|(?:_[ \t]*){3,}|(?:-[ \t]*){3,})$", ""),
        (r"(?m)^[ \t]*\|[ \t]?", ""),
        (r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*", "$1"),
        (r"__([^\s_](?:[^\n]*?[^\s_])?)__", "$1"),
        (r"(?m)^([ \t]*)[-*+•][ \t]+", "${1}- "),
        (r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*", "$1"),
        (r"(?m)(^|[^\w])_([^\s_](?:[^_\n]*?[^\s_])?)_([^\w]|$)", "$1$2$3"),
        (r"(?m)[ \t]+$", ""),
        (r"\n{3,}", "\n\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("bad sanitize rule {pattern}: {e}"));
        (regex, replacement)
    })
    .collect()
});

fn apply_rules(text: &str) -> String {
    let mut text = text.to_string();
    for (regex, replacement) in RULES.iter() {
        text = regex.replace_all(&text, *replacement).into_owned();
    }
    text.trim().to_string()
}

/// Strips Markdown syntax, keeping the visible text.
///
/// Passes repeat until nothing changes, so nested constructs such as
/// `> **bold**` or back-to-back `_a_ _b_` are fully removed and sanitizing
/// already sanitized text is a no-op.
pub fn sanitize(text: &str) -> String {
    let mut current = apply_rules(text);
    // A pass that changes anything removes characters or swaps one for its
    // plain form (CR to newline, bullet marker to `- `), so this reaches a
    // fixpoint.
    loop {
        let next = apply_rules(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
