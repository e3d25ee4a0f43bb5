//! Text heuristics shared by the parser and the planner.
//!
//! Sentence splitting, context windows around code blocks, word-capped
//! condensation and list-marker bullet extraction. Everything here is a pure
//! function over borrowed text.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex splitting text on runs of sentence terminators.
static SENTENCE_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Regex matching a non-empty list item line (`*`, `-` or `+` marker at column zero).
static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[*\-+][ \t]+(\S.*)$").unwrap());

/// Maximum number of characters kept for a code block context window.
pub const MAX_CONTEXT_CHARS: usize = 200;

/// Marker appended to condensed text when sentences were dropped.
pub const ELLIPSIS: &str = "...";

/// Convert CRLF and lone CR line endings to LF.
///
/// Body and code text is otherwise left byte-for-byte intact.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Unicode NFC composition, applied to headings and metadata values.
pub fn compose_unicode(text: &str) -> String {
    text.nfc().collect()
}

/// Split text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT_REGEX
        .split(text.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Join sentences into a context window capped at [`MAX_CONTEXT_CHARS`].
fn context_window(sentences: &[&str]) -> String {
    let joined = sentences.join(". ");
    truncate_chars(joined.trim(), MAX_CONTEXT_CHARS).to_string()
}

/// The last `count` sentences of `text`, used as context before a code block.
pub fn last_sentences(text: &str, count: usize) -> String {
    let sentences = split_sentences(text);
    let start = sentences.len().saturating_sub(count);
    context_window(&sentences[start..])
}

/// The first `count` sentences of `text`, used as context after a code block.
pub fn first_sentences(text: &str, count: usize) -> String {
    let sentences = split_sentences(text);
    let end = sentences.len().min(count);
    context_window(&sentences[..end])
}

/// Reduce text to a prefix of whole sentences within a word budget.
///
/// Sentences are taken greedily while the running word count stays at or
/// below `max_words`. Each kept sentence is terminated with ". ". When a
/// sentence would overflow the budget, it and everything after it is
/// dropped and [`ELLIPSIS`] is appended.
pub fn condense_text(text: &str, max_words: usize) -> String {
    let mut condensed = String::new();
    let mut word_count = 0;
    let mut truncated = false;

    for sentence in split_sentences(text) {
        let words = sentence.split_whitespace().count();
        if word_count + words > max_words {
            truncated = true;
            break;
        }

        condensed.push_str(sentence);
        condensed.push_str(". ");
        word_count += words;
    }

    if truncated {
        condensed.push_str(ELLIPSIS);
    }

    condensed.trim().to_string()
}

/// Extract up to `max_bullets` list items, in order of appearance.
pub fn extract_bullet_points(text: &str, max_bullets: usize) -> Vec<String> {
    BULLET_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .take(max_bullets)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("First one. Second!  Third?? "),
            vec!["First one", "Second", "Third"]
        );
        assert!(split_sentences("  ...  ").is_empty());
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_line_endings_keep_decomposed_text() {
        assert_eq!(normalize_line_endings("Cafe\u{0301}\r\n"), "Cafe\u{0301}\n");
    }

    #[test]
    fn test_compose_unicode() {
        // "e" followed by a combining acute accent becomes a single code point
        assert_eq!(compose_unicode("Caf\u{0065}\u{0301}"), "Caf\u{00e9}");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[test]
    fn test_last_sentences() {
        let text = "One. Two. Three. Here is the code:\n";
        assert_eq!(last_sentences(text, 2), "Three. Here is the code:");
        assert_eq!(last_sentences("", 2), "");
    }

    #[test]
    fn test_first_sentences() {
        let text = "\nThat prints one. Then it exits. Nothing else happens.";
        assert_eq!(first_sentences(text, 2), "That prints one. Then it exits");
    }

    #[test]
    fn test_context_is_capped() {
        let long = "word ".repeat(100);
        assert_eq!(last_sentences(&long, 2).chars().count(), MAX_CONTEXT_CHARS);
    }

    #[test]
    fn test_condense_under_cap_keeps_everything() {
        let condensed = condense_text("Rust is fast. It is also safe.", 100);
        assert_eq!(condensed, "Rust is fast. It is also safe.");
        assert!(!condensed.contains(ELLIPSIS));
    }

    #[test]
    fn test_condense_over_cap_appends_ellipsis() {
        let condensed = condense_text("One two three. Four five six. Seven eight.", 5);
        assert_eq!(condensed, "One two three. ...");
    }

    #[test]
    fn test_condense_exact_cap_is_not_truncated() {
        assert_eq!(condense_text("One two. Three four.", 4), "One two. Three four.");
    }

    #[test]
    fn test_condense_empty() {
        assert_eq!(condense_text("", 100), "");
    }

    #[test]
    fn test_extract_bullet_points_all_markers() {
        let text = "Intro line\n* star item\n- dash item\n+ plus item\n  - indented\nplain\n";
        assert_eq!(
            extract_bullet_points(text, 5),
            vec!["star item", "dash item", "plus item"]
        );
    }

    #[test]
    fn test_extract_bullet_points_respects_limit_and_order() {
        let text = (1..=8).map(|i| format!("- item {}\n", i)).collect::<String>();
        assert_eq!(
            extract_bullet_points(&text, 5),
            vec!["item 1", "item 2", "item 3", "item 4", "item 5"]
        );
        assert!(extract_bullet_points(&text, 0).is_empty());
    }

    #[test]
    fn test_horizontal_rule_is_not_a_bullet() {
        assert!(extract_bullet_points("---\n***\n", 5).is_empty());
    }

    #[test]
    fn test_marker_without_text_is_skipped() {
        assert_eq!(extract_bullet_points("-   \n*\t\n- real\n", 5), vec!["real"]);
    }
}
