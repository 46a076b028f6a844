use regex::Regex;
use std::collections::HashSet;

/// Collapses runs of whitespace (including newlines) into single spaces
/// and trims the result. Used before citation-context capture and summary
/// generation so stored text doesn't carry source line breaks.
pub fn collapse_whitespace(input: &str) -> String {
    let ws_regex = Regex::new(r"\s+").unwrap();
    ws_regex.replace_all(input.trim(), " ").into_owned()
}

/// Extracts lowercase alphabetic words of length >= 4, skipping stop
/// words, in first-seen order with duplicates removed. Used by the
/// enricher for `key_terms`.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let word_regex = Regex::new(r"\b[a-zA-Z]{4,}\b").unwrap();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in word_regex.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if is_stop_word(&word) || !seen.insert(word.clone()) {
            continue;
        }
        out.push(word);
    }
    out
}

fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "that" | "this" | "with" | "from" | "shall" | "have" | "been"
            | "such" | "were" | "when" | "which" | "than" | "then" | "also"
            | "upon" | "under" | "into" | "more" | "only" | "each" | "other"
    )
}

/// Counts how many of `keywords` appear (case-insensitively) in `text`.
/// Used by the enricher's threshold-based `practice_areas`/`subject_matter`
/// classification.
pub fn keyword_match_count(text: &str, keywords: &[&str]) -> usize {
    let lower = text.to_lowercase();
    keywords.iter().filter(|kw| lower.contains(&kw.to_lowercase())).count()
}

/// Truncates `input` to `max_len` characters (not bytes), appending an
/// ellipsis when truncated. Used to cap citation `context` strings.
pub fn truncate_chars(input: &str, max_len: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= max_len {
        input.to_string()
    } else {
        let truncated: String = chars[..max_len].iter().collect();
        format!("{truncated}...")
    }
}

/// Extracts a `window`-character slice centered on a regex match's start,
/// used by relationship classification (spec.md: "±30-char window").
pub fn context_window(text: &str, match_start: usize, match_end: usize, window: usize) -> String {
    let start = match_start.saturating_sub(window);
    let end = (match_end + window).min(text.len());
    if start >= text.len() || end > text.len() || start > end {
        return String::new();
    }
    text.get(start..end).unwrap_or("").to_string()
}

/// Derives the chapter prefix from a bare id, e.g. `"1901.01"` ->
/// `"1901"`. Used for range-expansion chapter-sharing checks and for
/// dotted chapter-level citation normalization.
pub fn chapter_of(bare_id: &str) -> Option<String> {
    bare_id.split('.').next().map(|s| s.to_string())
}

/// Deterministic 16-hex-char FNV-1a hash, used to derive `source_hash`
/// when an input record omits `url_hash` (spec.md §3: "short stable hash
/// (16 hex chars) of source URL"). Not cryptographic; stability across
/// runs/platforms is what matters here, not collision resistance.
pub fn stable_hash16(input: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut hash = FNV_OFFSET;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

pub fn format_count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_normalizes_newlines() {
        assert_eq!(collapse_whitespace("a\n\n  b\tc  "), "a b c");
    }

    #[test]
    fn extract_keywords_drops_stop_words_and_dupes() {
        let words = extract_keywords("shall be applied when this applies applies");
        assert!(!words.contains(&"shall".to_string()));
        assert!(!words.contains(&"when".to_string()));
        assert_eq!(words.iter().filter(|w| *w == "applies").count(), 1);
    }

    #[test]
    fn keyword_match_count_is_case_insensitive() {
        assert_eq!(
            keyword_match_count("Felony theft offense", &["felony", "theft", "burglary"]),
            2
        );
    }

    #[test]
    fn truncate_chars_appends_ellipsis() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 5), "abcde...");
    }

    #[test]
    fn context_window_bounds_to_text_length() {
        let text = "0123456789";
        assert_eq!(context_window(text, 4, 6, 2), "234567");
        assert_eq!(context_window(text, 0, 1, 5), "012345");
    }

    #[test]
    fn format_count_pluralizes() {
        assert_eq!(format_count(1, "section"), "1 section");
        assert_eq!(format_count(3, "section"), "3 sections");
    }

    #[test]
    fn chapter_of_strips_section_suffix() {
        assert_eq!(chapter_of("1901.01"), Some("1901".to_string()));
        assert_eq!(chapter_of("II"), Some("II".to_string()));
    }

    #[test]
    fn stable_hash16_is_deterministic_and_16_hex_chars() {
        let a = stable_hash16("https://example/orc/2903.01");
        let b = stable_hash16("https://example/orc/2903.01");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stable_hash16_differs_for_different_input() {
        assert_ne!(stable_hash16("a"), stable_hash16("b"));
    }
}
