use lex_core::{chapter_of, Corpus, LexError, LexResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Per-corpus header-line prefixes stripped before the bare id, grounded
/// in the Ohio builders' `header.replace('Section ', '').replace('Rule ',
/// '')` convention.
fn strip_prefix(corpus: Corpus, left: &str) -> String {
    let trimmed = left.trim();
    let prefixes: &[&str] = match corpus {
        Corpus::Statute => &["Section ", "§"],
        Corpus::Admin => &["Rule ", "Section "],
        Corpus::Constitution => &["Article ", "Section ", "§"],
        Corpus::CaseLaw => &["Case ", "No. "],
    };
    for prefix in prefixes {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Matches `"Article <roman>, Section <n[letter]>"` in a header's left
/// half. spec.md §3 fixes the long form (`"Article II, Section 3"`, not
/// the `"II.3"` shorthand some citation text uses) as the canonical
/// constitution id, so every shorthand or abbreviated in-text reference
/// must normalize up to this same form (see grammars::extract_citations).
static ARTICLE_SECTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Article\s+([IVXLCDM]+),?\s+Section\s+(\d+[a-z]?)$").unwrap()
});

/// Parses a `"<id-with-prefix>|<title>"` header line into a bare id and
/// title, then returns the corpus-tagged canonical id
/// (`"<tag>:<bare-id>"`). Headers with no `|` separator are malformed.
pub fn canonicalize_header(
    corpus: Corpus,
    header: &str,
    line: u64,
) -> LexResult<(String, String)> {
    let mut parts = header.splitn(2, '|');
    let left = parts.next().unwrap_or("");
    let title = parts.next().unwrap_or("").trim().to_string();

    if !header.contains('|') {
        return Err(LexError::MalformedHeader {
            line,
            header: header.to_string(),
        });
    }

    let bare_id = if corpus == Corpus::Constitution {
        match ARTICLE_SECTION_HEADER_RE.captures(left.trim()) {
            Some(caps) => format!("Article {}, Section {}", caps[1].to_uppercase(), &caps[2]),
            None => strip_prefix(corpus, left),
        }
    } else {
        strip_prefix(corpus, left)
    };
    if bare_id.is_empty() {
        return Err(LexError::MalformedHeader {
            line,
            header: header.to_string(),
        });
    }

    Ok((corpus.canonical_id(&bare_id), title))
}

/// Canonicalizes a case-law record's identity (spec.md §4.2): the
/// integer `id` cast to a string, falling back to the first official
/// citation string when `id` is absent. `line` is error context only.
pub fn canonicalize_case(
    id: Option<&serde_json::Value>,
    citations: &[crate::reader::ReporterCitation],
    line: u64,
) -> LexResult<String> {
    if let Some(id) = id {
        let bare_id = match id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !bare_id.is_empty() {
            return Ok(Corpus::CaseLaw.canonical_id(&bare_id));
        }
    }
    if let Some(first) = citations.iter().map(|c| c.cite.trim()).find(|c| !c.is_empty()) {
        return Ok(Corpus::CaseLaw.canonical_id(first));
    }
    Err(LexError::MalformedHeader {
        line,
        header: "case record has neither id nor citation".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_statute_header() {
        let (id, title) = canonicalize_header(Corpus::Statute, "Section 1901.01|Definitions", 1)
            .unwrap();
        assert_eq!(id, "orc:1901.01");
        assert_eq!(title, "Definitions");
    }

    #[test]
    fn parses_admin_rule_header() {
        let (id, title) =
            canonicalize_header(Corpus::Admin, "Rule 101:1-1-01|Scope", 1).unwrap();
        assert_eq!(id, "oac:101:1-1-01");
        assert_eq!(title, "Scope");
    }

    #[test]
    fn parses_constitution_header_to_long_form_id() {
        let (id, title) = canonicalize_header(
            Corpus::Constitution,
            "Article I, Section 1|Inalienable Rights",
            1,
        )
        .unwrap();
        assert_eq!(id, "oconst:Article I, Section 1");
        assert_eq!(title, "Inalienable Rights");
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = canonicalize_header(Corpus::Statute, "Section 1901.01 Definitions", 7)
            .unwrap_err();
        match err {
            LexError::MalformedHeader { line, .. } => assert_eq!(line, 7),
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn chapter_of_strips_section_suffix() {
        assert_eq!(chapter_of("1901.01"), Some("1901".to_string()));
        assert_eq!(chapter_of("II"), Some("II".to_string()));
    }

    #[test]
    fn case_law_id_casts_integer_to_string() {
        let id = serde_json::json!(12345);
        let canonical = canonicalize_case(Some(&id), &[], 1).unwrap();
        assert_eq!(canonical, "ohcase:12345");
    }

    #[test]
    fn case_law_falls_back_to_official_citation_when_id_absent() {
        let citations = vec![crate::reader::ReporterCitation {
            cite: "55 Ohio St. 3d 1".to_string(),
            citation_type: "official".to_string(),
        }];
        let canonical = canonicalize_case(None, &citations, 1).unwrap();
        assert_eq!(canonical, "ohcase:55 Ohio St. 3d 1");
    }

    #[test]
    fn case_law_with_neither_id_nor_citation_is_malformed() {
        let err = canonicalize_case(None, &[], 9).unwrap_err();
        match err {
            LexError::MalformedHeader { line, .. } => assert_eq!(line, 9),
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }
}
