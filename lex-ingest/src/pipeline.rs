use crate::canonical::{canonicalize_case, canonicalize_header};
use crate::reader::RawRecord;
use lex_core::{chapter_of, stable_hash16, Corpus, LexError, LexResult, Section};

/// Turns one `RawRecord` into a canonical `Section`, the C1+C2 handoff
/// point in spec.md §2's control flow ("C1 feeds records to C2, which
/// yields a canonical `(corpus, id, title, paragraphs)` tuple").
///
/// `line` is the 1-based source line number, used only for error context.
/// `ingest_time` is the single timestamp stamped across a whole build run
/// when a record's own `scraped_date` is absent, so `scraped_date` is
/// stable across a resumed run rather than drifting per-record.
pub fn section_from_record(
    corpus: Corpus,
    record: RawRecord,
    line: u64,
    ingest_time: &str,
) -> LexResult<Section> {
    if corpus == Corpus::CaseLaw {
        return section_from_case_record(record, line, ingest_time);
    }

    let header = record.header.ok_or_else(|| LexError::MalformedHeader {
        line,
        header: String::new(),
    })?;
    let (id, title) = canonicalize_header(corpus, &header, line)?;

    let source_hash = if record.url_hash.is_empty() {
        stable_hash16(&record.url)
    } else {
        record.url_hash
    };
    let scraped_date = if record.scraped_date.is_empty() {
        ingest_time.to_string()
    } else {
        record.scraped_date
    };

    let mut section = Section::from_paragraphs(
        id,
        corpus,
        record.url,
        source_hash,
        header,
        title,
        record.paragraphs,
        scraped_date,
    );
    let bare_id = section.id.splitn(2, ':').nth(1).unwrap_or(&section.id);
    section.chapter = chapter_of(bare_id);
    Ok(section)
}

/// Builds a case-law `Section` from the nested casebody record shape
/// (spec.md §4.1/§6), rather than the `header`/`paragraphs` shape the
/// other three corpora use. Paragraphs come from each opinion's text, in
/// the order `casebody.opinions` lists them; the official reporter
/// citation (or the case name, if none) stands in for a header.
fn section_from_case_record(record: RawRecord, line: u64, ingest_time: &str) -> LexResult<Section> {
    let case = record.case;
    let id = canonicalize_case(case.id.as_ref(), &case.citations, line)?;

    let title = case.name.clone();
    let header = case
        .citations
        .first()
        .map(|c| c.cite.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| title.clone());

    let paragraphs: Vec<String> = case
        .casebody
        .as_ref()
        .map(|body| {
            body.opinions
                .iter()
                .map(|op| op.text.clone())
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let source_hash = if record.url_hash.is_empty() {
        stable_hash16(&record.url)
    } else {
        record.url_hash
    };
    let scraped_date = if !record.scraped_date.is_empty() {
        record.scraped_date
    } else if !case.decision_date.is_empty() {
        case.decision_date
    } else {
        ingest_time.to_string()
    };

    let section = Section::from_paragraphs(
        id,
        Corpus::CaseLaw,
        record.url,
        source_hash,
        header,
        title,
        paragraphs,
        scraped_date,
    );
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CaseBody, CaseLawFields, Opinion, ReporterCitation};

    fn statute_record(header: &str, paragraphs: Vec<&str>) -> RawRecord {
        RawRecord {
            url: "u".to_string(),
            url_hash: String::new(),
            header: Some(header.to_string()),
            paragraphs: paragraphs.into_iter().map(String::from).collect(),
            scraped_date: String::new(),
            case: CaseLawFields::default(),
        }
    }

    #[test]
    fn builds_section_with_derived_counts() {
        let mut record = statute_record(
            "Section 2903.01|Aggravated Murder.",
            vec![
                "No person shall purposely cause the death of another.",
                "Whoever violates this section is guilty of aggravated murder.",
            ],
        );
        record.url = "https://example/orc/2903.01".to_string();
        record.url_hash = "a1b2c3d4e5f60718".to_string();
        let section = section_from_record(Corpus::Statute, record, 1, "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(section.id, "orc:2903.01");
        assert_eq!(section.title, "Aggravated Murder.");
        assert_eq!(section.paragraph_count, 2);
        assert_eq!(section.scraped_date, "2024-01-01T00:00:00Z");
        assert_eq!(section.chapter.as_deref(), Some("2903"));
        assert_eq!(section.source_hash, "a1b2c3d4e5f60718");
    }

    #[test]
    fn derives_source_hash_when_absent() {
        let mut record = statute_record("Section 1.01|Definitions", vec![]);
        record.url = "https://example/orc/1.01".to_string();
        let section = section_from_record(Corpus::Statute, record, 1, "t").unwrap();
        assert_eq!(section.source_hash.len(), 16);
        assert_eq!(section.paragraph_count, 0);
        assert_eq!(section.word_count, 0);
    }

    #[test]
    fn preserves_input_scraped_date_when_present() {
        let mut record = statute_record("Section 1.01|X", vec![]);
        record.url_hash = "h".to_string();
        record.scraped_date = "2019-05-01".to_string();
        let section = section_from_record(Corpus::Statute, record, 1, "ignored").unwrap();
        assert_eq!(section.scraped_date, "2019-05-01");
    }

    #[test]
    fn missing_header_on_legislative_corpus_is_malformed() {
        let record = statute_record("placeholder", vec![]);
        let mut record = record;
        record.header = None;
        let err = section_from_record(Corpus::Statute, record, 3, "t").unwrap_err();
        assert!(matches!(err, LexError::MalformedHeader { line: 3, .. }));
    }

    #[test]
    fn builds_case_law_section_from_nested_record() {
        let record = RawRecord {
            url: "https://example/case/12345".to_string(),
            url_hash: String::new(),
            header: None,
            paragraphs: vec![],
            scraped_date: String::new(),
            case: CaseLawFields {
                id: Some(serde_json::json!(12345)),
                name: "State v. Doe".to_string(),
                decision_date: "1990-04-02".to_string(),
                docket_number: "89-123".to_string(),
                court: None,
                citations: vec![ReporterCitation {
                    cite: "55 Ohio St. 3d 1".to_string(),
                    citation_type: "official".to_string(),
                }],
                casebody: Some(CaseBody {
                    opinions: vec![Opinion {
                        text: "The defendant appeals his conviction.".to_string(),
                        opinion_type: "majority".to_string(),
                        author: Some("Smith, J.".to_string()),
                    }],
                    ..Default::default()
                }),
                cites_to: vec![],
                analysis: None,
            },
        };
        let section = section_from_record(Corpus::CaseLaw, record, 1, "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(section.id, "ohcase:12345");
        assert_eq!(section.title, "State v. Doe");
        assert_eq!(section.paragraph_count, 1);
        assert_eq!(section.scraped_date, "1990-04-02");
        assert_eq!(section.header, "55 Ohio St. 3d 1");
    }

    #[test]
    fn case_law_falls_back_to_name_as_header_without_citation() {
        let record = RawRecord {
            url: "u".to_string(),
            url_hash: "h".to_string(),
            header: None,
            paragraphs: vec![],
            scraped_date: String::new(),
            case: CaseLawFields {
                id: Some(serde_json::json!(1)),
                name: "State v. Roe".to_string(),
                ..Default::default()
            },
        };
        let section = section_from_record(Corpus::CaseLaw, record, 1, "t").unwrap();
        assert_eq!(section.header, "State v. Roe");
    }
}
