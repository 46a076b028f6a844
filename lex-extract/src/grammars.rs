use lex_core::{chapter_of, truncate_chars, Citation, CitationRelationship, Corpus, Section};
use once_cell::sync::Lazy;
use regex::Regex;

/// How far an inclusive section range (`124.01 to 124.64`) is expanded.
/// Expansion only happens when both endpoints share a chapter prefix and
/// the numeric gap between them is within this threshold, following the
/// Ohio builders' own conservative range handling.
#[derive(Debug, Clone)]
pub struct RangeExpansionConfig {
    pub max_gap: u32,
    pub context_window: usize,
    pub max_context_chars: usize,
}

impl Default for RangeExpansionConfig {
    fn default() -> Self {
        Self {
            max_gap: 20,
            context_window: 30,
            max_context_chars: 200,
        }
    }
}

struct ReferencePattern {
    regex: Regex,
    has_range: bool,
    /// True for the bare-chapter `"NNN. of the Revised Code"` pattern,
    /// whose capture is a chapter number rather than a section id and
    /// must be normalized to that chapter's first section (`NNNN.01`)
    /// before becoming a citation target (DESIGN.md Open Questions).
    is_chapter_only: bool,
}

fn legislative_patterns() -> &'static [ReferencePattern] {
    // Grounded in ohio_revised/citation_analysis/citation_mapper.py's
    // reference_patterns list; shared by statute and admin corpora since
    // both cite by dotted section number.
    static PATTERNS: Lazy<Vec<ReferencePattern>> = Lazy::new(|| {
        vec![
            ReferencePattern {
                regex: Regex::new(
                    r"(?i)[Ss]ections?\s+(\d+\.\d+)(?:\s+to\s+(\d+\.\d+))?",
                )
                .unwrap(),
                has_range: true,
                is_chapter_only: false,
            },
            ReferencePattern {
                regex: Regex::new(
                    r"(?i)division\s*\([A-Z]\d*\)\s+of\s+section\s+(\d+\.\d+)",
                )
                .unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
            ReferencePattern {
                regex: Regex::new(
                    r"(?i)(?:Chapter\s+)?(\d{3,4})\.\s+of\s+the\s+Revised\s+Code",
                )
                .unwrap(),
                has_range: false,
                is_chapter_only: true,
            },
            ReferencePattern {
                regex: Regex::new(r"(?:^|[^.\d])(\d{3,4}\.\d+)(?:[^.\d]|$)").unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
        ]
    });
    &PATTERNS
}

fn constitution_patterns() -> &'static [ReferencePattern] {
    static PATTERNS: Lazy<Vec<ReferencePattern>> = Lazy::new(|| {
        vec![
            ReferencePattern {
                regex: Regex::new(
                    r"(?i)Article\s+([IVXLCDM]+),?\s+Section\s+(\d+[a-z]?)",
                )
                .unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
            // Abbreviated form "Art. II, Sec. 3" / "Art II Sec 3".
            ReferencePattern {
                regex: Regex::new(
                    r"(?i)Art\.?\s+([IVXLCDM]+),?\s+Sec\.?\s*§?\s*(\d+[a-z]?)",
                )
                .unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
            // Symbolic form "Art. II § 3".
            ReferencePattern {
                regex: Regex::new(r"(?i)Art\.?\s+([IVXLCDM]+)\s*§\s*(\d+[a-z]?)").unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
            // Shorthand form "I.1" or "II.14".
            ReferencePattern {
                regex: Regex::new(r"\b([IVXLCDM]+)\.(\d+[a-z]?)\b").unwrap(),
                has_range: false,
                is_chapter_only: false,
            },
        ]
    });
    &PATTERNS
}

struct CaseLawPattern {
    name: &'static str,
    regex: Regex,
}

fn case_law_patterns() -> &'static [CaseLawPattern] {
    // Grounded verbatim in ohio_caselaw/citation_analysis/citation_mapper.py
    // CITATION_PATTERNS, in declared order.
    static PATTERNS: Lazy<Vec<CaseLawPattern>> = Lazy::new(|| {
        vec![
            CaseLawPattern {
                name: "ohio_neutral",
                regex: Regex::new(r"(?i)\b(\d{4})-Ohio-(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "ohio_state",
                regex: Regex::new(r"(?i)\b(\d+)\s+Ohio\s+St\.?\s*(\d[dr]d?)?\s+(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "ohio_app",
                regex: Regex::new(r"(?i)\b(\d+)\s+Ohio\s+App\.?\s*(\d[dr]d?)?\s+(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "ohio_misc",
                regex: Regex::new(
                    r"(?i)\b(\d+)\s+Ohio\s+(?:Misc\.?|Dec\.?|N\.P\.?)\s*(\d[dr]d?)?\s+(\d+)\b",
                )
                .unwrap(),
            },
            CaseLawPattern {
                name: "northeast",
                regex: Regex::new(r"(?i)\b(\d+)\s+N\.E\.\s*(\d[dr]d?)?\s+(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "federal_supreme",
                regex: Regex::new(r"(?i)\b(\d+)\s+U\.S\.\s+(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "federal_reporter",
                regex: Regex::new(r"(?i)\b(\d+)\s+F\.\s*(\d[dr]d?)?\s+(\d+)\b").unwrap(),
            },
            CaseLawPattern {
                name: "federal_supp",
                regex: Regex::new(r"(?i)\b(\d+)\s+F\.\s*Supp\.\s*(\d[dr]d?)?\s+(\d+)\b").unwrap(),
            },
        ]
    });
    &PATTERNS
}

struct RelationshipRule {
    relationship: CitationRelationship,
    regexes: &'static [&'static str],
}

fn relationship_rules(corpus: Corpus) -> Vec<(CitationRelationship, Vec<Regex>)> {
    // Ordered exactly as ohio_caselaw's RELATIONSHIP_PATTERNS dict (first
    // match wins); other corpora get a short table since their citations
    // are overwhelmingly plain cross-references.
    let raw: &[RelationshipRule] = match corpus {
        Corpus::CaseLaw => &[
            RelationshipRule {
                relationship: CitationRelationship::Overruled,
                regexes: &[
                    r"(?i)overrul(?:ed|ing)\s+(?:in\s+)?",
                    r"(?i)(?:was|is)\s+overruled",
                ],
            },
            RelationshipRule {
                relationship: CitationRelationship::Reversed,
                regexes: &[r"(?i)revers(?:ed|ing)\s+", r"(?i)(?:was|is)\s+reversed"],
            },
            RelationshipRule {
                relationship: CitationRelationship::Affirmed,
                regexes: &[r"(?i)affirm(?:ed|ing)\s+", r"(?i)(?:was|is)\s+affirmed"],
            },
            RelationshipRule {
                relationship: CitationRelationship::Distinguished,
                regexes: &[
                    r"(?i)distinguish(?:ed|ing)\s+(?:from\s+)?",
                    r"(?i)(?:is|was)\s+distinguished",
                ],
            },
            RelationshipRule {
                relationship: CitationRelationship::Followed,
                regexes: &[
                    r"(?i)follow(?:ed|ing|s)\s+",
                    r"(?i)pursuant\s+to\s+",
                    r"(?i)consistent\s+with\s+",
                ],
            },
            RelationshipRule {
                relationship: CitationRelationship::Cited,
                regexes: &[
                    r"(?i)(?:see|citing|accord)\s+",
                    r"(?i)as\s+(?:stated|held|noted)\s+in\s+",
                ],
            },
            RelationshipRule {
                relationship: CitationRelationship::Questioned,
                regexes: &[r"(?i)question(?:ed|ing)\s+", r"(?i)doubt(?:ed|ing)\s+"],
            },
            RelationshipRule {
                relationship: CitationRelationship::Compared,
                regexes: &[
                    r"(?i)compar(?:ed|ing)\s+(?:with\s+)?",
                    r"(?i)(?:cf\.|contrast)\s+",
                ],
            },
        ],
        _ => &[
            RelationshipRule {
                relationship: CitationRelationship::Defines,
                regexes: &[r"(?i)as\s+defined\s+in\s+"],
            },
            RelationshipRule {
                relationship: CitationRelationship::AmendedBy,
                regexes: &[r"(?i)as\s+amended\s+by\s+"],
            },
            RelationshipRule {
                relationship: CitationRelationship::SupersededBy,
                regexes: &[
                    r"(?i)superseded\s+by\s+",
                    r"(?i)replaced\s+by\s+",
                    r"(?i)repealed\s+by\s+",
                ],
            },
        ],
    };

    raw.iter()
        .map(|rule| {
            (
                rule.relationship,
                rule.regexes
                    .iter()
                    .map(|pattern| Regex::new(pattern).unwrap())
                    .collect(),
            )
        })
        .collect()
}

fn classify_relationship(corpus: Corpus, context: &str) -> CitationRelationship {
    for (relationship, regexes) in relationship_rules(corpus) {
        if regexes.iter().any(|re| re.is_match(context)) {
            return relationship;
        }
    }
    CitationRelationship::default()
}

fn make_citation(
    source_id: &str,
    corpus: Corpus,
    target_bare_id: &str,
    relationship: CitationRelationship,
    context: &str,
    position: usize,
    cfg: &RangeExpansionConfig,
) -> Citation {
    Citation {
        source_id: source_id.to_string(),
        target_id: corpus.canonical_id(target_bare_id),
        relationship,
        context: truncate_chars(context, cfg.max_context_chars),
        position,
    }
}

/// Expands `"A.01 to A.20"` into the endpoint plus every `.01`-suffixed
/// chapter marker in between, when both endpoints share a chapter and the
/// numeric gap is within `cfg.max_gap`. Matches the exact behavior of the
/// Python tooling this was distilled from: only whole-chapter markers are
/// synthesized, not every individual section in the range.
fn expand_range(start: &str, end: &str, cfg: &RangeExpansionConfig) -> Vec<String> {
    let mut out = vec![start.to_string()];
    let (Some(start_chapter), Some(end_chapter)) = (chapter_of(start), chapter_of(end)) else {
        out.push(end.to_string());
        return out;
    };
    if start_chapter != end_chapter {
        out.push(end.to_string());
        return out;
    }

    let start_section: Option<f64> = start.split('.').nth(1).and_then(|s| s.parse().ok());
    let end_section: Option<f64> = end.split('.').nth(1).and_then(|s| s.parse().ok());
    if let (Some(s), Some(e)) = (start_section, end_section) {
        if (e - s).abs() as u32 <= cfg.max_gap {
            out.push(format!("{start_chapter}.01"));
        }
    }
    out.push(end.to_string());
    out
}

/// Collapses identical `(target_id, relationship, context)` tuples,
/// preserving first-occurrence order (spec.md §4.3).
fn dedup_citations(mut citations: Vec<Citation>) -> Vec<Citation> {
    let mut seen = std::collections::HashSet::new();
    citations.retain(|c| seen.insert((c.target_id.clone(), c.relationship, c.context.clone())));
    citations
}

fn extract_legislative(section: &Section, cfg: &RangeExpansionConfig) -> Vec<Citation> {
    let text = &section.text;
    let mut citations = Vec::new();

    for pattern in legislative_patterns() {
        for caps in pattern.regex.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let context = lex_core::context_window(
                text,
                whole.start(),
                whole.end(),
                cfg.context_window,
            );
            let relationship = classify_relationship(section.corpus, &context);

            let first = caps.get(1).map(|m| m.as_str());
            let second = if pattern.has_range {
                caps.get(2).map(|m| m.as_str())
            } else {
                None
            };

            match (first, second) {
                (Some(start), Some(end)) => {
                    for target in expand_range(start, end, cfg) {
                        citations.push(make_citation(
                            &section.id,
                            section.corpus,
                            &target,
                            relationship,
                            &context,
                            whole.start(),
                            cfg,
                        ));
                    }
                }
                (Some(target), None) => {
                    let normalized = if pattern.is_chapter_only {
                        format!("{target}.01")
                    } else {
                        target.to_string()
                    };
                    let own_bare_id = section.id.splitn(2, ':').nth(1).unwrap_or(&section.id);
                    if normalized == own_bare_id {
                        continue;
                    }
                    citations.push(make_citation(
                        &section.id,
                        section.corpus,
                        &normalized,
                        relationship,
                        &context,
                        whole.start(),
                        cfg,
                    ));
                }
                _ => {}
            }
        }
    }
    dedup_citations(citations)
}

fn extract_constitution(section: &Section, cfg: &RangeExpansionConfig) -> Vec<Citation> {
    let text = &section.text;
    let mut citations = Vec::new();

    for pattern in constitution_patterns() {
        for caps in pattern.regex.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let context =
                lex_core::context_window(text, whole.start(), whole.end(), cfg.context_window);
            let relationship = classify_relationship(section.corpus, &context);
            let article = caps.get(1).map(|m| m.as_str().to_uppercase());
            let section_num = caps.get(2).map(|m| m.as_str());
            if let (Some(article), Some(section_num)) = (article, section_num) {
                let target = crate::constitution::long_form_id(&article, section_num);
                citations.push(make_citation(
                    &section.id,
                    section.corpus,
                    &target,
                    relationship,
                    &context,
                    whole.start(),
                    cfg,
                ));
            }
        }
    }
    dedup_citations(citations)
}

fn extract_case_law(section: &Section, cfg: &RangeExpansionConfig) -> Vec<Citation> {
    let text = &section.text;
    let mut citations = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for pattern in case_law_patterns() {
        for m in pattern.regex.find_iter(text) {
            let citation_string = m.as_str();
            if !seen.insert(citation_string.to_string()) {
                continue;
            }
            let context =
                lex_core::context_window(text, m.start(), m.end(), cfg.context_window.max(100));
            let relationship = classify_relationship(section.corpus, &context);
            tracing::trace!(reporter = pattern.name, citation = citation_string, "matched case law citation");

            // Unresolved reporter citations keep the raw string as a
            // dangling target by construction.
            citations.push(Citation {
                source_id: section.id.clone(),
                target_id: citation_string.to_string(),
                relationship,
                context: truncate_chars(&context, cfg.max_context_chars),
                position: m.start(),
            });
        }
    }
    citations
}

/// Extracts the citations a section's text emits, using the corpus's
/// ordered grammar table. Never recompiles the regex tables — they are
/// lazily compiled once per process.
pub fn extract_citations(section: &Section, cfg: &RangeExpansionConfig) -> Vec<Citation> {
    match section.corpus {
        Corpus::Statute | Corpus::Admin => extract_legislative(section, cfg),
        Corpus::Constitution => extract_constitution(section, cfg),
        Corpus::CaseLaw => extract_case_law(section, cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::Section;

    fn section(corpus: Corpus, id: &str, text: &str) -> Section {
        Section::new(id.to_string(), corpus, String::new(), text.to_string())
    }

    #[test]
    fn extracts_standalone_section_reference() {
        let section = section(
            Corpus::Statute,
            "orc:1901.01",
            "As provided in section 5907.01 of the Revised Code.",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        assert!(citations.iter().any(|c| c.target_id == "orc:5907.01"));
    }

    #[test]
    fn bare_chapter_reference_normalizes_to_first_section() {
        let section = section(
            Corpus::Statute,
            "orc:1901.01",
            "As required by 119. of the Revised Code.",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        let hit = citations.iter().find(|c| c.target_id == "orc:119.01");
        assert!(hit.is_some(), "expected chapter 119 to normalize to orc:119.01");
        assert!(hit.unwrap().context.contains("119"));
    }

    #[test]
    fn dedup_collapses_identical_target_relationship_context_tuples() {
        let make = |position: usize| Citation {
            source_id: "orc:1901.01".to_string(),
            target_id: "orc:5907.01".to_string(),
            relationship: CitationRelationship::CrossReference,
            context: "section 5907.01 of the Revised Code".to_string(),
            position,
        };
        let deduped = dedup_citations(vec![make(4), make(40), make(4)]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].position, 4); // first occurrence kept
    }

    #[test]
    fn expands_close_range_with_chapter_marker() {
        let section = section(
            Corpus::Statute,
            "orc:100.01",
            "sections 124.01 to 124.10 apply",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        let targets: Vec<_> = citations.iter().map(|c| c.target_id.as_str()).collect();
        assert!(targets.contains(&"orc:124.01"));
        assert!(targets.contains(&"orc:124.10"));
    }

    #[test]
    fn does_not_expand_range_beyond_gap_threshold() {
        let cfg = RangeExpansionConfig {
            max_gap: 5,
            ..Default::default()
        };
        let section = section(
            Corpus::Statute,
            "orc:100.01",
            "sections 124.05 to 124.64 apply",
        );
        let citations = extract_citations(&section, &cfg);
        let targets: Vec<_> = citations.iter().map(|c| c.target_id.as_str()).collect();
        assert!(targets.contains(&"orc:124.05"));
        assert!(targets.contains(&"orc:124.64"));
        assert!(!targets.contains(&"orc:124.01"));
    }

    #[test]
    fn extracts_constitution_shorthand_reference() {
        let section = section(
            Corpus::Constitution,
            "oconst:Article I, Section 1",
            "See Article II, Section 14.",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        assert!(citations
            .iter()
            .any(|c| c.target_id == "oconst:Article II, Section 14"));
    }

    #[test]
    fn normalizes_shorthand_citation_to_long_form_canonical_id() {
        let section = section(
            Corpus::Constitution,
            "oconst:Article I, Section 1",
            "As provided in Art. II § 3, the franchise is secured.",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        assert!(citations
            .iter()
            .any(|c| c.target_id == "oconst:Article II, Section 3"));
    }

    #[test]
    fn extracts_ohio_neutral_case_citation_as_dangling() {
        let section = section(
            Corpus::CaseLaw,
            "ohcase:2020-ohio-1234",
            "This court, following 2019-Ohio-5678, holds that...",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        assert!(citations
            .iter()
            .any(|c| c.relationship == CitationRelationship::Followed));
    }

    #[test]
    fn case_law_relationship_classification_first_match_wins() {
        let section = section(
            Corpus::CaseLaw,
            "ohcase:2020-ohio-1",
            "The court in 123 Ohio St. 3d 45 was overruled by later precedent.",
        );
        let citations = extract_citations(&section, &RangeExpansionConfig::default());
        assert!(citations
            .iter()
            .any(|c| c.relationship == CitationRelationship::Overruled));
    }
}
