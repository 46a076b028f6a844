use crate::constitution;
use lex_core::{keyword_match_count, Corpus, Enrichment, LexResult, Section};

struct PracticeArea {
    name: &'static str,
    keywords: &'static [&'static str],
}

/// Practice area keyword table, grounded in the Ohio builders'
/// `AutoEnricher.PRACTICE_AREA_KEYWORDS`. Shared across statute, admin
/// and case law corpora.
const PRACTICE_AREAS: &[PracticeArea] = &[
    PracticeArea {
        name: "criminal_law",
        keywords: &[
            "felony", "misdemeanor", "imprisonment", "convicted", "offense",
            "guilty", "crime", "criminal", "penal", "defendant", "prosecution",
            "sentence", "jail", "prison", "punish",
        ],
    },
    PracticeArea {
        name: "family_law",
        keywords: &[
            "marriage", "divorce", "custody", "child support", "adoption",
            "spouse", "parent", "guardian", "domestic", "alimony", "visitation",
        ],
    },
    PracticeArea {
        name: "property_law",
        keywords: &[
            "property", "real estate", "conveyance", "deed", "mortgage",
            "landlord", "tenant", "lease", "title", "easement", "lien",
        ],
    },
    PracticeArea {
        name: "business_law",
        keywords: &[
            "corporation", "llc", "partnership", "business", "commercial",
            "contract", "enterprise", "company", "shareholder", "entity",
        ],
    },
    PracticeArea {
        name: "tax_law",
        keywords: &[
            "tax", "revenue", "assessment", "levy", "taxation", "taxable",
            "income tax", "sales tax", "property tax",
        ],
    },
    PracticeArea {
        name: "employment_law",
        keywords: &[
            "employment", "employee", "employer", "workplace", "labor",
            "wage", "worker", "compensation", "unemployment", "benefits",
        ],
    },
    PracticeArea {
        name: "administrative_law",
        keywords: &[
            "agency", "regulation", "administrative", "rule", "board",
            "commission", "department", "licensing", "permit",
        ],
    },
    PracticeArea {
        name: "civil_procedure",
        keywords: &[
            "complaint", "summons", "pleading", "discovery", "trial",
            "judgment", "appeal", "motion", "filing",
        ],
    },
];

const CASE_LAW_ONLY_AREAS: &[PracticeArea] = &[
    PracticeArea {
        name: "constitutional_law",
        keywords: &[
            "constitutional", "amendment", "due process", "equal protection",
            "first amendment", "fourth amendment", "rights",
        ],
    },
    PracticeArea {
        name: "tort_law",
        keywords: &[
            "negligence", "damages", "liability", "injury", "tort",
            "personal injury", "wrongful death", "malpractice",
        ],
    },
];

struct SubjectMatter {
    name: &'static str,
    keywords: &'static [&'static str],
}

/// Subject matter keyword table for the constitution corpus, grounded in
/// `ohio_constitution`'s `SUBJECT_MATTER_KEYWORDS`.
const SUBJECT_MATTERS: &[SubjectMatter] = &[
    SubjectMatter {
        name: "fundamental_rights",
        keywords: &["rights", "liberty", "freedom", "equality", "justice", "free", "independent", "inalienable", "protect"],
    },
    SubjectMatter {
        name: "voting_elections",
        keywords: &["election", "vote", "ballot", "suffrage", "voter", "elect", "electoral", "candidate", "poll"],
    },
    SubjectMatter {
        name: "judicial_system",
        keywords: &["court", "judge", "justice", "judicial", "trial", "jury", "judgment", "appeal", "supreme court"],
    },
    SubjectMatter {
        name: "legislative_process",
        keywords: &["general assembly", "legislature", "bill", "law", "senate", "house", "representatives", "enact"],
    },
    SubjectMatter {
        name: "executive_powers",
        keywords: &["governor", "executive", "veto", "appointment", "pardon", "command", "enforce"],
    },
    SubjectMatter {
        name: "education",
        keywords: &["school", "education", "educational", "university", "college", "instruction", "learning", "teacher"],
    },
    SubjectMatter {
        name: "taxation_finance",
        keywords: &["tax", "revenue", "debt", "fiscal", "appropriation", "treasury", "fund", "levy", "assessment"],
    },
    SubjectMatter {
        name: "local_government",
        keywords: &["municipal", "county", "township", "city", "local"],
    },
];

const STOP_KEY_TERMS: &[&str] = &["the", "and", "for", "with", "from", "this", "that"];

fn summary_for_legislative(title: &str) -> String {
    let lower = title.to_lowercase();
    if ["definition", "definitions", "defined"].iter().any(|w| lower.contains(w)) {
        format!("Defines {lower}")
    } else if ["penalty", "penalties", "punishment"].iter().any(|w| lower.contains(w)) {
        format!("Establishes penalties for {lower}")
    } else if ["procedure", "process", "filing"].iter().any(|w| lower.contains(w)) {
        format!("Describes procedure for {lower}")
    } else {
        format!("Relates to {lower}")
    }
}

fn summary_for_constitution(title: &str) -> String {
    let lower = title.to_lowercase();
    if ["rights", "freedom", "liberty"].iter().any(|w| lower.contains(w)) {
        format!("Guarantees {lower}")
    } else if ["power", "authority", "duty"].iter().any(|w| lower.contains(w)) {
        format!("Establishes {lower}")
    } else if ["procedure", "process", "election"].iter().any(|w| lower.contains(w)) {
        format!("Governs {lower}")
    } else if ["prohibition", "prohibited", "limit"].iter().any(|w| lower.contains(w)) {
        format!("Prohibits or limits {lower}")
    } else {
        format!("Addresses {lower}")
    }
}

fn classify_legal_type(text: &str, title: &str, default_civil: &str) -> String {
    let criminal_patterns = [
        "felony", "misdemeanor", "imprisonment", "imprisoned", "convicted",
        "guilty", "offense", "violation", "penalty",
    ];
    let criminal_matches = keyword_match_count(text, &criminal_patterns);
    if criminal_matches >= 2 {
        return "criminal_statute".to_string();
    }
    let lower_text = text.to_lowercase();
    let lower_title = title.to_lowercase();
    if lower_text.contains("as used in") || lower_title.contains("definition") {
        return "definitional".to_string();
    }
    if ["procedure", "process", "filing", "hearing", "motion"]
        .iter()
        .any(|w| lower_text.contains(w))
    {
        return "procedural".to_string();
    }
    default_civil.to_string()
}

/// Case-law branch of spec.md §4.4's `legal_type` classification — distinct
/// from `classify_legal_type`'s statute rules (no definitional/procedural
/// buckets; appellate status matters instead).
fn classify_case_law_type(text: &str) -> String {
    let criminal_patterns = [
        "felony", "misdemeanor", "imprisonment", "imprisoned", "convicted",
        "guilty", "offense", "violation", "penalty",
    ];
    if keyword_match_count(text, &criminal_patterns) >= 3 {
        return "criminal_case".to_string();
    }
    let lower_text = text.to_lowercase();
    if ["appeal", "appellant", "appellee"]
        .iter()
        .any(|w| lower_text.contains(w))
    {
        return "appellate_case".to_string();
    }
    "civil_case".to_string()
}

fn identify_practice_areas(
    text: &str,
    bare_chapter: Option<&str>,
    include_case_law_areas: bool,
) -> Vec<String> {
    let mut areas = Vec::new();
    let tables: Vec<&PracticeArea> = if include_case_law_areas {
        PRACTICE_AREAS.iter().chain(CASE_LAW_ONLY_AREAS.iter()).collect()
    } else {
        PRACTICE_AREAS.iter().collect()
    };
    for area in tables {
        if keyword_match_count(text, area.keywords) >= 2 {
            areas.push(area.name.to_string());
        }
    }

    if let Some(chapter) = bare_chapter.and_then(|c| c.parse::<u32>().ok()) {
        if (2900..3000).contains(&chapter) && !areas.contains(&"criminal_law".to_string()) {
            areas.push("criminal_law".to_string());
        }
        if (3100..3200).contains(&chapter) && !areas.contains(&"family_law".to_string()) {
            areas.push("family_law".to_string());
        }
        if (5500..5800).contains(&chapter) && !areas.contains(&"tax_law".to_string()) {
            areas.push("tax_law".to_string());
        }
        if (1700..1800).contains(&chapter) && !areas.contains(&"business_law".to_string()) {
            areas.push("business_law".to_string());
        }
    }

    if areas.is_empty() {
        areas.push("general".to_string());
    }
    areas
}

fn identify_subject_matter(text: &str) -> Vec<String> {
    let mut matters: Vec<String> = SUBJECT_MATTERS
        .iter()
        .filter(|subject| keyword_match_count(text, subject.keywords) >= 1)
        .map(|subject| subject.name.to_string())
        .collect();
    if matters.is_empty() {
        matters.push("general".to_string());
    }
    matters
}

fn extract_offense_level(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if lower.contains("minor misdemeanor") {
        Some("minor_misdemeanor".to_string())
    } else if lower.contains("felony") {
        Some("felony".to_string())
    } else if lower.contains("misdemeanor") {
        Some("misdemeanor".to_string())
    } else {
        None
    }
}

fn extract_offense_degree(text: &str) -> Option<String> {
    use regex::Regex;
    let lower = text.to_lowercase();
    let felony_re = Regex::new(r"felony of the (first|second|third|fourth|fifth) degree").unwrap();
    if let Some(caps) = felony_re.captures(&lower) {
        return Some(match &caps[1] {
            "first" => "F1",
            "second" => "F2",
            "third" => "F3",
            "fourth" => "F4",
            "fifth" => "F5",
            _ => return None,
        }.to_string());
    }
    let misdemeanor_re =
        Regex::new(r"misdemeanor of the (first|second|third|fourth) degree").unwrap();
    if let Some(caps) = misdemeanor_re.captures(&lower) {
        return Some(match &caps[1] {
            "first" => "M1",
            "second" => "M2",
            "third" => "M3",
            "fourth" => "M4",
            _ => return None,
        }.to_string());
    }
    None
}

fn calculate_complexity(word_count: usize, paragraph_count: usize, citation_count: usize) -> u8 {
    let mut score: i32 = 5;
    if word_count > 1000 {
        score += 2;
    } else if word_count > 500 {
        score += 1;
    } else if word_count < 100 {
        score -= 1;
    }

    if paragraph_count > 15 {
        score += 2;
    } else if paragraph_count > 10 {
        score += 1;
    }

    if citation_count > 10 {
        score += 2;
    } else if citation_count > 5 {
        score += 1;
    } else if citation_count == 0 {
        score -= 1;
    }

    score.clamp(1, 10) as u8
}

fn extract_key_terms(title: &str, text: &str) -> Vec<String> {
    let mut terms = Vec::new();

    let title_lower = title.to_lowercase();
    if !title_lower.is_empty() {
        for word in title_lower.split(|c: char| matches!(c, ',' | ';' | '.' | '-') || c.is_whitespace()) {
            let word = word.trim();
            if word.len() > 3 && !STOP_KEY_TERMS.contains(&word) {
                terms.push(word.to_string());
            }
        }
    }

    let head: String = text.chars().take(500).collect();

    for quoted in extract_quoted(&head) {
        terms.push(quoted.to_lowercase());
    }

    for phrase in extract_capitalized_phrases(&head) {
        if phrase.len() > 5 {
            terms.push(phrase);
        }
    }

    let mut seen = std::collections::HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));
    terms.truncate(10);
    terms
}

fn extract_quoted(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c == '"' {
            if let Some(end) = text[start + 1..].find('"') {
                out.push(text[start + 1..start + 1 + end].to_string());
            }
        }
    }
    out
}

/// Runs of two or more consecutive capitalized words (spec.md §4.4
/// "capitalized multi-word proper phrases"), e.g. "Ohio Revised Code".
fn extract_capitalized_phrases(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        let starts_upper = trimmed.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
        if starts_upper {
            current.push(trimmed);
        } else {
            if current.len() >= 2 {
                phrases.push(current.join(" "));
            }
            current.clear();
        }
    }
    if current.len() >= 2 {
        phrases.push(current.join(" "));
    }
    phrases
}

/// Enricher for the statute and administrative-rule corpora. Grounded in
/// the Ohio builders' generic `AutoEnricher.enrich_section`.
pub struct LegislativeEnricher {
    pub corpus: Corpus,
    pub citation_count_of: Box<dyn Fn(&str) -> usize + Send + Sync>,
}

impl lex_core::Enricher for LegislativeEnricher {
    fn enrich(&self, section: &Section) -> LexResult<Enrichment> {
        let citation_count = (self.citation_count_of)(&section.id);
        let bare_chapter = lex_core::chapter_of(section.id.splitn(2, ':').nth(1).unwrap_or(""));
        let default_civil = match self.corpus {
            Corpus::Admin => "administrative_rule",
            _ => "civil_statute",
        };
        let legal_type = classify_legal_type(&section.text, &section.title, default_civil);
        let practice_areas = identify_practice_areas(&section.text, bare_chapter.as_deref(), false);
        let (offense_level, offense_degree) = if legal_type == "criminal_statute" {
            (
                extract_offense_level(&section.text),
                extract_offense_degree(&section.text),
            )
        } else {
            (None, None)
        };

        Ok(Enrichment {
            summary: summary_for_legislative(&section.title),
            legal_type,
            practice_areas,
            subject_matter: Vec::new(),
            complexity: calculate_complexity(
                section.word_count,
                section.paragraph_count,
                citation_count,
            ),
            key_terms: extract_key_terms(&section.title, &section.text),
            offense_level,
            offense_degree,
            article_name: None,
            article_type: None,
            rights_category: None,
            government_branch: None,
        })
    }
}

/// Enricher for the constitution corpus. Grounded in
/// `ohio_constitution`'s `AutoEnricher.enrich_section`.
pub struct ConstitutionEnricher {
    pub citation_count_of: Box<dyn Fn(&str) -> usize + Send + Sync>,
}

impl lex_core::Enricher for ConstitutionEnricher {
    fn enrich(&self, section: &Section) -> LexResult<Enrichment> {
        let citation_count = (self.citation_count_of)(&section.id);
        let bare_id = section.id.splitn(2, ':').nth(1).unwrap_or("");
        let (article, section_num) = constitution::parse_article_section(bare_id)
            .unwrap_or((String::new(), String::new()));
        let article_name = constitution::article_name(&article).map(|s| s.to_string());
        let article_type = article_name
            .as_deref()
            .map(constitution::article_category)
            .map(|s| s.to_string());
        let government_branch = article_type
            .as_deref()
            .and_then(constitution::government_branch)
            .map(|s| s.to_string());
        let rights_category = if article_type.as_deref() == Some("bill_of_rights") {
            Some(
                constitution::rights_category(&section_num, &section.title, &section.text)
                    .to_string(),
            )
        } else {
            None
        };

        Ok(Enrichment {
            summary: summary_for_constitution(&section.title),
            legal_type: "constitutional_provision".to_string(),
            practice_areas: Vec::new(),
            subject_matter: identify_subject_matter(&section.text),
            complexity: calculate_complexity(
                section.word_count,
                section.paragraph_count,
                citation_count,
            ),
            key_terms: extract_key_terms(&section.title, &section.text),
            offense_level: None,
            offense_degree: None,
            article_name,
            article_type,
            rights_category,
            government_branch,
        })
    }
}

/// Enricher for case opinions. Grounded in
/// `ohio_caselaw`'s `auto_enricher_caselaw.AutoEnricher.enrich_case`.
pub struct CaseLawEnricher {
    pub citation_count_of: Box<dyn Fn(&str) -> usize + Send + Sync>,
}

impl lex_core::Enricher for CaseLawEnricher {
    fn enrich(&self, section: &Section) -> LexResult<Enrichment> {
        let citation_count = (self.citation_count_of)(&section.id);
        let legal_type = classify_case_law_type(&section.text);
        let practice_areas = identify_practice_areas(&section.text, None, true);
        let (offense_level, offense_degree) = if practice_areas.contains(&"criminal_law".to_string())
        {
            (
                extract_offense_level(&section.text),
                extract_offense_degree(&section.text),
            )
        } else {
            (None, None)
        };

        Ok(Enrichment {
            summary: summary_for_legislative(&section.title),
            legal_type,
            practice_areas,
            subject_matter: Vec::new(),
            complexity: calculate_complexity(
                section.word_count,
                section.paragraph_count,
                citation_count,
            ),
            key_terms: extract_key_terms(&section.title, &section.text),
            offense_level,
            offense_degree,
            article_name: None,
            article_type: None,
            rights_category: None,
            government_branch: None,
        })
    }
}

/// Builds the corpus-appropriate enricher, wiring in a citation-count
/// lookup the caller supplies (usually backed by the graph builder's
/// forward adjacency map, since complexity scoring depends on it).
pub fn corpus_enricher(
    corpus: Corpus,
    citation_count_of: Box<dyn Fn(&str) -> usize + Send + Sync>,
) -> Box<dyn lex_core::Enricher> {
    match corpus {
        Corpus::Statute | Corpus::Admin => Box::new(LegislativeEnricher {
            corpus,
            citation_count_of,
        }),
        Corpus::Constitution => Box::new(ConstitutionEnricher { citation_count_of }),
        Corpus::CaseLaw => Box::new(CaseLawEnricher { citation_count_of }),
    }
}
