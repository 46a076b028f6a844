use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One of the four legal corpora this engine ingests. The variant's tag
/// prefixes every canonical id and every KV key derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corpus {
    Statute,
    Admin,
    Constitution,
    CaseLaw,
}

impl Corpus {
    /// Fixed tag table: orc/oac/oconst/ohcase.
    pub fn tag(&self) -> &'static str {
        match self {
            Corpus::Statute => "orc",
            Corpus::Admin => "oac",
            Corpus::Constitution => "oconst",
            Corpus::CaseLaw => "ohcase",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "orc" => Some(Corpus::Statute),
            "oac" => Some(Corpus::Admin),
            "oconst" => Some(Corpus::Constitution),
            "ohcase" => Some(Corpus::CaseLaw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Corpus::Statute => "statute",
            Corpus::Admin => "admin",
            Corpus::Constitution => "constitution",
            Corpus::CaseLaw => "case_law",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "statute" => Some(Corpus::Statute),
            "admin" => Some(Corpus::Admin),
            "constitution" => Some(Corpus::Constitution),
            "case_law" | "caselaw" => Some(Corpus::CaseLaw),
            _ => None,
        }
    }

    /// Builds the corpus-prefixed canonical id used as every KV key.
    pub fn canonical_id(&self, bare_id: &str) -> String {
        format!("{}:{}", self.tag(), bare_id)
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-corpus derived enrichment attached to a Section. Fields that don't
/// apply to a given corpus are left at their default (empty/None).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrichment {
    pub summary: String,
    pub legal_type: String,
    pub practice_areas: Vec<String>,
    pub subject_matter: Vec<String>,
    pub complexity: u8,
    pub key_terms: Vec<String>,

    // Statute-only.
    pub offense_level: Option<String>,
    pub offense_degree: Option<String>,

    // Constitution-only.
    pub article_name: Option<String>,
    pub article_type: Option<String>,
    pub rights_category: Option<String>,
    pub government_branch: Option<String>,
}

/// A single section/record within a corpus, identified by a canonical id.
///
/// `paragraphs` is the write-once verbatim legal text (spec.md invariant
/// 1: no phase mutates it after C1/C2 produce it). `text` is the derived
/// `full_text` — paragraphs joined with `"\n"` — kept alongside rather
/// than recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub corpus: Corpus,
    pub source_url: String,
    pub source_hash: String,
    pub header: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub text: String,
    pub word_count: usize,
    pub paragraph_count: usize,
    pub chapter: Option<String>,
    pub enrichment: Option<Enrichment>,
    pub is_clickable: bool,
    pub has_outbound_citations: bool,
    pub has_inbound_citations: bool,
    pub in_complex_chain: bool,
    pub scraped_date: String,
    pub metadata: HashMap<String, String>,
}

impl Section {
    /// Minimal constructor used by unit tests across the workspace: wraps
    /// `text` as a single paragraph. Real ingest goes through
    /// `from_paragraphs`, which preserves the source's actual paragraph
    /// boundaries and provenance fields.
    pub fn new(id: String, corpus: Corpus, title: String, text: String) -> Self {
        let paragraphs = if text.is_empty() { Vec::new() } else { vec![text.clone()] };
        Self::from_paragraphs(
            id,
            corpus,
            String::new(),
            String::new(),
            String::new(),
            title,
            paragraphs,
            String::new(),
        )
    }

    /// Builds a Section the way C1+C2 do: from a header, a title already
    /// split out of it, and the verbatim paragraph sequence. `full_text`
    /// and the word/paragraph counts are derived here, once.
    pub fn from_paragraphs(
        id: String,
        corpus: Corpus,
        source_url: String,
        source_hash: String,
        header: String,
        title: String,
        paragraphs: Vec<String>,
        scraped_date: String,
    ) -> Self {
        let text = paragraphs.join("\n");
        let word_count = text.split_whitespace().count();
        let paragraph_count = paragraphs.len();
        Self {
            id,
            corpus,
            source_url,
            source_hash,
            header,
            title,
            paragraphs,
            text,
            word_count,
            paragraph_count,
            chapter: None,
            enrichment: None,
            is_clickable: false,
            has_outbound_citations: false,
            has_inbound_citations: false,
            in_complex_chain: false,
            scraped_date,
            metadata: HashMap::new(),
        }
    }
}

/// The relationship a citation expresses between two sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CitationRelationship {
    Defines,
    CrossReference,
    AmendedBy,
    SupersededBy,
    Overruled,
    Reversed,
    Affirmed,
    Distinguished,
    Followed,
    Cited,
    Questioned,
    Compared,
}

impl CitationRelationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationRelationship::Defines => "defines",
            CitationRelationship::CrossReference => "cross_reference",
            CitationRelationship::AmendedBy => "amended_by",
            CitationRelationship::SupersededBy => "superseded_by",
            CitationRelationship::Overruled => "overruled",
            CitationRelationship::Reversed => "reversed",
            CitationRelationship::Affirmed => "affirmed",
            CitationRelationship::Distinguished => "distinguished",
            CitationRelationship::Followed => "followed",
            CitationRelationship::Cited => "cited",
            CitationRelationship::Questioned => "questioned",
            CitationRelationship::Compared => "compared",
        }
    }
}

impl Default for CitationRelationship {
    fn default() -> Self {
        CitationRelationship::CrossReference
    }
}

/// A single extracted citation edge from `source_id` to `target_id`.
/// `target_id` may be dangling (no matching Section exists) by
/// construction, e.g. an unresolved case law reporter citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub target_id: String,
    pub relationship: CitationRelationship,
    pub context: String,
    /// Byte offset in the source section's `full_text` where the match
    /// begins (spec.md §3: "position: byte offset ... where the match
    /// begins").
    pub position: usize,
}

/// The outbound side of a section's citation record, as stored in the
/// `citations` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundCitations {
    pub direct_references: Vec<String>,
    pub references_details: Vec<Citation>,
    pub reference_count: usize,
}

/// The inbound side, as stored in the `reverse_citations` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundCitations {
    pub cited_by: Vec<String>,
    pub citing_details: Vec<Citation>,
    pub cited_by_count: usize,
}

/// A denormalized snapshot of one section embedded in a `CitationChain`,
/// so a single chain read serves downstream LLM context without further
/// primary-table lookups (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub id: String,
    pub title: String,
    pub url: String,
    pub url_hash: String,
    pub full_text: String,
    pub word_count: usize,
}

/// A bounded transitive closure rooted at one section, produced by C5's
/// breadth-first expansion and stored in the `chains` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationChain {
    pub chain_id: String,
    pub primary_section: String,
    pub chain_sections: Vec<String>,
    pub chain_depth: usize,
    pub references_count: usize,
    pub is_complex: bool,
    pub complete_chain: Vec<SectionSnapshot>,
}

/// Summary statistics recorded once per corpus in the `metadata` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub corpus: Option<Corpus>,
    pub total_sections: usize,
    pub total_citations: usize,
    pub clickable_sections: usize,
    pub sections_with_inbound: usize,
    pub chains_built: usize,
    pub complex_chains: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_tag_round_trips() {
        for corpus in [
            Corpus::Statute,
            Corpus::Admin,
            Corpus::Constitution,
            Corpus::CaseLaw,
        ] {
            let tag = corpus.tag();
            assert_eq!(Corpus::from_tag(tag), Some(corpus));
        }
    }

    #[test]
    fn canonical_id_is_tag_prefixed() {
        assert_eq!(Corpus::Statute.canonical_id("1901.01"), "orc:1901.01");
        assert_eq!(Corpus::Admin.canonical_id("101:1-1-01"), "oac:101:1-1-01");
    }

    #[test]
    fn section_starts_unclickable() {
        let section = Section::new(
            "orc:1901.01".to_string(),
            Corpus::Statute,
            "Definitions".to_string(),
            "text".to_string(),
        );
        assert!(!section.is_clickable);
        assert!(!section.has_outbound_citations);
        assert!(!section.has_inbound_citations);
        assert!(!section.in_complex_chain);
    }

    #[test]
    fn relationship_default_is_cross_reference() {
        assert_eq!(
            CitationRelationship::default().as_str(),
            "cross_reference"
        );
    }
}
