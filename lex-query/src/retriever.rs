use lex_core::{CitationChain, CorpusMetadata, InboundCitations, LexResult, OutboundCitations, Section};
use lex_store::SectionKvStore;
use serde::Serialize;

/// One citation's target resolved against the primary table, or left
/// empty when the target is dangling (spec.md §4.8 failure semantics:
/// "the caller sees the dangling id").
#[derive(Debug, Clone, Serialize)]
pub struct CitationDetail {
    pub target_id: String,
    pub relationship: String,
    pub context: String,
    pub target_title: String,
    pub target_url: String,
}

/// A `{id, url, url_hash, verified_date}` provenance record, emitted for
/// every section folded into a `Context` bundle (spec.md §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub id: String,
    pub url: String,
    pub url_hash: String,
    pub verified_date: String,
}

/// The composed bundle `get_complete_context` returns: primary section,
/// resolved outbound citations, optional reverse citations, an optional
/// truncated chain, total word count across every section folded in, and
/// a provenance list.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub section: Section,
    pub citations: Vec<CitationDetail>,
    pub reverse: Option<InboundCitations>,
    pub chain: Option<CitationChain>,
    pub total_word_count: usize,
    pub sources: Vec<Source>,
}

/// One `search_by_keyword` hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub url: String,
    pub relevance: &'static str,
    pub preview: String,
}

/// One `related_sections` neighbor, labeled by which side of the
/// citation graph it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedSection {
    pub id: String,
    pub title: String,
    pub label: &'static str,
}

const PREVIEW_CHARS: usize = 160;

/// Read-only API over the five KV tables (C8). Stateless aside from the
/// open `SectionKvStore`; every method opens its own read transaction, so
/// concurrent readers never block each other or the writer.
pub struct Retriever<'a> {
    store: &'a SectionKvStore,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a SectionKvStore) -> Self {
        Self { store }
    }

    pub fn get_section(&self, id: &str) -> LexResult<Option<Section>> {
        self.store.get_section(id)
    }

    pub fn get_citations(&self, id: &str) -> LexResult<Option<OutboundCitations>> {
        self.store.get_outbound(id)
    }

    pub fn get_reverse(&self, id: &str) -> LexResult<Option<InboundCitations>> {
        self.store.get_inbound(id)
    }

    pub fn get_chain(&self, id: &str) -> LexResult<Option<CitationChain>> {
        self.store.get_chain(id)
    }

    pub fn get_metadata(&self, key: &str) -> LexResult<Option<serde_json::Value>> {
        self.store.get_metadata_raw(key)
    }

    pub fn get_corpus_metadata(&self, corpus: lex_core::Corpus) -> LexResult<Option<CorpusMetadata>> {
        self.store.get_metadata(corpus)
    }

    /// Composes the full bundle spec.md §4.8 describes. `None` when the
    /// root id isn't in the primary table — a miss, not an error.
    pub fn get_complete_context(
        &self,
        id: &str,
        include_chain: bool,
        include_reverse: bool,
        max_chain_depth: usize,
    ) -> LexResult<Option<Context>> {
        let Some(section) = self.store.get_section(id)? else {
            return Ok(None);
        };

        let outbound = self.store.get_outbound(id)?.unwrap_or_default();
        let mut citations = Vec::with_capacity(outbound.references_details.len());
        let mut sources = vec![Source {
            id: section.id.clone(),
            url: section.source_url.clone(),
            url_hash: section.source_hash.clone(),
            verified_date: section.scraped_date.clone(),
        }];
        let mut total_word_count = section.word_count;

        for citation in &outbound.references_details {
            let detail = match self.store.get_section(&citation.target_id)? {
                Some(target) => {
                    total_word_count += target.word_count;
                    sources.push(Source {
                        id: target.id.clone(),
                        url: target.source_url.clone(),
                        url_hash: target.source_hash.clone(),
                        verified_date: target.scraped_date.clone(),
                    });
                    CitationDetail {
                        target_id: citation.target_id.clone(),
                        relationship: citation.relationship.as_str().to_string(),
                        context: citation.context.clone(),
                        target_title: target.title,
                        target_url: target.source_url,
                    }
                }
                None => CitationDetail {
                    target_id: citation.target_id.clone(),
                    relationship: citation.relationship.as_str().to_string(),
                    context: citation.context.clone(),
                    target_title: String::new(),
                    target_url: String::new(),
                },
            };
            citations.push(detail);
        }

        let reverse = if include_reverse {
            self.store.get_inbound(id)?
        } else {
            None
        };

        let chain = if include_chain {
            self.store.get_chain(id)?.map(|mut chain| {
                chain.chain_sections.truncate(max_chain_depth);
                chain.complete_chain.truncate(max_chain_depth + 1);
                chain
            })
        } else {
            None
        };

        Ok(Some(Context {
            section,
            citations,
            reverse,
            chain,
            total_word_count,
            sources,
        }))
    }

    /// Unindexed linear scan over the primary table (spec.md §4.8:
    /// "Not indexed; intended for diagnostic use"). Title matches rank
    /// ahead of text-only matches.
    pub fn search_by_keyword(&self, keyword: &str, max_results: usize) -> LexResult<Vec<SearchHit>> {
        let needle = keyword.to_lowercase();
        let mut title_hits = Vec::new();
        let mut text_hits = Vec::new();

        for section in self.store.all_sections()? {
            if title_hits.len() + text_hits.len() >= max_results {
                break;
            }
            if section.title.to_lowercase().contains(&needle) {
                title_hits.push(self.to_search_hit(&section, "title"));
            } else if section.text.to_lowercase().contains(&needle) {
                text_hits.push(self.to_search_hit(&section, "text"));
            }
        }

        title_hits.extend(text_hits);
        title_hits.truncate(max_results);
        Ok(title_hits)
    }

    fn to_search_hit(&self, section: &Section, relevance: &'static str) -> SearchHit {
        SearchHit {
            id: section.id.clone(),
            title: section.title.clone(),
            url: section.source_url.clone(),
            relevance,
            preview: section.text.chars().take(PREVIEW_CHARS).collect(),
        }
    }

    /// Scans the reverse table and ranks by `cited_by_count` descending.
    pub fn most_cited(&self, limit: usize) -> LexResult<Vec<(String, usize)>> {
        let mut counts: Vec<(String, usize)> = self
            .store
            .all_reverse_citations()?
            .into_iter()
            .map(|(id, ic)| (id, ic.cited_by_count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        Ok(counts)
    }

    /// Merges up to `max/2` forward and `max/2` reverse neighbors.
    pub fn related_sections(&self, id: &str, max: usize) -> LexResult<Vec<RelatedSection>> {
        let half = (max / 2).max(1);
        let mut out = Vec::new();

        if let Some(outbound) = self.store.get_outbound(id)? {
            for target_id in outbound.direct_references.iter().take(half) {
                let title = self
                    .store
                    .get_section(target_id)?
                    .map(|s| s.title)
                    .unwrap_or_default();
                out.push(RelatedSection {
                    id: target_id.clone(),
                    title,
                    label: "cites_primary",
                });
            }
        }

        if let Some(inbound) = self.store.get_inbound(id)? {
            for source_id in inbound.cited_by.iter().take(half) {
                let title = self
                    .store
                    .get_section(source_id)?
                    .map(|s| s.title)
                    .unwrap_or_default();
                out.push(RelatedSection {
                    id: source_id.clone(),
                    title,
                    label: "cited_by_primary",
                });
            }
        }

        out.truncate(max);
        Ok(out)
    }

    /// Human-readable text block for downstream LLM consumption. Every
    /// section folded in carries its `url_hash` so provenance survives
    /// outside the structured bundle (spec.md §4.8).
    pub fn build_llm_context(
        &self,
        id: &str,
        include_chain: bool,
        max_chain_depth: usize,
    ) -> LexResult<Option<String>> {
        let Some(context) = self.get_complete_context(id, include_chain, true, max_chain_depth)? else {
            return Ok(None);
        };

        let mut out = String::new();
        out.push_str(&format!(
            "# {} ({})\n[url_hash: {}]\n\n{}\n\n",
            context.section.title, context.section.id, context.section.source_hash, context.section.text
        ));

        if !context.citations.is_empty() {
            out.push_str("## Direct citations\n");
            for citation in &context.citations {
                if context.sources.iter().any(|s| s.id == citation.target_id) {
                    out.push_str(&format!(
                        "- {} ({}): {}\n",
                        citation.target_title, citation.target_id, citation.relationship
                    ));
                } else {
                    out.push_str(&format!("- [dangling] {}\n", citation.target_id));
                }
            }
            out.push('\n');
        }

        if let Some(chain) = &context.chain {
            out.push_str(&format!(
                "## Citation chain (depth {}, complex={})\n",
                chain.chain_depth, chain.is_complex
            ));
            for snapshot in &chain.complete_chain {
                out.push_str(&format!(
                    "- {} [url_hash: {}]\n",
                    snapshot.title, snapshot.url_hash
                ));
            }
            out.push('\n');
        }

        if let Some(reverse) = &context.reverse {
            out.push_str(&format!("## Cited by {} section(s)\n\n", reverse.cited_by_count));
        }

        out.push_str("## Provenance\n");
        for source in &context.sources {
            out.push_str(&format!(
                "- {} | {} | url_hash={} | verified={}\n",
                source.id, source.url, source.url_hash, source.verified_date
            ));
        }

        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::{Citation, CitationRelationship, Corpus, SectionStore};
    use tempfile::tempdir;

    fn store_with_two_linked_sections() -> (tempfile::TempDir, SectionKvStore) {
        let dir = tempdir().unwrap();
        let mut store = SectionKvStore::open(&dir.path().join("s.redb")).unwrap();

        let mut a = Section::new("orc:1.01".to_string(), Corpus::Statute, "A".to_string(), "alpha bravo".to_string());
        a.has_outbound_citations = true;
        a.is_clickable = true;
        let mut b = Section::new("orc:1.02".to_string(), Corpus::Statute, "B".to_string(), "charlie".to_string());
        b.has_inbound_citations = true;
        b.is_clickable = true;

        let citation = Citation {
            source_id: "orc:1.01".to_string(),
            target_id: "orc:1.02".to_string(),
            relationship: CitationRelationship::CrossReference,
            context: "see section 1.02".to_string(),
            position: 0,
        };
        let outbound = vec![(
            "orc:1.01".to_string(),
            OutboundCitations {
                direct_references: vec!["orc:1.02".to_string()],
                references_details: vec![citation],
                reference_count: 1,
            },
        )];
        let inbound = vec![(
            "orc:1.02".to_string(),
            InboundCitations {
                cited_by: vec!["orc:1.01".to_string()],
                citing_details: vec![],
                cited_by_count: 1,
            },
        )];
        store.write_batch(&[a, b], &outbound, &inbound, &[]).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_section_is_none_not_error() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        assert!(retriever.get_section("orc:9999.99").unwrap().is_none());
    }

    #[test]
    fn complete_context_resolves_citation_target() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        let context = retriever.get_complete_context("orc:1.01", false, true, 8).unwrap().unwrap();
        assert_eq!(context.citations.len(), 1);
        assert_eq!(context.citations[0].target_title, "B");
        assert_eq!(context.sources.len(), 2);
    }

    #[test]
    fn dangling_citation_leaves_target_fields_empty() {
        let dir = tempdir().unwrap();
        let mut store = SectionKvStore::open(&dir.path().join("s.redb")).unwrap();
        let section = Section::new("orc:1.01".to_string(), Corpus::Statute, "A".to_string(), "x".to_string());
        let citation = Citation {
            source_id: "orc:1.01".to_string(),
            target_id: "orc:9999.99".to_string(),
            relationship: CitationRelationship::CrossReference,
            context: "ctx".to_string(),
            position: 0,
        };
        let outbound = vec![(
            "orc:1.01".to_string(),
            OutboundCitations {
                direct_references: vec!["orc:9999.99".to_string()],
                references_details: vec![citation],
                reference_count: 1,
            },
        )];
        store.write_batch(&[section], &outbound, &[], &[]).unwrap();

        let retriever = Retriever::new(&store);
        let context = retriever.get_complete_context("orc:1.01", false, false, 8).unwrap().unwrap();
        assert_eq!(context.citations[0].target_title, "");
    }

    #[test]
    fn search_by_keyword_ranks_title_matches_first() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        let hits = retriever.search_by_keyword("a", 10).unwrap();
        assert!(hits.iter().any(|h| h.relevance == "title"));
    }

    #[test]
    fn most_cited_sorts_descending() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        let ranked = retriever.most_cited(10).unwrap();
        assert_eq!(ranked[0].0, "orc:1.02");
        assert_eq!(ranked[0].1, 1);
    }

    #[test]
    fn related_sections_labels_both_directions() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        let related_a = retriever.related_sections("orc:1.01", 4).unwrap();
        assert!(related_a.iter().any(|r| r.label == "cites_primary"));
        let related_b = retriever.related_sections("orc:1.02", 4).unwrap();
        assert!(related_b.iter().any(|r| r.label == "cited_by_primary"));
    }

    #[test]
    fn llm_context_includes_url_hash() {
        let (_dir, store) = store_with_two_linked_sections();
        let retriever = Retriever::new(&store);
        let text = retriever.build_llm_context("orc:1.01", false, 8).unwrap().unwrap();
        assert!(text.contains("url_hash"));
    }
}
