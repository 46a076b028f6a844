use lex_core::LexResult;
use lex_store::SectionKvStore;
use std::collections::HashSet;

/// One failed invariant, identified by the section/chain it was found on.
#[derive(Debug, Clone)]
pub struct Violation {
    pub subject_id: String,
    pub rule: String,
    pub detail: String,
}

/// Checks the testable invariants of spec.md §8 against a built store,
/// backing the `verify` CLI subcommand (SPEC_FULL.md §6).
pub struct IntegrityChecker<'a> {
    store: &'a SectionKvStore,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(store: &'a SectionKvStore) -> Self {
        Self { store }
    }

    /// Runs every check and returns the full violation list. Empty means
    /// the store is internally consistent; the CLI maps that to exit
    /// code 0, non-empty to exit code 1.
    pub fn check_all(&self) -> LexResult<Vec<Violation>> {
        let mut violations = Vec::new();
        let sections = self.store.all_sections()?;
        let known_ids: HashSet<&str> = sections.iter().map(|s| s.id.as_str()).collect();

        violations.extend(self.check_clickability(&sections)?);
        violations.extend(self.check_complexity_bounds(&sections));
        violations.extend(self.check_key_term_caps(&sections));
        violations.extend(self.check_reverse_forward_symmetry()?);
        violations.extend(self.check_chain_bounds(&known_ids)?);
        Ok(violations)
    }

    /// `is_clickable` must hold exactly when a section has outbound or
    /// inbound citations (spec.md §8: clickability consistency).
    fn check_clickability(&self, sections: &[lex_core::Section]) -> LexResult<Vec<Violation>> {
        let mut violations = Vec::new();
        for section in sections {
            let expected = section.has_outbound_citations || section.has_inbound_citations;
            if section.is_clickable != expected {
                violations.push(Violation {
                    subject_id: section.id.clone(),
                    rule: "clickability_consistency".to_string(),
                    detail: format!(
                        "is_clickable={} but has_outbound={} has_inbound={}",
                        section.is_clickable, section.has_outbound_citations, section.has_inbound_citations
                    ),
                });
            }
        }
        Ok(violations)
    }

    /// Enrichment complexity must fall in [1, 10] (spec.md §8).
    fn check_complexity_bounds(&self, sections: &[lex_core::Section]) -> Vec<Violation> {
        sections
            .iter()
            .filter_map(|section| {
                let enrichment = section.enrichment.as_ref()?;
                if enrichment.complexity < 1 || enrichment.complexity > 10 {
                    Some(Violation {
                        subject_id: section.id.clone(),
                        rule: "complexity_bounds".to_string(),
                        detail: format!("complexity={} out of [1,10]", enrichment.complexity),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Key terms are capped at 10 with no duplicates (spec.md §8).
    fn check_key_term_caps(&self, sections: &[lex_core::Section]) -> Vec<Violation> {
        sections
            .iter()
            .filter_map(|section| {
                let enrichment = section.enrichment.as_ref()?;
                let unique: HashSet<&str> = enrichment.key_terms.iter().map(|s| s.as_str()).collect();
                if enrichment.key_terms.len() > 10 || unique.len() != enrichment.key_terms.len() {
                    Some(Violation {
                        subject_id: section.id.clone(),
                        rule: "key_term_cap".to_string(),
                        detail: format!(
                            "{} key terms, {} unique",
                            enrichment.key_terms.len(),
                            unique.len()
                        ),
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Every forward citation's source must list the target as cited-by
    /// on the reverse side, and vice versa (spec.md §8: reverse-forward
    /// symmetry). Dangling targets (no Section on record) are exempt —
    /// spec.md §4.3 keeps them as raw strings rather than backfilling a
    /// reverse entry that has nowhere to live.
    fn check_reverse_forward_symmetry(&self) -> LexResult<Vec<Violation>> {
        let mut violations = Vec::new();
        let outbound = self.store.all_citations()?;
        let inbound: std::collections::HashMap<String, lex_core::InboundCitations> =
            self.store.all_reverse_citations()?.into_iter().collect();

        for (source_id, oc) in &outbound {
            for citation in &oc.references_details {
                let Some(target_inbound) = inbound.get(&citation.target_id) else {
                    continue;
                };
                if !target_inbound.cited_by.contains(source_id) {
                    violations.push(Violation {
                        subject_id: source_id.clone(),
                        rule: "reverse_forward_symmetry".to_string(),
                        detail: format!(
                            "{} cites {} but {} has no matching cited_by entry",
                            source_id, citation.target_id, citation.target_id
                        ),
                    });
                }
            }
        }
        Ok(violations)
    }

    /// Chain sections are capped, deduplicated, and every member must be a
    /// known section id (spec.md §8: chain containment).
    fn check_chain_bounds(&self, known_ids: &HashSet<&str>) -> LexResult<Vec<Violation>> {
        let mut violations = Vec::new();
        for section in self.store.all_sections()? {
            let Some(chain) = self.store.get_chain(&section.id)? else {
                continue;
            };
            let unique: HashSet<&str> = chain.chain_sections.iter().map(|s| s.as_str()).collect();
            if unique.len() != chain.chain_sections.len() {
                violations.push(Violation {
                    subject_id: chain.chain_id.clone(),
                    rule: "chain_no_duplicates".to_string(),
                    detail: format!(
                        "{} entries, {} unique",
                        chain.chain_sections.len(),
                        unique.len()
                    ),
                });
            }
            for member in &chain.chain_sections {
                if !known_ids.contains(member.as_str()) {
                    violations.push(Violation {
                        subject_id: chain.chain_id.clone(),
                        rule: "chain_containment".to_string(),
                        detail: format!("chain references unknown section {member}"),
                    });
                }
            }
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::{Citation, CitationRelationship, Corpus, InboundCitations, OutboundCitations, Section, SectionStore};
    use tempfile::tempdir;

    #[test]
    fn clean_store_has_no_violations() {
        let dir = tempdir().unwrap();
        let mut store = SectionKvStore::open(&dir.path().join("store.redb")).unwrap();
        let mut section = Section::new("orc:1.01".to_string(), Corpus::Statute, "T".to_string(), "a".to_string());
        section.is_clickable = false;
        store.write_batch(&[section], &[], &[], &[]).unwrap();

        let violations = IntegrityChecker::new(&store).check_all().unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn flags_clickability_mismatch() {
        let dir = tempdir().unwrap();
        let mut store = SectionKvStore::open(&dir.path().join("store.redb")).unwrap();
        let mut section = Section::new("orc:1.01".to_string(), Corpus::Statute, "T".to_string(), "a".to_string());
        section.is_clickable = true;
        store.write_batch(&[section], &[], &[], &[]).unwrap();

        let violations = IntegrityChecker::new(&store).check_all().unwrap();
        assert!(violations.iter().any(|v| v.rule == "clickability_consistency"));
    }

    #[test]
    fn flags_asymmetric_citation() {
        let dir = tempdir().unwrap();
        let mut store = SectionKvStore::open(&dir.path().join("store.redb")).unwrap();
        let citation = Citation {
            source_id: "orc:1.01".to_string(),
            target_id: "orc:1.02".to_string(),
            relationship: CitationRelationship::CrossReference,
            context: "ctx".to_string(),
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
                cited_by: vec![],
                citing_details: vec![],
                cited_by_count: 0,
            },
        )];
        let section_a = Section::new("orc:1.01".to_string(), Corpus::Statute, "A".to_string(), "a".to_string());
        let section_b = Section::new("orc:1.02".to_string(), Corpus::Statute, "B".to_string(), "b".to_string());
        store
            .write_batch(&[section_a, section_b], &outbound, &inbound, &[])
            .unwrap();

        let violations = IntegrityChecker::new(&store).check_all().unwrap();
        assert!(violations.iter().any(|v| v.rule == "reverse_forward_symmetry"));
    }
}
