use lex_core::{
    Citation, CitationChain, InboundCitations, LexResult, OutboundCitations, Section,
    SectionSnapshot,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// Breadth-first bound on chain construction: at most `k` unvisited
/// targets are appended per queue pop, and a chain never exceeds
/// `max_size` sections. A chain with `chain_sections.len() >=
/// complex_threshold` is flagged complex.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub k: usize,
    pub max_size: usize,
    pub complex_threshold: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_size: 8,
            complex_threshold: 4,
        }
    }
}

/// Builds forward/reverse adjacency and bounded transitive chains from a
/// flat citation list, the way the teacher's `ConflictGraph` builds
/// adjacency from a flat conflict list — one pass to populate maps, a
/// second pass to derive higher-level structures.
pub struct CitationGraphBuilder {
    pub chain_config: ChainConfig,
}

impl Default for CitationGraphBuilder {
    fn default() -> Self {
        Self {
            chain_config: ChainConfig::default(),
        }
    }
}

impl CitationGraphBuilder {
    pub fn new(chain_config: ChainConfig) -> Self {
        Self { chain_config }
    }

    fn build_adjacency(
        &self,
        citations: &[Citation],
    ) -> (
        HashMap<String, Vec<Citation>>,
        HashMap<String, Vec<Citation>>,
    ) {
        let mut forward: HashMap<String, Vec<Citation>> = HashMap::new();
        let mut reverse: HashMap<String, Vec<Citation>> = HashMap::new();

        for citation in citations {
            forward
                .entry(citation.source_id.clone())
                .or_default()
                .push(citation.clone());
            reverse
                .entry(citation.target_id.clone())
                .or_default()
                .push(citation.clone());
        }

        (forward, reverse)
    }

    fn build_chain(
        &self,
        root: &str,
        targets: &HashMap<String, Vec<String>>,
        snapshots: &HashMap<&str, SectionSnapshot>,
    ) -> CitationChain {
        let cfg = &self.chain_config;
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root.to_string());

        // chain_sections[0] is always the root (spec.md §8 "Chain
        // containment"); max_size bounds this vec's total length, root
        // included, not just the neighbor count.
        let mut chain_sections = vec![root.to_string()];
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((root.to_string(), 0));
        let mut references_count = 0usize;

        while let Some((node, dist)) = queue.pop_front() {
            if chain_sections.len() >= cfg.max_size {
                break;
            }
            let Some(neighbors) = targets.get(&node) else {
                continue;
            };
            references_count += neighbors.len();

            let mut added = 0usize;
            for neighbor in neighbors {
                if added >= cfg.k {
                    break;
                }
                if visited.contains(neighbor) {
                    continue;
                }
                if chain_sections.len() >= cfg.max_size {
                    break;
                }
                visited.insert(neighbor.clone());
                chain_sections.push(neighbor.clone());
                queue.push_back((neighbor.clone(), dist + 1));
                added += 1;
            }
        }

        let is_complex = chain_sections.len() >= cfg.complex_threshold;
        let chain_depth = chain_sections.len();

        let complete_chain = chain_sections
            .iter()
            .filter_map(|id| snapshots.get(id.as_str()).cloned())
            .collect();

        CitationChain {
            chain_id: root.to_string(),
            primary_section: root.to_string(),
            chain_sections,
            chain_depth,
            references_count,
            is_complex,
            complete_chain,
        }
    }
}

impl lex_core::GraphBuilder for CitationGraphBuilder {
    fn build(
        &self,
        sections: &[Section],
        citations: &[Citation],
    ) -> LexResult<(
        Vec<(String, OutboundCitations)>,
        Vec<(String, InboundCitations)>,
        Vec<CitationChain>,
    )> {
        let (forward, reverse) = self.build_adjacency(citations);

        let mut outbound = Vec::with_capacity(sections.len());
        for section in sections {
            let details = forward.get(&section.id).cloned().unwrap_or_default();
            let mut direct_references = Vec::new();
            let mut seen = HashSet::new();
            for citation in &details {
                if seen.insert(citation.target_id.clone()) {
                    direct_references.push(citation.target_id.clone());
                }
            }
            outbound.push((
                section.id.clone(),
                OutboundCitations {
                    reference_count: direct_references.len(),
                    direct_references,
                    references_details: details,
                },
            ));
        }

        let mut inbound = Vec::with_capacity(sections.len());
        for section in sections {
            let mut details = reverse.get(&section.id).cloned().unwrap_or_default();
            // Sorted by source id at write time for determinism (spec.md
            // §5), so a resumed/rebuilt store is bytewise-identical to an
            // uninterrupted run.
            details.sort_by(|a, b| a.source_id.cmp(&b.source_id));
            let mut cited_by = Vec::new();
            let mut seen = HashSet::new();
            for citation in &details {
                if seen.insert(citation.source_id.clone()) {
                    cited_by.push(citation.source_id.clone());
                }
            }
            inbound.push((
                section.id.clone(),
                InboundCitations {
                    cited_by_count: cited_by.len(),
                    cited_by,
                    citing_details: details,
                },
            ));
        }

        let target_lists: HashMap<String, Vec<String>> = outbound
            .iter()
            .map(|(id, oc)| (id.clone(), oc.direct_references.clone()))
            .collect();

        let snapshots: HashMap<&str, SectionSnapshot> = sections
            .iter()
            .map(|s| {
                (
                    s.id.as_str(),
                    SectionSnapshot {
                        id: s.id.clone(),
                        title: s.title.clone(),
                        url: s.source_url.clone(),
                        url_hash: s.source_hash.clone(),
                        full_text: s.text.clone(),
                        word_count: s.word_count,
                    },
                )
            })
            .collect();

        let mut chains = Vec::new();
        for (id, oc) in &outbound {
            if oc.reference_count == 0 {
                continue;
            }
            chains.push(self.build_chain(id, &target_lists, &snapshots));
        }

        Ok((outbound, inbound, chains))
    }
}

/// Recomputes `is_clickable`, `has_outbound_citations`,
/// `has_inbound_citations` and `in_complex_chain` on every section from a
/// built graph. These booleans are always derived, never hand-set.
pub fn apply_derived_flags(
    sections: &mut [Section],
    outbound: &[(String, OutboundCitations)],
    inbound: &[(String, InboundCitations)],
    chains: &[CitationChain],
) {
    let outbound_index: HashMap<&str, &OutboundCitations> =
        outbound.iter().map(|(id, oc)| (id.as_str(), oc)).collect();
    let inbound_index: HashMap<&str, &InboundCitations> =
        inbound.iter().map(|(id, ic)| (id.as_str(), ic)).collect();
    let complex_sections: HashSet<&str> = chains
        .iter()
        .filter(|chain| chain.is_complex)
        .flat_map(|chain| chain.chain_sections.iter().map(|s| s.as_str()))
        .collect();

    for section in sections.iter_mut() {
        let has_out = outbound_index
            .get(section.id.as_str())
            .map(|oc| oc.reference_count > 0)
            .unwrap_or(false);
        let has_in = inbound_index
            .get(section.id.as_str())
            .map(|ic| ic.cited_by_count > 0)
            .unwrap_or(false);

        section.has_outbound_citations = has_out;
        section.has_inbound_citations = has_in;
        section.is_clickable = has_out || has_in;
        section.in_complex_chain = complex_sections.contains(section.id.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::{Citation, CitationRelationship, Corpus, GraphBuilder as _};

    fn citation(source: &str, target: &str) -> Citation {
        Citation {
            source_id: source.to_string(),
            target_id: target.to_string(),
            relationship: CitationRelationship::CrossReference,
            context: String::new(),
            position: 0,
        }
    }

    fn section(id: &str) -> Section {
        Section::new(id.to_string(), Corpus::Statute, String::new(), String::new())
    }

    #[test]
    fn reverse_adjacency_mirrors_forward() {
        let builder = CitationGraphBuilder::default();
        let sections = vec![section("a"), section("b")];
        let citations = vec![citation("a", "b")];
        let (outbound, inbound, _) = builder.build(&sections, &citations).unwrap();

        let a_out = &outbound.iter().find(|(id, _)| id == "a").unwrap().1;
        assert_eq!(a_out.direct_references, vec!["b".to_string()]);

        let b_in = &inbound.iter().find(|(id, _)| id == "b").unwrap().1;
        assert_eq!(b_in.cited_by, vec!["a".to_string()]);
    }

    #[test]
    fn chain_caps_at_max_size() {
        let builder = CitationGraphBuilder::new(ChainConfig {
            k: 3,
            max_size: 8,
            complex_threshold: 4,
        });
        let sections: Vec<Section> = (0..20).map(|i| section(&format!("s{i}"))).collect();
        // s0 cites s1..s19, a wide fan-out that should be capped at 8.
        let citations: Vec<Citation> = (1..20).map(|i| citation("s0", &format!("s{i}"))).collect();
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "s0").unwrap();
        assert!(chain.chain_sections.len() <= 8);
    }

    #[test]
    fn chain_respects_k_unvisited_targets_per_pop() {
        let builder = CitationGraphBuilder::default();
        let sections: Vec<Section> = (0..6).map(|i| section(&format!("s{i}"))).collect();
        let citations = vec![
            citation("s0", "s1"),
            citation("s0", "s2"),
            citation("s0", "s3"),
            citation("s0", "s4"), // 4th target from s0, beyond k=3, not added this pop
        ];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "s0").unwrap();
        // root + 3 unvisited targets (k=3); the 4th is dropped this pop.
        assert_eq!(chain.chain_sections, vec!["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn cycles_are_suppressed_by_global_visited_set() {
        let builder = CitationGraphBuilder::default();
        let sections = vec![section("a"), section("b")];
        let citations = vec![citation("a", "b"), citation("b", "a")];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "a").unwrap();
        // "a" is chain_sections[0] (the root) and must never reappear
        // despite the cycle back from "b".
        assert_eq!(chain.chain_sections[0], "a");
        assert_eq!(chain.chain_sections.iter().filter(|s| *s == "a").count(), 1);
    }

    #[test]
    fn chain_sections_starts_with_root() {
        let builder = CitationGraphBuilder::default();
        let sections = vec![section("a"), section("b")];
        let citations = vec![citation("a", "b")];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "a").unwrap();
        assert_eq!(chain.chain_sections[0], "a");
        assert_eq!(chain.chain_depth, chain.chain_sections.len());
    }

    #[test]
    fn below_complex_threshold_is_not_complex() {
        let builder = CitationGraphBuilder::default();
        let sections: Vec<Section> = (0..3).map(|i| section(&format!("s{i}"))).collect();
        let citations = vec![citation("s0", "s1"), citation("s0", "s2")];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "s0").unwrap();
        assert_eq!(chain.chain_sections.len(), 3); // root + 2 targets
        assert!(!chain.is_complex);
    }

    #[test]
    fn complex_threshold_is_four_entries_root_included() {
        let builder = CitationGraphBuilder::default();
        let sections: Vec<Section> = (0..5).map(|i| section(&format!("s{i}"))).collect();
        let citations = vec![
            citation("s0", "s1"),
            citation("s0", "s2"),
            citation("s0", "s3"),
        ];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "s0").unwrap();
        assert_eq!(chain.chain_sections.len(), 4); // root + 3 targets
        assert!(chain.is_complex);
    }

    #[test]
    fn scenario_4_chain_construction_with_cap() {
        // spec.md Scenario 4: forward map {A:[B,C], B:[D,E], C:[F],
        // D:[G,H], E:[], F:[I], G:[], H:[], I:[]}, max_size=8, k=3.
        // Chain for A is [A,B,C,D,E,F,G,H] — I never gets in.
        let builder = CitationGraphBuilder::new(ChainConfig {
            k: 3,
            max_size: 8,
            complex_threshold: 4,
        });
        let sections: Vec<Section> = ["A", "B", "C", "D", "E", "F", "G", "H", "I"]
            .iter()
            .map(|id| section(id))
            .collect();
        let citations = vec![
            citation("A", "B"),
            citation("A", "C"),
            citation("B", "D"),
            citation("B", "E"),
            citation("C", "F"),
            citation("D", "G"),
            citation("D", "H"),
            citation("F", "I"),
        ];
        let (_, _, chains) = builder.build(&sections, &citations).unwrap();
        let chain = chains.iter().find(|c| c.primary_section == "A").unwrap();
        assert_eq!(
            chain.chain_sections,
            vec!["A", "B", "C", "D", "E", "F", "G", "H"]
        );
        assert_eq!(chain.chain_depth, 8);
        assert!(chain.is_complex);
    }

    #[test]
    fn derived_flags_mark_clickable_and_complex_sections() {
        let mut sections = vec![section("a"), section("b"), section("c")];
        let builder = CitationGraphBuilder::default();
        let citations = vec![citation("a", "b")];
        let (outbound, inbound, chains) = builder.build(&sections, &citations).unwrap();
        apply_derived_flags(&mut sections, &outbound, &inbound, &chains);

        assert!(sections[0].is_clickable); // a: has outbound
        assert!(sections[1].is_clickable); // b: has inbound
        assert!(!sections[2].is_clickable); // c: isolated
    }
}
