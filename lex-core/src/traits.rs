use crate::{
    Citation, CitationChain, Corpus, CorpusMetadata, Enrichment, InboundCitations, LexResult,
    OutboundCitations, Section,
};

/// Implemented by the KV writer (C6) and relied on by the retriever (C8).
/// A single `write_batch` call commits all five tables' changes together.
pub trait SectionStore {
    fn write_batch(
        &mut self,
        sections: &[Section],
        outbound: &[(String, OutboundCitations)],
        inbound: &[(String, InboundCitations)],
        chains: &[CitationChain],
    ) -> LexResult<()>;

    fn get_section(&self, id: &str) -> LexResult<Option<Section>>;
    fn get_outbound(&self, id: &str) -> LexResult<Option<OutboundCitations>>;
    fn get_inbound(&self, id: &str) -> LexResult<Option<InboundCitations>>;
    fn get_chain(&self, chain_id: &str) -> LexResult<Option<CitationChain>>;
    fn get_metadata(&self, corpus: Corpus) -> LexResult<Option<CorpusMetadata>>;
}

/// Implemented by C3: turns a section's raw text into the citations it
/// emits, using the corpus's ordered grammar table.
pub trait CitationExtractor {
    fn extract(&self, section: &Section) -> LexResult<Vec<Citation>>;
}

/// Implemented by C4: derives the corpus-specific Enrichment for a section.
pub trait Enricher {
    fn enrich(&self, section: &Section) -> LexResult<Enrichment>;
}

/// Implemented by C5: builds forward/reverse adjacency and bounded
/// transitive chains from a flat citation list.
pub trait GraphBuilder {
    fn build(
        &self,
        sections: &[Section],
        citations: &[Citation],
    ) -> LexResult<(
        Vec<(String, OutboundCitations)>,
        Vec<(String, InboundCitations)>,
        Vec<CitationChain>,
    )>;
}

#[cfg(test)]
mod tests {
    // Trait objects are exercised by their implementations in lex-extract,
    // lex-graph and lex-store; nothing to unit test here beyond compiling.
}
