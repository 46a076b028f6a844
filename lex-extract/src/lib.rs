pub mod constitution;
pub mod enrich;
pub mod grammars;

pub use enrich::corpus_enricher;
pub use grammars::{extract_citations, RangeExpansionConfig};
