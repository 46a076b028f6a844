use redb::TableDefinition;

/// Current on-disk store format. Bumped whenever the JSON value shapes
/// written into the five tables change in a way old readers can't parse.
/// Checked against `VERSION_TABLE` on open; mismatch is `IncompatibleStore`
/// (spec.md §7), not a silent upgrade — rebuild is the migration path
/// (spec.md §1 Non-goals: "no schema evolution in place").
pub const STORE_VERSION: &str = "1";

/// Canonical id -> JSON-encoded `Section` (includes enrichment).
pub const SECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("primary");

/// Canonical id -> JSON-encoded `OutboundCitations`.
pub const CITATIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("citations");

/// Canonical id -> JSON-encoded `InboundCitations`.
pub const REVERSE_CITATIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("reverse_citations");

/// Chain id (the root section's canonical id) -> JSON-encoded `CitationChain`.
pub const CHAINS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("chains");

/// Key -> JSON value, used for three kinds of entries (spec.md §4.6):
/// `corpus_info` (one `CorpusMetadata` per corpus, keyed
/// `corpus_info:<tag>`), `section_<id>_meta`, and `inbound_count_<id>`.
pub const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

/// Single-row table holding the store format version, so an old binary
/// opening a new store (or vice versa) fails fast with `IncompatibleStore`
/// instead of misreading JSON.
pub const VERSION_TABLE: TableDefinition<&str, &str> = TableDefinition::new("__version");

pub const VERSION_KEY: &str = "version";

pub fn corpus_info_key(tag: &str) -> String {
    format!("corpus_info:{tag}")
}

pub fn section_meta_key(id: &str) -> String {
    format!("section_{id}_meta")
}

pub fn inbound_count_key(id: &str) -> String {
    format!("inbound_count_{id}")
}
