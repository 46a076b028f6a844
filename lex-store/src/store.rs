use crate::schema::{
    corpus_info_key, inbound_count_key, section_meta_key, CHAINS_TABLE, CITATIONS_TABLE,
    METADATA_TABLE, REVERSE_CITATIONS_TABLE, SECTIONS_TABLE, STORE_VERSION, VERSION_KEY,
    VERSION_TABLE,
};
use lex_core::{
    Citation, CitationChain, Corpus, CorpusMetadata, InboundCitations, LexError, LexResult,
    OutboundCitations, Section, SectionStore,
};
use redb::{Database, ReadableTable};
use std::path::Path;

fn store_io(operation: &str) -> impl Fn(redb::Error) -> LexError + '_ {
    move |err| LexError::StoreIo {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

/// Counts surfaced by the `inspect` CLI subcommand (spec.md §6), one per
/// logical table.
#[derive(Debug, Clone, Default)]
pub struct TableCounts {
    pub sections: u64,
    pub citations: u64,
    pub reverse_citations: u64,
    pub chains: u64,
    pub metadata_entries: u64,
}

/// The five coordinated KV tables (C6), backed by one redb `Database`
/// file so a batch's writes across all five tables commit inside a
/// single redb write transaction — true cross-table atomicity, the
/// "preferred alternative" spec.md §4.6 allows for engines that support
/// multi-table transactions.
pub struct SectionKvStore {
    db: Database,
}

impl SectionKvStore {
    /// Opens (creating if absent) the store at `path`, stamping or
    /// checking the format version. redb grows its backing file on
    /// demand, so unlike LMDB there is no map-size to provision up
    /// front; a full disk surfaces as `StoreIo`, not `StoreFull`
    /// (documented in DESIGN.md).
    pub fn open(path: &Path) -> LexResult<Self> {
        let existed = path.exists();
        let db = Database::create(path).map_err(|err| LexError::StoreIo {
            operation: "open".to_string(),
            reason: err.to_string(),
        })?;
        let store = Self { db };
        if existed {
            store.check_version()?;
        } else {
            store.stamp_version()?;
        }
        Ok(store)
    }

    fn stamp_version(&self) -> LexResult<()> {
        let txn = self.db.begin_write().map_err(store_io("begin_write"))?;
        {
            let mut table = txn.open_table(VERSION_TABLE).map_err(store_io("open_table"))?;
            table
                .insert(VERSION_KEY, STORE_VERSION)
                .map_err(store_io("insert"))?;
        }
        txn.commit().map_err(store_io("commit"))?;
        Ok(())
    }

    fn check_version(&self) -> LexResult<()> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = match txn.open_table(VERSION_TABLE) {
            Ok(table) => table,
            // A pre-versioning store has no version table at all.
            Err(_) => {
                return Err(LexError::IncompatibleStore {
                    expected: STORE_VERSION.to_string(),
                    found: "unversioned".to_string(),
                })
            }
        };
        let found = table
            .get(VERSION_KEY)
            .map_err(store_io("get"))?
            .map(|v| v.value().to_string())
            .unwrap_or_else(|| "unversioned".to_string());
        if found != STORE_VERSION {
            return Err(LexError::IncompatibleStore {
                expected: STORE_VERSION.to_string(),
                found,
            });
        }
        Ok(())
    }

    pub fn write_corpus_metadata(&self, corpus: Corpus, meta: &CorpusMetadata) -> LexResult<()> {
        let bytes = serde_json::to_vec(meta)?;
        let txn = self.db.begin_write().map_err(store_io("begin_write"))?;
        {
            let mut table = txn.open_table(METADATA_TABLE).map_err(store_io("open_table"))?;
            table
                .insert(corpus_info_key(corpus.tag()).as_str(), bytes.as_slice())
                .map_err(store_io("insert"))?;
        }
        txn.commit().map_err(store_io("commit"))?;
        Ok(())
    }

    pub fn read_corpus_metadata(&self, corpus: Corpus) -> LexResult<Option<CorpusMetadata>> {
        self.get_metadata(corpus)
    }

    /// Every section id in the primary table, in storage (not insertion)
    /// order — used by `inspect`, `verify`, and C8's linear-scan
    /// diagnostics (`search_by_keyword`, `most_cited`).
    pub fn all_section_ids(&self) -> LexResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(SECTIONS_TABLE).map_err(store_io("open_table"))?;
        let mut ids = Vec::new();
        for entry in table.iter().map_err(store_io("iter"))? {
            let (key, _) = entry.map_err(store_io("iter"))?;
            ids.push(key.value().to_string());
        }
        Ok(ids)
    }

    pub fn all_sections(&self) -> LexResult<Vec<Section>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(SECTIONS_TABLE).map_err(store_io("open_table"))?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_io("iter"))? {
            let (_, value) = entry.map_err(store_io("iter"))?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    pub fn all_reverse_citations(&self) -> LexResult<Vec<(String, InboundCitations)>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn
            .open_table(REVERSE_CITATIONS_TABLE)
            .map_err(store_io("open_table"))?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_io("iter"))? {
            let (key, value) = entry.map_err(store_io("iter"))?;
            out.push((key.value().to_string(), serde_json::from_slice(value.value())?));
        }
        Ok(out)
    }

    pub fn all_citations(&self) -> LexResult<Vec<(String, OutboundCitations)>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(CITATIONS_TABLE).map_err(store_io("open_table"))?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_io("iter"))? {
            let (key, value) = entry.map_err(store_io("iter"))?;
            out.push((key.value().to_string(), serde_json::from_slice(value.value())?));
        }
        Ok(out)
    }

    pub fn table_counts(&self) -> LexResult<TableCounts> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let len_of = |def| -> LexResult<u64> {
            match txn.open_table(def) {
                Ok(table) => Ok(table.len().map_err(store_io("len"))?),
                Err(_) => Ok(0),
            }
        };
        Ok(TableCounts {
            sections: len_of(SECTIONS_TABLE)?,
            citations: len_of(CITATIONS_TABLE)?,
            reverse_citations: len_of(REVERSE_CITATIONS_TABLE)?,
            chains: len_of(CHAINS_TABLE)?,
            metadata_entries: len_of(METADATA_TABLE)?,
        })
    }

    pub fn get_metadata_raw(&self, key: &str) -> LexResult<Option<serde_json::Value>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = match txn.open_table(METADATA_TABLE) {
            Ok(table) => table,
            Err(_) => return Ok(None),
        };
        match table.get(key).map_err(store_io("get"))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn inbound_count(&self, id: &str) -> LexResult<usize> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = match txn.open_table(METADATA_TABLE) {
            Ok(table) => table,
            Err(_) => return Ok(0),
        };
        match table.get(inbound_count_key(id).as_str()).map_err(store_io("get"))? {
            Some(value) => {
                let v: serde_json::Value = serde_json::from_slice(value.value())?;
                Ok(v.as_u64().unwrap_or(0) as usize)
            }
            None => Ok(0),
        }
    }
}

impl SectionStore for SectionKvStore {
    fn write_batch(
        &mut self,
        sections: &[Section],
        outbound: &[(String, OutboundCitations)],
        inbound: &[(String, InboundCitations)],
        chains: &[CitationChain],
    ) -> LexResult<()> {
        let txn = self.db.begin_write().map_err(store_io("begin_write"))?;
        {
            let mut table = txn.open_table(SECTIONS_TABLE).map_err(store_io("open_table"))?;
            for section in sections {
                let bytes = serde_json::to_vec(section)?;
                table
                    .insert(section.id.as_str(), bytes.as_slice())
                    .map_err(store_io("insert"))?;
            }
        }
        {
            let mut table = txn.open_table(CITATIONS_TABLE).map_err(store_io("open_table"))?;
            for (id, oc) in outbound {
                let bytes = serde_json::to_vec(oc)?;
                table.insert(id.as_str(), bytes.as_slice()).map_err(store_io("insert"))?;
            }
        }
        {
            let mut table = txn
                .open_table(REVERSE_CITATIONS_TABLE)
                .map_err(store_io("open_table"))?;
            for (id, ic) in inbound {
                let bytes = serde_json::to_vec(ic)?;
                table.insert(id.as_str(), bytes.as_slice()).map_err(store_io("insert"))?;
            }
        }
        {
            let mut table = txn.open_table(CHAINS_TABLE).map_err(store_io("open_table"))?;
            for chain in chains.iter().filter(|c| c.is_complex) {
                let bytes = serde_json::to_vec(chain)?;
                table
                    .insert(chain.chain_id.as_str(), bytes.as_slice())
                    .map_err(store_io("insert"))?;
            }
        }
        {
            let mut table = txn.open_table(METADATA_TABLE).map_err(store_io("open_table"))?;
            for section in sections {
                let meta = serde_json::json!({
                    "corpus": section.corpus.as_str(),
                    "word_count": section.word_count,
                    "paragraph_count": section.paragraph_count,
                });
                let bytes = serde_json::to_vec(&meta)?;
                table
                    .insert(section_meta_key(&section.id).as_str(), bytes.as_slice())
                    .map_err(store_io("insert"))?;
            }
            for (id, ic) in inbound {
                let bytes = serde_json::to_vec(&serde_json::json!(ic.cited_by_count))?;
                table
                    .insert(inbound_count_key(id).as_str(), bytes.as_slice())
                    .map_err(store_io("insert"))?;
            }
        }
        txn.commit().map_err(store_io("commit"))?;
        Ok(())
    }

    fn get_section(&self, id: &str) -> LexResult<Option<Section>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(SECTIONS_TABLE).map_err(store_io("open_table"))?;
        match table.get(id).map_err(store_io("get"))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_outbound(&self, id: &str) -> LexResult<Option<OutboundCitations>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(CITATIONS_TABLE).map_err(store_io("open_table"))?;
        match table.get(id).map_err(store_io("get"))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_inbound(&self, id: &str) -> LexResult<Option<InboundCitations>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn
            .open_table(REVERSE_CITATIONS_TABLE)
            .map_err(store_io("open_table"))?;
        match table.get(id).map_err(store_io("get"))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_chain(&self, chain_id: &str) -> LexResult<Option<CitationChain>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = txn.open_table(CHAINS_TABLE).map_err(store_io("open_table"))?;
        match table.get(chain_id).map_err(store_io("get"))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_metadata(&self, corpus: Corpus) -> LexResult<Option<CorpusMetadata>> {
        let txn = self.db.begin_read().map_err(store_io("begin_read"))?;
        let table = match txn.open_table(METADATA_TABLE) {
            Ok(table) => table,
            Err(_) => return Ok(None),
        };
        match table
            .get(corpus_info_key(corpus.tag()).as_str())
            .map_err(store_io("get"))?
        {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

/// Recomputes `CorpusMetadata` totals from a freshly built in-memory
/// graph, before the batch is written. Used by the `build` command to
/// populate the `metadata` table's `corpus_info` entry.
pub fn summarize_corpus(
    corpus: Corpus,
    sections: &[Section],
    citations: &[Citation],
    chains: &[CitationChain],
) -> CorpusMetadata {
    CorpusMetadata {
        corpus: Some(corpus),
        total_sections: sections.len(),
        total_citations: citations.len(),
        clickable_sections: sections.iter().filter(|s| s.is_clickable).count(),
        sections_with_inbound: sections.iter().filter(|s| s.has_inbound_citations).count(),
        chains_built: chains.len(),
        complex_chains: chains.iter().filter(|c| c.is_complex).count(),
    }
}
