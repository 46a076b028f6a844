use lex_core::{Corpus, LexResult};
use lex_store::SectionKvStore;
use tabled::{Table, Tabled};

use crate::cli::InspectArgs;

#[derive(Tabled)]
struct Row {
    key: String,
    value: String,
}

const MAX_VALUE_CHARS: usize = 120;

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_VALUE_CHARS).collect();
        format!("{head}...")
    }
}

/// Dumps rows from one of the five logical tables, or looks up a single
/// key directly (`--key`), grounded in the Ohio scraper's own
/// `analyze_lmdb.py` inspection tool (SPEC_FULL.md §6).
pub fn run_inspect(args: InspectArgs) -> LexResult<String> {
    let store = SectionKvStore::open(&args.dir.join("store.redb"))?;

    if let Some(key) = &args.key {
        return Ok(match store.get_metadata_raw(key)? {
            Some(value) => serde_json::to_string_pretty(&value)?,
            None => format!("(no metadata entry for key '{key}')"),
        });
    }

    let rows = match args.table.as_str() {
        "primary" => section_rows(&store, args.limit)?,
        "citations" => citation_rows(&store, args.limit)?,
        "reverse_citations" => reverse_rows(&store, args.limit)?,
        "chains" => chain_rows(&store, args.limit)?,
        "metadata" => metadata_rows(&store, args.limit)?,
        other => {
            return Ok(format!(
                "unknown table '{other}' (expected primary|citations|reverse_citations|chains|metadata)"
            ))
        }
    };

    if rows.is_empty() {
        return Ok(format!("(table '{}' is empty)", args.table));
    }
    Ok(Table::new(rows).to_string())
}

fn section_rows(store: &SectionKvStore, limit: usize) -> LexResult<Vec<Row>> {
    let mut out = Vec::new();
    for id in store.all_section_ids()?.into_iter().take(limit) {
        if let Some(section) = store.get_section(&id)? {
            out.push(Row { key: id, value: truncate(&section.title) });
        }
    }
    Ok(out)
}

fn citation_rows(store: &SectionKvStore, limit: usize) -> LexResult<Vec<Row>> {
    Ok(store
        .all_citations()?
        .into_iter()
        .take(limit)
        .map(|(id, oc)| Row { key: id, value: truncate(&format!("{} direct reference(s)", oc.reference_count)) })
        .collect())
}

fn reverse_rows(store: &SectionKvStore, limit: usize) -> LexResult<Vec<Row>> {
    Ok(store
        .all_reverse_citations()?
        .into_iter()
        .take(limit)
        .map(|(id, ic)| Row { key: id, value: truncate(&format!("cited by {} section(s)", ic.cited_by_count)) })
        .collect())
}

fn chain_rows(store: &SectionKvStore, limit: usize) -> LexResult<Vec<Row>> {
    let mut out = Vec::new();
    for id in store.all_section_ids()?.into_iter().take(limit * 4) {
        if out.len() >= limit {
            break;
        }
        if let Some(chain) = store.get_chain(&id)? {
            out.push(Row {
                key: chain.chain_id.clone(),
                value: truncate(&format!("depth {} complex={}", chain.chain_depth, chain.is_complex)),
            });
        }
    }
    Ok(out)
}

fn metadata_rows(store: &SectionKvStore, limit: usize) -> LexResult<Vec<Row>> {
    let mut out = Vec::new();
    for corpus in [Corpus::Statute, Corpus::Admin, Corpus::Constitution, Corpus::CaseLaw] {
        if out.len() >= limit {
            break;
        }
        if let Some(meta) = store.read_corpus_metadata(corpus)? {
            out.push(Row {
                key: format!("corpus_info:{}", corpus.tag()),
                value: truncate(&format!(
                    "{} sections, {} citations, {} complex chains",
                    meta.total_sections, meta.total_citations, meta.complex_chains
                )),
            });
        }
    }
    Ok(out)
}
