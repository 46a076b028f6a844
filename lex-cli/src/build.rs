use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::sync::Arc;

use chrono::Utc;
use lex_audit::{clear_progress, load_progress, save_progress, ProgressRecord, ShutdownSignal};
use lex_core::{Citation, Corpus, GraphBuilder, LexResult, Section, SectionStore};
use lex_extract::{corpus_enricher, extract_citations};
use lex_graph::{apply_derived_flags, CitationGraphBuilder};
use lex_ingest::{section_from_record, RecordReader};
use lex_store::{summarize_corpus, SectionKvStore};

use crate::cli::BuildArgs;
use crate::config::IngestConfig;

/// Final counts printed after a `build` run, whether it finished clean or
/// was interrupted (in which case `run_build` still returns this before
/// the caller maps `LexError::Interrupted` to exit code 3).
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub total_sections: usize,
    pub new_sections: usize,
    pub lines_skipped_malformed: u64,
    pub sections_skipped_malformed_header: u64,
    pub complex_chains: usize,
    pub interrupted: bool,
}

/// Runs the full C1-C7 ingest pipeline for one corpus file.
///
/// Resume merges whatever is already in the store for this corpus with
/// newly read sections, then rebuilds the citation graph over the entire
/// merged set on every flush — spec.md's reverse adjacency and chain
/// invariants hold over the whole corpus, not a single batch, so there is
/// no cheaper correct alternative to a full rebuild per flush.
pub fn run_build(args: BuildArgs) -> LexResult<BuildSummary> {
    let corpus = args.corpus;
    let cfg = IngestConfig::from_args(&args);

    fs::create_dir_all(&args.out)?;
    let input_len = fs::metadata(&args.input)?.len();
    let input_path = fs::canonicalize(&args.input)?.to_string_lossy().into_owned();

    let mut store = SectionKvStore::open(&args.out.join("store.redb"))?;
    let signal = ShutdownSignal::install().unwrap_or_else(|err| {
        tracing::warn!(%err, "could not install signal handler; Ctrl-C will not checkpoint");
        ShutdownSignal::inert()
    });

    let now = Utc::now().to_rfc3339();
    let mut progress = resolve_progress(&args, corpus, &input_path, input_len, &now)?;

    let mut sections: Vec<Section> = store
        .all_sections()?
        .into_iter()
        .filter(|section| section.corpus == corpus)
        .collect();
    let existing_ids: std::collections::HashSet<String> =
        sections.iter().map(|s| s.id.clone()).collect();
    let mut citations: Vec<Citation> = store
        .all_citations()?
        .into_iter()
        .filter(|(id, _)| existing_ids.contains(id))
        .flat_map(|(_, outbound)| outbound.references_details)
        .collect();
    let new_sections_at_start = sections.len();

    let graph_builder = CitationGraphBuilder::new(cfg.chain.clone());

    let file = File::open(&args.input)?;
    let mut reader = RecordReader::new(BufReader::new(file));
    while reader.stats.total_lines < progress.last_line {
        if reader.next().is_none() {
            break;
        }
    }

    let mut sections_skipped_malformed_header = 0u64;
    let mut since_flush = 0usize;
    let mut interrupted = false;
    let mut last_meta = None;

    loop {
        if signal.requested() {
            interrupted = true;
            break;
        }
        let record = match reader.next() {
            None => break,
            Some(Ok(record)) => record,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "skipping malformed line");
                continue;
            }
        };
        let line = reader.stats.total_lines;
        let section = match section_from_record(corpus, record, line, &now) {
            Ok(section) => section,
            Err(err) => {
                sections_skipped_malformed_header += 1;
                tracing::warn!(error = %err, line, "skipping malformed header");
                continue;
            }
        };
        if existing_ids.contains(&section.id) || progress.already_processed(&section.id) {
            continue;
        }

        citations.extend(extract_citations(&section, &cfg.range_expansion));
        progress.mark_processed(&section.id, line, &now);
        sections.push(section);
        since_flush += 1;

        if since_flush >= cfg.flush_threshold() {
            last_meta = Some(flush(corpus, &cfg, &graph_builder, &mut sections, &citations, &mut store)?);
            save_progress(&args.out, &progress)?;
            since_flush = 0;
        }
    }

    if since_flush > 0 || last_meta.is_none() {
        last_meta = Some(flush(corpus, &cfg, &graph_builder, &mut sections, &citations, &mut store)?);
    }
    progress.checkpoint_time = Utc::now().to_rfc3339();
    save_progress(&args.out, &progress)?;

    let complex_chains = last_meta.map(|m| m.complex_chains).unwrap_or(0);
    let summary = BuildSummary {
        total_sections: sections.len(),
        new_sections: sections.len() - new_sections_at_start,
        lines_skipped_malformed: reader.stats.lines_skipped_malformed,
        sections_skipped_malformed_header,
        complex_chains,
        interrupted,
    };

    if interrupted {
        return Err(lex_core::LexError::Interrupted {
            processed: summary.total_sections as u64,
        });
    }
    clear_progress(&args.out)?;
    Ok(summary)
}

fn resolve_progress(
    args: &BuildArgs,
    corpus: Corpus,
    input_path: &str,
    input_len: u64,
    now: &str,
) -> LexResult<ProgressRecord> {
    if !args.resume {
        return Ok(ProgressRecord::new(corpus, input_path.to_string(), input_len, now.to_string()));
    }
    match load_progress(&args.out) {
        Ok(Some(record)) if record.identity_matches(corpus, input_path, input_len) => {
            tracing::info!(last_line = record.last_line, "resuming from checkpoint");
            Ok(record)
        }
        Ok(Some(_)) => {
            tracing::warn!("checkpoint identity mismatch; starting a fresh build");
            Ok(ProgressRecord::new(corpus, input_path.to_string(), input_len, now.to_string()))
        }
        Ok(None) => Ok(ProgressRecord::new(corpus, input_path.to_string(), input_len, now.to_string())),
        Err(_) => Ok(ProgressRecord::new(corpus, input_path.to_string(), input_len, now.to_string())),
    }
}

fn flush(
    corpus: Corpus,
    cfg: &IngestConfig,
    graph_builder: &CitationGraphBuilder,
    sections: &mut [Section],
    citations: &[Citation],
    store: &mut SectionKvStore,
) -> LexResult<lex_core::CorpusMetadata> {
    if cfg.enrich {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for citation in citations {
            *counts.entry(citation.source_id.clone()).or_insert(0) += 1;
        }
        let counts = Arc::new(counts);
        let enricher = corpus_enricher(
            corpus,
            Box::new(move |id: &str| counts.get(id).copied().unwrap_or(0)),
        );
        for section in sections.iter_mut() {
            if section.enrichment.is_none() {
                section.enrichment = Some(enricher.enrich(section)?);
            }
        }
    }

    let (outbound, inbound, chains) = graph_builder.build(sections, citations)?;
    apply_derived_flags(sections, &outbound, &inbound, &chains);
    store.write_batch(sections, &outbound, &inbound, &chains)?;

    let meta = summarize_corpus(corpus, sections, citations, &chains);
    store.write_corpus_metadata(corpus, &meta)?;
    Ok(meta)
}
