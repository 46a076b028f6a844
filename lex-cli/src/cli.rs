use clap::{Parser, Subcommand};
use lex_core::Corpus;
use std::path::PathBuf;

/// Parses the `<corpus>` positional argument against the four tags
/// spec.md §3 defines (`statute|admin|constitution|case_law`).
fn parse_corpus(raw: &str) -> Result<Corpus, String> {
    Corpus::from_str_name(raw)
        .ok_or_else(|| format!("unknown corpus '{raw}' (expected statute|admin|constitution|case_law)"))
}

#[derive(Parser)]
#[command(name = "lex-cli")]
#[command(about = "Ingests Ohio legal corpora into a citation-graph KV store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Raises the tracing verbosity one notch above LOG_LEVEL.
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingests one corpus file into the KV store (C1-C7).
    Build(BuildArgs),
    /// Dumps rows from one of the five KV tables (diagnostic, C8).
    Inspect(InspectArgs),
    /// Checks a built store against spec.md §8's testable invariants.
    Verify(VerifyArgs),
    /// Linear-scan keyword search over the primary table (diagnostic, C8).
    Search(SearchArgs),
    /// Prints the composed LLM context bundle for one section id (diagnostic, C8).
    Context(ContextArgs),
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// One of statute, admin, constitution, case_law.
    #[arg(value_parser = parse_corpus)]
    pub corpus: Corpus,

    /// Line-delimited JSON input file for this corpus.
    #[arg(long)]
    pub input: PathBuf,

    /// Output directory holding the KV store and progress file.
    #[arg(long)]
    pub out: PathBuf,

    /// Resumes from `<out>/build_progress.json` if its identity matches.
    #[arg(long)]
    pub resume: bool,

    #[arg(long, action = clap::ArgAction::SetTrue, default_value_t = true, overrides_with = "no_enrich")]
    pub enrich: bool,

    #[arg(long = "no-enrich", action = clap::ArgAction::SetTrue, overrides_with = "enrich")]
    pub no_enrich: bool,

    /// Sections read from the input between full graph rebuild-and-writes.
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,

    /// Upper bound, in sections, on how long progress can go unsaved.
    #[arg(long, default_value_t = 1000)]
    pub checkpoint_interval: usize,

    /// Max chapter-number gap the range-expansion grammar will bridge (spec.md §4.3).
    #[arg(long, default_value_t = 20)]
    pub range_expansion_threshold: u32,

    /// Minimum chain depth written to the `chains` table (spec.md §4.5).
    #[arg(long, default_value_t = 4)]
    pub complex_chain_threshold: usize,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Directory holding the KV store.
    pub dir: PathBuf,

    #[arg(long, default_value = "primary")]
    pub table: String,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Looks up one key directly instead of listing `--limit` rows.
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Directory holding the KV store.
    pub dir: PathBuf,
}

#[derive(clap::Args)]
pub struct SearchArgs {
    /// Directory holding the KV store.
    pub dir: PathBuf,
    pub keyword: String,
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(clap::Args)]
pub struct ContextArgs {
    /// Directory holding the KV store.
    pub dir: PathBuf,
    pub id: String,
    #[arg(long)]
    pub chain: bool,
    #[arg(long)]
    pub reverse: bool,
    #[arg(long, default_value_t = 8)]
    pub max_chain_depth: usize,
}
