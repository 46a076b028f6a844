use lex_extract::RangeExpansionConfig;
use lex_graph::ChainConfig;

use crate::cli::BuildArgs;

/// Resolved build-time parameters, built once from `BuildArgs` and passed
/// by value into the pipeline rather than read back out of clap types
/// (SPEC_FULL.md §5: "no global mutable state").
pub struct IngestConfig {
    pub enrich: bool,
    pub batch_size: usize,
    pub checkpoint_interval: usize,
    pub range_expansion: RangeExpansionConfig,
    pub chain: ChainConfig,
}

impl IngestConfig {
    pub fn from_args(args: &BuildArgs) -> Self {
        Self {
            enrich: args.enrich && !args.no_enrich,
            batch_size: args.batch_size.max(1),
            checkpoint_interval: args.checkpoint_interval.max(1),
            range_expansion: RangeExpansionConfig {
                max_gap: args.range_expansion_threshold,
                ..Default::default()
            },
            chain: ChainConfig {
                complex_threshold: args.complex_chain_threshold.max(1),
                ..Default::default()
            },
        }
    }

    /// The smaller of `--batch-size`/`--checkpoint-interval` decides how
    /// often the pipeline actually rebuilds the graph and flushes to disk
    /// — the two flags bound the same flush point from different angles
    /// (throughput vs. checkpoint freshness), so one counter serves both.
    pub fn flush_threshold(&self) -> usize {
        self.batch_size.min(self.checkpoint_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::Corpus;
    use std::path::PathBuf;

    fn sample_args() -> BuildArgs {
        BuildArgs {
            corpus: Corpus::Statute,
            input: PathBuf::from("in.jsonl"),
            out: PathBuf::from("out"),
            resume: false,
            enrich: true,
            no_enrich: false,
            batch_size: 10,
            checkpoint_interval: 3,
            range_expansion_threshold: 20,
            complex_chain_threshold: 4,
        }
    }

    #[test]
    fn flush_threshold_is_the_smaller_bound() {
        let cfg = IngestConfig::from_args(&sample_args());
        assert_eq!(cfg.flush_threshold(), 3);
    }

    #[test]
    fn no_enrich_overrides_enrich() {
        let mut args = sample_args();
        args.no_enrich = true;
        let cfg = IngestConfig::from_args(&args);
        assert!(!cfg.enrich);
    }
}
