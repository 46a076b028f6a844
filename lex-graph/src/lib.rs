pub mod builder;

pub use builder::{apply_derived_flags, ChainConfig, CitationGraphBuilder};