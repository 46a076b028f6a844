pub mod build;
pub mod cli;
pub mod config;
pub mod inspect;
pub mod query_commands;
pub mod utils;
pub mod verify;

pub use build::{run_build, BuildSummary};
pub use cli::*;
pub use config::IngestConfig;
pub use inspect::run_inspect;
pub use query_commands::{run_context, run_search};
pub use utils::*;
pub use verify::{run_verify, VerifyReport};
