pub mod schema;
pub mod store;

pub use schema::*;
pub use store::{summarize_corpus, SectionKvStore, TableCounts};
