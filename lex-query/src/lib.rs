pub mod retriever;

pub use retriever::{CitationDetail, Context, RelatedSection, Retriever, SearchHit, Source};
