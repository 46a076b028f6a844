use lex_core::LexResult;
use lex_query::{Retriever, SearchHit};
use lex_store::SectionKvStore;

use crate::cli::{ContextArgs, SearchArgs};

pub fn run_search(args: SearchArgs) -> LexResult<Vec<SearchHit>> {
    let store = SectionKvStore::open(&args.dir.join("store.redb"))?;
    Retriever::new(&store).search_by_keyword(&args.keyword, args.limit)
}

/// Prints the same human-readable bundle `lex-query::build_llm_context`
/// hands downstream LLM callers, plus raw reverse-citation counts when
/// `--reverse` is set (diagnostic surface over C8, SPEC_FULL.md §4.8).
pub fn run_context(args: ContextArgs) -> LexResult<Option<String>> {
    let store = SectionKvStore::open(&args.dir.join("store.redb"))?;
    let retriever = Retriever::new(&store);
    let Some(mut text) = retriever.build_llm_context(&args.id, args.chain, args.max_chain_depth)? else {
        return Ok(None);
    };
    if args.reverse {
        if let Some(reverse) = retriever.get_reverse(&args.id)? {
            text.push_str(&format!("\n## Citing sections\n{:?}\n", reverse.cited_by));
        }
    }
    Ok(Some(text))
}
