use lex_audit::IntegrityChecker;
use lex_core::LexResult;
use lex_store::SectionKvStore;

use crate::cli::VerifyArgs;

/// Result of a `verify` run: empty `violations` means the store is
/// internally consistent (spec.md §8's testable invariants all hold).
pub struct VerifyReport {
    pub checked: String,
    pub violations: Vec<lex_audit::Violation>,
}

pub fn run_verify(args: VerifyArgs) -> LexResult<VerifyReport> {
    let store = SectionKvStore::open(&args.dir.join("store.redb"))?;
    let violations = IntegrityChecker::new(&store).check_all()?;
    Ok(VerifyReport {
        checked: args.dir.display().to_string(),
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::{Corpus, Section, SectionStore};
    use tempfile::tempdir;

    #[test]
    fn clean_store_reports_no_violations() {
        let dir = tempdir().unwrap();
        {
            let mut store = SectionKvStore::open(&dir.path().join("store.redb")).unwrap();
            let section = Section::new("orc:1.01".to_string(), Corpus::Statute, "T".to_string(), "a".to_string());
            store.write_batch(&[section], &[], &[], &[]).unwrap();
        }
        let report = run_verify(VerifyArgs { dir: dir.path().to_path_buf() }).unwrap();
        assert!(report.violations.is_empty());
    }

    #[test]
    fn inconsistent_store_reports_a_violation() {
        let dir = tempdir().unwrap();
        {
            let mut store = SectionKvStore::open(&dir.path().join("store.redb")).unwrap();
            let mut section = Section::new("orc:1.01".to_string(), Corpus::Statute, "T".to_string(), "a".to_string());
            section.is_clickable = true;
            store.write_batch(&[section], &[], &[], &[]).unwrap();
        }
        let report = run_verify(VerifyArgs { dir: dir.path().to_path_buf() }).unwrap();
        assert!(!report.violations.is_empty());
    }
}
