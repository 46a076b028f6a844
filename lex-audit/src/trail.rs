use lex_core::{Corpus, LexError, LexResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable checkpoint record (spec.md §4.7). Written every `C` sections
/// (default 10,000) and on graceful shutdown, via temp-file + rename so a
/// reader never observes a half-written file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub corpus: Corpus,
    pub input_path: String,
    pub input_len: u64,
    pub total_processed: u64,
    pub last_line: u64,
    pub last_processed_id: String,
    pub sections_written: u64,
    pub processed_ids: HashSet<String>,
    pub start_time: String,
    pub checkpoint_time: String,
}

impl ProgressRecord {
    pub fn new(corpus: Corpus, input_path: String, input_len: u64, start_time: String) -> Self {
        Self {
            corpus,
            input_path,
            input_len,
            total_processed: 0,
            last_line: 0,
            last_processed_id: String::new(),
            sections_written: 0,
            processed_ids: HashSet::new(),
            start_time: start_time.clone(),
            checkpoint_time: start_time,
        }
    }

    /// True when this record was built against the same input this run is
    /// (re)ingesting — spec.md §4.7's resume precondition, extended with a
    /// byte-length identity check so a same-named but different input
    /// never silently resumes (SPEC_FULL.md §4.7 Open Question).
    pub fn identity_matches(&self, corpus: Corpus, input_path: &str, input_len: u64) -> bool {
        self.corpus == corpus && self.input_path == input_path && self.input_len == input_len
    }

    pub fn mark_processed(&mut self, id: &str, line: u64, now: &str) {
        self.processed_ids.insert(id.to_string());
        self.total_processed += 1;
        self.last_line = line;
        self.last_processed_id = id.to_string();
        self.checkpoint_time = now.to_string();
    }

    pub fn already_processed(&self, id: &str) -> bool {
        self.processed_ids.contains(id)
    }
}

fn progress_path(out_dir: &Path) -> PathBuf {
    out_dir.join("build_progress.json")
}

fn backup_path(out_dir: &Path) -> PathBuf {
    out_dir.join("build_progress.json.backup")
}

/// Loads the progress file at `<out>/build_progress.json`. A corrupt file
/// is renamed to `.backup` and an error is returned so the caller can log
/// it and start fresh, per spec.md §7's `CorruptProgress` policy.
pub fn load_progress(out_dir: &Path) -> LexResult<Option<ProgressRecord>> {
    let path = progress_path(out_dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    match serde_json::from_str(&contents) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            tracing::warn!(error = %err, "progress file corrupt, renaming to .backup and starting fresh");
            fs::rename(&path, backup_path(out_dir))?;
            Err(LexError::CorruptProgress {
                reason: err.to_string(),
            })
        }
    }
}

/// Writes `record` atomically: serialize to a sibling temp file, then
/// rename over the real path. `rename` within the same directory is
/// atomic, so a reader of `build_progress.json` never observes a partial
/// write even if the process is killed mid-save.
pub fn save_progress(out_dir: &Path, record: &ProgressRecord) -> LexResult<()> {
    fs::create_dir_all(out_dir)?;
    let path = progress_path(out_dir);
    let tmp_path = out_dir.join("build_progress.json.tmp");
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// Removes the progress file on clean completion (spec.md Scenario 5).
pub fn clear_progress(out_dir: &Path) -> LexResult<()> {
    let path = progress_path(out_dir);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_atomic_write() {
        let dir = tempdir().unwrap();
        let mut record = ProgressRecord::new(Corpus::Statute, "in.jsonl".to_string(), 100, "t0".to_string());
        record.mark_processed("orc:1.01", 1, "t1");
        save_progress(dir.path(), &record).unwrap();

        let loaded = load_progress(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.total_processed, 1);
        assert!(loaded.already_processed("orc:1.01"));
    }

    #[test]
    fn missing_file_returns_none() {
        let dir = tempdir().unwrap();
        assert!(load_progress(dir.path()).unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_renamed_to_backup() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(progress_path(dir.path()), "{not json").unwrap();

        let result = load_progress(dir.path());
        assert!(result.is_err());
        assert!(backup_path(dir.path()).exists());
        assert!(!progress_path(dir.path()).exists());
    }

    #[test]
    fn identity_check_rejects_different_input() {
        let record = ProgressRecord::new(Corpus::Statute, "in.jsonl".to_string(), 100, "t0".to_string());
        assert!(record.identity_matches(Corpus::Statute, "in.jsonl", 100));
        assert!(!record.identity_matches(Corpus::Statute, "in.jsonl", 101));
        assert!(!record.identity_matches(Corpus::Admin, "in.jsonl", 100));
    }

    #[test]
    fn clear_progress_removes_file() {
        let dir = tempdir().unwrap();
        let record = ProgressRecord::new(Corpus::Statute, "in.jsonl".to_string(), 1, "t".to_string());
        save_progress(dir.path(), &record).unwrap();
        clear_progress(dir.path()).unwrap();
        assert!(load_progress(dir.path()).unwrap().is_none());
    }
}
