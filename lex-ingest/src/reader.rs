use lex_core::{LexError, LexResult};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// `court` sub-object of a case-law record (spec.md §6).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CourtInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_abbreviation: String,
}

/// One entry of a case-law record's `citations` array: an official
/// reporter citation string plus its type tag (e.g. `"official"`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReporterCitation {
    #[serde(default)]
    pub cite: String,
    #[serde(default, rename = "type")]
    pub citation_type: String,
}

/// One opinion within a case-law record's `casebody.opinions` array.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Opinion {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub opinion_type: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaseBody {
    #[serde(default)]
    pub opinions: Vec<Opinion>,
    #[serde(default)]
    pub judges: Vec<String>,
    #[serde(default)]
    pub parties: Vec<String>,
    #[serde(default)]
    pub attorneys: Vec<String>,
    #[serde(default)]
    pub head_matter: String,
}

/// One entry of a case-law record's `cites_to` array: an outbound
/// reference this opinion makes, not yet resolved to a stored id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CitesTo {
    #[serde(default)]
    pub cite: String,
    #[serde(default)]
    pub case_ids: Vec<i64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reporter: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisInfo {
    #[serde(default)]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub char_count: Option<usize>,
}

/// Fields specific to case-law records, flattened into `RawRecord` so one
/// reader handles both the `header`/`paragraphs` shape of the other three
/// corpora and the nested case-opinion shape (spec.md §6) without a
/// second parse pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaseLawFields {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub decision_date: String,
    #[serde(default)]
    pub docket_number: String,
    #[serde(default)]
    pub court: Option<CourtInfo>,
    #[serde(default)]
    pub citations: Vec<ReporterCitation>,
    #[serde(default)]
    pub casebody: Option<CaseBody>,
    #[serde(default)]
    pub cites_to: Vec<CitesTo>,
    #[serde(default)]
    pub analysis: Option<AnalysisInfo>,
}

/// One line of the input JSONL corpus file, before canonicalization.
/// Statute/admin/constitution records populate `header`/`paragraphs`;
/// case-law records populate the flattened `case` fields instead. Both
/// shapes parse through this one type so the reader stays corpus-agnostic
/// (corpus-specific interpretation happens in `section_from_record`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_hash: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub scraped_date: String,
    #[serde(flatten)]
    pub case: CaseLawFields,
}

/// Counts kept alongside a read pass, surfaced in the final progress
/// summary. Grounded in the corpus-loading loops of the Ohio builders,
/// which log a running total and warn on skipped lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadStats {
    pub total_lines: u64,
    pub records_emitted: u64,
    pub lines_skipped_malformed: u64,
    pub lines_skipped_header: u64,
}

/// Streams `RawRecord`s out of a JSONL reader one line at a time so C6
/// never has to buffer the whole corpus file in memory.
pub struct RecordReader<R> {
    lines: std::io::Lines<R>,
    line_no: u64,
    pub stats: ReadStats,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            stats: ReadStats::default(),
        }
    }

    /// The first line of a file may be a non-record metadata object
    /// (spec.md §4.1); it is detected by the `processed_files` token it
    /// carries rather than by shape, since a bare-bones object would
    /// otherwise look like a malformed record.
    fn is_metadata_header_line(value: &serde_json::Value) -> bool {
        value.is_object() && value.get("processed_files").is_some()
    }

    /// A parsed `RawRecord` is a real record only if it carries a
    /// `header` (statute/admin/constitution) or a case-law identity
    /// (`id` or at least one reporter citation). Anything else parses
    /// successfully as an all-default `RawRecord` but is not a record.
    fn is_recognized_record(record: &RawRecord) -> bool {
        record.header.is_some() || record.case.id.is_some() || !record.case.citations.is_empty()
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = LexResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(LexError::from(err))),
            };
            self.line_no += 1;
            self.stats.total_lines += 1;

            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(err) => {
                    self.stats.lines_skipped_malformed += 1;
                    return Some(Err(LexError::MalformedLine {
                        line: self.line_no,
                        reason: err.to_string(),
                    }));
                }
            };

            if Self::is_metadata_header_line(&value) {
                self.stats.lines_skipped_header += 1;
                continue;
            }

            return match serde_json::from_value::<RawRecord>(value) {
                Ok(record) if Self::is_recognized_record(&record) => {
                    self.stats.records_emitted += 1;
                    Some(Ok(record))
                }
                Ok(_) => {
                    self.stats.lines_skipped_malformed += 1;
                    Some(Err(LexError::MalformedLine {
                        line: self.line_no,
                        reason: "object carries neither a header nor a case-law identity"
                            .to_string(),
                    }))
                }
                Err(err) => {
                    self.stats.lines_skipped_malformed += 1;
                    Some(Err(LexError::MalformedLine {
                        line: self.line_no,
                        reason: err.to_string(),
                    }))
                }
            };
        }
    }
}
