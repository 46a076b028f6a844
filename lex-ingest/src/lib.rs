pub mod canonical;
pub mod pipeline;
pub mod reader;

pub use canonical::{canonicalize_case, canonicalize_header};
pub use pipeline::section_from_record;
pub use reader::{
    AnalysisInfo, CaseBody, CaseLawFields, CitesTo, CourtInfo, Opinion, RawRecord, ReadStats,
    RecordReader, ReporterCitation,
};
