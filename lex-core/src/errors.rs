use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("section not found: {id}")]
    SectionNotFound { id: String },

    #[error("malformed input line {line}: {reason}")]
    MalformedLine { line: u64, reason: String },

    #[error("malformed header at line {line}: {header}")]
    MalformedHeader { line: u64, header: String },

    #[error("invalid citation target {target} in {corpus} grammar")]
    InvalidCitationTarget { target: String, corpus: String },

    #[error("store map size exceeded: {reason}")]
    StoreFull { reason: String },

    #[error("store I/O failure during {operation}: {reason}")]
    StoreIo { operation: String, reason: String },

    #[error("progress file corrupt: {reason}")]
    CorruptProgress { reason: String },

    #[error("interrupted after checkpoint at {processed} sections")]
    Interrupted { processed: u64 },

    #[error("incompatible store version: expected {expected}, found {found}")]
    IncompatibleStore { expected: String, found: String },

    #[error("serialization error: {reason}")]
    SerializationError { reason: String },

    #[error("configuration error: {parameter}: {reason}")]
    ConfigurationError { parameter: String, reason: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

pub type LexResult<T> = Result<T, LexError>;

impl LexError {
    /// Maps an error to the CLI exit code table (spec.md §6/§7).
    pub fn exit_code(&self) -> i32 {
        match self {
            LexError::MalformedLine { .. } | LexError::MalformedHeader { .. } => 1,
            LexError::StoreFull { .. } | LexError::StoreIo { .. } => 2,
            LexError::Interrupted { .. } => 3,
            LexError::IncompatibleStore { .. } => 4,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for LexError {
    fn from(err: serde_json::Error) -> Self {
        LexError::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for LexError {
    fn from(err: std::io::Error) -> Self {
        LexError::StoreIo {
            operation: "io".to_string(),
            reason: err.to_string(),
        }
    }
}
