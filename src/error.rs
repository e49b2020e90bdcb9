use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid type {type_name:?}: {reason}")]
    InvalidType { type_name: String, reason: String },

    #[error("Column count mismatch: {block} (columns) != {target} (target)")]
    ColumnCount { block: usize, target: usize },

    #[error("[{index}]: unexpected column {actual:?} ({expected:?} expected)")]
    ColumnName { index: usize, expected: String, actual: String },

    #[error(
        "[{index}]: {column}: unexpected type {actual:?} (got) instead of {expected:?} (has)"
    )]
    TypeConflict {
        index: usize,
        column: String,
        expected: String,
        actual: String,
    },

    #[error("column [{index}]: unknown type code 0x{code:x}")]
    UnknownTypeCode { index: usize, code: u8 },

    #[error("Time64: no precision set")]
    PrecisionNotSet,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build an [`Error::InvalidType`] for the given descriptor.
    pub fn invalid_type(
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Innermost error, skipping any context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach positional context (column index, name, phase) to an error.
pub trait ResultExt<T> {
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
