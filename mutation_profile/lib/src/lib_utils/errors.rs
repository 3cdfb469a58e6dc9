use std::io;
use thiserror::Error;

/// Failures raised while loading, filtering or profiling an alignment.
#[derive(Error, Debug)]
pub enum MsaError {
    /// Malformed alignment input: unequal lengths, unknown symbols, empty records.
    #[error("Alignment format error: {0}")]
    Format(String),

    /// A position or id was looked up outside the valid range.
    #[error("Out of range: {0}")]
    Range(String),

    /// None of the requested ids survived filtering.
    #[error("Variant group '{0}' has no sequences left in the alignment")]
    EmptySubset(String),

    /// The designated reference sequence is not in the alignment.
    #[error("Reference sequence '{0}' is missing from the alignment")]
    ReferenceMissing(String),

    #[error("Invalid domain table: {0}")]
    InvalidDomainTable(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MsaError>;
