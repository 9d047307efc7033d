use std::io;

use thiserror::Error;

use crate::types::{RecordId, SourceId};

/// Error type for identifier parsing, record sources, and configuration failures.
///
/// Data-invariant violations found by an audit are not errors; they are
/// reported as [`crate::DiagnosticLine`]s and the run continues.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Answer-log id without the expected segment boundaries.
    #[error("malformed composite identifier '{id}': {reason}")]
    MalformedIdentifier {
        /// Offending identifier.
        id: RecordId,
        /// Which boundary was missing.
        reason: String,
    },
    /// Source could not be opened or read.
    #[error("record source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Source that failed.
        source_id: SourceId,
        /// Underlying failure.
        reason: String,
    },
    /// Source reported state the pipeline cannot use.
    #[error("record source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        /// Source that failed.
        source_id: SourceId,
        /// What was inconsistent.
        details: String,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Record that is not valid JSON for its kind.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Invalid pipeline settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}
