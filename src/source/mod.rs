//! Record source interfaces.
//!
//! Ownership model:
//! - The storage layer owns records; a `RecordSource` only exposes read access.
//! - Sources are index-addressable so the pipeline can hand disjoint index
//!   ranges to shard workers without any shared cursor state.

use std::sync::Arc;

use crate::data::AuditRecord;
use crate::errors::AuditError;
use crate::types::SourceId;

/// Source implementation modules.
pub mod sources;
/// Utility helpers used by the pipeline and sources.
pub mod utilities;

pub use sources::json_lines::JsonLinesSource;

/// Pipeline-facing, index-addressable record supplier.
///
/// For a fixed dataset, `record_at` must return the same record for the same
/// index on every call; audit output determinism depends on it.
pub trait RecordSource: Send + Sync {
    /// Stable source identifier.
    fn id(&self) -> &str;
    /// Current index domain size, typically `Some(total_records)`.
    fn len_hint(&self) -> Option<usize>;
    /// Return the record at index `idx`, or `None` for sparse/missing positions.
    fn record_at(&self, idx: usize) -> Result<Option<AuditRecord>, AuditError>;

    /// Index domain size, failing when the source cannot report one.
    fn require_len(&self) -> Result<usize, AuditError> {
        self.len_hint()
            .ok_or_else(|| AuditError::SourceInconsistent {
                source_id: self.id().to_string(),
                details: "record source did not provide len_hint".into(),
            })
    }
}

/// In-memory record source for tests and small datasets.
#[derive(Clone)]
pub struct InMemorySource {
    id: SourceId,
    records: Arc<Vec<AuditRecord>>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<AuditRecord>) -> Self {
        Self {
            id: id.into(),
            records: Arc::new(records),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }

    fn record_at(&self, idx: usize) -> Result<Option<AuditRecord>, AuditError> {
        Ok(self.records.get(idx).cloned())
    }
}
