use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::AuditRecord;
use crate::errors::AuditError;
use crate::source::RecordSource;
use crate::types::SourceId;

/// Record source backed by a JSON-lines dump (one kind-tagged record per line).
///
/// The file is read once at open time; blank lines are skipped.
pub struct JsonLinesSource {
    id: SourceId,
    path: PathBuf,
    records: Arc<Vec<AuditRecord>>,
}

impl JsonLinesSource {
    /// Open `path`, using its file name as the source id.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::open_with_id(id, path)
    }

    /// Open `path` under an explicit source id.
    pub fn open_with_id(
        id: impl Into<SourceId>,
        path: impl AsRef<Path>,
    ) -> Result<Self, AuditError> {
        let id = id.into();
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|err| AuditError::SourceUnavailable {
            source_id: id.clone(),
            reason: format!("failed to read {}: {err}", path.display()),
        })?;
        let records = parse_lines(&id, &contents)?;
        debug!(
            "[audit:source] loaded {} records from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            id,
            path,
            records: Arc::new(records),
        })
    }

    /// File the records were loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_lines(source_id: &str, contents: &str) -> Result<Vec<AuditRecord>, AuditError> {
    let mut records = Vec::new();
    for (line_idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<AuditRecord>(line).inspect_err(|err| {
            warn!(
                "[audit:source] source '{}' line {} is not a record: {}",
                source_id,
                line_idx + 1,
                err
            );
        })?;
        records.push(record);
    }
    Ok(records)
}

impl RecordSource for JsonLinesSource {
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
