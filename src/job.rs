//! Map/reduce job contract shared by every audit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{AuditRecord, RecordKind};
use crate::errors::AuditError;
use crate::types::{GroupKey, Namespace};

/// Audit jobs shipped with the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Counter and annotation consistency checks.
    StatisticsAudit,
    /// Handler and rule usage summaries.
    AnswersAudit,
}

impl JobKind {
    /// Entity kinds the job scans; other records are skipped before mapping.
    pub const fn record_kinds(self) -> &'static [RecordKind] {
        match self {
            JobKind::StatisticsAudit => &[
                RecordKind::ExplorationAnnotations,
                RecordKind::StateCounter,
            ],
            JobKind::AnswersAudit => &[RecordKind::StateRuleAnswerLog],
        }
    }

    /// Stable snake_case label used in logs and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            JobKind::StatisticsAudit => "statistics_audit",
            JobKind::AnswersAudit => "answers_audit",
        }
    }
}

/// One keyed partial value produced by a mapper.
#[derive(Clone, Debug, PartialEq)]
pub struct Emission<V> {
    /// Grouping key within the value's namespace.
    pub key: GroupKey,
    /// Partial value handed to the reducer.
    pub value: V,
}

impl<V> Emission<V> {
    /// Pair `value` with `key`.
    pub fn new(key: impl Into<GroupKey>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Human-readable line emitted by a reducer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticLine(String);

impl DiagnosticLine {
    /// Wrap `text` as a diagnostic line.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the line text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned line text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DiagnosticLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DiagnosticLine {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DiagnosticLine {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Map/reduce audit over storage records.
///
/// `map` runs once per scanned record and `reduce` once per distinct
/// `(namespace, key)` with every value emitted under it, in record order.
/// Both must be pure: re-running either on the same input yields the same
/// output, so a crashed shard or key can simply be repeated.
pub trait AuditJob: Send + Sync {
    /// Partial value passed from map to reduce.
    type Value: Send + Sync;

    fn kind(&self) -> JobKind;

    /// Entity kinds to map over.
    fn record_kinds(&self) -> &'static [RecordKind] {
        self.kind().record_kinds()
    }

    /// Emit zero or more keyed values for `record`.
    ///
    /// An `Err` marks the record as corrupt and fails the run.
    fn map(
        &self,
        record: &AuditRecord,
        out: &mut Vec<Emission<Self::Value>>,
    ) -> Result<(), AuditError>;

    /// Key space a value is grouped in. Equal keys in different namespaces are
    /// reduced independently.
    fn namespace(&self, value: &Self::Value) -> Namespace;

    /// Validate or summarize every value sharing one key.
    fn reduce(&self, key: &str, values: &[Self::Value], out: &mut Vec<DiagnosticLine>);
}
