use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::statistics::VERSION_ALL;

pub use crate::types::{ExplorationId, RecordId, StateName};

/// Storage entity kinds a job can scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Per-state counter snapshot.
    StateCounter,
    /// Versioned exploration annotation (starts, completions, state hits).
    ExplorationAnnotations,
    /// Answer log keyed by a composite dotted identifier.
    StateRuleAnswerLog,
}

impl RecordKind {
    /// Stable snake_case label used in logs and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordKind::StateCounter => "state_counter",
            RecordKind::ExplorationAnnotations => "exploration_annotations",
            RecordKind::StateRuleAnswerLog => "state_rule_answer_log",
        }
    }
}

/// Version tag of an annotation snapshot.
///
/// `All` is the aggregate across every other version of the same exploration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionTag {
    /// Aggregate `all` snapshot.
    All,
    /// One concrete version, kept as its wire text.
    Specific(String),
}

impl VersionTag {
    /// True for the `all` aggregate.
    pub fn is_all(&self) -> bool {
        matches!(self, VersionTag::All)
    }
}

impl From<String> for VersionTag {
    fn from(value: String) -> Self {
        if value == VERSION_ALL {
            VersionTag::All
        } else {
            VersionTag::Specific(value)
        }
    }
}

impl From<&str> for VersionTag {
    fn from(value: &str) -> Self {
        VersionTag::from(value.to_string())
    }
}

impl From<u32> for VersionTag {
    fn from(value: u32) -> Self {
        VersionTag::Specific(value.to_string())
    }
}

impl From<VersionTag> for String {
    fn from(value: VersionTag) -> Self {
        value.to_string()
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTag::All => f.write_str(VERSION_ALL),
            VersionTag::Specific(version) => f.write_str(version),
        }
    }
}

/// Single numeric counter snapshot for one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterFact {
    /// Composite storage key of the counter (for example `exp1.Intro`).
    pub key: RecordId,
    /// Number of first entries into the state.
    pub first_entry_count: i64,
}

/// Per-state hit counters stored on an annotation snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHitCounts {
    /// Number of first entries into the state.
    pub first_entry_count: i64,
}

impl StateHitCounts {
    /// Counts with the given first-entry total.
    pub fn new(first_entry_count: i64) -> Self {
        Self { first_entry_count }
    }
}

/// Annotation snapshot for one version of an exploration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedAnnotationFact {
    /// Owning exploration; absent on snapshots written before the field existed.
    #[serde(default)]
    pub exploration_id: Option<ExplorationId>,
    /// Version this snapshot covers.
    pub version: VersionTag,
    /// Number of exploration starts.
    pub num_starts: i64,
    /// Number of exploration completions.
    pub num_completions: i64,
    /// Hit counters keyed by state name.
    #[serde(default)]
    pub state_hit_counts: BTreeMap<StateName, StateHitCounts>,
}

/// Counter or annotation fact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactRecord {
    /// State counter snapshot.
    Counter(CounterFact),
    /// Versioned annotation snapshot.
    Annotation(VersionedAnnotationFact),
}

/// Answer log entry; only the identifier participates in audits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Composite identifier `<exploration>.<state>.<handler>.<rule>`.
    pub id: RecordId,
    /// Raw answer payload, carried for identity only.
    #[serde(default)]
    pub answers: serde_json::Value,
}

/// Any record a job may scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordEnvelope", into = "RecordEnvelope")]
pub enum AuditRecord {
    /// Statistics fact.
    Fact(FactRecord),
    /// Answer log entry.
    Answer(AnswerRecord),
}

impl AuditRecord {
    /// Entity kind used to match a job's scan list.
    pub fn kind(&self) -> RecordKind {
        match self {
            AuditRecord::Fact(FactRecord::Counter(_)) => RecordKind::StateCounter,
            AuditRecord::Fact(FactRecord::Annotation(_)) => RecordKind::ExplorationAnnotations,
            AuditRecord::Answer(_) => RecordKind::StateRuleAnswerLog,
        }
    }
}

impl From<CounterFact> for AuditRecord {
    fn from(value: CounterFact) -> Self {
        AuditRecord::Fact(FactRecord::Counter(value))
    }
}

impl From<VersionedAnnotationFact> for AuditRecord {
    fn from(value: VersionedAnnotationFact) -> Self {
        AuditRecord::Fact(FactRecord::Annotation(value))
    }
}

impl From<AnswerRecord> for AuditRecord {
    fn from(value: AnswerRecord) -> Self {
        AuditRecord::Answer(value)
    }
}

/// Flat wire form of `AuditRecord`, tagged by `kind`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RecordEnvelope {
    StateCounter(CounterFact),
    ExplorationAnnotations(VersionedAnnotationFact),
    StateRuleAnswerLog(AnswerRecord),
}

impl From<RecordEnvelope> for AuditRecord {
    fn from(value: RecordEnvelope) -> Self {
        match value {
            RecordEnvelope::StateCounter(fact) => fact.into(),
            RecordEnvelope::ExplorationAnnotations(fact) => fact.into(),
            RecordEnvelope::StateRuleAnswerLog(record) => record.into(),
        }
    }
}

impl From<AuditRecord> for RecordEnvelope {
    fn from(value: AuditRecord) -> Self {
        match value {
            AuditRecord::Fact(FactRecord::Counter(fact)) => RecordEnvelope::StateCounter(fact),
            AuditRecord::Fact(FactRecord::Annotation(fact)) => {
                RecordEnvelope::ExplorationAnnotations(fact)
            }
            AuditRecord::Answer(record) => RecordEnvelope::StateRuleAnswerLog(record),
        }
    }
}
