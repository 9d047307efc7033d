#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline execution settings.
pub mod config;
/// Centralized constants used across parsing, jobs, and the pipeline.
pub mod constants;
/// Storage record types scanned by audits.
pub mod data;
/// Reusable CLI runners shared by demos and downstream crates.
pub mod example_apps;
mod hash;
/// Map/reduce job contract and diagnostic output type.
pub mod job;
/// Built-in audit jobs.
pub mod jobs;
/// Composite answer-log identifier parsing.
pub mod key_parser;
/// Group-size metrics helpers.
pub mod metrics;
/// Map -> shuffle -> reduce orchestration.
pub mod pipeline;
/// Rule-descriptor classification.
pub mod rules;
/// Record source traits and built-in sources.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::AuditConfig;
pub use data::{
    AnswerRecord, AuditRecord, CounterFact, FactRecord, RecordKind, StateHitCounts, VersionTag,
    VersionedAnnotationFact,
};
pub use errors::AuditError;
pub use job::{AuditJob, DiagnosticLine, Emission, JobKind};
pub use jobs::{
    AnnotationValue, AnswerValue, AnswersAudit, ReduceKind, StatisticsAudit, StatisticsValue,
};
pub use key_parser::{CompositeId, parse_composite_id};
pub use pipeline::{AuditPipeline, AuditReport, MapOutput};
pub use rules::{RuleClass, classify_rule};
pub use source::{InMemorySource, JsonLinesSource, RecordSource};
pub use types::{
    ExplorationId, GroupKey, HandlerName, LogMessage, Namespace, RecordId, RuleString, SourceId,
    StateName,
};
