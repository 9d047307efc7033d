//! Answers audit.
//!
//! Every answer log is counted twice: once under its handler name and once
//! under its rule (the rule type for parameterized rules, otherwise the whole
//! descriptor). Handler and rule groups live in separate namespaces.

use tracing::warn;

use crate::constants::answers::{
    HANDLER_NAMESPACE, MIXED_KIND_ERROR, RULE_NAMESPACE, UNKNOWN_KIND_ERROR,
};
use crate::data::{AnswerRecord, AuditRecord, RecordId};
use crate::errors::AuditError;
use crate::job::{AuditJob, DiagnosticLine, Emission, JobKind};
use crate::key_parser::parse_composite_id;
use crate::rules::{RuleClass, classify_rule};
use crate::types::{Namespace, RuleString};

/// Reduction applied to a group, fixed by the first value in the group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceKind {
    /// Handler usage summary.
    HandlerName,
    /// Fuzzy rule count.
    FuzzyRule,
    /// Default rule count.
    DefaultRule,
    /// Per-rule-type count.
    StandardRule,
    /// Malformed descriptor report.
    ErrorRule,
}

/// Partial value emitted by the answers mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerValue {
    /// Handler occurrence, carrying the full identifier it came from.
    Handler {
        /// Composite identifier of the answer record.
        rule_spec_str: RecordId,
    },
    /// `FuzzyMatches` occurrence.
    FuzzyRule,
    /// `Default` occurrence.
    DefaultRule,
    /// Parameterized rule occurrence.
    StandardRule {
        /// Rule type before the argument list.
        rule_str: RuleString,
        /// Raw argument text between the parentheses.
        rule_args: String,
    },
    /// Descriptor that matched no known shape.
    ErrorRule,
}

impl AnswerValue {
    /// Reduction this value belongs to.
    pub fn reduce_kind(&self) -> ReduceKind {
        match self {
            AnswerValue::Handler { .. } => ReduceKind::HandlerName,
            AnswerValue::FuzzyRule => ReduceKind::FuzzyRule,
            AnswerValue::DefaultRule => ReduceKind::DefaultRule,
            AnswerValue::StandardRule { .. } => ReduceKind::StandardRule,
            AnswerValue::ErrorRule => ReduceKind::ErrorRule,
        }
    }
}

/// Handler and rule usage audit.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnswersAudit;

impl AnswersAudit {
    fn map_answer(
        record: &AnswerRecord,
        out: &mut Vec<Emission<AnswerValue>>,
    ) -> Result<(), AuditError> {
        let parsed = parse_composite_id(&record.id)?;
        out.push(Emission::new(
            parsed.handler_name,
            AnswerValue::Handler {
                rule_spec_str: record.id.clone(),
            },
        ));

        let rule_str = parsed.rule_str;
        let emission = match classify_rule(&rule_str) {
            RuleClass::Fuzzy => Emission::new(rule_str, AnswerValue::FuzzyRule),
            RuleClass::Default => Emission::new(rule_str, AnswerValue::DefaultRule),
            RuleClass::Standard { rule_type, args } => Emission::new(
                rule_type,
                AnswerValue::StandardRule {
                    rule_str,
                    rule_args: args,
                },
            ),
            RuleClass::Malformed => Emission::new(rule_str, AnswerValue::ErrorRule),
        };
        out.push(emission);
        Ok(())
    }
}

impl AuditJob for AnswersAudit {
    type Value = AnswerValue;

    fn kind(&self) -> JobKind {
        JobKind::AnswersAudit
    }

    fn map(
        &self,
        record: &AuditRecord,
        out: &mut Vec<Emission<AnswerValue>>,
    ) -> Result<(), AuditError> {
        match record {
            AuditRecord::Answer(answer) => Self::map_answer(answer, out),
            AuditRecord::Fact(_) => Ok(()),
        }
    }

    fn namespace(&self, value: &AnswerValue) -> Namespace {
        match value {
            AnswerValue::Handler { .. } => HANDLER_NAMESPACE,
            _ => RULE_NAMESPACE,
        }
    }

    fn reduce(&self, key: &str, values: &[AnswerValue], out: &mut Vec<DiagnosticLine>) {
        let mut reduce_kind: Option<ReduceKind> = None;
        for value in values {
            match reduce_kind {
                Some(kind) if kind != value.reduce_kind() => {
                    warn!(
                        "[audit:answers] key '{}' mixes {:?} with {:?}",
                        key,
                        kind,
                        value.reduce_kind()
                    );
                    out.push(DiagnosticLine::new(MIXED_KIND_ERROR));
                }
                Some(_) => {}
                None => reduce_kind = Some(value.reduce_kind()),
            }
        }

        let count = values.len();
        let line = match reduce_kind {
            Some(ReduceKind::HandlerName) => {
                let rule_spec_strs: Vec<&str> = values
                    .iter()
                    .filter_map(|value| match value {
                        AnswerValue::Handler { rule_spec_str } => Some(rule_spec_str.as_str()),
                        _ => None,
                    })
                    .collect();
                // Debug list form: `["a", "b"]`, double-quoted entries.
                format!(
                    "Found handler \"{key}\" {count} time(s), ALL RULE SPEC STRINGS: \n{rule_spec_strs:?}"
                )
            }
            Some(ReduceKind::FuzzyRule) => format!("Found fuzzy rules {count} time(s)"),
            Some(ReduceKind::DefaultRule) => format!("Found default rules {count} time(s)"),
            Some(ReduceKind::StandardRule) => format!("Found rule type \"{key}\" {count} time(s)"),
            Some(ReduceKind::ErrorRule) => format!(
                "Encountered invalid rule string {count} time(s) (is it too long?): \"{key}\""
            ),
            None => {
                warn!("[audit:answers] key '{}' has no reduce kind", key);
                UNKNOWN_KIND_ERROR.to_string()
            }
        };
        out.push(DiagnosticLine::new(line));
    }
}
