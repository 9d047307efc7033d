//! Statistics audit.
//!
//! Counter snapshots with a negative first-entry count are reported under a
//! shared error key. Annotation snapshots are grouped by exploration and each
//! group's non-`all` versions are summed and compared with the `all` aggregate.

use std::collections::BTreeMap;

use crate::constants::statistics::{
    ANNOTATION_NAMESPACE, COUNTER_NAMESPACE, STATE_COUNTER_ERROR_KEY,
};
use crate::data::{
    AuditRecord, CounterFact, FactRecord, StateHitCounts, StateName, VersionTag,
    VersionedAnnotationFact,
};
use crate::errors::AuditError;
use crate::job::{AuditJob, DiagnosticLine, Emission, JobKind};
use crate::types::{LogMessage, Namespace};

/// Partial value emitted by the statistics mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatisticsValue {
    /// Pre-rendered report for a negative counter.
    CounterError(LogMessage),
    /// Counts carried by one annotation version.
    Annotation(AnnotationValue),
}

/// Counts of one annotation version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationValue {
    /// Version tag of the snapshot.
    pub version: VersionTag,
    /// Exploration starts.
    pub starts: i64,
    /// Exploration completions.
    pub completions: i64,
    /// Hit counters keyed by state name.
    pub state_hit: BTreeMap<StateName, StateHitCounts>,
}

impl From<&VersionedAnnotationFact> for AnnotationValue {
    fn from(fact: &VersionedAnnotationFact) -> Self {
        Self {
            version: fact.version.clone(),
            starts: fact.num_starts,
            completions: fact.num_completions,
            state_hit: fact.state_hit_counts.clone(),
        }
    }
}

/// Counter and annotation consistency audit.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticsAudit;

impl StatisticsAudit {
    fn map_counter(fact: &CounterFact, out: &mut Vec<Emission<StatisticsValue>>) {
        if fact.first_entry_count < 0 {
            out.push(Emission::new(
                STATE_COUNTER_ERROR_KEY,
                StatisticsValue::CounterError(format!(
                    "Less than 0: {} {}",
                    fact.key, fact.first_entry_count
                )),
            ));
        }
    }

    fn map_annotation(fact: &VersionedAnnotationFact, out: &mut Vec<Emission<StatisticsValue>>) {
        // Snapshots written before the exploration id was stored cannot be
        // attributed to an exploration.
        if let Some(exploration_id) = &fact.exploration_id {
            out.push(Emission::new(
                exploration_id.clone(),
                StatisticsValue::Annotation(AnnotationValue::from(fact)),
            ));
        }
    }
}

impl AuditJob for StatisticsAudit {
    type Value = StatisticsValue;

    fn kind(&self) -> JobKind {
        JobKind::StatisticsAudit
    }

    fn map(
        &self,
        record: &AuditRecord,
        out: &mut Vec<Emission<StatisticsValue>>,
    ) -> Result<(), AuditError> {
        match record {
            AuditRecord::Fact(FactRecord::Counter(fact)) => Self::map_counter(fact, out),
            AuditRecord::Fact(FactRecord::Annotation(fact)) => Self::map_annotation(fact, out),
            AuditRecord::Answer(_) => {}
        }
        Ok(())
    }

    fn namespace(&self, value: &StatisticsValue) -> Namespace {
        match value {
            StatisticsValue::CounterError(_) => COUNTER_NAMESPACE,
            StatisticsValue::Annotation(_) => ANNOTATION_NAMESPACE,
        }
    }

    fn reduce(&self, key: &str, values: &[StatisticsValue], out: &mut Vec<DiagnosticLine>) {
        let mut annotations = Vec::with_capacity(values.len());
        for value in values {
            match value {
                StatisticsValue::CounterError(message) => {
                    out.push(DiagnosticLine::new(message.as_str()));
                }
                StatisticsValue::Annotation(annotation) => annotations.push(annotation),
            }
        }
        if !annotations.is_empty() {
            reconcile_versions(key, &annotations, out);
        }
    }
}

/// Running totals for one side of the `all`-versus-sum comparison.
///
/// Held as `i128`; sums of `i64` versions must never clamp or wrap.
#[derive(Default)]
struct VersionTotals {
    starts: i128,
    completions: i128,
    state_hit: BTreeMap<StateName, i128>,
}

/// Check per-version invariants, then compare the summed versions with `all`.
fn reconcile_versions(
    exploration_id: &str,
    values: &[&AnnotationValue],
    out: &mut Vec<DiagnosticLine>,
) {
    let mut all = VersionTotals::default();
    let mut sum = VersionTotals::default();

    for value in values {
        check_version_counts(exploration_id, value, out);

        if value.version.is_all() {
            // A later `all` snapshot overwrites totals and any states it carries.
            all.starts = i128::from(value.starts);
            all.completions = i128::from(value.completions);
            for (state_name, counts) in &value.state_hit {
                all.state_hit
                    .insert(state_name.clone(), i128::from(counts.first_entry_count));
            }
        } else {
            sum.starts += i128::from(value.starts);
            sum.completions += i128::from(value.completions);
            for (state_name, counts) in &value.state_hit {
                *sum.state_hit.entry(state_name.clone()).or_default() +=
                    i128::from(counts.first_entry_count);
            }
        }
    }

    if sum.starts != all.starts {
        out.push(DiagnosticLine::new(format!(
            "Non-all != all for starts: exp_id:{exploration_id} sum: {} all: {}",
            sum.starts, all.starts
        )));
    }
    if sum.completions != all.completions {
        out.push(DiagnosticLine::new(format!(
            "Non-all != all for completions: exp_id:{exploration_id} sum: {} all: {}",
            sum.completions, all.completions
        )));
    }

    for (state_name, all_hits) in &all.state_hit {
        match sum.state_hit.get(state_name) {
            None if *all_hits != 0 => out.push(DiagnosticLine::new(format!(
                "state hit count not same exp_id:{exploration_id} state:{state_name}, all:{all_hits} sum: null"
            ))),
            None => {}
            Some(sum_hits) if sum_hits != all_hits => out.push(DiagnosticLine::new(format!(
                "state hit count not same exp_id: {exploration_id} state: {state_name} all: {all_hits} sum:{sum_hits}"
            ))),
            Some(_) => {}
        }
    }
}

fn check_version_counts(
    exploration_id: &str,
    value: &AnnotationValue,
    out: &mut Vec<DiagnosticLine>,
) {
    let version = &value.version;
    if value.starts < 0 {
        out.push(DiagnosticLine::new(format!(
            "Negative start count: exp_id:{exploration_id} version:{version} starts:{}",
            value.starts
        )));
    }
    if value.completions < 0 {
        out.push(DiagnosticLine::new(format!(
            "Negative completion count: exp_id:{exploration_id} version:{version} completions:{}",
            value.completions
        )));
    }
    if value.completions > value.starts {
        out.push(DiagnosticLine::new(format!(
            "Completions > starts: exp_id:{exploration_id} version:{version} {}>{}",
            value.completions, value.starts
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(
        version: &str,
        starts: i64,
        completions: i64,
        hits: &[(&str, i64)],
    ) -> StatisticsValue {
        StatisticsValue::Annotation(AnnotationValue {
            version: VersionTag::from(version),
            starts,
            completions,
            state_hit: hits
                .iter()
                .map(|(state, count)| (state.to_string(), StateHitCounts::new(*count)))
                .collect(),
        })
    }

    fn reduce(values: &[StatisticsValue]) -> Vec<String> {
        let mut out = Vec::new();
        StatisticsAudit.reduce("exp1", values, &mut out);
        out.into_iter().map(DiagnosticLine::into_string).collect()
    }

    #[test]
    fn counter_mapper_reports_only_negative_counts() {
        let mut out = Vec::new();
        let positive = AuditRecord::from(CounterFact {
            key: "exp1.Intro".into(),
            first_entry_count: 0,
        });
        StatisticsAudit.map(&positive, &mut out).unwrap();
        assert!(out.is_empty());

        let negative = AuditRecord::from(CounterFact {
            key: "exp1.Intro".into(),
            first_entry_count: -3,
        });
        StatisticsAudit.map(&negative, &mut out).unwrap();
        assert_eq!(
            out,
            vec![Emission::new(
                STATE_COUNTER_ERROR_KEY,
                StatisticsValue::CounterError("Less than 0: exp1.Intro -3".into())
            )]
        );
    }

    #[test]
    fn annotation_without_owner_is_dropped() {
        let mut out = Vec::new();
        let legacy = AuditRecord::from(VersionedAnnotationFact {
            exploration_id: None,
            version: VersionTag::from(1),
            num_starts: -1,
            num_completions: 0,
            state_hit_counts: BTreeMap::new(),
        });
        StatisticsAudit.map(&legacy, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn consistent_versions_produce_no_lines() {
        let lines = reduce(&[
            annotation("all", 10, 4, &[("A", 3)]),
            annotation("1", 6, 1, &[("A", 2)]),
            annotation("2", 4, 3, &[("A", 1)]),
        ]);
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[test]
    fn per_version_violations_are_all_reported() {
        let lines = reduce(&[
            annotation("all", 0, 0, &[]),
            annotation("1", -2, -5, &[]),
            annotation("2", 2, 7, &[]),
        ]);
        assert!(lines.contains(&"Negative start count: exp_id:exp1 version:1 starts:-2".to_string()));
        assert!(lines.contains(
            &"Negative completion count: exp_id:exp1 version:1 completions:-5".to_string()
        ));
        assert!(lines.contains(&"Completions > starts: exp_id:exp1 version:2 7>2".to_string()));
        assert!(lines.contains(&"Non-all != all for completions: exp_id:exp1 sum: 2 all: 0".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Non-all != all for starts")));
    }

    #[test]
    fn completions_over_starts_also_breaks_sums() {
        let lines = reduce(&[
            annotation("all", 10, 4, &[("A", 3)]),
            annotation("1", 6, 1, &[("A", 2)]),
            annotation("2", 4, 5, &[("A", 1)]),
        ]);
        assert_eq!(
            lines,
            vec![
                "Completions > starts: exp_id:exp1 version:2 5>4".to_string(),
                "Non-all != all for completions: exp_id:exp1 sum: 6 all: 4".to_string(),
            ]
        );
    }

    #[test]
    fn zero_all_hits_for_missing_state_is_not_flagged() {
        let lines = reduce(&[
            annotation("all", 1, 0, &[("A", 0)]),
            annotation("1", 1, 0, &[]),
        ]);
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[test]
    fn nonzero_all_hits_for_missing_state_is_flagged_once() {
        let lines = reduce(&[
            annotation("all", 1, 0, &[("A", 5)]),
            annotation("1", 1, 0, &[]),
        ]);
        assert_eq!(
            lines,
            vec!["state hit count not same exp_id:exp1 state:A, all:5 sum: null".to_string()]
        );
    }

    #[test]
    fn state_hit_mismatch_is_flagged() {
        let lines = reduce(&[
            annotation("all", 1, 0, &[("A", 5)]),
            annotation("1", 1, 0, &[("A", 4), ("B", 9)]),
        ]);
        assert_eq!(
            lines,
            vec!["state hit count not same exp_id: exp1 state: A all: 5 sum:4".to_string()]
        );
    }

    #[test]
    fn missing_all_version_compares_against_zero() {
        let lines = reduce(&[annotation("1", 3, 1, &[("A", 3)])]);
        assert_eq!(
            lines,
            vec![
                "Non-all != all for starts: exp_id:exp1 sum: 3 all: 0".to_string(),
                "Non-all != all for completions: exp_id:exp1 sum: 1 all: 0".to_string(),
            ]
        );
    }

    #[test]
    fn version_sums_beyond_i64_still_mismatch_all() {
        let lines = reduce(&[
            annotation("all", i64::MAX, 0, &[("A", i64::MAX)]),
            annotation("1", i64::MAX, 0, &[("A", i64::MAX)]),
            annotation("2", 1, 0, &[("A", 1)]),
        ]);
        assert_eq!(
            lines,
            vec![
                "Non-all != all for starts: exp_id:exp1 sum: 18446744073709551615 all: 9223372036854775807".to_string(),
                "state hit count not same exp_id: exp1 state: A all: 9223372036854775807 sum:18446744073709551615".to_string(),
            ]
        );
    }

    // Conflicting `all` snapshots are not diagnosed; the later one silently wins.
    #[test]
    fn later_all_snapshot_wins_without_diagnostic() {
        let lines = reduce(&[
            annotation("all", 99, 99, &[("A", 99)]),
            annotation("all", 2, 1, &[("A", 2)]),
            annotation("1", 2, 1, &[("A", 2)]),
        ]);
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[test]
    fn counter_errors_pass_through_unchanged() {
        let mut out = Vec::new();
        StatisticsAudit.reduce(
            STATE_COUNTER_ERROR_KEY,
            &[
                StatisticsValue::CounterError("Less than 0: a -1".into()),
                StatisticsValue::CounterError("Less than 0: b -2".into()),
            ],
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                DiagnosticLine::from("Less than 0: a -1"),
                DiagnosticLine::from("Less than 0: b -2")
            ]
        );
    }

    #[test]
    fn counter_errors_and_annotations_use_separate_namespaces() {
        let counter = StatisticsValue::CounterError("Less than 0: a -1".into());
        let annotation = annotation("all", 0, 0, &[]);
        assert_ne!(
            StatisticsAudit.namespace(&counter),
            StatisticsAudit.namespace(&annotation)
        );
    }
}
