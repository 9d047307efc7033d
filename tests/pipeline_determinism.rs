use std::collections::BTreeMap;

use stats_audit::key_parser::compose_identifier;
use stats_audit::{
    AnswerRecord, AnswersAudit, AuditConfig, AuditPipeline, AuditRecord, CounterFact,
    InMemorySource, StateHitCounts, StatisticsAudit, VersionTag, VersionedAnnotationFact,
};

fn statistics_records() -> Vec<AuditRecord> {
    let mut records = Vec::new();
    for exp in 0..40i64 {
        let exploration_id = format!("exp{exp:02}");
        for version in 1..=3i64 {
            let starts = exp + version;
            let completions = if exp % 7 == 0 { starts + 1 } else { starts / 2 };
            let mut state_hit_counts = BTreeMap::new();
            state_hit_counts.insert("Intro".to_string(), StateHitCounts::new(starts));
            records.push(AuditRecord::from(VersionedAnnotationFact {
                exploration_id: Some(exploration_id.clone()),
                version: VersionTag::from(version.to_string()),
                num_starts: starts,
                num_completions: completions,
                state_hit_counts,
            }));
        }
        let mut all_hits = BTreeMap::new();
        all_hits.insert("Intro".to_string(), StateHitCounts::new(3 * exp + 6));
        all_hits.insert("Outro".to_string(), StateHitCounts::new(exp % 3));
        records.push(AuditRecord::from(VersionedAnnotationFact {
            exploration_id: Some(exploration_id),
            version: VersionTag::All,
            num_starts: 3 * exp + 6 + (exp % 5 == 0) as i64,
            num_completions: 0,
            state_hit_counts: all_hits,
        }));
        records.push(AuditRecord::from(CounterFact {
            key: format!("exp{exp:02}.Intro"),
            first_entry_count: if exp % 4 == 0 { -exp - 1 } else { exp },
        }));
    }
    records
}

fn answer_records() -> Vec<AuditRecord> {
    let rules = ["Equals(x)", "FuzzyMatches", "Default", "Contains(ab", "StartsWith(q.r)"];
    let handlers = ["submit", "click", "on.enter"];
    (0..150)
        .map(|idx| {
            let id = compose_identifier(
                &format!("exp.{}", idx % 9),
                &format!("State {}", idx % 4),
                handlers[idx % handlers.len()],
                rules[idx % rules.len()],
            )
            .unwrap();
            AuditRecord::from(AnswerRecord {
                id,
                answers: serde_json::Value::Null,
            })
        })
        .collect()
}

#[test]
fn statistics_output_is_identical_across_reruns_and_shardings() {
    let source = InMemorySource::new("statistics", statistics_records());
    let baseline = AuditPipeline::default()
        .run(&StatisticsAudit, &source)
        .unwrap();
    assert!(!baseline.is_clean());

    for config in [
        AuditConfig::default(),
        AuditConfig::default().with_shard_size(1),
        AuditConfig::default().with_shard_size(7).with_max_workers(3),
        AuditConfig::default().with_shard_size(64).with_max_workers(1),
    ] {
        let rerun = AuditPipeline::new(config)
            .run(&StatisticsAudit, &source)
            .unwrap();
        assert_eq!(rerun.lines(), baseline.lines());
        assert_eq!(rerun.fingerprint(), baseline.fingerprint());
        assert_eq!(rerun.keys_reduced, baseline.keys_reduced);
    }
}

#[test]
fn answers_output_is_identical_across_reruns_and_shardings() {
    let source = InMemorySource::new("answers", answer_records());
    let baseline = AuditPipeline::default().run(&AnswersAudit, &source).unwrap();
    assert_eq!(baseline.records_mapped, 150);
    assert_eq!(baseline.emissions, 300);

    for shard_size in [1, 3, 50, 1000] {
        let rerun = AuditPipeline::new(AuditConfig::default().with_shard_size(shard_size))
            .run(&AnswersAudit, &source)
            .unwrap();
        assert_eq!(rerun.lines(), baseline.lines());
    }
}

#[test]
fn report_counts_describe_the_run() {
    let source = InMemorySource::new("statistics", statistics_records());
    let report = AuditPipeline::default()
        .run(&StatisticsAudit, &source)
        .unwrap();
    assert_eq!(report.records_scanned, 40 * 5);
    assert_eq!(report.records_mapped, 40 * 5);
    // One annotation group per exploration plus the shared counter channel.
    assert_eq!(report.keys_reduced, 41);
    let skew = report.skew.as_ref().expect("skew");
    assert_eq!(skew.keys, 41);
    assert_eq!(skew.max, 10);
    assert_eq!(skew.largest_key, "State Counter ERROR");
    assert!(report.finished_at >= report.started_at);
}
