//! Map -> shuffle -> reduce orchestration.
//!
//! Shards of the source's index space are mapped in parallel with no shared
//! state. Their emissions are concatenated in shard order and grouped by
//! `(namespace, key)`. Each group is then reduced independently, also in
//! parallel, and the resulting lines are concatenated in key order. Because
//! both phases are pure and grouping is ordered, re-running the same input
//! produces byte-identical output.

use std::ops::Range;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::constants::pipeline::PROGRESS_RECORD_THRESHOLD;
use crate::errors::AuditError;
use crate::hash::stable_hash_lines;
use crate::job::{AuditJob, DiagnosticLine, Emission, JobKind};
use crate::metrics::{KeySkew, key_skew};
use crate::source::RecordSource;
use crate::source::utilities::grouping::{ShuffleKey, group_by_key, shard_ranges};
use crate::types::SourceId;

/// Output of the map phase, already grouped for reduction.
pub struct MapOutput<V> {
    /// Records present in the source.
    pub records_scanned: usize,
    /// Records whose kind the job maps over.
    pub records_mapped: usize,
    /// Total emissions across all shards.
    pub emissions: usize,
    /// Values per reduce invocation, ordered by key.
    pub groups: IndexMap<ShuffleKey, Vec<V>>,
}

/// Result of one audit run.
#[derive(Clone, Debug, Serialize)]
pub struct AuditReport {
    /// Job that produced this report.
    pub job: JobKind,
    /// Source the records were read from.
    pub source_id: SourceId,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub finished_at: DateTime<Utc>,
    /// Records present in the source.
    pub records_scanned: usize,
    /// Records whose kind the job maps over.
    pub records_mapped: usize,
    /// Total map emissions.
    pub emissions: usize,
    /// Number of reduce invocations.
    pub keys_reduced: usize,
    /// Group-size distribution; absent when nothing was emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew: Option<KeySkew>,
    /// Diagnostic lines in key order.
    pub lines: Vec<DiagnosticLine>,
}

impl AuditReport {
    /// Borrow the diagnostic lines.
    pub fn lines(&self) -> &[DiagnosticLine] {
        &self.lines
    }

    /// Consume the report, keeping only its lines.
    pub fn into_lines(self) -> Vec<DiagnosticLine> {
        self.lines
    }

    /// True when the run found nothing to report.
    ///
    /// A clean report still means the run completed; failures surface as `Err`
    /// from [`AuditPipeline::run`].
    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }

    /// Order-sensitive hash of the emitted lines, for comparing reruns.
    pub fn fingerprint(&self) -> u64 {
        stable_hash_lines(self.lines.iter().map(DiagnosticLine::as_str))
    }
}

/// Runs audit jobs over record sources.
#[derive(Clone, Debug, Default)]
pub struct AuditPipeline {
    config: AuditConfig,
}

/// Per-shard map result.
struct ShardOutput<V> {
    scanned: usize,
    mapped: usize,
    emissions: Vec<Emission<V>>,
}

impl AuditPipeline {
    /// Create a pipeline with `config`.
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run `job` over every record in `source`.
    ///
    /// Fails on invalid configuration, source errors, or a record the mapper
    /// rejects as corrupt; no partial report is produced in that case.
    pub fn run<J: AuditJob>(
        &self,
        job: &J,
        source: &dyn RecordSource,
    ) -> Result<AuditReport, AuditError> {
        self.config.validate()?;
        match self.config.max_workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|err| AuditError::Configuration(err.to_string()))?;
                pool.install(|| self.run_in_pool(job, source))
            }
            None => self.run_in_pool(job, source),
        }
    }

    fn run_in_pool<J: AuditJob>(
        &self,
        job: &J,
        source: &dyn RecordSource,
    ) -> Result<AuditReport, AuditError> {
        let started_at = Utc::now();
        let mapped = self.map_phase(job, source)?;
        let skew = key_skew(
            mapped
                .groups
                .iter()
                .map(|(shuffle, values)| (shuffle.key.as_str(), values.len())),
        );
        let keys_reduced = mapped.groups.len();
        let lines = Self::reduce_phase(job, &mapped.groups);
        let report = AuditReport {
            job: job.kind(),
            source_id: source.id().to_string(),
            started_at,
            finished_at: Utc::now(),
            records_scanned: mapped.records_scanned,
            records_mapped: mapped.records_mapped,
            emissions: mapped.emissions,
            keys_reduced,
            skew,
            lines,
        };
        info!(
            "[audit:pipeline] {} finished source='{}' records={} keys={} lines={}",
            report.job.as_str(),
            report.source_id,
            report.records_scanned,
            report.keys_reduced,
            report.lines.len()
        );
        Ok(report)
    }

    /// Map every shard of `source` and group the emissions by key.
    pub fn map_phase<J: AuditJob>(
        &self,
        job: &J,
        source: &dyn RecordSource,
    ) -> Result<MapOutput<J::Value>, AuditError> {
        let total = source.require_len()?;
        let shards = shard_ranges(total, self.config.shard_size);
        let report_progress = total >= PROGRESS_RECORD_THRESHOLD;
        info!(
            "[audit:pipeline] {} map start source='{}' records={} shards={}",
            job.kind().as_str(),
            source.id(),
            total,
            shards.len()
        );

        let outputs = shards
            .into_par_iter()
            .enumerate()
            .map(|(ordinal, range)| {
                let output = map_shard(job, source, range.clone())?;
                if report_progress {
                    info!(
                        "[audit:pipeline] shard {} ({}..{}) emitted {}",
                        ordinal,
                        range.start,
                        range.end,
                        output.emissions.len()
                    );
                } else {
                    debug!(
                        "[audit:pipeline] shard {} ({}..{}) emitted {}",
                        ordinal,
                        range.start,
                        range.end,
                        output.emissions.len()
                    );
                }
                Ok::<_, AuditError>(output)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let records_scanned = outputs.iter().map(|output| output.scanned).sum();
        let records_mapped = outputs.iter().map(|output| output.mapped).sum();
        let emissions = outputs.iter().map(|output| output.emissions.len()).sum();
        let groups = group_by_key(
            outputs
                .into_iter()
                .flat_map(|output| output.emissions)
                .map(|emission| (job.namespace(&emission.value), emission.key, emission.value)),
        );
        Ok(MapOutput {
            records_scanned,
            records_mapped,
            emissions,
            groups,
        })
    }

    /// Reduce every group independently and concatenate lines in key order.
    pub fn reduce_phase<J: AuditJob>(
        job: &J,
        groups: &IndexMap<ShuffleKey, Vec<J::Value>>,
    ) -> Vec<DiagnosticLine> {
        let entries: Vec<(&ShuffleKey, &Vec<J::Value>)> = groups.iter().collect();
        let per_key: Vec<Vec<DiagnosticLine>> = entries
            .into_par_iter()
            .map(|(shuffle, values)| {
                let mut out = Vec::new();
                job.reduce(&shuffle.key, values, &mut out);
                debug!(
                    "[audit:pipeline] reduced {}:'{}' values={} lines={}",
                    shuffle.namespace,
                    shuffle.key,
                    values.len(),
                    out.len()
                );
                out
            })
            .collect();
        per_key.into_iter().flatten().collect()
    }
}

fn map_shard<J: AuditJob>(
    job: &J,
    source: &dyn RecordSource,
    range: Range<usize>,
) -> Result<ShardOutput<J::Value>, AuditError> {
    let kinds = job.record_kinds();
    let mut output = ShardOutput {
        scanned: 0,
        mapped: 0,
        emissions: Vec::new(),
    };
    for idx in range {
        let Some(record) = source.record_at(idx)? else {
            continue;
        };
        output.scanned += 1;
        if !kinds.contains(&record.kind()) {
            continue;
        }
        output.mapped += 1;
        job.map(&record, &mut output.emissions).inspect_err(|err| {
            warn!(
                "[audit:pipeline] source '{}' record {} failed to map: {}",
                source.id(),
                idx,
                err
            );
        })?;
    }
    Ok(output)
}
