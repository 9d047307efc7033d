use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::AuditConfig;
use crate::constants::pipeline::DEFAULT_SHARD_SIZE;
use crate::job::JobKind;
use crate::jobs::{AnswersAudit, StatisticsAudit};
use crate::pipeline::{AuditPipeline, AuditReport};
use crate::source::{JsonLinesSource, RecordSource};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JobArg {
    Statistics,
    Answers,
}

impl From<JobArg> for JobKind {
    fn from(value: JobArg) -> Self {
        match value {
            JobArg::Statistics => JobKind::StatisticsAudit,
            JobArg::Answers => JobKind::AnswersAudit,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "audit",
    disable_help_subcommand = true,
    about = "Run a statistics or answers audit over a JSON-lines record dump",
    long_about = "Map every record in the dump, group emissions by key, reduce each key, and print one diagnostic line per finding.",
    after_help = "No output lines means the audit ran and found no inconsistencies."
)]
/// CLI for the `audit` runner.
///
/// Common usage:
/// - Statistics audit: `--job statistics --input stats.jsonl`
/// - Answers audit as JSON: `--job answers --input answers.jsonl --json`
struct AuditCli {
    #[arg(long, value_enum, help = "Audit job to run")]
    job: JobArg,
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON-lines file with one kind-tagged record per line"
    )]
    input: PathBuf,
    #[arg(
        long = "shard-size",
        default_value_t = DEFAULT_SHARD_SIZE,
        value_parser = parse_positive_usize,
        help = "Records mapped per shard worker"
    )]
    shard_size: usize,
    #[arg(
        long,
        value_parser = parse_positive_usize,
        help = "Optional worker thread cap (defaults to one per core)"
    )]
    workers: Option<usize>,
    #[arg(long, help = "Print the full report as JSON instead of plain lines")]
    json: bool,
}

/// Parse CLI args and run the selected audit, printing its report to stdout.
pub fn run_audit_cli<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<AuditCli, _>(std::iter::once("audit".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = AuditConfig::default().with_shard_size(cli.shard_size);
    config.max_workers = cli.workers;
    let source = JsonLinesSource::open(&cli.input)?;
    let report = run_job(cli.job.into(), &AuditPipeline::new(config), &source)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Run the job named by `kind` with `pipeline`.
pub fn run_job(
    kind: JobKind,
    pipeline: &AuditPipeline,
    source: &dyn RecordSource,
) -> Result<AuditReport, crate::AuditError> {
    match kind {
        JobKind::StatisticsAudit => pipeline.run(&StatisticsAudit, source),
        JobKind::AnswersAudit => pipeline.run(&AnswersAudit, source),
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("expected a positive integer, got '{raw}'"))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_usize_rejects_zero_and_garbage() {
        assert_eq!(parse_positive_usize("8"), Ok(8));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("many").is_err());
    }

    #[test]
    fn cli_parses_job_and_defaults() {
        let cli = parse_cli::<AuditCli, _>(["audit", "--job", "answers", "--input", "dump.jsonl"])
            .unwrap()
            .unwrap();
        assert!(matches!(cli.job, JobArg::Answers));
        assert_eq!(cli.shard_size, DEFAULT_SHARD_SIZE);
        assert_eq!(cli.workers, None);
        assert!(!cli.json);
    }

    #[test]
    fn cli_help_returns_none() {
        let parsed = parse_cli::<AuditCli, _>(["audit", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn cli_requires_input() {
        assert!(parse_cli::<AuditCli, _>(["audit", "--job", "statistics"]).is_err());
    }
}
