/// Opaque record identifier assigned by the storage layer.
/// Example: `exp1.Intro.submit.Equals(x)`
pub type RecordId = String;
/// Identifier for the source that supplied a batch of records.
/// Examples: `fixtures`, `stats_dump.jsonl`
pub type SourceId = String;
/// Identifier of the exploration (collection) owning a record.
/// Example: `exp1`
pub type ExplorationId = String;
/// Name of a state inside an exploration.
/// Examples: `Intro`, `What is 2+2?`
pub type StateName = String;
/// Name of an answer handler.
/// Examples: `submit`, `click`
pub type HandlerName = String;
/// Trailing rule descriptor of an answer-log id.
/// Examples: `Equals(x)`, `FuzzyMatches`, `Default`
pub type RuleString = String;
/// Key that groups map emissions for a single reduce invocation.
/// Examples: `exp1`, `State Counter ERROR`, `Equals`
pub type GroupKey = String;
/// Label separating independent key spaces inside one job.
/// Examples: `annotations`, `handler`, `rule`
pub type Namespace = &'static str;
/// Warning/log message text.
/// Example: `Less than 0: exp1.Intro -3`
pub type LogMessage = String;
