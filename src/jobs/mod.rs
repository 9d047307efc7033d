/// Handler and rule usage audit over answer logs.
pub mod answers;
/// Counter and annotation consistency audit.
pub mod statistics;

pub use answers::{AnswerValue, AnswersAudit, ReduceKind};
pub use statistics::{AnnotationValue, StatisticsAudit, StatisticsValue};
