/// Constants used when parsing composite answer-log identifiers.
pub mod key_parser {
    /// Segment delimiter inside composite identifiers.
    pub const SEGMENT_DELIMITER: char = '.';
}

/// Constants used by the rule-descriptor classifier.
pub mod rules {
    /// Rule descriptor emitted for fuzzy-match rules.
    pub const FUZZY_RULE: &str = "FuzzyMatches";
    /// Rule descriptor emitted for default (fallthrough) rules.
    pub const DEFAULT_RULE: &str = "Default";
    /// Opening delimiter of a parameterized rule's argument list.
    pub const ARGS_OPEN: char = '(';
    /// Closing delimiter of a parameterized rule's argument list.
    pub const ARGS_CLOSE: char = ')';
}

/// Constants used by the statistics audit job.
pub mod statistics {
    /// Shared key under which negative state counters are reported.
    pub const STATE_COUNTER_ERROR_KEY: &str = "State Counter ERROR";
    /// Serialized form of the aggregate version tag.
    pub const VERSION_ALL: &str = "all";
    /// Namespace for exploration-keyed annotation groups.
    pub const ANNOTATION_NAMESPACE: &str = "annotations";
    /// Namespace for the negative counter channel.
    pub const COUNTER_NAMESPACE: &str = "state_counter";
}

/// Constants used by the answers audit job.
pub mod answers {
    /// Namespace for handler-name keyed groups.
    pub const HANDLER_NAMESPACE: &str = "handler";
    /// Namespace for rule keyed groups (fuzzy, default, standard, malformed).
    pub const RULE_NAMESPACE: &str = "rule";
    /// Line emitted when a group mixes reduce kinds.
    pub const MIXED_KIND_ERROR: &str = "Internal error 1";
    /// Line emitted when no reduce kind could be established for a group.
    pub const UNKNOWN_KIND_ERROR: &str = "Internal error 2";
}

/// Constants used by the pipeline runner.
pub mod pipeline {
    /// Default number of record indices mapped by one shard worker.
    pub const DEFAULT_SHARD_SIZE: usize = 512;
    /// Record count above which shard progress is logged at info level.
    pub const PROGRESS_RECORD_THRESHOLD: usize = 10_000;
}
