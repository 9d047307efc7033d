//! Rule-descriptor classification for answer-log identifiers.

use crate::constants::rules::{ARGS_CLOSE, ARGS_OPEN, DEFAULT_RULE, FUZZY_RULE};

/// Category of a trailing rule descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleClass {
    /// Fuzzy-match rule (`FuzzyMatches`).
    Fuzzy,
    /// Fallthrough rule (`Default`).
    Default,
    /// Parameterized rule `<rule_type>(<args>)`.
    Standard { rule_type: String, args: String },
    /// Anything else, usually a truncated descriptor.
    Malformed,
}

/// Classify a rule descriptor. Total: unrecognized shapes are `Malformed`.
pub fn classify_rule(rule_str: &str) -> RuleClass {
    if rule_str == FUZZY_RULE {
        return RuleClass::Fuzzy;
    }
    if rule_str == DEFAULT_RULE {
        return RuleClass::Default;
    }
    match (rule_str.find(ARGS_OPEN), rule_str.strip_suffix(ARGS_CLOSE)) {
        (Some(open), Some(body)) => RuleClass::Standard {
            rule_type: rule_str[..open].to_string(),
            args: body[open + ARGS_OPEN.len_utf8()..].to_string(),
        },
        _ => RuleClass::Malformed,
    }
}
