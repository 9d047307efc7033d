//! Composite answer-log identifier parsing.
//!
//! Identifiers have the shape `<exploration>.<state>.<handler>.<rule>`. The
//! first three segments may carry the delimiter as literal content: a run of
//! `N > 1` consecutive delimiters stands for `N - 1` literal delimiters and
//! does not end the segment. Only a lone delimiter is a segment boundary. The
//! trailing rule descriptor is everything after the third boundary, verbatim.

use crate::constants::key_parser::SEGMENT_DELIMITER;
use crate::errors::AuditError;
use crate::types::{ExplorationId, HandlerName, RuleString, StateName};

/// Structured view over a composite answer-log identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeId {
    /// Owning exploration, unescaped.
    pub exploration_id: ExplorationId,
    /// State name, unescaped.
    pub state_name: StateName,
    /// Handler name, unescaped.
    pub handler_name: HandlerName,
    /// Everything after the handler boundary, verbatim.
    pub rule_str: RuleString,
}

/// Split the next unescaped segment off `input`.
///
/// Returns the segment (with escaped delimiter runs collapsed to their literal
/// content) and the remainder after the boundary, or `None` when `input` has
/// no lone delimiter left.
pub fn next_segment(input: &str) -> Option<(String, &str)> {
    let mut segment = String::new();
    let mut cursor = 0usize;
    loop {
        let first = cursor + input[cursor..].find(SEGMENT_DELIMITER)?;
        let run = consecutive_delimiter_count(input, first);
        segment.push_str(&input[cursor..first]);
        if run == 1 {
            return Some((segment, &input[first + SEGMENT_DELIMITER.len_utf8()..]));
        }
        segment.extend(std::iter::repeat_n(SEGMENT_DELIMITER, run - 1));
        cursor = first + run * SEGMENT_DELIMITER.len_utf8();
    }
}

/// Parse `id` into exploration, state, handler, and rule descriptor.
pub fn parse_composite_id(id: &str) -> Result<CompositeId, AuditError> {
    let mut rest = id;
    let mut take = |label: &str| -> Result<String, AuditError> {
        let (segment, remainder) =
            next_segment(rest).ok_or_else(|| AuditError::MalformedIdentifier {
                id: id.to_string(),
                reason: format!("no '{SEGMENT_DELIMITER}' boundary after {label}"),
            })?;
        rest = remainder;
        Ok(segment)
    };
    let exploration_id = take("exploration id")?;
    let state_name = take("state name")?;
    let handler_name = take("handler name")?;
    Ok(CompositeId {
        exploration_id,
        state_name,
        handler_name,
        rule_str: rest.to_string(),
    })
}

/// Escape literal delimiters in one leading segment.
///
/// Returns `None` for content the escaping cannot represent unambiguously:
/// empty segments and segments that begin or end with the delimiter.
pub fn escape_segment(segment: &str) -> Option<String> {
    if segment.is_empty()
        || segment.starts_with(SEGMENT_DELIMITER)
        || segment.ends_with(SEGMENT_DELIMITER)
    {
        return None;
    }
    let mut escaped = String::with_capacity(segment.len() + 2);
    let mut in_run = false;
    for ch in segment.chars() {
        if ch == SEGMENT_DELIMITER && !in_run {
            escaped.push(SEGMENT_DELIMITER);
        }
        in_run = ch == SEGMENT_DELIMITER;
        escaped.push(ch);
    }
    Some(escaped)
}

/// Build a composite identifier that [`parse_composite_id`] maps back to its parts.
pub fn compose_identifier(
    exploration_id: &str,
    state_name: &str,
    handler_name: &str,
    rule_str: &str,
) -> Result<String, AuditError> {
    let mut id = String::new();
    for segment in [exploration_id, state_name, handler_name] {
        let escaped = escape_segment(segment).ok_or_else(|| AuditError::MalformedIdentifier {
            id: segment.to_string(),
            reason: "segment cannot be escaped".into(),
        })?;
        id.push_str(&escaped);
        id.push(SEGMENT_DELIMITER);
    }
    if rule_str.starts_with(SEGMENT_DELIMITER) {
        return Err(AuditError::MalformedIdentifier {
            id: rule_str.to_string(),
            reason: "rule descriptor begins with the delimiter".into(),
        });
    }
    id.push_str(rule_str);
    Ok(id)
}

fn consecutive_delimiter_count(input: &str, start: usize) -> usize {
    input[start..]
        .chars()
        .take_while(|ch| *ch == SEGMENT_DELIMITER)
        .count()
}
