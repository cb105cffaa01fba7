//! Distinct-id counting over `<prefix>-<id>:<rest>` lines

use std::collections::HashSet;

use super::{InterpretError, RuleResult};

/// Count distinct ids across all lines containing `-`.
///
/// The id is the segment after the first `-`, cut at the next `-` or `:`.
pub fn count_unique_ids(data: &[u8]) -> RuleResult {
    let content = std::str::from_utf8(data)
        .map_err(|e| InterpretError::malformed(format!("file is not valid UTF-8: {}", e)))?;

    let ids: HashSet<&str> = content.lines().filter_map(extract_id).collect();

    tracing::debug!("Found {} distinct ids", ids.len());
    Ok(ids.len().to_string())
}

fn extract_id(line: &str) -> Option<&str> {
    let segment = line.split('-').nth(1)?;
    let id = segment.split(':').next()?.trim();
    (!id.is_empty()).then_some(id)
}
