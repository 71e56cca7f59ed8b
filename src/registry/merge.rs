use crate::publisher::PublishedRecord;
use serde_json::Value;
use std::collections::HashSet;

/// Upsert `new_records` into `current` by logical id.
///
/// Existing entries whose `id` matches any new record are dropped, untouched
/// entries keep their position and extra fields, and the new records are
/// appended in publication order. When one run published the same id more
/// than once, only the last record survives.
pub fn merge_registry(
    current: Vec<Value>,
    new_records: &[PublishedRecord],
) -> Result<Vec<Value>, serde_json::Error> {
    let latest = dedupe_last_wins(new_records);
    let ids: HashSet<&str> = latest.iter().map(|r| r.logical_id.as_str()).collect();

    let mut merged: Vec<Value> = current
        .into_iter()
        .filter(|entry| entry_id(entry).is_none_or(|id| !ids.contains(id)))
        .collect();

    for record in latest {
        merged.push(serde_json::to_value(record)?);
    }
    Ok(merged)
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

fn dedupe_last_wins(records: &[PublishedRecord]) -> Vec<&PublishedRecord> {
    let mut seen = HashSet::new();
    let mut kept: Vec<&PublishedRecord> = records
        .iter()
        .rev()
        .filter(|r| seen.insert(r.logical_id.as_str()))
        .collect();
    kept.reverse();
    kept
}
