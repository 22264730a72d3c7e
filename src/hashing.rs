//! Artifact Hashing
//!
//! Each run records the SHA-256 of every recipe and loot table it wrote.
//! The run as a whole gets one digest over those, taken from a key-sorted
//! JSON rendering so it does not depend on map insertion order.

use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::pipeline::ItemReport;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted(serde_json::to_value(value)?))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

pub fn compute_report_hash<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(report)?.as_bytes()))
}

/// Digest of a namespace's generated artifacts. Run id, timestamp and paths
/// stay out, so identical inputs hash the same across runs and checkouts.
pub fn artifacts_hash(namespace: &str, items: &[ItemReport]) -> Result<String, serde_json::Error> {
    let artifacts: Vec<Value> = items
        .iter()
        .map(|i| json!({ "id": i.id, "recipe": i.recipe_hash, "loot_table": i.loot_table_hash }))
        .collect();
    compute_report_hash(&json!({ "namespace": namespace, "items": artifacts }))
}
