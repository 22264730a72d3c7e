//! Loot Table Deriver
//!
//! Pure function of a recipe's result block. Loot tables are never merged
//! with a previous version.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::pipeline::PipelineError;
use crate::recipe::ResultDescriptor;

pub const ENTRY_TYPE_ITEM: &str = "minecraft:item";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub pools: Vec<LootPool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootPool {
    pub rolls: u32,
    pub entries: Vec<LootEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<LootFunction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function")]
pub enum LootFunction {
    #[serde(rename = "minecraft:set_components")]
    SetComponents { components: Map<String, Value> },
    #[serde(rename = "minecraft:set_count")]
    SetCount { count: u32 },
}

pub fn derive_loot_table(result: &ResultDescriptor) -> Result<LootTable, PipelineError> {
    if result.id.trim().is_empty() {
        return Err(PipelineError::InvalidResult("result has no item id".to_string()));
    }
    if result.count == 0 {
        return Err(PipelineError::InvalidResult(format!(
            "result count for {} must be positive",
            result.id
        )));
    }

    let mut functions = vec![];
    if !result.components.is_empty() {
        functions.push(LootFunction::SetComponents {
            components: result.components.clone(),
        });
    }
    if result.count > 1 {
        functions.push(LootFunction::SetCount { count: result.count });
    }

    Ok(LootTable {
        pools: vec![LootPool {
            rolls: 1,
            entries: vec![LootEntry {
                entry_type: ENTRY_TYPE_ITEM.to_string(),
                name: result.id.clone(),
                functions,
            }],
        }],
    })
}

/// Overwrite the loot table at `path`; returns the written text.
pub fn write_loot_table(path: &Path, table: &LootTable) -> Result<String, PipelineError> {
    let content = serde_json::to_string_pretty(table)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(count: u32, components: Value) -> ResultDescriptor {
        ResultDescriptor {
            components: components.as_object().cloned().unwrap_or_default(),
            count,
            id: "minecraft:player_head".to_string(),
        }
    }

    #[test]
    fn test_plain_result_has_no_functions() {
        let table = derive_loot_table(&result(1, json!({}))).unwrap();
        let entry = &table.pools[0].entries[0];
        assert!(entry.functions.is_empty());

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            json!({"pools": [{"rolls": 1, "entries": [{"type": "minecraft:item", "name": "minecraft:player_head"}]}]})
        );
    }

    #[test]
    fn test_count_only() {
        let table = derive_loot_table(&result(3, json!({}))).unwrap();
        assert_eq!(table.pools[0].entries[0].functions, vec![LootFunction::SetCount { count: 3 }]);
    }

    #[test]
    fn test_components_then_count() {
        let table = derive_loot_table(&result(2, json!({"minecraft:custom_data": {"deco": true}}))).unwrap();
        let value = serde_json::to_value(&table.pools[0].entries[0]).unwrap();
        assert_eq!(
            value["functions"],
            json!([
                {"function": "minecraft:set_components", "components": {"minecraft:custom_data": {"deco": true}}},
                {"function": "minecraft:set_count", "count": 2}
            ])
        );
    }

    #[test]
    fn test_invalid_result() {
        assert!(matches!(derive_loot_table(&result(0, json!({}))), Err(PipelineError::InvalidResult(_))));
        let mut no_id = result(1, json!({}));
        no_id.id.clear();
        assert!(derive_loot_table(&no_id).is_err());
    }
}
