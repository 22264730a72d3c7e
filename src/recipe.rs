//! Recipe Synthesizer - Row to Shaped Crafting Recipe
//!
//! A recipe is rebuilt from its row on every run. Three fields survive
//! from the previous artifact at the same path: the key table, the custom
//! name text and the deco id. Nothing else is carried forward.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::config::GeneratorConfig;
use crate::pattern::{decode_pattern, KeyTable, PatternGrid};
use crate::pipeline::PipelineError;
use crate::table::ItemRow;

pub const RECIPE_TYPE: &str = "minecraft:crafting_shaped";
pub const TAG_REFERENCE_MARKER: char = '#';

pub const COMPONENT_PROFILE: &str = "minecraft:profile";
pub const COMPONENT_ATTRIBUTE_MODIFIERS: &str = "minecraft:attribute_modifiers";
pub const COMPONENT_TOOLTIP_DISPLAY: &str = "minecraft:tooltip_display";
pub const COMPONENT_EQUIPPABLE: &str = "minecraft:equippable";
pub const COMPONENT_CUSTOM_DATA: &str = "minecraft:custom_data";
pub const COMPONENT_CUSTOM_NAME: &str = "minecraft:custom_name";
pub const COMPONENT_LORE: &str = "minecraft:lore";

const INTERACTION_RANGE_MODIFIER: i64 = -5;
const EQUIP_SLOT: &str = "chest";
const EQUIP_SOUND: &str = "minecraft:ui.cartography_table.take_result";
const EQUIP_ENTITY: &str = "minecraft:armor_stand";
const LORE_COLOR: &str = "dark_gray";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeArtifact {
    #[serde(rename = "type")]
    pub recipe_type: String,
    pub key: KeyTable,
    pub pattern: PatternGrid,
    pub result: ResultDescriptor,
    pub show_notification: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDescriptor {
    #[serde(default)]
    pub components: Map<String, Value>,
    pub count: u32,
    pub id: String,
}

impl RecipeArtifact {
    pub fn custom_name(&self) -> Option<&str> {
        self.result.components.get(COMPONENT_CUSTOM_NAME)?.get("text")?.as_str()
    }

    pub fn deco_id(&self) -> Option<&str> {
        self.result.components.get(COMPONENT_CUSTOM_DATA)?.get("deco_id")?.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f64,
    pub height: f64,
}

/// Fields carried over from a previously generated recipe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorRecipe {
    pub key: Option<KeyTable>,
    pub custom_name: Option<String>,
    pub deco_id: Option<String>,
}

impl PriorRecipe {
    /// Read the recipe at `path`, if any.
    pub fn load(path: &Path) -> Result<Option<Self>, PipelineError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        let prior = Self::from_value(&value);

        if prior.key.is_none() || prior.custom_name.is_none() || prior.deco_id.is_none() {
            tracing::warn!(
                "{} is missing carried fields, regenerating them",
                path.display()
            );
        }
        Ok(Some(prior))
    }

    pub fn from_value(value: &Value) -> Self {
        let components = value.pointer("/result/components");
        let text_at = |component: &str, field: &str| {
            components
                .and_then(|c| c.get(component))
                .and_then(|c| c.get(field))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            key: value
                .get("key")
                .and_then(|k| serde_json::from_value(k.clone()).ok()),
            custom_name: text_at(COMPONENT_CUSTOM_NAME, "text"),
            deco_id: text_at(COMPONENT_CUSTOM_DATA, "deco_id"),
        }
    }
}

/// Prefix `token` with `default_namespace` unless it already names one or
/// is a tag reference.
pub fn normalize_component(token: &str, default_namespace: &str) -> String {
    let token = token.trim();
    if token.contains(':') || token.starts_with(TAG_REFERENCE_MARKER) {
        token.to_string()
    } else {
        format!("{}:{}", default_namespace, token)
    }
}

pub fn parse_components(recipe_keys: &str, default_namespace: &str) -> Vec<String> {
    recipe_keys
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| normalize_component(t, default_namespace))
        .collect()
}

pub fn parse_hitbox(text: &str) -> Result<Hitbox, PipelineError> {
    let invalid = || PipelineError::InvalidHitbox(text.to_string());

    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [width, height] = parts.as_slice() else {
        return Err(invalid());
    };
    let width: f64 = width.parse().map_err(|_| invalid())?;
    let height: f64 = height.parse().map_err(|_| invalid())?;
    if !width.is_finite() || !height.is_finite() {
        return Err(invalid());
    }

    Ok(Hitbox { width, height })
}

/// `witch_hat` -> `Witch Hat <suffix>`
pub fn default_custom_name(id: &str, suffix: &str) -> String {
    let mut name = String::with_capacity(id.len() + suffix.len() + 1);
    let mut prev_is_letter = false;
    for c in id.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            name.push(c);
            prev_is_letter = false;
        }
    }
    name.push(' ');
    name.push_str(suffix);
    name
}

pub struct RecipeSynthesizer<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> RecipeSynthesizer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(
        &self,
        row: &ItemRow,
        prior: Option<&PriorRecipe>,
    ) -> Result<RecipeArtifact, PipelineError> {
        let prior = prior.cloned().unwrap_or_default();

        let key = match prior.key {
            Some(key) => key,
            None => KeyTable::assign(parse_components(&row.recipe_keys, &self.config.key_namespace))?,
        };
        let custom_name = prior
            .custom_name
            .unwrap_or_else(|| default_custom_name(&row.id, &self.config.name_suffix));
        let deco_id = prior.deco_id.unwrap_or_else(|| row.id.clone());

        let pattern = decode_pattern(&row.recipe_pattern, &key)?;
        let hitbox = parse_hitbox(&row.hitbox)?;

        Ok(RecipeArtifact {
            recipe_type: RECIPE_TYPE.to_string(),
            key,
            pattern,
            result: ResultDescriptor {
                components: self.result_components(row, &custom_name, &deco_id, hitbox),
                count: 1,
                id: self.config.base_item.clone(),
            },
            show_notification: false,
        })
    }

    fn result_components(
        &self,
        row: &ItemRow,
        custom_name: &str,
        deco_id: &str,
        hitbox: Hitbox,
    ) -> Map<String, Value> {
        let mut components = Map::new();
        components.insert(
            COMPONENT_PROFILE.to_string(),
            json!({ "properties": [{ "name": "textures", "value": row.texture }] }),
        );
        components.insert(
            COMPONENT_ATTRIBUTE_MODIFIERS.to_string(),
            json!([{
                "type": "minecraft:block_interaction_range",
                "id": "block_interaction_range",
                "amount": INTERACTION_RANGE_MODIFIER,
                "operation": "add_multiplied_total",
                "slot": "hand"
            }]),
        );
        components.insert(
            COMPONENT_TOOLTIP_DISPLAY.to_string(),
            json!({ "hidden_components": [COMPONENT_ATTRIBUTE_MODIFIERS] }),
        );
        components.insert(
            COMPONENT_EQUIPPABLE.to_string(),
            json!({
                "slot": EQUIP_SLOT,
                "equip_sound": EQUIP_SOUND,
                "allowed_entities": EQUIP_ENTITY
            }),
        );
        components.insert(
            COMPONENT_CUSTOM_DATA.to_string(),
            json!({
                "deco": true,
                "deco_id": deco_id,
                "deco_width": hitbox.width,
                "deco_height": hitbox.height
            }),
        );
        components.insert(
            COMPONENT_CUSTOM_NAME.to_string(),
            json!({
                "text": custom_name,
                "color": self.config.name_color,
                "bold": false,
                "italic": false
            }),
        );
        components.insert(
            COMPONENT_LORE.to_string(),
            json!([
                [lore_line(&format!("Model by {}", row.author))],
                [lore_line(&row.url)]
            ]),
        );
        components
    }
}

fn lore_line(text: &str) -> Value {
    json!({ "text": text, "color": LORE_COLOR, "bold": false, "italic": false })
}

/// Overwrite the recipe at `path`; returns the written text.
/// Ids with `/` land in subdirectories, which are created on demand.
pub fn write_recipe(path: &Path, recipe: &RecipeArtifact) -> Result<String, PipelineError> {
    let content = serde_json::to_string_pretty(recipe)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &content)?;
    Ok(content)
}
