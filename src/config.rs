//! Generator Configuration - Layout and Fixed Values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineError;

pub const DEFAULT_CONFIG_FILE: &str = "decogen.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Datapack namespace the artifacts are generated under
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Root of the datapack tree (`<outputRoot>/data/<namespace>/...`)
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Tab-separated item table
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Namespace applied to recipe keys that carry none
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    #[serde(default = "default_name_suffix")]
    pub name_suffix: String,
    #[serde(default = "default_name_color")]
    pub name_color: String,
    #[serde(default = "default_base_item")]
    pub base_item: String,
    /// Tag inserted into summon commands of spawn scripts
    #[serde(default = "default_parent_tag")]
    pub parent_tag: String,
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub deploy_destination: Option<PathBuf>,
}

fn default_namespace() -> String { "halloweendeco".to_string() }
fn default_output_root() -> PathBuf { PathBuf::from("src") }
fn default_input() -> PathBuf { PathBuf::from("scripts/items.csv") }
fn default_key_namespace() -> String { "minecraft".to_string() }
fn default_name_suffix() -> String { "Decoration".to_string() }
fn default_name_color() -> String { "#ffbf00".to_string() }
fn default_base_item() -> String { "minecraft:player_head".to_string() }
fn default_parent_tag() -> String { "deco_parent".to_string() }

/// What a row validation error does to the run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Block,
    Warn,
    Log,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            output_root: default_output_root(),
            input: default_input(),
            key_namespace: default_key_namespace(),
            name_suffix: default_name_suffix(),
            name_color: default_name_color(),
            base_item: default_base_item(),
            parent_tag: default_parent_tag(),
            failure_mode: FailureMode::default(),
            deploy_destination: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_root, &self.namespace)
    }

    /// `Tags:[<tag>]`, the marker the patcher looks for
    pub fn tag_marker(&self) -> String {
        format!("Tags:[{}]", self.parent_tag)
    }
}

/// Output areas of one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub recipe_dir: PathBuf,
    pub loot_table_dir: PathBuf,
    pub function_dir: PathBuf,
    pub spawn_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_root: &Path, namespace: &str) -> Self {
        let base = output_root.join("data").join(namespace);
        let function_dir = base.join("function");
        Self {
            recipe_dir: base.join("recipe"),
            loot_table_dir: base.join("loot_table"),
            spawn_dir: function_dir.join("spawn"),
            function_dir,
        }
    }

    pub fn create_dirs(&self) -> Result<(), std::io::Error> {
        for dir in [&self.recipe_dir, &self.loot_table_dir, &self.function_dir, &self.spawn_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn recipe_path(&self, id: &str) -> PathBuf {
        self.recipe_dir.join(format!("{}.json", id))
    }

    pub fn loot_table_path(&self, id: &str) -> PathBuf {
        self.loot_table_dir.join(format!("{}.json", id))
    }

    pub fn spawn_script_path(&self, id: &str) -> PathBuf {
        self.spawn_dir.join(format!("{}.mcfunction", id))
    }

    pub fn aggregate_script_path(&self) -> PathBuf {
        self.function_dir.join("give_all_recipes.mcfunction")
    }
}
