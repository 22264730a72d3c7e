//! Generation Pipeline - Single Entry Point
//!
//! Rows are processed in table order: validate, synthesize the recipe,
//! derive the loot table, ensure the spawn script. The aggregate script and
//! the tag patcher run once after the last row. A failing row stops the
//! run; artifacts already written stay on disk.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::{GeneratorConfig, OutputLayout};
use crate::hashing::{artifacts_hash, sha256_hex};
use crate::loot::{derive_loot_table, write_loot_table};
use crate::patcher::{patch_spawn_scripts, PatchedScript};
use crate::recipe::{write_recipe, PriorRecipe, RecipeSynthesizer};
use crate::scripts::{ensure_spawn_script, write_aggregate_script};
use crate::table::{ItemRow, ItemTable};
use crate::validation::{ValidationViolation, Validator, ViolationSeverity};
use crate::GENERATOR_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid hitbox '{0}': expected two comma-separated numbers")]
    InvalidHitbox(String),

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Item table error: {0}")]
    Table(#[from] csv::Error),

    #[error("Missing input field: {0}")]
    MissingInputField(String),

    #[error("{count} distinct recipe components, at most {max} symbols available")]
    KeyCapacityExceeded { count: usize, max: usize },

    #[error("Validation failed for {0}: {1}")]
    ValidationFailed(String, String),

    #[error("Deploy error: {0}")]
    Deploy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub id: String,
    pub recipe_path: PathBuf,
    pub recipe_hash: String,
    pub loot_table_path: PathBuf,
    pub loot_table_hash: String,
    pub reused_prior: bool,
    pub spawn_script_created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub generator_version: String,
    pub generated_at: DateTime<Utc>,
    pub namespace: String,
    pub input_hash: String,
    pub items: Vec<ItemReport>,
    pub aggregate_script: PathBuf,
    pub patched_scripts: Vec<PatchedScript>,
    pub violations: Vec<ValidationViolation>,
    /// Hash over the generated artifacts only, comparable across runs
    pub artifacts_hash: String,
}

/// The generation pipeline - runs every step over one item table
pub struct GenerationPipeline {
    config: GeneratorConfig,
    layout: OutputLayout,
    validator: Validator,
}

impl GenerationPipeline {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            layout: config.layout(),
            validator: Validator::new(config.failure_mode),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Read the configured input table and run every step.
    pub fn run(&self) -> Result<GenerationReport, PipelineError> {
        let bytes = fs::read(&self.config.input)?;
        let table = ItemTable::from_reader(bytes.as_slice())?;
        tracing::info!("Loaded {} row(s) from {}", table.len(), self.config.input.display());
        self.generate(&table, sha256_hex(&bytes))
    }

    pub fn generate(&self, table: &ItemTable, input_hash: String) -> Result<GenerationReport, PipelineError> {
        self.layout.create_dirs()?;

        let mut items = vec![];
        let mut violations = vec![];
        for row in table.rows() {
            let row = row?;
            violations.extend(self.check_row(&row)?);
            items.push(self.process_row(&row)?);
        }

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        let aggregate_script = self.layout.aggregate_script_path();
        write_aggregate_script(&aggregate_script, &self.config.namespace, &ids)?;

        let patched_scripts = self.patch_scripts()?;

        let mut report = GenerationReport {
            run_id: Uuid::new_v4().to_string(),
            generator_version: GENERATOR_VERSION.to_string(),
            generated_at: Utc::now(),
            namespace: self.config.namespace.clone(),
            input_hash,
            items,
            aggregate_script,
            patched_scripts,
            violations,
            artifacts_hash: String::new(),  // Computed after
        };
        report.artifacts_hash = artifacts_hash(&report.namespace, &report.items)?;

        Ok(report)
    }

    /// Run only the tag patcher over the spawn directory.
    pub fn patch_scripts(&self) -> Result<Vec<PatchedScript>, PipelineError> {
        if !self.layout.spawn_dir.is_dir() {
            tracing::warn!("No spawn scripts at {}", self.layout.spawn_dir.display());
            return Ok(vec![]);
        }
        Ok(patch_spawn_scripts(&self.layout.spawn_dir, &self.config.tag_marker())?)
    }

    fn check_row(&self, row: &ItemRow) -> Result<Vec<ValidationViolation>, PipelineError> {
        let validation = self.validator.validate(row);
        if !validation.valid {
            return Err(PipelineError::ValidationFailed(row.id.clone(), validation.summary()));
        }

        for v in &validation.violations {
            match v.severity {
                ViolationSeverity::Error | ViolationSeverity::Warning => {
                    tracing::warn!("{}: {}: {}", v.item_id, v.rule, v.message)
                }
                ViolationSeverity::Info => tracing::debug!("{}: {}: {}", v.item_id, v.rule, v.message),
            }
        }
        Ok(validation.violations)
    }

    fn process_row(&self, row: &ItemRow) -> Result<ItemReport, PipelineError> {
        let recipe_path = self.layout.recipe_path(&row.id);
        let prior = PriorRecipe::load(&recipe_path)?;

        let recipe = RecipeSynthesizer::new(&self.config).synthesize(row, prior.as_ref())?;
        let recipe_json = write_recipe(&recipe_path, &recipe)?;

        let loot_table_path = self.layout.loot_table_path(&row.id);
        let loot_table = derive_loot_table(&recipe.result)?;
        let loot_json = write_loot_table(&loot_table_path, &loot_table)?;

        let spawn_script_created = ensure_spawn_script(&self.layout.spawn_script_path(&row.id))?;

        tracing::info!("Generated: {}.json (recipe, loot table)", row.id);
        Ok(ItemReport {
            id: row.id.clone(),
            recipe_path,
            recipe_hash: sha256_hex(recipe_json.as_bytes()),
            loot_table_path,
            loot_table_hash: sha256_hex(loot_json.as_bytes()),
            reused_prior: prior.is_some(),
            spawn_script_created,
        })
    }
}

impl Default for GenerationPipeline {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
