//! DecoGen Core - Decoration Datapack Generator
//!
//! # The Rules
//! 1. The Table Is Truth
//! 2. Symbols Once Assigned Stay Assigned
//! 3. Loot Follows Recipe
//! 4. Spawn Scripts Belong To Their Authors
//! 5. Reports Enable Comparison

pub mod pattern;
pub mod recipe;
pub mod loot;
pub mod scripts;
pub mod patcher;
pub mod table;
pub mod config;
pub mod validation;
pub mod hashing;
pub mod deploy;
pub mod pipeline;

pub use pattern::{decode_pattern, infer_shape, GridShape, KeyTable, PatternGrid};
pub use recipe::{RecipeArtifact, RecipeSynthesizer, ResultDescriptor, PriorRecipe};
pub use loot::{derive_loot_table, LootTable};
pub use patcher::{patch_line, patch_spawn_scripts, PatchedScript};
pub use table::{ItemRow, ItemTable};
pub use config::{GeneratorConfig, OutputLayout, FailureMode};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::{artifacts_hash, canonical_json, compute_report_hash, sha256_hex};
pub use deploy::{deploy, DeployReport};
pub use pipeline::{GenerationPipeline, GenerationReport, ItemReport, PipelineError};

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
