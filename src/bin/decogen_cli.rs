//! DecoGen CLI - datapack generation from the item table
//!
//! Commands: generate, patch, decode, deploy
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use decogen_core::{
    config::DEFAULT_CONFIG_FILE,
    recipe::parse_components,
    decode_pattern, deploy, FailureMode, GenerationPipeline, GeneratorConfig, KeyTable,
};

#[derive(Parser)]
#[command(name = "decogen-cli")]
#[command(about = "DecoGen CLI - Decoration Datapack Generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the generator config (JSON)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate recipes, loot tables and scripts from the item table
    Generate {
        /// Tab-separated item table
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Datapack root the data/ tree is written under
        #[arg(short, long)]
        output_root: Option<PathBuf>,

        /// Datapack namespace
        #[arg(short, long)]
        namespace: Option<String>,

        /// Report validation errors without stopping
        #[arg(long)]
        no_block: bool,
    },

    /// Add the parent tag to summon commands in spawn scripts
    Patch,

    /// Decode a numeric pattern against recipe keys
    Decode {
        /// Numeric pattern, e.g. 120034560
        #[arg(short, long)]
        pattern: String,

        /// Comma-separated recipe keys
        #[arg(short, long)]
        keys: String,
    },

    /// Mirror the datapack root into the destination folder
    Deploy {
        /// Destination folder; its contents are replaced
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },
}

fn initialize_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!(r#"{{"success": false, "error": "Failed to serialize output: {}"}}"#, e),
    }
}

fn failure(error: impl ToString) -> ExitCode {
    print_json(&serde_json::json!({
        "success": false,
        "error": error.to_string(),
    }));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logging(&cli.log_level);

    let mut config = match GeneratorConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => return failure(format!("Failed to load config: {}", e)),
    };

    match cli.command {
        Commands::Generate { input, output_root, namespace, no_block } => {
            if let Some(input) = input {
                config.input = input;
            }
            if let Some(output_root) = output_root {
                config.output_root = output_root;
            }
            if let Some(namespace) = namespace {
                config.namespace = namespace;
            }
            if no_block {
                config.failure_mode = FailureMode::Warn;
            }

            match GenerationPipeline::new(config).run() {
                Ok(report) => {
                    print_json(&serde_json::json!({
                        "success": true,
                        "report": report,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    failure(e)
                }
            }
        }

        Commands::Patch => match GenerationPipeline::new(config).patch_scripts() {
            Ok(patched) => {
                print_json(&serde_json::json!({
                    "success": true,
                    "patched_scripts": patched,
                }));
                ExitCode::SUCCESS
            }
            Err(e) => failure(e),
        },

        Commands::Decode { pattern, keys } => {
            let decoded = KeyTable::assign(parse_components(&keys, &config.key_namespace))
                .and_then(|key| decode_pattern(&pattern, &key).map(|grid| (key, grid)));
            match decoded {
                Ok((key, grid)) => {
                    print_json(&serde_json::json!({
                        "key": key,
                        "pattern": grid,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => failure(e),
            }
        }

        Commands::Deploy { destination } => {
            let Some(destination) = destination.or(config.deploy_destination.clone()) else {
                return failure("No destination given and none configured");
            };
            match deploy(&config.output_root, &destination) {
                Ok(report) => {
                    print_json(&serde_json::json!({
                        "success": true,
                        "deploy": report,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => failure(e),
            }
        }
    }
}
