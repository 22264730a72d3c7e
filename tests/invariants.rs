//! Contract Invariant Tests
//!
//! These tests verify the guarantees a datapack author relies on between runs.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::Value;

use decogen_core::{
    decode_pattern, derive_loot_table, infer_shape, patcher::patch_content, FailureMode,
    GenerationPipeline, GeneratorConfig, ItemTable, KeyTable, PipelineError,
};

const HEADER: &str = "id\trecipe keys\trecipe pattern\ttexture\thitbox\tauthor\turl";
const MARKER: &str = "Tags:[deco_parent]";

// {"textures":{"SKIN":{"url":"http://textures.minecraft.net/texture/abc"}}}
const TEXTURE: &str = "eyJ0ZXh0dXJlcyI6eyJTS0lOIjp7InVybCI6Imh0dHA6Ly90ZXh0dXJlcy5taW5lY3JhZnQubmV0L3RleHR1cmUvYWJjIn19fQ==";

fn create_config(root: &Path) -> GeneratorConfig {
    GeneratorConfig {
        output_root: root.join("src"),
        input: root.join("items.csv"),
        ..GeneratorConfig::default()
    }
}

fn row(id: &str, keys: &str, pattern: &str, hitbox: &str, author: &str) -> String {
    format!("{}\t{}\t{}\t{}\t{}\t{}\thttps://example.com/{}", id, keys, pattern, TEXTURE, hitbox, author, id)
}

fn write_table(root: &Path, rows: &[String]) {
    let mut content = String::from(HEADER);
    for r in rows {
        content.push('\n');
        content.push_str(r);
    }
    content.push('\n');
    fs::write(root.join("items.csv"), content).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn invariant_example_pattern_decodes() {
    let keys = KeyTable::assign(["minecraft:stick", "minecraft:stone"]).unwrap();
    assert_eq!(keys.get("#"), Some("minecraft:stick"));
    assert_eq!(keys.get("A"), Some("minecraft:stone"));

    // Digits beyond the two keys are out of range.
    assert!(matches!(decode_pattern("120034560", &keys), Err(PipelineError::InvalidPattern(_))));

    let grid = decode_pattern("120021000", &keys).unwrap();
    assert_eq!(grid.rows(), &["#A ", " A#", "   "]);
}

#[test]
fn invariant_full_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_table(dir.path(), &[
        row("witch_hat", "black_wool, stick", "111121000", "0.5, 0.5", "Anna"),
        row("bat", "black_wool", "101010", "0.25, 0.25", "Bo"),
    ]);

    let pipeline = GenerationPipeline::new(create_config(dir.path()));
    let report = pipeline.run().unwrap();
    let layout = pipeline.layout();

    assert_eq!(report.items.len(), 2);
    assert!(report.items.iter().all(|i| i.spawn_script_created && !i.reused_prior));

    let recipe = read_json(&layout.recipe_path("witch_hat"));
    assert_eq!(recipe["key"]["#"], "minecraft:black_wool");
    assert_eq!(recipe["pattern"], serde_json::json!(["###", "#A#", "   "]));
    assert_eq!(recipe["result"]["components"]["minecraft:custom_name"]["text"], "Witch Hat Decoration");

    let loot = read_json(&layout.loot_table_path("bat"));
    assert_eq!(loot["pools"][0]["entries"][0]["name"], "minecraft:player_head");
    assert_eq!(
        loot["pools"][0]["entries"][0]["functions"][0]["components"],
        read_json(&layout.recipe_path("bat"))["result"]["components"]
    );

    assert_eq!(fs::read_to_string(layout.spawn_script_path("bat")).unwrap(), "");
    assert_eq!(
        fs::read_to_string(layout.aggregate_script_path()).unwrap(),
        "recipe give @a halloweendeco:witch_hat\nrecipe give @a halloweendeco:bat\n"
    );
}

#[test]
fn invariant_merge_keeps_keys_name_and_deco_id() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    let layout = config.layout();

    write_table(dir.path(), &[row("pumpkin", "pumpkin, torch", "111121111", "1, 1", "Anna")]);
    GenerationPipeline::new(config.clone()).run().unwrap();

    // Hand edits to the carried fields must survive regeneration.
    let recipe_path = layout.recipe_path("pumpkin");
    let mut recipe = read_json(&recipe_path);
    recipe["key"] = serde_json::json!({ "P": "minecraft:carved_pumpkin", "T": "minecraft:torch" });
    recipe["result"]["components"]["minecraft:custom_name"]["text"] = "Grinning Pumpkin".into();
    recipe["result"]["components"]["minecraft:custom_data"]["deco_id"] = "pumpkin_v1".into();
    fs::write(&recipe_path, serde_json::to_string_pretty(&recipe).unwrap()).unwrap();

    write_table(dir.path(), &[row("pumpkin", "melon, torch", "212000000", "2, 3", "Bo")]);
    let report = GenerationPipeline::new(config.clone()).run().unwrap();
    assert!(report.items[0].reused_prior);

    let first = read_json(&recipe_path);
    let components = &first["result"]["components"];
    assert_eq!(first["key"], serde_json::json!({ "P": "minecraft:carved_pumpkin", "T": "minecraft:torch" }));
    assert_eq!(first["pattern"], serde_json::json!(["TPT", "   ", "   "]));
    assert_eq!(components["minecraft:custom_name"]["text"], "Grinning Pumpkin");
    assert_eq!(components["minecraft:custom_data"]["deco_id"], "pumpkin_v1");
    assert_eq!(components["minecraft:custom_data"]["deco_width"], 2.0);
    assert_eq!(components["minecraft:custom_data"]["deco_height"], 3.0);
    assert_eq!(components["minecraft:lore"][0][0]["text"], "Model by Bo");

    // Idempotent on unchanged input.
    let before = fs::read_to_string(&recipe_path).unwrap();
    GenerationPipeline::new(config).run().unwrap();
    assert_eq!(fs::read_to_string(&recipe_path).unwrap(), before);
}

#[test]
fn invariant_spawn_scripts_preserved_and_patched() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    let layout = config.layout();
    write_table(dir.path(), &[row("ghost", "white_wool", "1", "1, 2", "Anna")]);

    GenerationPipeline::new(config.clone()).run().unwrap();
    let script = layout.spawn_script_path("ghost");
    fs::write(&script, "summon armor_stand ~ ~ ~ {CustomName:\"x\"}\nsay boo\n").unwrap();

    let report = GenerationPipeline::new(config.clone()).run().unwrap();
    assert!(!report.items[0].spawn_script_created);
    assert_eq!(report.patched_scripts.len(), 1);
    let patched = fs::read_to_string(&script).unwrap();
    assert_eq!(patched, "summon armor_stand ~ ~ ~ {Tags:[deco_parent],CustomName:\"x\"}\nsay boo\n");

    let report = GenerationPipeline::new(config).run().unwrap();
    assert!(report.patched_scripts.is_empty());
    assert_eq!(fs::read_to_string(&script).unwrap(), patched);
}

#[test]
fn invariant_failing_row_stops_run_and_keeps_earlier_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    let layout = config.layout();
    write_table(dir.path(), &[
        row("candle", "candle", "1", "0.5, 0.5", "Anna"),
        row("cauldron", "iron_ingot", "101101111", "1", "Bo"),
        row("broom", "stick", "1", "0.5, 2", "Cy"),
    ]);

    let err = GenerationPipeline::new(config).run().unwrap_err();
    assert!(matches!(err, PipelineError::InvalidHitbox(_)));
    assert!(layout.recipe_path("candle").is_file());
    assert!(!layout.recipe_path("cauldron").exists());
    assert!(!layout.recipe_path("broom").exists());
}

#[test]
fn invariant_validation_policy() {
    let dir = tempfile::tempdir().unwrap();
    write_table(dir.path(), &[row("Bad Id", "stick", "1", "1, 1", "Anna")]);

    let err = GenerationPipeline::new(create_config(dir.path())).run().unwrap_err();
    assert!(err.to_string().contains("Validation failed"));

    let config = GeneratorConfig {
        failure_mode: FailureMode::Warn,
        ..create_config(dir.path())
    };
    let report = GenerationPipeline::new(config).run().unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule, "identifier");
}

#[test]
fn invariant_artifacts_hash_stable() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    write_table(dir.path(), &[row("skull", "bone", "1111", "1, 1", "Anna")]);

    let first = GenerationPipeline::new(config.clone()).run().unwrap();
    let second = GenerationPipeline::new(config).run().unwrap();
    assert_eq!(first.artifacts_hash, second.artifacts_hash);
    assert_eq!(first.input_hash, second.input_hash);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn invariant_missing_column_reported() {
    let dir = tempfile::tempdir().unwrap();
    let table = ItemTable::parse("id\trecipe keys\nbat\tstick\n").unwrap();
    let err = GenerationPipeline::new(create_config(dir.path())).generate(&table, String::new());
    assert!(matches!(err, Err(PipelineError::MissingInputField(ref c)) if c == "recipe pattern"));
}

#[test]
fn invariant_invalid_utf8_table_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    let mut bytes = format!("{}\n{}\n", HEADER, row("bat", "stick", "1", "1, 1", "Anna")).into_bytes();
    bytes.extend_from_slice(b"ghost\twool\t1\tdGV4\t1, 1\tAnn\xffa\thttps://example.com/ghost\n");
    fs::write(&config.input, bytes).unwrap();

    let err = GenerationPipeline::new(config.clone()).run().unwrap_err();
    assert!(matches!(err, PipelineError::Table(_)));
    assert!(!config.layout().recipe_path("bat").exists());
}

#[test]
fn invariant_quoted_fields_unquoted() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    write_table(dir.path(), &[format!(
        "lantern\t\"iron_ingot, torch\"\t121\t{}\t\"0.5, 1\"\t\"Anna\"\thttps://example.com/lantern",
        TEXTURE
    )]);

    GenerationPipeline::new(config.clone()).run().unwrap();
    let recipe = read_json(&config.layout().recipe_path("lantern"));
    assert_eq!(recipe["key"], serde_json::json!({ "#": "minecraft:iron_ingot", "A": "minecraft:torch" }));
    let components = &recipe["result"]["components"];
    assert_eq!(components["minecraft:custom_data"]["deco_width"], 0.5);
    assert_eq!(components["minecraft:lore"][0][0]["text"], "Model by Anna");
}

#[test]
fn invariant_nested_id_written_and_patched() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(dir.path());
    let layout = config.layout();
    write_table(dir.path(), &[row("deco/bat", "black_wool", "1", "0.25, 0.25", "Bo")]);

    let report = GenerationPipeline::new(config.clone()).run().unwrap();
    assert!(report.items[0].spawn_script_created);
    assert!(layout.recipe_path("deco/bat").is_file());
    assert!(layout.loot_table_path("deco/bat").is_file());
    assert_eq!(
        fs::read_to_string(layout.aggregate_script_path()).unwrap(),
        "recipe give @a halloweendeco:deco/bat\n"
    );

    let script = layout.spawn_script_path("deco/bat");
    fs::write(&script, "summon bat ~ ~ ~ {NoAI:1b}\n").unwrap();
    let report = GenerationPipeline::new(config).run().unwrap();
    assert_eq!(report.patched_scripts.len(), 1);
    assert_eq!(fs::read_to_string(&script).unwrap(), "summon bat ~ ~ ~ {Tags:[deco_parent],NoAI:1b}\n");
}

#[test]
fn invariant_loot_count_functions() {
    let config = GeneratorConfig::default();
    let mut result = decogen_core::ResultDescriptor {
        components: Default::default(),
        count: 1,
        id: config.base_item.clone(),
    };
    assert!(derive_loot_table(&result).unwrap().pools[0].entries[0].functions.is_empty());

    result.count = 3;
    let value = serde_json::to_value(derive_loot_table(&result).unwrap()).unwrap();
    assert_eq!(
        value["pools"][0]["entries"][0]["functions"],
        serde_json::json!([{ "function": "minecraft:set_count", "count": 3 }])
    );
}

fn arb_pattern() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u32..=3, 1..=30)
        .prop_map(|digits| digits.into_iter().map(|d| char::from_digit(d, 10).unwrap()).collect())
}

proptest! {
    #[test]
    fn prop_shape_follows_length(pattern in arb_pattern()) {
        let keys = KeyTable::assign(["a", "b", "c"]).unwrap();
        let grid = decode_pattern(&pattern, &keys).unwrap();
        let len = pattern.len();

        let (rows, cols) = match len {
            6 => (2, 3),
            9 => (3, 3),
            _ => ((len + 2) / 3, 3),
        };
        prop_assert_eq!(infer_shape(len).rows, rows);
        prop_assert_eq!(grid.rows().len(), rows);
        prop_assert!(grid.rows().iter().all(|r| r.chars().count() == cols));
        prop_assert!(rows * cols >= len);

        let cells: String = grid.rows().concat();
        prop_assert!(cells[len..].chars().all(|c| c == ' '));
        prop_assert_eq!(decode_pattern(&pattern, &keys).unwrap(), grid);
    }

    #[test]
    fn prop_patch_is_idempotent(
        entity in "[a-z_]{1,12}",
        data in "[A-Za-z:0-9,\"]{1,20}",
        indent in " {0,4}",
    ) {
        let content = format!("{}summon {} ~ ~ ~ {{{}}}\nsay hi\n", indent, entity, data);
        let once = patch_content(&content, MARKER).map(|(c, _)| c).unwrap_or(content.clone());
        prop_assert!(once.contains(MARKER));
        prop_assert!(once.ends_with("\nsay hi\n"));
        prop_assert_eq!(patch_content(&once, MARKER), None);
    }
}
