//! Spawn Script Tag Patcher
//!
//! Inserts the parent tag marker into `summon <entity> ~ ~ ~ {...}` lines.
//! Recognition goes through a small tokenizer over that one command shape;
//! anything else is left alone.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SUMMON_KEYWORD: &str = "summon";
pub const RELATIVE_COORDINATE: &str = "~";
pub const SCRIPT_EXTENSION: &str = "mcfunction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchedScript {
    pub path: PathBuf,
    pub lines_patched: usize,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) -> usize {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        skipped
    }

    /// One or more whitespace characters.
    fn separator(&mut self) -> Option<()> {
        (self.skip_whitespace() > 0).then_some(())
    }

    /// Maximal run of non-whitespace characters.
    fn token(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn expect(&mut self, word: &str) -> Option<()> {
        (self.token()? == word).then_some(())
    }
}

/// Byte offset of the data block's opening brace in a summon line.
fn data_block_offset(line: &str) -> Option<usize> {
    let mut cursor = Cursor::new(line);
    cursor.skip_whitespace();
    cursor.expect(SUMMON_KEYWORD)?;
    cursor.separator()?;
    cursor.token()?;
    for _ in 0..3 {
        cursor.separator()?;
        cursor.expect(RELATIVE_COORDINATE)?;
    }
    cursor.separator()?;

    let data = cursor.rest();
    (data.starts_with('{') && data.len() > 1).then_some(cursor.pos)
}

pub fn is_summon_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(SUMMON_KEYWORD)
        .map_or(false, |rest| rest.starts_with(char::is_whitespace))
}

/// Patched line, or `None` when the line stays as it is.
pub fn patch_line(line: &str, marker: &str) -> Option<String> {
    if !is_summon_line(line) || line.contains(marker) {
        return None;
    }
    let brace = data_block_offset(line)?;
    Some(format!("{}{{{},{}", &line[..brace], marker, &line[brace + 1..]))
}

/// Patched content and number of changed lines, or `None` if nothing changed.
pub fn patch_content(content: &str, marker: &str) -> Option<(String, usize)> {
    if content.trim().is_empty() {
        return None;
    }

    let mut changed = 0;
    let lines: Vec<String> = content
        .split('\n')
        .map(|line| match patch_line(line, marker) {
            Some(patched) => {
                changed += 1;
                patched
            }
            None => line.to_string(),
        })
        .collect();

    (changed > 0).then(|| (lines.join("\n"), changed))
}

/// Patch every script under `dir`. Files without changes are not rewritten.
pub fn patch_spawn_scripts(dir: &Path, marker: &str) -> Result<Vec<PatchedScript>, std::io::Error> {
    tracing::info!("Processing spawn scripts in {}", dir.display());

    let mut patched = vec![];
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let is_script = entry.path().extension().map_or(false, |e| e == SCRIPT_EXTENSION);
        if !entry.file_type().is_file() || !is_script {
            continue;
        }

        let path = entry.into_path();
        let content = fs::read_to_string(&path)?;
        let Some((updated, lines_patched)) = patch_content(&content, marker) else {
            continue;
        };
        fs::write(&path, updated)?;
        tracing::info!("Updated {}: added {} to {} line(s)", path.display(), marker, lines_patched);
        patched.push(PatchedScript { path, lines_patched });
    }

    tracing::debug!("Spawn script processing complete, {} file(s) patched", patched.len());
    Ok(patched)
}
