//! Item Table - Tab-Separated Input Rows

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::pipeline::PipelineError;

pub const COLUMN_ID: &str = "id";
pub const COLUMN_RECIPE_KEYS: &str = "recipe keys";
pub const COLUMN_RECIPE_PATTERN: &str = "recipe pattern";
pub const COLUMN_TEXTURE: &str = "texture";
pub const COLUMN_HITBOX: &str = "hitbox";
pub const COLUMN_AUTHOR: &str = "author";
pub const COLUMN_URL: &str = "url";

/// One decoration item as described by the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub recipe_keys: String,
    pub recipe_pattern: String,
    pub texture: String,
    pub hitbox: String,
    pub author: String,
    pub url: String,
}

/// Parsed table: header plus raw records, converted to rows lazily so a bad
/// record only fails when it is reached.
#[derive(Debug, Clone)]
pub struct ItemTable {
    header: Vec<String>,
    records: Vec<StringRecord>,
}

impl ItemTable {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn parse(content: &str) -> Result<Self, PipelineError> {
        Self::from_reader(content.as_bytes())
    }

    /// Tab-delimited, `"`-quoted fields; invalid UTF-8 is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let header = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut records = vec![];
        for record in reader.records() {
            let record = record?;
            if record.iter().any(|field| !field.trim().is_empty()) {
                records.push(record);
            }
        }

        Ok(Self { header, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Result<ItemRow, PipelineError>> + '_ {
        self.records.iter().map(|record| self.to_row(record))
    }

    fn field(&self, record: &StringRecord, column: &str) -> Result<String, PipelineError> {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|idx| record.get(idx))
            .map(|value| value.trim().to_string())
            .ok_or_else(|| PipelineError::MissingInputField(column.to_string()))
    }

    fn to_row(&self, record: &StringRecord) -> Result<ItemRow, PipelineError> {
        let id = self.field(record, COLUMN_ID)?;
        if id.is_empty() {
            return Err(PipelineError::MissingInputField(COLUMN_ID.to_string()));
        }

        Ok(ItemRow {
            id,
            recipe_keys: self.field(record, COLUMN_RECIPE_KEYS)?,
            recipe_pattern: self.field(record, COLUMN_RECIPE_PATTERN)?,
            texture: self.field(record, COLUMN_TEXTURE)?,
            hitbox: self.field(record, COLUMN_HITBOX)?,
            author: self.field(record, COLUMN_AUTHOR)?,
            url: self.field(record, COLUMN_URL)?,
        })
    }
}
