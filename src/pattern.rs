//! Pattern Decoder - Numeric Grid to Shaped Recipe
//!
//! A row stores its crafting grid as a digit string: `0` is an empty cell,
//! digit `d` is the d-th entry of the recipe's key table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// Symbols handed out to components, in assignment order.
pub const SYMBOL_ALPHABET: [char; 27] = [
    '#', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Reserved for empty cells, never assigned to a component.
pub const EMPTY_SYMBOL: char = ' ';

const GRID_COLS: usize = 3;

/// Symbol -> component mapping, kept in insertion order.
///
/// Order matters: digits index into the table positionally, so a table
/// read back from a previous run keeps the order of that file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTable(IndexMap<String, String>);

impl KeyTable {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Assign symbols to components in first-appearance order.
    ///
    /// Repeated components share the symbol of their first occurrence.
    pub fn assign<I, S>(components: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut distinct: Vec<String> = vec![];
        for component in components {
            let component = component.into();
            if !distinct.contains(&component) {
                distinct.push(component);
            }
        }

        if distinct.len() > SYMBOL_ALPHABET.len() {
            return Err(PipelineError::KeyCapacityExceeded {
                count: distinct.len(),
                max: SYMBOL_ALPHABET.len(),
            });
        }

        let entries = SYMBOL_ALPHABET
            .iter()
            .zip(distinct)
            .map(|(symbol, component)| (symbol.to_string(), component))
            .collect();
        Ok(Self(entries))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(symbol).map(String::as_str)
    }

    /// Symbol stored at 1-based position `digit`.
    pub fn symbol_for_digit(&self, digit: u32) -> Option<&str> {
        if digit == 0 {
            return None;
        }
        self.0
            .get_index(digit as usize - 1)
            .map(|(symbol, _)| symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Grid shape for a numeric pattern of `len` digits.
pub fn infer_shape(len: usize) -> GridShape {
    match len {
        6 => GridShape { rows: 2, cols: 3 },
        9 => GridShape { rows: 3, cols: 3 },
        _ => GridShape {
            rows: len.div_ceil(GRID_COLS),
            cols: GRID_COLS,
        },
    }
}

/// Shaped recipe grid: equal-length row strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternGrid(Vec<String>);

impl PatternGrid {
    pub fn rows(&self) -> &[String] {
        &self.0
    }

    pub fn shape(&self) -> GridShape {
        GridShape {
            rows: self.0.len(),
            cols: self.0.first().map_or(0, |r| r.chars().count()),
        }
    }
}

/// Decode a digit string into a grid using `keys`.
pub fn decode_pattern(numeric: &str, keys: &KeyTable) -> Result<PatternGrid, PipelineError> {
    if numeric.is_empty() {
        return Err(PipelineError::InvalidPattern("pattern is empty".to_string()));
    }

    let symbols = numeric
        .chars()
        .map(|c| cell_symbol(c, numeric, keys))
        .collect::<Result<Vec<char>, _>>()?;

    let shape = infer_shape(symbols.len());
    let rows = (0..shape.rows)
        .map(|row| {
            (0..shape.cols)
                .map(|col| {
                    symbols
                        .get(row * shape.cols + col)
                        .copied()
                        .unwrap_or(EMPTY_SYMBOL)
                })
                .collect::<String>()
        })
        .collect();

    Ok(PatternGrid(rows))
}

fn cell_symbol(c: char, numeric: &str, keys: &KeyTable) -> Result<char, PipelineError> {
    let digit = c.to_digit(10).ok_or_else(|| {
        PipelineError::InvalidPattern(format!("'{}' contains non-digit '{}'", numeric, c))
    })?;
    if digit == 0 {
        return Ok(EMPTY_SYMBOL);
    }

    let symbol = keys.symbol_for_digit(digit).ok_or_else(|| {
        PipelineError::InvalidPattern(format!(
            "'{}' references component {} but only {} are defined",
            numeric,
            digit,
            keys.len()
        ))
    })?;

    // Hand-edited tables may carry multi-character keys; the engine only reads one.
    symbol.chars().next().ok_or_else(|| {
        PipelineError::InvalidPattern(format!("key table has an empty symbol for component {}", digit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick_stone() -> KeyTable {
        KeyTable::assign(["minecraft:stick", "minecraft:stone"]).unwrap()
    }

    #[test]
    fn test_assign_first_appearance_order() {
        let keys = KeyTable::assign(["b", "a", "b", "c"]).unwrap();
        let entries: Vec<_> = keys.iter().collect();
        assert_eq!(entries, vec![("#", "b"), ("A", "a"), ("B", "c")]);
    }

    #[test]
    fn test_assign_rejects_over_capacity() {
        let components: Vec<String> = (0..28).map(|i| format!("item_{}", i)).collect();
        let err = KeyTable::assign(components).unwrap_err();
        assert!(matches!(err, PipelineError::KeyCapacityExceeded { count: 28, max: 27 }));
    }

    #[test]
    fn test_assign_full_alphabet() {
        let components: Vec<String> = (0..27).map(|i| format!("item_{}", i)).collect();
        let keys = KeyTable::assign(components).unwrap();
        assert_eq!(keys.symbol_for_digit(1), Some("#"));
        assert_eq!(keys.symbol_for_digit(27), Some("Z"));
        assert!(keys.get(" ").is_none());
    }

    #[test]
    fn test_decode_three_by_three() {
        let grid = decode_pattern("120034560", &KeyTable::assign(["a", "b", "c", "d", "e", "f"]).unwrap()).unwrap();
        assert_eq!(grid.rows(), &["#A ".to_string(), " BC".to_string(), "DE ".to_string()]);
    }

    #[test]
    fn test_decode_two_by_three() {
        let grid = decode_pattern("101020", &stick_stone()).unwrap();
        assert_eq!(grid.shape(), GridShape { rows: 2, cols: 3 });
        assert_eq!(grid.rows(), &["# #".to_string(), " A ".to_string()]);
    }

    #[test]
    fn test_decode_pads_partial_row() {
        let grid = decode_pattern("1212", &stick_stone()).unwrap();
        assert_eq!(grid.rows(), &["#A#".to_string(), "A  ".to_string()]);
    }

    #[test]
    fn test_decode_rejects_non_digit() {
        let err = decode_pattern("12x", &stick_stone()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPattern(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_component() {
        let err = decode_pattern("123", &stick_stone()).unwrap_err();
        assert!(err.to_string().contains("only 2 are defined"));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(decode_pattern("", &stick_stone()).is_err());
    }

    #[test]
    fn test_shape_fallback() {
        assert_eq!(infer_shape(1), GridShape { rows: 1, cols: 3 });
        assert_eq!(infer_shape(4), GridShape { rows: 2, cols: 3 });
        assert_eq!(infer_shape(12), GridShape { rows: 4, cols: 3 });
    }
}
