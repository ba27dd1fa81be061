//! Raw spreadsheet cells and rows as handed to the ingestion pipeline.
//!
//! Rows come from an upstream sheet reader and carry no schema: each row is an
//! ordered mapping from an opaque column key (original header text or a
//! positional placeholder) to a loosely typed cell value.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single raw cell value.
///
/// Deserializes from JSON strings, numbers, booleans and `null`. Strings are
/// never reinterpreted as numbers at this layer, so values such as phone
/// numbers keep their leading zeros.
///
/// # Example
///
/// ```
/// use payroll_ingest::models::CellValue;
///
/// let cell: CellValue = serde_json::from_str("\"0712 345 678\"").unwrap();
/// assert_eq!(cell.as_text(), "0712 345 678");
///
/// let cell: CellValue = serde_json::from_str("45000").unwrap();
/// assert_eq!(cell, CellValue::number(45000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Free text, exactly as it appeared in the sheet.
    Text(String),
    /// A numeric cell.
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
    /// A boolean cell.
    Bool(bool),
    /// An empty cell.
    Empty,
}

impl CellValue {
    /// Creates a numeric cell.
    pub fn number(value: impl Into<Decimal>) -> Self {
        CellValue::Number(value.into())
    }

    /// Returns the trimmed textual form of the cell.
    ///
    /// Numbers are rendered without trailing zeros, booleans as `true`/`false`
    /// and empty cells as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(number) => number.normalize().to_string(),
            CellValue::Bool(flag) => flag.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Returns true if the cell carries no usable content.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Empty => true,
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One spreadsheet row: an ordered list of `(column key, cell)` pairs.
///
/// Rows in the same sheet need not share the same keys. Key order is the
/// order in which the cells were supplied and is preserved through
/// serialization.
///
/// # Example
///
/// ```
/// use payroll_ingest::models::{CellValue, RawRow};
///
/// let row: RawRow = [("Name", CellValue::from("Jane Doe")), ("Gross", CellValue::number(50000))]
///     .into_iter()
///     .collect();
///
/// assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Name", "Gross"]);
/// assert_eq!(row.get("Name").unwrap().as_text(), "Jane Doe");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for a column key, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key, value)),
        }
    }

    /// Returns the cell stored under the given column key.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Iterates over column keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    /// Iterates over `(key, cell)` pairs in row order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over the cells in row order.
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().map(|(_, value)| value)
    }

    /// Returns the number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns true if every cell in the row is blank.
    pub fn is_blank(&self) -> bool {
        self.values().all(CellValue::is_blank)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawRowVisitor;

        impl<'de> Visitor<'de> for RawRowVisitor {
            type Value = RawRow;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column keys to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
                let mut row = RawRow::new();
                while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(key, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RawRowVisitor)
    }
}
