use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::debug;

/// Sort hint carried by a column descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// Column metadata. The order of descriptors in a dataset is the display
/// and export order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    /// When absent the comparator infers per comparison
    pub kind: Option<ColumnKind>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // Date-like text, kept as supplied
    Null,
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Numeric payload of `Integer`/`Float` values. Text is never parsed here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataValue::Integer(_) | DataValue::Float(_))
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(value.into())
    }
}

impl From<u64> for DataValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(DataValue::Integer)
            .unwrap_or(DataValue::Float(value as f64))
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// A row of data: column key to value, in insertion order.
///
/// Rows do not have to carry every column of their dataset; a missing key
/// reads as absent and is treated like `Null` by filters, sorting and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    cells: Vec<(String, DataValue)>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`DataRow::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace the value for `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DataValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text form of a cell; absent and null values are empty
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<DataValue>> FromIterator<(K, V)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = DataRow::new();
        for (key, value) in iter {
            row.set(key, value);
        }
        row
    }
}

/// Rows plus ordered column descriptors, as handed to a view in one load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<DataRow>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: ColumnDescriptor) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = DataRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn get_column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.get_column(key).is_some()
    }

    /// Column keys in descriptor order
    pub fn column_keys(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_value(&self, row: usize, key: &str) -> Option<&DataValue> {
        self.rows.get(row)?.get(key)
    }

    /// Fill in missing column kinds from the data. A column whose non-blank
    /// values are all numbers becomes `Number`, all dates `Date`; anything
    /// else keeps no kind and is compared value by value.
    pub fn infer_column_kinds(&mut self) {
        for column in self.columns.iter_mut().filter(|c| c.kind.is_none()) {
            let mut inferred: Option<ColumnKind> = None;
            let mut mixed = false;

            for value in self.rows.iter().filter_map(|row| row.get(&column.key)) {
                let kind = match value {
                    DataValue::Null => continue,
                    DataValue::String(s) if s.is_empty() => continue,
                    DataValue::Integer(_) | DataValue::Float(_) => ColumnKind::Number,
                    DataValue::DateTime(_) => ColumnKind::Date,
                    DataValue::String(_) | DataValue::Boolean(_) => {
                        mixed = true;
                        break;
                    }
                };
                match inferred {
                    None => inferred = Some(kind),
                    Some(existing) if existing == kind => {}
                    Some(_) => {
                        mixed = true;
                        break;
                    }
                }
            }

            if !mixed {
                column.kind = inferred;
            }
        }
    }

    /// Build a dataset from JSON objects. Column order comes from `columns`,
    /// never from the key order of the objects.
    pub fn from_json_records(
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        records: &[JsonValue],
    ) -> Self {
        let mut dataset = Dataset::new(name);
        dataset.columns = columns;

        for record in records {
            let Some(obj) = record.as_object() else {
                continue;
            };
            let row = dataset
                .columns
                .iter()
                .filter_map(|column| {
                    obj.get(&column.key)
                        .map(|v| (column.key.clone(), json_value_to_data_value(v)))
                })
                .collect();
            dataset.rows.push(row);
        }

        debug!(
            "Created dataset '{}' with {} columns and {} rows",
            dataset.name,
            dataset.column_count(),
            dataset.row_count()
        );
        dataset
    }
}

fn json_value_to_data_value(json: &JsonValue) -> DataValue {
    match json {
        JsonValue::Null => DataValue::Null,
        JsonValue::Bool(b) => DataValue::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                DataValue::Float(f)
            } else {
                DataValue::String(n.to_string())
            }
        }
        JsonValue::String(s) => DataValue::String(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            // Store complex types as JSON string
            DataValue::String(json.to_string())
        }
    }
}
