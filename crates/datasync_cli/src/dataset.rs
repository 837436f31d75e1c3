//! JSON datasets as synchronization sides.
//!
//! A dataset file holds a JSON array of records. Records are keyed by the
//! JSON text of one scalar field, so `"1"` and `1` are different keys.

use crate::error::{CliError, CliResult};
use datasync_engine::{
    KeyedCollection, Side, SyncError, SynchronizationDataProvider, SynchronizationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// How differing records are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// The source record replaces the destination record.
    #[default]
    Source,
    /// Source fields are written over the destination record.
    Overlay,
}

/// Renders the key field of a record, if it has a usable one.
pub fn record_key(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        scalar => Some(scalar.to_string()),
    }
}

/// Reads a dataset file and checks that every record carries the key field.
pub fn load_records(path: &Path, key: &str) -> CliResult<Vec<Value>> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| CliError::json(path, e))?;
    let Value::Array(records) = value else {
        return Err(CliError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    if let Some(index) = records.iter().position(|r| record_key(r, key).is_none()) {
        return Err(CliError::MissingKey {
            path: path.to_path_buf(),
            index,
            field: key.to_string(),
        });
    }
    Ok(records)
}

/// Writes records as a pretty-printed JSON array.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::json(path, e))?;
    fs::write(path, text + "\n").map_err(|e| CliError::io(path, e))
}

/// Creates a provider that reads `path` on every fetch.
pub fn file_provider(
    side: Side,
    path: PathBuf,
    key: String,
) -> SynchronizationDataProvider<String, Value> {
    let key_field = key.clone();
    SynchronizationDataProvider::new(
        move || load_records(&path, &key).map_err(|e| SyncError::data_retrieval(side, e.to_string())),
        move |record| record_key(record, &key_field).unwrap_or_default(),
    )
}

/// Compares a source record with a destination record.
///
/// Ignored top-level fields never count. In overlay mode only the source's
/// fields are compared, so destination-only fields survive reconciliation.
pub fn records_equal(mode: MergeMode, source: &Value, destination: &Value, ignored: &[String]) -> bool {
    let (Some(src), Some(dst)) = (source.as_object(), destination.as_object()) else {
        return source == destination;
    };
    let relevant = |map: &serde_json::Map<String, Value>| {
        map.keys().filter(|k| !ignored.contains(*k)).count()
    };
    let source_fields_match = src
        .iter()
        .filter(|(k, _)| !ignored.contains(*k))
        .all(|(k, v)| dst.get(k) == Some(v));

    match mode {
        MergeMode::Overlay => source_fields_match,
        MergeMode::Source => source_fields_match && relevant(src) == relevant(dst),
    }
}

/// Merges a differing pair of records.
pub fn merge_records(mode: MergeMode, destination: &Value, source: &Value) -> Value {
    match (mode, destination, source) {
        (MergeMode::Overlay, Value::Object(destination), Value::Object(source)) => {
            let mut merged = destination.clone();
            for (field, value) in source {
                merged.insert(field.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => source.clone(),
    }
}

/// Serializable view of a delta.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Synchronization name.
    pub name: String,
    /// Records to insert into the destination.
    pub to_add: Vec<Value>,
    /// Records to delete from the destination.
    pub to_remove: Vec<Value>,
    /// Replacement records for changed keys.
    pub modified: Vec<Value>,
}

impl DeltaReport {
    /// Builds a report from a delta.
    pub fn new(name: &str, result: &SynchronizationResult<String, Value>) -> Self {
        let items = |c: &KeyedCollection<String, Value>| -> Vec<Value> { c.values().cloned().collect() };
        Self {
            name: name.to_string(),
            to_add: items(result.to_add()),
            to_remove: items(result.to_remove()),
            modified: items(result.modified()),
        }
    }

    /// Prints a one-line-per-key summary.
    pub fn print_text(&self, key: &str) {
        let key_of = |record: &Value| record_key(record, key).unwrap_or_default();
        println!("{}:", self.name);
        for record in &self.to_add {
            println!("  + {}", key_of(record));
        }
        for record in &self.to_remove {
            println!("  - {}", key_of(record));
        }
        for record in &self.modified {
            println!("  ~ {}", key_of(record));
        }
        println!(
            "  {} to add, {} to remove, {} modified",
            self.to_add.len(),
            self.to_remove.len(),
            self.modified.len()
        );
    }
}
