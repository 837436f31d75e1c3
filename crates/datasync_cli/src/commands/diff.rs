//! Diff command implementation.

use crate::dataset::{self, DeltaReport, MergeMode};
use datasync_engine::{diff, DuplicateKeyPolicy, Side};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Output format of the diff command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per changed key.
    #[default]
    Text,
    /// The delta report as pretty-printed JSON.
    Json,
}

/// Runs the diff command: a one-off comparison of two dataset files.
pub fn run(
    source: &Path,
    destination: &Path,
    key: &str,
    merge: MergeMode,
    ignore_fields: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = DuplicateKeyPolicy::LastWins;
    let source_records = dataset::file_provider(Side::Source, source.to_path_buf(), key.to_string())
        .fetch_keyed(Side::Source, policy)?;
    let destination_records =
        dataset::file_provider(Side::Destination, destination.to_path_buf(), key.to_string())
            .fetch_keyed(Side::Destination, policy)?;
    debug!(
        source = source_records.len(),
        destination = destination_records.len(),
        "loaded datasets"
    );

    let equal = |src: &Value, dst: &Value| dataset::records_equal(merge, src, dst, ignore_fields);
    let overlay = |dst: &Value, src: &Value| dataset::merge_records(merge, dst, src);
    let merge_fn: Option<&dyn Fn(&Value, &Value) -> Value> = match merge {
        MergeMode::Overlay => Some(&overlay),
        MergeMode::Source => None,
    };

    let result = diff(&source_records, &destination_records, &equal, merge_fn);
    let report = DeltaReport::new("diff", &result);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => report.print_text(key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn both_formats_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.json");
        let destination = dir.path().join("destination.json");
        fs::write(&source, r#"[{"sku": "a", "qty": 2}]"#).unwrap();
        fs::write(&destination, r#"[{"sku": "a", "qty": 1}, {"sku": "b", "qty": 5}]"#).unwrap();

        for format in [OutputFormat::Text, OutputFormat::Json] {
            run(&source, &destination, "sku", MergeMode::Overlay, &[], format).unwrap();
        }
        let missing = dir.path().join("nope.json");
        assert!(run(&source, &missing, "sku", MergeMode::Source, &[], OutputFormat::Text).is_err());
    }
}
