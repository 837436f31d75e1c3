//! Synchronization definitions file.
//!
//! ```json
//! {
//!   "synchronizations": [
//!     { "name": "users", "source": "hr/users.json", "destination": "app/users.json",
//!       "key": "id", "merge": "overlay", "ignore_fields": ["updated_at"] }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the definitions file.

use crate::dataset::{self, DeltaReport, MergeMode};
use crate::error::{CliError, CliResult};
use datasync_engine::{
    ConfigurationRegistry, DuplicateKeyPolicy, RunContext, Side, SyncError, SyncResult,
    SynchronizationConfiguration, SynchronizationResult,
};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Duplicate key handling as spelled in the definitions file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeys {
    /// Later records replace earlier ones.
    #[default]
    LastWins,
    /// Duplicate keys fail the run.
    Reject,
}

impl From<DuplicateKeys> for DuplicateKeyPolicy {
    fn from(value: DuplicateKeys) -> Self {
        match value {
            DuplicateKeys::LastWins => DuplicateKeyPolicy::LastWins,
            DuplicateKeys::Reject => DuplicateKeyPolicy::Reject,
        }
    }
}

/// One synchronization definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncDefinition {
    /// Unique name.
    pub name: String,
    /// Source dataset file.
    pub source: PathBuf,
    /// Destination dataset file.
    pub destination: PathBuf,
    /// Key field shared by both datasets.
    pub key: String,
    /// Merge mode for modified records.
    #[serde(default)]
    pub merge: MergeMode,
    /// Duplicate key handling.
    #[serde(default)]
    pub duplicate_keys: DuplicateKeys,
    /// Top-level fields excluded from comparison.
    #[serde(default)]
    pub ignore_fields: Vec<String>,
}

/// Contents of a definitions file.
#[derive(Debug, Clone, Deserialize)]
pub struct Definitions {
    /// Definitions in file order.
    pub synchronizations: Vec<SyncDefinition>,
}

impl Definitions {
    /// Loads a definitions file and resolves its relative paths.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let mut definitions: Definitions =
            serde_json::from_str(&text).map_err(|e| CliError::json(path, e))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for definition in &mut definitions.synchronizations {
            definition.source = base.join(&definition.source);
            definition.destination = base.join(&definition.destination);
        }
        Ok(definitions)
    }

    /// Finds a definition by name.
    pub fn get(&self, name: &str) -> Option<&SyncDefinition> {
        self.synchronizations.iter().find(|d| d.name == name)
    }
}

/// What the save callback does with a delta.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Rewrite the destination file with the reconciled dataset.
    pub apply: bool,
    /// Directory receiving `<name>.delta.json` reports.
    pub output: Option<PathBuf>,
}

/// Builds the registry for all definitions.
pub fn build_registry(
    definitions: &Definitions,
    options: &SaveOptions,
) -> CliResult<ConfigurationRegistry<String, Value>> {
    let mut registry = ConfigurationRegistry::new();
    for definition in &definitions.synchronizations {
        registry.register(configuration(definition.clone(), options.clone()))?;
    }
    Ok(registry)
}

fn configuration(
    definition: SyncDefinition,
    options: SaveOptions,
) -> SynchronizationConfiguration<String, Value> {
    let source = dataset::file_provider(
        Side::Source,
        definition.source.clone(),
        definition.key.clone(),
    );
    let destination = dataset::file_provider(
        Side::Destination,
        definition.destination.clone(),
        definition.key.clone(),
    );

    let ignored = definition.ignore_fields.clone();
    let merge = definition.merge;
    let policy = DuplicateKeyPolicy::from(definition.duplicate_keys);
    let name = definition.name.clone();

    let mut configuration = SynchronizationConfiguration::new(
        name,
        source,
        destination,
        move |src, dst| dataset::records_equal(merge, src, dst, &ignored),
        move |result, context| save(&definition, &options, result, context),
    )
    .with_duplicate_keys(policy);

    if merge == MergeMode::Overlay {
        configuration = configuration
            .with_merge(move |dst, src| dataset::merge_records(MergeMode::Overlay, dst, src));
    }
    configuration
}

fn save(
    definition: &SyncDefinition,
    options: &SaveOptions,
    result: &SynchronizationResult<String, Value>,
    context: &RunContext,
) -> SyncResult<()> {
    if let Some(dir) = &options.output {
        let path = dir.join(format!("{}.delta.json", definition.name));
        dataset::write_json(&path, &DeltaReport::new(&definition.name, result))
            .map_err(SyncError::external)?;
        info!(path = %path.display(), run_id = %context.run_id(), "wrote delta report");
    }

    if options.apply && result.has_changes() {
        let destination = dataset::file_provider(
            Side::Destination,
            definition.destination.clone(),
            definition.key.clone(),
        );
        let mut records =
            destination.fetch_keyed(Side::Destination, definition.duplicate_keys.into())?;
        records.apply(result);
        dataset::write_json(&definition.destination, &records.into_values())
            .map_err(SyncError::external)?;
        info!(
            path = %definition.destination.display(),
            changes = result.change_count(),
            "applied delta to destination"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasync_engine::SynchronizationRunner;
    use serde_json::json;

    fn write(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    fn setup(dir: &Path) -> PathBuf {
        write(
            &dir.join("source.json"),
            &json!([
                {"id": 1, "name": "alice", "seen": "mon"},
                {"id": 2, "name": "bob", "seen": "mon"},
                {"id": 3, "name": "carol", "seen": "mon"}
            ]),
        );
        write(
            &dir.join("destination.json"),
            &json!([
                {"id": 1, "name": "alice", "seen": "tue"},
                {"id": 2, "name": "robert", "local": true},
                {"id": 4, "name": "dave"}
            ]),
        );
        let definitions = dir.join("sync.json");
        write(
            &definitions,
            &json!({
                "synchronizations": [
                    {
                        "name": "people",
                        "source": "source.json",
                        "destination": "destination.json",
                        "key": "id",
                        "merge": "overlay",
                        "ignore_fields": ["seen"]
                    }
                ]
            }),
        );
        definitions
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let definitions = Definitions::load(&setup(dir.path())).unwrap();

        let people = definitions.get("people").unwrap();
        assert_eq!(people.source, dir.path().join("source.json"));
        assert_eq!(people.merge, MergeMode::Overlay);
        assert_eq!(people.duplicate_keys, DuplicateKeys::LastWins);
        assert!(definitions.get("missing").is_none());
    }

    #[test]
    fn run_writes_report_and_applies() {
        let dir = tempfile::tempdir().unwrap();
        let definitions = Definitions::load(&setup(dir.path())).unwrap();
        let options = SaveOptions {
            apply: true,
            output: Some(dir.path().to_path_buf()),
        };
        let runner = SynchronizationRunner::new(build_registry(&definitions, &options).unwrap());

        let state = runner.run_synchronization("people");
        let result = state.result().unwrap();
        assert_eq!(result.to_add().keys().collect::<Vec<_>>(), vec!["3"]);
        assert_eq!(result.to_remove().keys().collect::<Vec<_>>(), vec!["4"]);
        assert_eq!(
            result.modified().get(&"2".to_string()),
            Some(&json!({"id": 2, "name": "bob", "seen": "mon", "local": true}))
        );

        let report: DeltaReport = serde_json::from_str(
            &fs::read_to_string(dir.path().join("people.delta.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(report.to_add.len(), 1);
        assert_eq!(report.modified.len(), 1);

        let applied: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("destination.json")).unwrap(),
        )
        .unwrap();
        let ids: Vec<_> = applied
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // A second pass finds nothing left to do.
        let state = runner.run_synchronization("people");
        assert!(!state.result().unwrap().has_changes());
    }

    #[test]
    fn duplicate_definition_names_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = setup(dir.path());
        let mut definitions = Definitions::load(&path).unwrap();
        let copy = definitions.synchronizations[0].clone();
        definitions.synchronizations.push(copy);

        let err = build_registry(&definitions, &SaveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Sync(SyncError::DuplicateConfiguration(_))
        ));
    }
}
