//! List command implementation.

use crate::definitions::{build_registry, Definitions, SaveOptions};
use datasync_engine::SynchronizationRunner;
use std::path::Path;

/// Runs the list command.
pub fn run(definitions_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = Definitions::load(definitions_path)?;
    let runner = SynchronizationRunner::new(build_registry(&definitions, &SaveOptions::default())?);

    for name in runner.available() {
        match definitions.get(&name) {
            Some(definition) => println!(
                "{}\t{} -> {} (key: {})",
                name,
                definition.source.display(),
                definition.destination.display(),
                definition.key
            ),
            None => println!("{}", name),
        }
    }
    Ok(())
}
