//! Run command implementation.

use crate::definitions::{build_registry, Definitions, SaveOptions};
use crate::error::CliError;
use datasync_engine::{RunContext, RunOutcome, SynchronizationResultState, SynchronizationRunner};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Options of the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Run only this synchronization.
    pub name: Option<String>,
    /// Rewrite destination files.
    pub apply: bool,
    /// Save even when nothing changed.
    pub force: bool,
    /// Directory for delta reports.
    pub output: Option<PathBuf>,
    /// Run all synchronizations concurrently.
    pub parallel: bool,
    /// Deadline for each run.
    pub timeout: Option<Duration>,
}

/// Runs the run command.
pub fn run(definitions_path: &Path, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = Definitions::load(definitions_path)?;
    if let Some(dir) = &options.output {
        fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
    }

    let save_options = SaveOptions {
        apply: options.apply,
        output: options.output.clone(),
    };
    let registry = build_registry(&definitions, &save_options)?;
    let runner = SynchronizationRunner::new(registry);

    let mut context = RunContext::new().with_force_save(options.force);
    if let Some(timeout) = options.timeout {
        context = context.with_timeout(timeout);
    }

    let states = match &options.name {
        Some(name) => {
            let state = runner.run_synchronization_with(name, &context);
            if state.is_unknown_configuration() {
                return Err(CliError::UnknownSynchronization(name.clone()).into());
            }
            vec![state]
        }
        None if options.parallel => runner.run_all_concurrent_with(&context),
        None => runner.run_all_with(&context),
    };

    for state in &states {
        print_state(state);
    }

    let failed = states.iter().filter(|s| s.is_failed()).count();
    let stats = runner.stats();
    info!(
        completed = stats.runs_completed,
        failed = stats.runs_failed,
        changes_saved = stats.changes_saved,
        "run finished"
    );

    if failed > 0 {
        return Err(CliError::RunsFailed {
            failed,
            total: states.len(),
        }
        .into());
    }
    Ok(())
}

fn print_state(state: &SynchronizationResultState<String, Value>) {
    let elapsed = state.duration().as_millis();
    match state.outcome() {
        RunOutcome::Completed(result) if result.has_changes() => println!(
            "{}: {} to add, {} to remove, {} modified ({} ms)",
            state.name(),
            result.to_add().len(),
            result.to_remove().len(),
            result.modified().len(),
            elapsed
        ),
        RunOutcome::Completed(_) => println!("{}: up to date ({} ms)", state.name(), elapsed),
        RunOutcome::Failed(error) => println!("{}: FAILED: {}", state.name(), error),
        RunOutcome::UnknownConfiguration => println!("{}: not registered", state.name()),
    }
}
