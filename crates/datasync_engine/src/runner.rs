//! Synchronization runner.
//!
//! Resolves a configuration by name, fetches both sides, runs the diff
//! engine and hands non-empty deltas to the configuration's save callback.
//! Every failure is caught here exactly once and reported through the
//! returned [`SynchronizationResultState`].

use crate::config::{ConcurrentRunPolicy, RunnerConfig};
use crate::configuration::SynchronizationConfiguration;
use crate::context::RunContext;
use crate::diff::diff;
use crate::error::{Side, SyncError, SyncResult};
use crate::registry::ConfigurationRegistry;
use crate::result::{RunOutcome, SynchronizationResult, SynchronizationResultState};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Cumulative statistics of a runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerStats {
    /// Runs that completed successfully.
    pub runs_completed: u64,
    /// Runs that failed at any stage.
    pub runs_failed: u64,
    /// Runs requested for names that are not registered.
    pub unknown_configurations: u64,
    /// Number of times a save callback was invoked.
    pub saves_invoked: u64,
    /// Total delta entries handed to successful saves.
    pub changes_saved: u64,
    /// Time the last run finished.
    pub last_run_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Runs registered synchronizations.
///
/// Runs of different configurations are independent and may execute
/// concurrently. Runs of the same configuration are serialized according to
/// [`ConcurrentRunPolicy`].
pub struct SynchronizationRunner<K, V> {
    registry: Arc<ConfigurationRegistry<K, V>>,
    config: RunnerConfig,
    locks: HashMap<String, Mutex<()>>,
    stats: RwLock<RunnerStats>,
}

impl<K, V> SynchronizationRunner<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Creates a runner with the default configuration.
    pub fn new(registry: ConfigurationRegistry<K, V>) -> Self {
        Self::with_config(Arc::new(registry), RunnerConfig::default())
    }

    /// Creates a runner over a shared registry.
    pub fn with_config(registry: Arc<ConfigurationRegistry<K, V>>, config: RunnerConfig) -> Self {
        let locks = registry
            .names()
            .map(|name| (name.to_string(), Mutex::new(())))
            .collect();
        Self {
            registry,
            config,
            locks,
            stats: RwLock::new(RunnerStats::default()),
        }
    }

    /// Gets the registry.
    pub fn registry(&self) -> &ConfigurationRegistry<K, V> {
        &self.registry
    }

    /// Gets a snapshot of the statistics.
    pub fn stats(&self) -> RunnerStats {
        self.stats.read().clone()
    }

    /// Names of all registered configurations, in registration order.
    pub fn available(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    /// Runs one synchronization with a fresh context.
    ///
    /// An unknown name yields a non-failing state without a result; see
    /// [`SynchronizationResultState::is_unknown_configuration`].
    pub fn run_synchronization(&self, name: &str) -> SynchronizationResultState<K, V> {
        self.run_synchronization_with(name, &RunContext::new())
    }

    /// Runs one synchronization with the given context.
    ///
    /// The state carries the context's run id. A panic raised by a fetch,
    /// comparator, merge or save closure is reported as a failed run.
    pub fn run_synchronization_with(
        &self,
        name: &str,
        context: &RunContext,
    ) -> SynchronizationResultState<K, V> {
        let start = Instant::now();
        let run_id = context.run_id();
        let span = info_span!("synchronization", config = name, %run_id);
        let _enter = span.enter();

        let Some(configuration) = self.registry.get(name) else {
            warn!("no synchronization registered under this name");
            self.stats.write().unknown_configurations += 1;
            return SynchronizationResultState::new(
                name,
                run_id,
                start.elapsed(),
                RunOutcome::UnknownConfiguration,
            );
        };

        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execute_serialized(configuration, context)
        }));
        let run = run.unwrap_or_else(|_| Err(SyncError::External("synchronization panicked".into())));

        let outcome = match run {
            Ok(result) => {
                info!(
                    added = result.to_add().len(),
                    removed = result.to_remove().len(),
                    modified = result.modified().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "synchronization completed"
                );
                self.record_success();
                RunOutcome::Completed(result)
            }
            Err(error) => {
                warn!(%error, "synchronization failed");
                self.record_failure(&error);
                RunOutcome::Failed(error)
            }
        };

        SynchronizationResultState::new(name, run_id, start.elapsed(), outcome)
    }

    /// Runs every registered synchronization in registration order.
    pub fn run_all(&self) -> Vec<SynchronizationResultState<K, V>> {
        self.run_all_with(&RunContext::new())
    }

    /// Runs every registered synchronization, each with a copy of `context`
    /// under its own run id. A failing or panicking run does not affect the
    /// others.
    pub fn run_all_with(&self, context: &RunContext) -> Vec<SynchronizationResultState<K, V>> {
        self.registry
            .names()
            .map(|name| self.run_synchronization_with(name, &context.fork()))
            .collect()
    }

    /// Runs every registered synchronization on its own thread.
    ///
    /// States are returned in registration order.
    pub fn run_all_concurrent(&self) -> Vec<SynchronizationResultState<K, V>>
    where
        K: Send,
        V: Send,
        Self: Sync,
    {
        self.run_all_concurrent_with(&RunContext::new())
    }

    /// Concurrent variant of [`run_all_with`](Self::run_all_with).
    pub fn run_all_concurrent_with(
        &self,
        context: &RunContext,
    ) -> Vec<SynchronizationResultState<K, V>>
    where
        K: Send,
        V: Send,
        Self: Sync,
    {
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .registry
                .names()
                .map(|name| {
                    let context = context.fork();
                    let run_id = context.run_id();
                    let handle = scope.spawn(move || self.run_synchronization_with(name, &context));
                    (name, run_id, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, run_id, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        let error = SyncError::External("synchronization thread panicked".into());
                        self.record_failure(&error);
                        SynchronizationResultState::new(
                            name,
                            run_id,
                            std::time::Duration::ZERO,
                            RunOutcome::Failed(error),
                        )
                    })
                })
                .collect()
        })
    }

    /// Runs the configuration while holding its per-name lock.
    fn execute_serialized(
        &self,
        configuration: &SynchronizationConfiguration<K, V>,
        context: &RunContext,
    ) -> SyncResult<SynchronizationResult<K, V>> {
        let Some(lock) = self.locks.get(configuration.name()) else {
            return self.execute(configuration, context);
        };

        let _guard = match self.config.concurrent_runs {
            ConcurrentRunPolicy::Wait => lock.lock(),
            ConcurrentRunPolicy::Reject => lock
                .try_lock()
                .ok_or_else(|| SyncError::AlreadyRunning(configuration.name().to_string()))?,
        };

        self.execute(configuration, context)
    }

    /// Fetch, diff and (conditionally) save.
    fn execute(
        &self,
        configuration: &SynchronizationConfiguration<K, V>,
        context: &RunContext,
    ) -> SyncResult<SynchronizationResult<K, V>> {
        context.check_deadline()?;

        let policy = configuration.duplicate_keys();
        let source = configuration.source().fetch_keyed(Side::Source, policy)?;
        let destination = configuration
            .destination()
            .fetch_keyed(Side::Destination, policy)?;
        debug!(
            source = source.len(),
            destination = destination.len(),
            "fetched synchronization data"
        );

        let merge = configuration
            .merge_fn()
            .map(|merge| merge as &dyn Fn(&V, &V) -> V);
        let result = diff(&source, &destination, configuration.comparator(), merge);
        debug!(changes = result.change_count(), "computed delta");

        if result.has_changes() || context.force_save() || self.config.always_save {
            context.check_deadline()?;
            self.stats.write().saves_invoked += 1;
            configuration.save(&result, context)?;
            self.stats.write().changes_saved += result.change_count() as u64;
        } else {
            debug!("no changes, save skipped");
        }

        Ok(result)
    }

    fn record_success(&self) {
        let mut stats = self.stats.write();
        stats.runs_completed += 1;
        stats.last_run_time = Some(Instant::now());
    }

    fn record_failure(&self, error: &SyncError) {
        let mut stats = self.stats.write();
        stats.runs_failed += 1;
        stats.last_run_time = Some(Instant::now());
        stats.last_error = Some(error.to_string());
    }
}

impl<K, V> fmt::Debug for SynchronizationRunner<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizationRunner")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
