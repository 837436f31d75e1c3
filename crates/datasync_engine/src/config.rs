//! Configuration for the synchronization runner.

/// What a run does when the same configuration is already running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrentRunPolicy {
    /// Block until the earlier run finishes.
    #[default]
    Wait,
    /// Fail immediately with `SyncError::AlreadyRunning`.
    Reject,
}

/// Configuration for [`SynchronizationRunner`](crate::SynchronizationRunner).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Handling of overlapping runs of one configuration.
    pub concurrent_runs: ConcurrentRunPolicy,
    /// Invoke save even when the delta is empty.
    ///
    /// A run context can also request this per run.
    pub always_save: bool,
}

impl RunnerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            concurrent_runs: ConcurrentRunPolicy::Wait,
            always_save: false,
        }
    }

    /// Sets the concurrent run policy.
    pub fn with_concurrent_runs(mut self, policy: ConcurrentRunPolicy) -> Self {
        self.concurrent_runs = policy;
        self
    }

    /// Sets whether save is invoked for empty deltas.
    pub fn with_always_save(mut self, always: bool) -> Self {
        self.always_save = always;
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.concurrent_runs, ConcurrentRunPolicy::Wait);
        assert!(!config.always_save);
    }

    #[test]
    fn config_builder() {
        let config = RunnerConfig::new()
            .with_concurrent_runs(ConcurrentRunPolicy::Reject)
            .with_always_save(true);

        assert_eq!(config.concurrent_runs, ConcurrentRunPolicy::Reject);
        assert!(config.always_save);
    }
}
