//! Per-run context handed to the save callback.

use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Context of one synchronization run.
///
/// The engine only reads `force_save`. Everything else is carried through
/// to the save callback untouched.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Uuid,
    force_save: bool,
    deadline: Option<Instant>,
    attributes: HashMap<String, String>,
}

impl RunContext {
    /// Creates a context with a fresh run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            force_save: false,
            deadline: None,
            attributes: HashMap::new(),
        }
    }

    /// Invokes save even when the delta is empty.
    pub fn with_force_save(mut self, force: bool) -> Self {
        self.force_save = force;
        self
    }

    /// Sets a deadline relative to now.
    ///
    /// A timeout too large to represent leaves the run without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attaches an attribute for the save callback.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Identifier of the run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whether save runs for empty deltas.
    pub fn force_save(&self) -> bool {
        self.force_save
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Gets an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Fails with [`SyncError::DeadlineExceeded`] once the deadline has passed.
    pub fn check_deadline(&self) -> SyncResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SyncError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Returns a copy of this context with a new run id.
    pub(crate) fn fork(&self) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
