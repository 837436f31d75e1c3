//! Name-indexed registry of synchronization configurations.

use crate::configuration::SynchronizationConfiguration;
use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered configurations in registration order.
///
/// Populated once at startup and then handed to the runner, which only reads it.
pub struct ConfigurationRegistry<K, V> {
    configurations: Vec<Arc<SynchronizationConfiguration<K, V>>>,
    by_name: HashMap<String, usize>,
}

impl<K, V> ConfigurationRegistry<K, V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            configurations: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registers a configuration. Names must be unique.
    pub fn register(&mut self, configuration: SynchronizationConfiguration<K, V>) -> SyncResult<()> {
        let name = configuration.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(SyncError::DuplicateConfiguration(name));
        }
        self.by_name.insert(name, self.configurations.len());
        self.configurations.push(Arc::new(configuration));
        Ok(())
    }

    /// Registers a configuration, builder style.
    pub fn with(mut self, configuration: SynchronizationConfiguration<K, V>) -> SyncResult<Self> {
        self.register(configuration)?;
        Ok(self)
    }

    /// Looks up a configuration by name.
    pub fn get(&self, name: &str) -> Option<&Arc<SynchronizationConfiguration<K, V>>> {
        self.by_name.get(name).map(|&pos| &self.configurations[pos])
    }

    /// Returns true if a configuration with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names of all configurations in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configurations.iter().map(|c| c.name())
    }

    /// Iterates over configurations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SynchronizationConfiguration<K, V>>> {
        self.configurations.iter()
    }

    /// Number of registered configurations.
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

impl<K, V> Default for ConfigurationRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for ConfigurationRegistry<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SynchronizationDataProvider;

    fn config(name: &str) -> SynchronizationConfiguration<u32, u32> {
        let empty = SynchronizationDataProvider::from_items(Vec::new(), |n: &u32| *n);
        SynchronizationConfiguration::new(name, empty.clone(), empty, |a, b| a == b, |_, _| Ok(()))
    }

    #[test]
    fn lookup_and_order() {
        let registry = ConfigurationRegistry::new()
            .with(config("users"))
            .unwrap()
            .with(config("groups"))
            .unwrap()
            .with(config("roles"))
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("groups"));
        assert_eq!(registry.get("roles").map(|c| c.name()), Some("roles"));
        assert!(registry.get("missing").is_none());

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["users", "groups", "roles"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ConfigurationRegistry::new();
        registry.register(config("users")).unwrap();

        let err = registry.register(config("users")).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateConfiguration(ref name) if name == "users"));
        assert_eq!(registry.len(), 1);
    }
}
