//! Component registry
//!
//! Ordered, read-only mapping from application name to a factory producing
//! the component. Built once at startup and passed to whoever needs it;
//! there is no runtime registration.

use thiserror::Error;

use crate::apps;
use crate::component::Component;

/// Produces a fresh component value.
pub type ComponentFactory = fn() -> Box<dyn Component>;

/// Registry lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No application registered under this name
    #[error("Unknown application: {name}")]
    UnknownApplication { name: String },
}

/// Name → factory table.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<(&'static str, ComponentFactory)>,
}

impl Registry {
    /// Build a registry from explicit entries. Later duplicates of a name
    /// are ignored so the first registration wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (&'static str, ComponentFactory)>) -> Self {
        let mut unique: Vec<(&'static str, ComponentFactory)> = Vec::new();
        for (name, factory) in entries {
            if !unique.iter().any(|(existing, _)| *existing == name) {
                unique.push((name, factory));
            }
        }
        Self { entries: unique }
    }

    /// Registry of every application in the built-in catalogue.
    pub fn builtin() -> Self {
        Self::from_entries(apps::BUILTIN.iter().copied())
    }

    /// Find the factory for `name` without invoking it.
    pub fn lookup(&self, name: &str) -> Result<ComponentFactory, RegistryError> {
        self.entries
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, factory)| *factory)
            .ok_or_else(|| RegistryError::UnknownApplication {
                name: name.to_string(),
            })
    }

    /// Look up `name` and build the component.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>, RegistryError> {
        self.lookup(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(registered, _)| *registered == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
