//! A read-only lookup table of named strategies.
//!
//! A [`Registry`] is populated once through a [`RegistryBuilder`], usually at process start, and
//! never changes afterwards, so it can be shared freely between threads.

use crate::{
    error::{Error, UnknownStrategy},
    strategy::Method,
};
use levenshtein::levenshtein;
use std::{collections::HashMap, fmt, sync::Arc};

/// Names within this edit distance of a missing name are suggested in the error.
const SUGGESTION_DISTANCE: usize = 2;

/// A registered strategy and what it is for.
#[derive(Clone)]
pub struct Entry {
    /// The strategy.
    pub method: Arc<dyn Method>,

    /// A one-line description of the strategy.
    pub description: String,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("method", &self.method.name())
            .field("description", &self.description)
            .finish()
    }
}

/// Populates a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `method` under its own name, replacing any strategy already registered under
    /// that name.
    pub fn register(mut self, method: Arc<dyn Method>, description: impl Into<String>) -> Self {
        let name = method.name().to_string();
        let entry = Entry { method, description: description.into() };
        if self.entries.insert(name.clone(), entry).is_some() {
            tracing::warn!(%name, "strategy registered twice; keeping the last one");
        }
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> Registry {
        tracing::debug!(strategies = self.entries.len(), "built strategy registry");
        Registry { entries: self.entries }
    }
}

/// Named strategies, looked up by name.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The strategy registered under `name`.
    ///
    /// If there is none, the error lists the registered names that are close to `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Method>, Error> {
        match self.entries.get(name) {
            Some(entry) => Ok(Arc::clone(&entry.method)),
            None => Err(UnknownStrategy {
                name: name.to_string(),
                suggestions: self.similar_names(name),
            }.into()),
        }
    }

    /// The entry registered under `name`, if any.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Returns all registered names similar to the given name, sorted.
    pub fn similar_names(&self, name: &str) -> Vec<String> {
        let mut names = self
            .entries
            .keys()
            .filter(|n| levenshtein(n, name) <= SUGGESTION_DISTANCE)
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// The registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.entries.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
