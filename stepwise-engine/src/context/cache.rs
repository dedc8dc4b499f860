use crate::{
    error::Error,
    expr::{Expression, Path, Subexpression},
};
use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard},
};

type Key = (usize, Path, Expression);

/// Remembers whether a method succeeded on a subexpression, so a method known to fail there is
/// not run again.
///
/// Only the first outcome for a method and subexpression is stored. Fatal errors are never
/// stored. Cloning gives an empty cache, since a cloned context usually differs in a way that
/// can change outcomes.
#[derive(Default)]
pub struct OutcomeCache {
    outcomes: Mutex<HashMap<Key, bool>>,
}

impl OutcomeCache {
    fn lock(&self) -> MutexGuard<'_, HashMap<Key, bool>> {
        // a panic while holding the lock cannot leave the map half-written
        self.outcomes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The stored outcome of the method `id` on `sub`, if any.
    pub fn get(&self, id: usize, sub: &Subexpression) -> Option<bool> {
        self.lock().get(&(id, sub.path.clone(), sub.expr.clone())).copied()
    }

    /// Runs `run` unless the method `id` is known to fail on `sub`, and stores its outcome if
    /// none was stored yet.
    ///
    /// The cache is not locked while `run` executes, so `run` may itself consult the cache.
    pub fn unless_previously_failed<T>(
        &self,
        id: usize,
        sub: &Subexpression,
        run: impl FnOnce() -> Result<Option<T>, Error>,
    ) -> Result<Option<T>, Error> {
        let key = (id, sub.path.clone(), sub.expr.clone());
        if self.lock().get(&key) == Some(&false) {
            tracing::trace!(method = id, path = %sub.path, "cached failure");
            return Ok(None);
        }

        let result = run()?;
        self.lock().entry(key).or_insert(result.is_some());
        Ok(result)
    }

    /// The number of stored outcomes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for OutcomeCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for OutcomeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use super::*;

    fn one() -> Subexpression {
        Subexpression::root(Expression::integer(1))
    }

    #[test]
    fn failures_short_circuit() {
        let cache = OutcomeCache::default();
        let runs = Cell::new(0);
        let fail = || {
            runs.set(runs.get() + 1);
            Ok::<Option<()>, Error>(None)
        };

        assert_eq!(cache.unless_previously_failed(7, &one(), fail).unwrap(), None);
        assert_eq!(cache.unless_previously_failed(7, &one(), fail).unwrap(), None);
        assert_eq!(runs.get(), 1);
        assert_eq!(cache.get(7, &one()), Some(false));

        // another method, or the same expression elsewhere, is a different entry
        let elsewhere = Subexpression::new(Path::from_indices([0]), Expression::integer(1));
        assert_eq!(cache.unless_previously_failed(8, &one(), fail).unwrap(), None);
        assert_eq!(cache.unless_previously_failed(7, &elsewhere, fail).unwrap(), None);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn first_outcome_is_kept() {
        let cache = OutcomeCache::default();
        assert_eq!(cache.unless_previously_failed(1, &one(), || Ok(Some(2))).unwrap(), Some(2));
        assert_eq!(cache.unless_previously_failed(1, &one(), || Ok(None::<i32>)).unwrap(), None);
        assert_eq!(cache.get(1, &one()), Some(true));
    }

    #[test]
    fn clones_start_empty() {
        let cache = OutcomeCache::default();
        cache.unless_previously_failed(1, &one(), || Ok(None::<()>)).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.clone().is_empty());
    }
}
