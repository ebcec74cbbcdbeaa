//! Named filter storage.
//!
//! ```rust
//! use sqlmerge_query::{Filter, FilterRegistry};
//!
//! let registry = FilterRegistry::new();
//! registry.register("active", Filter::new(["u.id"], ["u"], Vec::<&str>::new(), ["u.active"]));
//!
//! assert!(registry.contains("active"));
//! assert!(registry.get("missing").is_none());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use crate::compose::{ComposedQuery, Composer};
use crate::error::ComposeResult;
use crate::filter::Filter;
use crate::value::ArgumentGroup;

/// A thread-safe map from filter name to [`Filter`].
///
/// Concurrent lookups share a read lock; registration takes the write lock.
/// Entries are never removed, only overwritten.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    filters: RwLock<HashMap<SmolStr, Arc<Filter>>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<SmolStr>, filter: Filter) {
        let name = name.into();
        debug!(name = %name, tables = filter.tables.len(), "FilterRegistry::register()");
        self.filters.write().insert(name, Arc::new(filter));
    }

    /// Look up a filter by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<Filter>> {
        self.filters.read().get(name).cloned()
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.read().contains_key(name)
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.read().len()
    }

    /// Check whether no filter is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<SmolStr> {
        let mut names: Vec<_> = self.filters.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Compose registered filters with the default configuration.
    ///
    /// See [`Composer::compose`].
    pub fn compose<S: AsRef<str>>(
        &self,
        names: &[S],
        groups: &[ArgumentGroup],
    ) -> ComposeResult<ComposedQuery> {
        Composer::new(self).compose(names, groups)
    }
}

impl<N: Into<SmolStr>> Extend<(N, Filter)> for FilterRegistry {
    fn extend<I: IntoIterator<Item = (N, Filter)>>(&mut self, iter: I) {
        let filters = self.filters.get_mut();
        for (name, filter) in iter {
            filters.insert(name.into(), Arc::new(filter));
        }
    }
}

impl<N: Into<SmolStr>> FromIterator<(N, Filter)> for FilterRegistry {
    fn from_iter<I: IntoIterator<Item = (N, Filter)>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn table(name: &str) -> Filter {
        Filter::builder().select([format!("{name}.id")]).from(name).build()
    }

    #[test]
    fn test_register_overwrites() {
        let registry = FilterRegistry::new();
        registry.register("f", table("a"));
        registry.register("f", table("b"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("f").unwrap().anchor(), Some("b"));
    }

    #[test]
    fn test_names_sorted() {
        let registry: FilterRegistry =
            [("zeta", table("z")), ("alpha", table("a"))].into_iter().collect();
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let registry = Arc::new(FilterRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let name = format!("f{i}");
                    registry.register(name.as_str(), table("t"));
                    for _ in 0..100 {
                        assert!(registry.get(&name).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
