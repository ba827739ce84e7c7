// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Introspected type descriptors.
//!
//! The [`Introspector`] searches code containers for a native type by exact
//! full name and caches the resulting [`ObjectType`]. The cache belongs to the
//! introspector (and so to the resolver that owns it) rather than to the
//! process. It is append-only: the first descriptor stored under a name is
//! the one every caller gets, including callers that raced to build it.

use crate::config::MetaConfig;
use crate::descriptor::{ObjectType, ROOT_TYPE_NAME};
use crate::native::{CodeContainer, ContainerSource, NativeType};
use crate::provider::MetadataProvider;
use crate::record::record_native_type;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Name of the container holding the crate's own native types.
pub const BUILTIN_CONTAINER: &str = "typemeta";

/// Builds and caches descriptors for native types.
pub struct Introspector {
    source: Arc<dyn ContainerSource>,
    builtin: Arc<CodeContainer>,
    core_container: String,
    cache: DashMap<String, Arc<ObjectType>>,
}

impl Introspector {
    pub fn new(source: Arc<dyn ContainerSource>) -> Self {
        Self::with_config(source, &MetaConfig::default())
    }

    pub fn with_config(source: Arc<dyn ContainerSource>, config: &MetaConfig) -> Self {
        let builtin = CodeContainer::new(BUILTIN_CONTAINER).with_type(record_native_type());
        Self {
            source,
            builtin: Arc::new(builtin),
            core_container: config.core_container.clone(),
            cache: DashMap::new(),
        }
    }

    /// Descriptor for `full_name`, built on first request.
    ///
    /// `resolver` is attached to a newly built descriptor and used later to
    /// resolve its parent. The root name never reaches the cache.
    pub fn get(
        &self,
        resolver: Option<Weak<dyn MetadataProvider>>,
        full_name: &str,
    ) -> Option<Arc<ObjectType>> {
        if full_name == ROOT_TYPE_NAME {
            return Some(ObjectType::root());
        }
        if let Some(cached) = self.cache.get(full_name) {
            return Some(Arc::clone(cached.value()));
        }

        let native = self.find_native(full_name)?;
        let candidate = ObjectType::introspected(native, resolver);
        match self.cache.entry(full_name.to_string()) {
            Entry::Occupied(existing) => Some(Arc::clone(existing.get())),
            Entry::Vacant(slot) => {
                log::debug!("[typemeta] introspected '{}'", full_name);
                Some(Arc::clone(slot.insert(candidate).value()))
            }
        }
    }

    /// Native type for `full_name`.
    ///
    /// Search order: the built-in container, the configured core container,
    /// then every other container in source order.
    pub fn find_native(&self, full_name: &str) -> Option<Arc<NativeType>> {
        if let Some(found) = self.builtin.find(full_name) {
            return Some(found);
        }
        let containers = self.source.containers();
        let (core, others): (Vec<_>, Vec<_>) = containers
            .iter()
            .partition(|c| c.name() == self.core_container);
        core.into_iter()
            .chain(others)
            .find_map(|container| container.find(full_name))
    }

    /// Cached descriptor, without building one.
    pub fn cached(&self, full_name: &str) -> Option<Arc<ObjectType>> {
        self.cache.get(full_name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::StaticContainers;
    use crate::record::RECORD_TYPE_NAME;

    fn source() -> Arc<StaticContainers> {
        Arc::new(
            StaticContainers::new()
                .with_container(
                    CodeContainer::new("plugins")
                        .with_type(NativeType::opaque("App.Widget", Some("plugin"))),
                )
                .with_container(
                    CodeContainer::new("core")
                        .with_type(NativeType::opaque("App.Widget", Some("core"))),
                ),
        )
    }

    #[test]
    fn test_core_container_searched_first() {
        let introspector = Introspector::new(source());
        let widget = introspector.find_native("App.Widget").unwrap();
        assert_eq!(widget.parent(), Some("core"));
    }

    #[test]
    fn test_builtin_record_type_available() {
        let introspector = Introspector::new(Arc::new(StaticContainers::new()));
        assert!(introspector.find_native(RECORD_TYPE_NAME).is_some());
    }

    #[test]
    fn test_cache_returns_same_descriptor() {
        let introspector = Introspector::new(source());
        let a = introspector.get(None, "App.Widget").unwrap();
        let b = introspector.get(None, "App.Widget").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(introspector.len(), 1);
        assert!(introspector.get(None, "App.Missing").is_none());
    }

    #[test]
    fn test_root_bypasses_cache() {
        let introspector = Introspector::new(source());
        let root = introspector.get(None, ROOT_TYPE_NAME).unwrap();
        assert!(root.is_root());
        assert!(introspector.is_empty());
    }

    #[test]
    fn test_racing_lookups_share_one_descriptor() {
        let introspector = Arc::new(Introspector::new(source()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let introspector = Arc::clone(&introspector);
                std::thread::spawn(move || introspector.get(None, "App.Widget").unwrap())
            })
            .collect();
        let found: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(found.iter().all(|t| Arc::ptr_eq(t, &found[0])));
    }
}
