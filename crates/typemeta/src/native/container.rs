// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Code containers: named groups of native types the introspector can search.

use crate::native::NativeType;
use parking_lot::RwLock;
use std::sync::Arc;

/// A named, logical group of native types.
#[derive(Debug, Clone)]
pub struct CodeContainer {
    name: String,
    types: Vec<Arc<NativeType>>,
}

impl CodeContainer {
    /// Create an empty container.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Add a type (builder style).
    pub fn with_type(mut self, native: NativeType) -> Self {
        self.add(native);
        self
    }

    /// Add a type and return the shared handle.
    pub fn add(&mut self, native: NativeType) -> Arc<NativeType> {
        let native = Arc::new(native);
        self.types.push(Arc::clone(&native));
        native
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact full-name match; first added wins.
    pub fn find(&self, full_name: &str) -> Option<Arc<NativeType>> {
        self.types
            .iter()
            .find(|t| t.full_name() == full_name)
            .cloned()
    }

    pub fn types(&self) -> &[Arc<NativeType>] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Enumerates the containers currently available for introspection.
pub trait ContainerSource: Send + Sync {
    fn containers(&self) -> Vec<Arc<CodeContainer>>;
}

/// Fixed, in-memory list of containers.
#[derive(Debug, Default)]
pub struct StaticContainers {
    containers: RwLock<Vec<Arc<CodeContainer>>>,
}

impl StaticContainers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a container (builder style).
    pub fn with_container(self, container: CodeContainer) -> Self {
        self.add(container);
        self
    }

    /// Append a container; later containers are searched after earlier ones.
    pub fn add(&self, container: CodeContainer) {
        log::debug!(
            "[typemeta] container '{}' added ({} types)",
            container.name(),
            container.len()
        );
        self.containers.write().push(Arc::new(container));
    }
}

impl ContainerSource for StaticContainers {
    fn containers(&self) -> Vec<Arc<CodeContainer>> {
        self.containers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_find() {
        let container = CodeContainer::new("app")
            .with_type(NativeType::opaque("App.A", None))
            .with_type(NativeType::opaque("App.B", Some("App.A")));

        assert_eq!(container.len(), 2);
        assert_eq!(
            container.find("App.B").and_then(|t| t.parent().map(str::to_string)),
            Some("App.A".to_string())
        );
        assert!(container.find("App.C").is_none());
    }

    #[test]
    fn test_static_containers_keep_order() {
        let source = StaticContainers::new()
            .with_container(CodeContainer::new("first"))
            .with_container(CodeContainer::new("second"));
        source.add(CodeContainer::new("third"));

        let names: Vec<_> = source
            .containers()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
