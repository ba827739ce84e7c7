// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Provider backed by the introspector.

use super::MetadataProvider;
use crate::descriptor::DataType;
use crate::introspect::Introspector;
use crate::native::ContainerSource;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Resolves names to introspected descriptors.
///
/// Descriptors built here resolve their parents through the attached
/// resolver; a standalone provider resolves through itself.
pub struct IntrospectionProvider {
    introspector: Introspector,
    resolver: RwLock<Option<Weak<dyn MetadataProvider>>>,
}

impl IntrospectionProvider {
    /// Provider that is its own resolver.
    pub fn new(source: Arc<dyn ContainerSource>) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let resolver: Weak<dyn MetadataProvider> = this.clone();
            Self {
                introspector: Introspector::new(source),
                resolver: RwLock::new(Some(resolver)),
            }
        })
    }

    /// Provider over an existing introspector, resolver attached later.
    pub fn with_introspector(introspector: Introspector) -> Self {
        Self {
            introspector,
            resolver: RwLock::new(None),
        }
    }

    pub fn attach_resolver(&self, provider: Weak<dyn MetadataProvider>) {
        *self.resolver.write() = Some(provider);
    }

    pub fn introspector(&self) -> &Introspector {
        &self.introspector
    }
}

impl MetadataProvider for IntrospectionProvider {
    fn provider_name(&self) -> &str {
        "introspection"
    }

    fn lookup_local(&self, full_name: &str) -> Option<DataType> {
        let resolver = self.resolver.read().clone();
        self.introspector
            .get(resolver, full_name)
            .map(DataType::Object)
    }
}
