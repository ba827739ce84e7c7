// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Chained and aggregate compositions.

use super::MetadataProvider;
use crate::descriptor::DataType;
use std::sync::Arc;

/// A store that falls through to `next` on a miss.
///
/// The store (with its own next providers) is walked before `next`.
pub struct ChainedProvider {
    name: String,
    store: Arc<dyn MetadataProvider>,
    next: Arc<dyn MetadataProvider>,
}

impl ChainedProvider {
    pub fn new(store: Arc<dyn MetadataProvider>, next: Arc<dyn MetadataProvider>) -> Self {
        let name = format!("{} -> {}", store.provider_name(), next.provider_name());
        Self { name, store, next }
    }

    pub fn store(&self) -> &Arc<dyn MetadataProvider> {
        &self.store
    }

    pub fn next(&self) -> &Arc<dyn MetadataProvider> {
        &self.next
    }
}

impl MetadataProvider for ChainedProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn lookup_local(&self, _full_name: &str) -> Option<DataType> {
        None
    }

    fn next_providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        vec![Arc::clone(&self.store), Arc::clone(&self.next)]
    }
}

/// Tries N providers in order; holds no store of its own.
#[derive(Default)]
pub struct AggregateProvider {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl AggregateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider (builder style).
    pub fn with(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl From<Vec<Arc<dyn MetadataProvider>>> for AggregateProvider {
    fn from(providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }
}

impl MetadataProvider for AggregateProvider {
    fn provider_name(&self) -> &str {
        "aggregate"
    }

    fn lookup_local(&self, _full_name: &str) -> Option<DataType> {
        None
    }

    fn next_providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        self.providers.clone()
    }
}
