// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Standard composition: dynamic registry, then introspection, then primitives.

use super::{
    ChainedProvider, DynamicTypeRegistry, IntrospectionProvider, ManualProvider,
    MetadataProvider, MetadataProviderExt,
};
use crate::config::MetaConfig;
use crate::descriptor::{DataType, ObjectType};
use crate::error::Result;
use crate::introspect::Introspector;
use crate::native::{ContainerSource, CreateContext, NativeType};
use crate::record::DynamicRecord;
use std::sync::{Arc, Weak};

/// The default resolver.
///
/// Dynamic types are tried first, so a run-time definition shadows an
/// introspected type of the same name. Every descriptor created through it
/// resolves parents and property types through the whole chain.
pub struct StandardProvider {
    config: MetaConfig,
    registry: Arc<DynamicTypeRegistry>,
    introspection: Arc<IntrospectionProvider>,
    primitives: Arc<ManualProvider>,
    chain: Arc<dyn MetadataProvider>,
}

impl StandardProvider {
    pub fn new(source: Arc<dyn ContainerSource>) -> Arc<Self> {
        Self::with_config(source, MetaConfig::default())
    }

    pub fn with_config(source: Arc<dyn ContainerSource>, config: MetaConfig) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let resolver: Weak<dyn MetadataProvider> = this.clone();

            let registry = Arc::new(DynamicTypeRegistry::new("dynamic"));
            registry.attach_resolver(resolver.clone());

            let introspection = Arc::new(IntrospectionProvider::with_introspector(
                Introspector::with_config(source, &config),
            ));
            introspection.attach_resolver(resolver);

            let primitives = Arc::new(ManualProvider::with_primitives("primitives"));

            let tail: Arc<dyn MetadataProvider> = Arc::new(ChainedProvider::new(
                Arc::clone(&introspection) as Arc<dyn MetadataProvider>,
                Arc::clone(&primitives) as Arc<dyn MetadataProvider>,
            ));
            let chain = Arc::new(ChainedProvider::new(
                Arc::clone(&registry) as Arc<dyn MetadataProvider>,
                tail,
            ));

            Self {
                config,
                registry,
                introspection,
                primitives,
                chain,
            }
        })
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DynamicTypeRegistry> {
        &self.registry
    }

    pub fn introspection(&self) -> &Arc<IntrospectionProvider> {
        &self.introspection
    }

    pub fn primitives(&self) -> &Arc<ManualProvider> {
        &self.primitives
    }

    /// Register a dynamic type over a native carrier.
    pub fn register_object_type(
        &self,
        full_name: &str,
        carrier: Arc<NativeType>,
        derives_from: Option<&str>,
    ) -> Result<Arc<ObjectType>> {
        self.registry
            .register_object_type(full_name, carrier, derives_from)
    }

    /// Register a dynamic type carried by a plain record.
    pub fn register_record_type(
        &self,
        full_name: &str,
        derives_from: Option<&str>,
    ) -> Result<Arc<ObjectType>> {
        self.registry.register_record_type(full_name, derives_from)
    }

    /// Resolve a type and create an instance with an empty context.
    pub fn create_record(&self, full_name: &str) -> Result<DynamicRecord> {
        self.require_object_type(full_name)?
            .create_instance(&CreateContext::empty())
    }
}

impl MetadataProvider for StandardProvider {
    fn provider_name(&self) -> &str {
        "standard"
    }

    fn lookup_local(&self, _full_name: &str) -> Option<DataType> {
        None
    }

    fn next_providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        vec![Arc::clone(&self.chain)]
    }
}
