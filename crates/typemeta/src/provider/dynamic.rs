// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of object types declared at run time.

use super::{MetadataProvider, MetadataProviderExt};
use crate::descriptor::{DataType, ObjectType, ROOT_TYPE_NAME};
use crate::error::{MetaError, Result};
use crate::native::NativeType;
use crate::record::record_native_type;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

#[derive(Default)]
struct RegistryState {
    types: HashMap<String, Arc<ObjectType>>,
    order: Vec<String>,
}

/// Registry of dynamic object types.
///
/// Registration is expected during start-up; lookups may run concurrently
/// afterwards.
pub struct DynamicTypeRegistry {
    name: String,
    state: RwLock<RegistryState>,
    resolver: RwLock<Option<Weak<dyn MetadataProvider>>>,
    record_carrier: Arc<NativeType>,
}

impl DynamicTypeRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(RegistryState::default()),
            resolver: RwLock::new(None),
            record_carrier: Arc::new(record_native_type()),
        }
    }

    /// Attach the resolver handed to registered types, including existing ones.
    pub fn attach_resolver(&self, provider: Weak<dyn MetadataProvider>) {
        for ty in self.types() {
            ty.attach_resolver(provider.clone());
        }
        *self.resolver.write() = Some(provider);
    }

    pub fn resolver(&self) -> Option<Arc<dyn MetadataProvider>> {
        self.resolver.read().as_ref().and_then(Weak::upgrade)
    }

    fn resolver_weak(&self) -> Option<Weak<dyn MetadataProvider>> {
        self.resolver.read().clone()
    }

    /// Register a dynamic type over a native carrier.
    ///
    /// Without `derives_from` the carrier's native parent is looked up through
    /// the resolver, falling back to the root when it cannot be found.
    pub fn register_object_type(
        &self,
        full_name: &str,
        carrier: Arc<NativeType>,
        derives_from: Option<&str>,
    ) -> Result<Arc<ObjectType>> {
        if self.state.read().types.contains_key(full_name) {
            return Err(MetaError::DuplicateType(full_name.to_string()));
        }

        let parent = match derives_from {
            Some(parent) => self.resolve_parent(parent)?,
            None => match carrier.parent() {
                None | Some(ROOT_TYPE_NAME) => ObjectType::root(),
                Some(native_parent) => match self.resolve_parent(native_parent) {
                    Ok(parent) => parent,
                    Err(MetaError::TypeNotFound(_)) => {
                        log::debug!(
                            "[typemeta] parent '{}' of '{}' not found, using root",
                            native_parent,
                            full_name
                        );
                        ObjectType::root()
                    }
                    Err(e) => return Err(e),
                },
            },
        };

        let ty = ObjectType::dynamic(full_name, carrier, parent, self.resolver_weak());
        self.insert(Arc::clone(&ty))?;
        Ok(ty)
    }

    /// Register a dynamic type carried by a plain record.
    pub fn register_record_type(
        &self,
        full_name: &str,
        derives_from: Option<&str>,
    ) -> Result<Arc<ObjectType>> {
        self.register_object_type(full_name, Arc::clone(&self.record_carrier), derives_from)
    }

    /// Add an already built descriptor.
    pub fn insert(&self, ty: Arc<ObjectType>) -> Result<()> {
        self.insert_all(std::slice::from_ref(&ty))
    }

    /// Add several descriptors, all or none.
    ///
    /// A name already registered, or repeated within `types`, rejects the
    /// whole batch.
    pub fn insert_all(&self, types: &[Arc<ObjectType>]) -> Result<()> {
        let mut state = self.state.write();
        let mut batch = HashSet::with_capacity(types.len());
        for ty in types {
            let full_name = ty.full_name();
            if state.types.contains_key(full_name) || !batch.insert(full_name) {
                return Err(MetaError::DuplicateType(full_name.to_string()));
            }
        }

        let resolver = self.resolver_weak();
        for ty in types {
            if let Some(resolver) = &resolver {
                ty.attach_resolver(resolver.clone());
            }
            log::debug!(
                "[typemeta] {}: registered '{}' (parent {:?})",
                self.name,
                ty.full_name(),
                ty.parent_name()
            );
            let full_name = ty.full_name().to_string();
            state.order.push(full_name.clone());
            state.types.insert(full_name, Arc::clone(ty));
        }
        Ok(())
    }

    pub fn get(&self, full_name: &str) -> Option<Arc<ObjectType>> {
        self.state.read().types.get(full_name).cloned()
    }

    /// Registered types, in registration order.
    pub fn types(&self) -> Vec<Arc<ObjectType>> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|name| state.types.get(name).cloned())
            .collect()
    }

    /// Native carrier used by [`register_record_type`](Self::register_record_type).
    pub fn record_carrier(&self) -> &Arc<NativeType> {
        &self.record_carrier
    }

    pub fn len(&self) -> usize {
        self.state.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().types.is_empty()
    }

    /// Parent lookup: this registry first, then the attached resolver.
    fn resolve_parent(&self, name: &str) -> Result<Arc<ObjectType>> {
        if name == ROOT_TYPE_NAME {
            return Ok(ObjectType::root());
        }
        if let Some(local) = self.get(name) {
            return Ok(local);
        }
        let resolver = self
            .resolver()
            .ok_or_else(|| MetaError::MissingResolver(self.name.clone()))?;
        resolver.require_object_type(name)
    }
}

impl MetadataProvider for DynamicTypeRegistry {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn lookup_local(&self, full_name: &str) -> Option<DataType> {
        self.get(full_name).map(DataType::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;

    #[test]
    fn test_register_and_lookup() {
        let registry = DynamicTypeRegistry::new("dynamic");
        let order = registry.register_record_type("Sales.Order", None).unwrap();
        order.add_property("Total", PrimitiveKind::F64).unwrap();

        let found = registry.get_object_type("Sales.Order").unwrap();
        assert!(Arc::ptr_eq(&found, &order));
        assert!(found.derives_from().unwrap().unwrap().is_root());
        assert!(found.is_dynamic());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = DynamicTypeRegistry::new("dynamic");
        let first = registry.register_record_type("Sales.Order", None).unwrap();
        assert_eq!(
            registry.register_record_type("Sales.Order", None).unwrap_err(),
            MetaError::DuplicateType("Sales.Order".into())
        );
        assert!(Arc::ptr_eq(&registry.get("Sales.Order").unwrap(), &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let registry = DynamicTypeRegistry::new("dynamic");
        registry.register_record_type("Crm.Party", None).unwrap();
        let carrier = Arc::clone(registry.record_carrier());
        let build = |name: &str| {
            ObjectType::dynamic(name, Arc::clone(&carrier), ObjectType::root(), None)
        };

        let clash = [build("Crm.Lead"), build("Crm.Party")];
        assert_eq!(
            registry.insert_all(&clash).unwrap_err(),
            MetaError::DuplicateType("Crm.Party".into())
        );
        let repeated = [build("Crm.Lead"), build("Crm.Lead")];
        assert_eq!(
            registry.insert_all(&repeated).unwrap_err(),
            MetaError::DuplicateType("Crm.Lead".into())
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Crm.Lead").is_none());

        registry
            .insert_all(&[build("Crm.Lead"), build("Crm.Account")])
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_explicit_parent_from_same_registry() {
        let registry = DynamicTypeRegistry::new("dynamic");
        registry.register_record_type("Crm.Party", None).unwrap();
        let person = registry
            .register_record_type("Crm.Person", Some("Crm.Party"))
            .unwrap();
        assert_eq!(person.parent_name(), Some("Crm.Party"));

        let names: Vec<_> = registry
            .types()
            .iter()
            .map(|t| t.full_name().to_string())
            .collect();
        assert_eq!(names, vec!["Crm.Party", "Crm.Person"]);
    }

    #[test]
    fn test_unknown_parent_needs_resolver() {
        let registry = DynamicTypeRegistry::new("dynamic");
        assert_eq!(
            registry
                .register_record_type("Crm.Person", Some("Crm.Party"))
                .unwrap_err(),
            MetaError::MissingResolver("dynamic".into())
        );
    }
}
