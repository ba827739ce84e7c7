// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metadata resolver chain.
//!
//! A provider answers for its own store through [`MetadataProvider::lookup_local`]
//! and names the providers to ask next. The walk itself lives in
//! [`MetadataProviderExt`] so every composition follows the same rules:
//!
//! 1. own store first, then next providers in declared order
//! 2. the first match of the requested kind wins
//! 3. no provider is visited twice in one lookup
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use typemeta::native::StaticContainers;
//! use typemeta::provider::{MetadataProviderExt, StandardProvider};
//! use typemeta::PrimitiveKind;
//!
//! let standard = StandardProvider::new(Arc::new(StaticContainers::new()));
//! let order = standard.register_record_type("Sales.Order", None).unwrap();
//! order.add_property("Total", PrimitiveKind::F64).unwrap();
//!
//! let found = standard.get_object_type("Sales.Order").unwrap();
//! assert!(Arc::ptr_eq(&found, &order));
//! assert_eq!(standard.get_data_type::<PrimitiveKind>("i32"), Some(PrimitiveKind::I32));
//! ```

mod chain;
mod dynamic;
mod introspection;
mod manual;
mod standard;


pub use chain::{AggregateProvider, ChainedProvider};
pub use dynamic::DynamicTypeRegistry;
pub use introspection::IntrospectionProvider;
pub use manual::ManualProvider;
pub use standard::StandardProvider;

use crate::descriptor::{DataType, ObjectType, PrimitiveKind, TypeSpec};
use crate::error::{MetaError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Resolves type names to descriptors.
pub trait MetadataProvider: Send + Sync {
    /// Name used in log messages.
    fn provider_name(&self) -> &str;

    /// Look up a full name in this provider's own store only.
    fn lookup_local(&self, full_name: &str) -> Option<DataType>;

    /// Providers consulted, in order, when the local store has no match.
    fn next_providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        Vec::new()
    }
}

/// Descriptor kinds a lookup can ask for.
pub trait FromDataType: Sized {
    fn from_data_type(data_type: DataType) -> Option<Self>;
}

impl FromDataType for DataType {
    fn from_data_type(data_type: DataType) -> Option<Self> {
        Some(data_type)
    }
}

impl FromDataType for Arc<ObjectType> {
    fn from_data_type(data_type: DataType) -> Option<Self> {
        match data_type {
            DataType::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl FromDataType for PrimitiveKind {
    fn from_data_type(data_type: DataType) -> Option<Self> {
        data_type.as_primitive()
    }
}

/// Chain-walking lookups available on every provider.
pub trait MetadataProviderExt: MetadataProvider {
    /// First descriptor of kind `T` named `full_name` along the chain.
    fn get_data_type<T: FromDataType>(&self, full_name: &str) -> Option<T> {
        let mut visited = HashSet::new();
        walk(self, full_name, &mut visited)
    }

    fn get_object_type(&self, full_name: &str) -> Option<Arc<ObjectType>> {
        self.get_data_type(full_name)
    }

    /// Like [`get_data_type`](Self::get_data_type), failing with `TypeNotFound`.
    fn require_data_type<T: FromDataType>(&self, full_name: &str) -> Result<T> {
        self.get_data_type(full_name)
            .ok_or_else(|| MetaError::TypeNotFound(full_name.to_string()))
    }

    fn require_object_type(&self, full_name: &str) -> Result<Arc<ObjectType>> {
        self.require_data_type(full_name)
    }

    /// Resolve a parsed type reference; named parts go through the chain.
    fn resolve_spec(&self, spec: &TypeSpec) -> Result<DataType> {
        match spec {
            TypeSpec::Primitive(kind) => Ok(DataType::Primitive(*kind)),
            TypeSpec::List(item) => self.resolve_spec(item).map(DataType::list_of),
            TypeSpec::Named(name) => self.require_data_type(name),
        }
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProviderExt for P {}

fn walk<T, P>(provider: &P, full_name: &str, visited: &mut HashSet<usize>) -> Option<T>
where
    T: FromDataType,
    P: MetadataProvider + ?Sized,
{
    let key = provider as *const P as *const () as usize;
    if !visited.insert(key) {
        log::trace!(
            "[typemeta] provider '{}' already visited for '{}'",
            provider.provider_name(),
            full_name
        );
        return None;
    }

    if let Some(found) = provider.lookup_local(full_name).and_then(T::from_data_type) {
        return Some(found);
    }
    provider
        .next_providers()
        .iter()
        .find_map(|next| walk(next.as_ref(), full_name, visited))
}
