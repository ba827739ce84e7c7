// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object type descriptors.
//!
//! One struct covers the universal root, introspected types and dynamic
//! types. They share the same local property table (reflected members plus
//! run-time extensions) and the same inheritance walks; only the origin and
//! the parent link differ.

use crate::descriptor::{split_full_name, DataType, Property};
use crate::error::{MetaError, Result};
use crate::native::{CreateContext, Instance, NativeType};
use crate::provider::{MetadataProvider, MetadataProviderExt};
use crate::record::{DynamicRecord, RECORD_TYPE_NAME};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Full name of the universal root type.
pub const ROOT_TYPE_NAME: &str = "Object";

static ROOT: OnceLock<Arc<ObjectType>> = OnceLock::new();

/// Where an object type comes from.
#[derive(Debug, Clone)]
pub enum ObjectOrigin {
    /// The universal root.
    Root,
    /// Built from a native type found in a code container.
    Introspected { native: Arc<NativeType> },
    /// Declared at run time over a native carrier.
    Dynamic { carrier: Arc<NativeType> },
}

enum ParentLink {
    None,
    Fixed(Arc<ObjectType>),
    /// Resolved by name through the attached resolver on first access.
    Lazy {
        name: String,
        resolved: OnceLock<Arc<ObjectType>>,
    },
}

impl ParentLink {
    fn named(name: Option<&str>) -> Self {
        match name {
            None | Some(ROOT_TYPE_NAME) => Self::Fixed(ObjectType::root()),
            Some(name) => Self::Lazy {
                name: name.to_string(),
                resolved: OnceLock::new(),
            },
        }
    }
}

/// Descriptor of an object type: named properties, single-parent
/// inheritance and an instantiation contract.
pub struct ObjectType {
    full_name: String,
    origin: ObjectOrigin,
    parent: ParentLink,
    reflected: OnceLock<Vec<Arc<Property>>>,
    extended: RwLock<Vec<Arc<Property>>>,
    resolver: RwLock<Option<Weak<dyn MetadataProvider>>>,
    version: AtomicU64,
    self_ref: Weak<ObjectType>,
}

impl ObjectType {
    fn build(
        full_name: String,
        origin: ObjectOrigin,
        parent: ParentLink,
        resolver: Option<Weak<dyn MetadataProvider>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            full_name,
            origin,
            parent,
            reflected: OnceLock::new(),
            extended: RwLock::new(Vec::new()),
            resolver: RwLock::new(resolver),
            version: AtomicU64::new(0),
            self_ref: self_ref.clone(),
        })
    }

    /// The universal root type. Immutable and shared by the whole process.
    pub fn root() -> Arc<Self> {
        Arc::clone(ROOT.get_or_init(|| {
            Self::build(
                ROOT_TYPE_NAME.to_string(),
                ObjectOrigin::Root,
                ParentLink::None,
                None,
            )
        }))
    }

    /// Descriptor of a native type. The parent is resolved lazily through
    /// `resolver`.
    pub fn introspected(
        native: Arc<NativeType>,
        resolver: Option<Weak<dyn MetadataProvider>>,
    ) -> Arc<Self> {
        let parent = ParentLink::named(native.parent());
        Self::build(
            native.full_name().to_string(),
            ObjectOrigin::Introspected { native },
            parent,
            resolver,
        )
    }

    /// Dynamic descriptor with an explicit parent.
    pub fn dynamic(
        full_name: impl Into<String>,
        carrier: Arc<NativeType>,
        parent: Arc<ObjectType>,
        resolver: Option<Weak<dyn MetadataProvider>>,
    ) -> Arc<Self> {
        Self::build(
            full_name.into(),
            ObjectOrigin::Dynamic { carrier },
            ParentLink::Fixed(parent),
            resolver,
        )
    }

    /// Dynamic descriptor whose parent is only known by name, as after a
    /// reload. Resolution failures surface on first use.
    pub fn dynamic_deferred(
        full_name: impl Into<String>,
        carrier: Arc<NativeType>,
        parent_name: &str,
        resolver: Option<Weak<dyn MetadataProvider>>,
    ) -> Arc<Self> {
        Self::build(
            full_name.into(),
            ObjectOrigin::Dynamic { carrier },
            ParentLink::named(Some(parent_name)),
            resolver,
        )
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        split_full_name(&self.full_name).1
    }

    pub fn namespace(&self) -> &str {
        split_full_name(&self.full_name).0
    }

    pub fn origin(&self) -> &ObjectOrigin {
        &self.origin
    }

    /// Native type behind an introspected type, or carrier of a dynamic one.
    pub fn native(&self) -> Option<&Arc<NativeType>> {
        match &self.origin {
            ObjectOrigin::Root => None,
            ObjectOrigin::Introspected { native } => Some(native),
            ObjectOrigin::Dynamic { carrier } => Some(carrier),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.origin, ObjectOrigin::Root)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.origin, ObjectOrigin::Dynamic { .. })
    }

    /// Bumped every time the type gains a property.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Resolver
    // -----------------------------------------------------------------------

    /// Attach the resolver used for lazy parent and property-type lookups.
    ///
    /// Also attached to local properties that do not have one yet.
    pub fn attach_resolver(&self, provider: Weak<dyn MetadataProvider>) {
        if self.is_root() {
            return;
        }
        for property in self.local_properties() {
            if !property.has_resolver() {
                property.attach_resolver(provider.clone());
            }
        }
        *self.resolver.write() = Some(provider);
    }

    /// Resolver attached to this type.
    pub fn resolver(&self) -> Result<Arc<dyn MetadataProvider>> {
        self.resolver
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| MetaError::MissingResolver(self.full_name.clone()))
    }

    // -----------------------------------------------------------------------
    // Inheritance
    // -----------------------------------------------------------------------

    /// Full name of the parent, without resolving it.
    pub fn parent_name(&self) -> Option<&str> {
        match &self.parent {
            ParentLink::None => None,
            ParentLink::Fixed(parent) => Some(parent.full_name()),
            ParentLink::Lazy { name, .. } => Some(name),
        }
    }

    /// Parent type; `None` only for the universal root.
    ///
    /// A parent known by name is resolved through the attached resolver once
    /// and memoized.
    pub fn derives_from(&self) -> Result<Option<Arc<ObjectType>>> {
        match &self.parent {
            ParentLink::None => Ok(None),
            ParentLink::Fixed(parent) => Ok(Some(Arc::clone(parent))),
            ParentLink::Lazy { name, resolved } => {
                if let Some(parent) = resolved.get() {
                    return Ok(Some(Arc::clone(parent)));
                }
                let parent = self.resolver()?.require_object_type(name)?;
                Ok(Some(Arc::clone(resolved.get_or_init(|| parent))))
            }
        }
    }

    /// This type followed by its ancestors, most derived first.
    pub fn lineage(&self) -> Result<Vec<Arc<ObjectType>>> {
        let mut chain = vec![self.arc()?];
        let mut seen = HashSet::from([self.full_name.clone()]);
        let mut next = self.derives_from()?;
        while let Some(ty) = next {
            if !seen.insert(ty.full_name.clone()) {
                log::debug!("[typemeta] inheritance cycle at '{}'", ty.full_name);
                break;
            }
            next = ty.derives_from()?;
            chain.push(ty);
        }
        Ok(chain)
    }

    /// Whether an instance of `other` can be used where `self` is expected.
    ///
    /// Walks `other`'s parents comparing full names. An ancestor that cannot
    /// be resolved ends the walk.
    pub fn is_assignable_from(&self, other: &ObjectType) -> bool {
        if self.is_root() || self.full_name == other.full_name {
            return true;
        }
        let mut seen = HashSet::from([other.full_name.clone()]);
        let mut next = other.derives_from().ok().flatten();
        while let Some(ty) = next {
            if ty.full_name == self.full_name {
                return true;
            }
            if !seen.insert(ty.full_name.clone()) {
                break;
            }
            next = ty.derives_from().ok().flatten();
        }
        false
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Properties reflected from the native type, computed once.
    ///
    /// Only members the native type declares itself are reflected; inherited
    /// members belong to the ancestor's descriptor.
    fn reflected(&self) -> &[Arc<Property>] {
        self.reflected.get_or_init(|| {
            let Some(native) = self.native() else {
                return Vec::new();
            };
            let resolver = self.resolver.read().clone();
            native
                .declared_members()
                .map(|member| Arc::new(Property::reflected(member, resolver.clone())))
                .collect()
        })
    }

    /// Property declared locally, reflected or added at run time.
    pub fn property(&self, name: &str) -> Option<Arc<Property>> {
        if let Some(found) = self.reflected().iter().find(|p| p.name() == name) {
            return Some(Arc::clone(found));
        }
        self.extended
            .read()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Every locally declared property.
    pub fn local_properties(&self) -> Vec<Arc<Property>> {
        let mut properties = self.reflected().to_vec();
        properties.extend(self.extended.read().iter().cloned());
        properties
    }

    /// First property with this name along the inheritance chain.
    pub fn find_property(&self, name: &str) -> Result<Option<Arc<Property>>> {
        if let Some(found) = self.property(name) {
            return Ok(Some(found));
        }
        for ancestor in self.lineage()?.iter().skip(1) {
            if let Some(found) = ancestor.property(name) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Every property including inherited ones.
    ///
    /// A name declared on several types of the chain appears once, taken from
    /// the most derived type.
    pub fn find_all_properties(&self) -> Result<Vec<Arc<Property>>> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();
        for ty in self.lineage()? {
            for property in ty.local_properties() {
                if seen.insert(property.name().to_string()) {
                    all.push(property);
                }
            }
        }
        Ok(all)
    }

    /// Properties along the chain matching a predicate.
    pub fn find_properties<F>(&self, predicate: F) -> Result<Vec<Arc<Property>>>
    where
        F: Fn(&Property) -> bool,
    {
        Ok(self
            .find_all_properties()?
            .into_iter()
            .filter(|p| predicate(p))
            .collect())
    }

    /// Add a dynamic property of the given type.
    pub fn add_property(
        &self,
        name: impl Into<String>,
        data_type: impl Into<DataType>,
    ) -> Result<Arc<Property>> {
        self.insert_property(Property::dynamic(name, data_type))
    }

    /// Add a prepared dynamic property.
    ///
    /// Only local names are checked for duplicates; redeclaring an inherited
    /// name shadows it. Existing instances see the property immediately.
    pub fn insert_property(&self, property: Property) -> Result<Arc<Property>> {
        if self.is_root() {
            return Err(MetaError::SealedType(self.full_name.clone()));
        }
        let owner = self.arc()?;
        let reflected = self.reflected();

        let mut extended = self.extended.write();
        let exists = reflected
            .iter()
            .chain(extended.iter())
            .any(|p| p.name() == property.name());
        if exists {
            return Err(MetaError::DuplicateProperty {
                type_name: self.full_name.clone(),
                property: property.name().to_string(),
            });
        }

        property.attach_owner(&owner);
        if !property.has_resolver() {
            if let Some(resolver) = self.resolver.read().clone() {
                property.attach_resolver(resolver);
            }
        }
        log::debug!(
            "[typemeta] property '{}' ({}) added to '{}'",
            property.name(),
            property.type_name(),
            self.full_name
        );
        let property = Arc::new(property);
        extended.push(Arc::clone(&property));
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(property)
    }

    // -----------------------------------------------------------------------
    // Instantiation
    // -----------------------------------------------------------------------

    /// Create an instance.
    ///
    /// Types carried by the record carrier (and the root) become plain
    /// records; any other native type is constructed and wrapped.
    pub fn create_instance(&self, ctx: &CreateContext<'_>) -> Result<DynamicRecord> {
        let this = self.arc()?;
        match self.native() {
            Some(native) if native.full_name() != RECORD_TYPE_NAME => {
                let carrier = native.construct(ctx)?;
                Ok(DynamicRecord::with_carrier(this, carrier))
            }
            _ => Ok(DynamicRecord::new(this)),
        }
    }

    /// Create an instance and unwrap its native carrier.
    pub fn create_native<T: Instance>(&self, ctx: &CreateContext<'_>) -> Result<T> {
        self.create_instance(ctx)?.into_carrier::<T>()
    }

    fn arc(&self) -> Result<Arc<ObjectType>> {
        self.self_ref
            .upgrade()
            .ok_or_else(|| MetaError::NotInstantiable(self.full_name.clone()))
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match &self.origin {
            ObjectOrigin::Root => "root",
            ObjectOrigin::Introspected { .. } => "introspected",
            ObjectOrigin::Dynamic { .. } => "dynamic",
        };
        f.debug_struct("ObjectType")
            .field("full_name", &self.full_name)
            .field("origin", &origin)
            .field("parent", &self.parent_name())
            .field("version", &self.version())
            .finish()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;

    fn carrier() -> Arc<NativeType> {
        Arc::new(NativeType::opaque(RECORD_TYPE_NAME, None))
    }

    #[test]
    fn test_root_is_singleton_and_sealed() {
        let a = ObjectType::root();
        let b = ObjectType::root();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.full_name(), ROOT_TYPE_NAME);
        assert!(a.derives_from().unwrap().is_none());
        assert_eq!(
            a.add_property("X", PrimitiveKind::I32).unwrap_err(),
            MetaError::SealedType(ROOT_TYPE_NAME.into())
        );
    }

    #[test]
    fn test_name_and_namespace() {
        let ty = ObjectType::dynamic("Sales.Orders.Order", carrier(), ObjectType::root(), None);
        assert_eq!(ty.name(), "Order");
        assert_eq!(ty.namespace(), "Sales.Orders");
        assert_eq!(ty.parent_name(), Some(ROOT_TYPE_NAME));
    }

    #[test]
    fn test_add_property_rejects_local_duplicate_only() {
        let base = ObjectType::dynamic("T.Base", carrier(), ObjectType::root(), None);
        let derived = ObjectType::dynamic("T.Derived", carrier(), Arc::clone(&base), None);

        base.add_property("Code", PrimitiveKind::String).unwrap();
        assert!(matches!(
            base.add_property("Code", PrimitiveKind::I32),
            Err(MetaError::DuplicateProperty { .. })
        ));
        derived.add_property("Code", PrimitiveKind::I32).unwrap();
        assert_eq!(base.version(), 1);
        assert_eq!(derived.version(), 1);
    }

    #[test]
    fn test_find_all_properties_shadows_by_name() {
        let base = ObjectType::dynamic("T.Base", carrier(), ObjectType::root(), None);
        let derived = ObjectType::dynamic("T.Derived", carrier(), Arc::clone(&base), None);
        base.add_property("Code", PrimitiveKind::String).unwrap();
        base.add_property("Label", PrimitiveKind::String).unwrap();
        derived.add_property("Code", PrimitiveKind::I32).unwrap();

        let all = derived.find_all_properties().unwrap();
        assert_eq!(all.len(), 2);
        let code = all.iter().find(|p| p.name() == "Code").unwrap();
        assert_eq!(code.type_name(), "i32");
        assert_eq!(code.declaring_type().as_deref(), Some("T.Derived"));

        let inherited = derived.find_property("Label").unwrap().unwrap();
        assert_eq!(inherited.declaring_type().as_deref(), Some("T.Base"));
        assert!(derived.find_property("Missing").unwrap().is_none());

        let strings = derived
            .find_properties(|p| p.type_name() == "string")
            .unwrap();
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_assignability_walks_parents() {
        let base = ObjectType::dynamic("T.Base", carrier(), ObjectType::root(), None);
        let derived = ObjectType::dynamic("T.Derived", carrier(), Arc::clone(&base), None);
        let other = ObjectType::dynamic("T.Other", carrier(), ObjectType::root(), None);

        assert!(base.is_assignable_from(&derived));
        assert!(!derived.is_assignable_from(&base));
        assert!(!base.is_assignable_from(&other));
        assert!(ObjectType::root().is_assignable_from(&other));
    }

    #[test]
    fn test_lazy_parent_without_resolver_fails_on_use() {
        let ty = ObjectType::dynamic_deferred("T.Late", carrier(), "T.Missing", None);
        assert_eq!(ty.parent_name(), Some("T.Missing"));
        assert_eq!(
            ty.derives_from().unwrap_err(),
            MetaError::MissingResolver("T.Late".into())
        );
        assert!(ty.find_all_properties().is_err());
    }
}
