// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property descriptors.

use crate::descriptor::{DataType, ObjectType, TypeSpec};
use crate::error::{MetaError, Result};
use crate::native::{read_through, write_through, Getter, Instance, NativeProperty, Setter};
use crate::provider::{MetadataProvider, MetadataProviderExt};
use crate::value::{FromValue, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Property type, resolved up front or on first use.
enum TypeSlot {
    Ready(DataType),
    Deferred {
        spec: TypeSpec,
        resolver: RwLock<Option<Weak<dyn MetadataProvider>>>,
        resolved: OnceLock<DataType>,
    },
}

impl TypeSlot {
    fn deferred(spec: TypeSpec, resolver: Option<Weak<dyn MetadataProvider>>) -> Self {
        match spec.resolve_builtin() {
            Some(data_type) => Self::Ready(data_type),
            None => Self::Deferred {
                spec,
                resolver: RwLock::new(resolver),
                resolved: OnceLock::new(),
            },
        }
    }
}

enum Access {
    /// Native accessor of a specific member.
    Reflection {
        getter: Option<Getter>,
        setter: Option<Setter>,
        declaring_type: String,
    },
    /// Value dictionary of the target, bound to an owner type.
    Dynamic { owner: RwLock<Weak<ObjectType>> },
}

/// Metadata and accessor pair for one named member of an object type.
pub struct Property {
    name: String,
    ty: TypeSlot,
    nullable: bool,
    default_value: Option<Value>,
    serialize: bool,
    access: Access,
}

impl Property {
    /// Reflection property for a native member.
    ///
    /// `serialize` is computed once: readable, writable and not excluded.
    pub(crate) fn reflected(
        member: &NativeProperty,
        resolver: Option<Weak<dyn MetadataProvider>>,
    ) -> Self {
        Self {
            name: member.name().to_string(),
            ty: TypeSlot::deferred(member.type_spec().clone(), resolver),
            nullable: member.is_nullable(),
            default_value: member.default_value().cloned(),
            serialize: member.can_read()
                && member.can_write()
                && !member.is_excluded_from_serialization(),
            access: Access::Reflection {
                getter: member.getter().cloned(),
                setter: member.setter().cloned(),
                declaring_type: member.declaring_type().to_string(),
            },
        }
    }

    /// Dynamic property of a resolved type. The owner is attached when the
    /// property is added to an object type.
    pub fn dynamic(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self::new_dynamic(name.into(), TypeSlot::Ready(data_type.into()))
    }

    /// Dynamic property whose type is resolved by name on first use.
    pub fn dynamic_named(name: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        Self::new_dynamic(name.into(), TypeSlot::deferred(spec.into(), None))
    }

    fn new_dynamic(name: String, ty: TypeSlot) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            default_value: None,
            serialize: true,
            access: Access::Dynamic {
                owner: RwLock::new(Weak::new()),
            },
        }
    }

    /// Set nullability (builder style).
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the default value (builder style).
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the serialize flag (builder style).
    pub fn serialized(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name as declared, without resolving it.
    pub fn type_name(&self) -> String {
        match &self.ty {
            TypeSlot::Ready(data_type) => data_type.full_name(),
            TypeSlot::Deferred { spec, .. } => spec.full_name(),
        }
    }

    /// Resolved property type.
    pub fn data_type(&self) -> Result<DataType> {
        match &self.ty {
            TypeSlot::Ready(data_type) => Ok(data_type.clone()),
            TypeSlot::Deferred {
                spec,
                resolver,
                resolved,
            } => {
                if let Some(data_type) = resolved.get() {
                    return Ok(data_type.clone());
                }
                let provider = resolver
                    .read()
                    .as_ref()
                    .and_then(Weak::upgrade)
                    .ok_or_else(|| MetaError::MissingResolver(format!("property {}", self.name)))?;
                let data_type = provider.resolve_spec(spec)?;
                Ok(resolved.get_or_init(|| data_type).clone())
            }
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Whether serializers should write and read this property.
    pub fn serialize(&self) -> bool {
        self.serialize
    }

    pub fn can_read(&self) -> bool {
        match &self.access {
            Access::Reflection { getter, .. } => getter.is_some(),
            Access::Dynamic { .. } => true,
        }
    }

    pub fn can_write(&self) -> bool {
        match &self.access {
            Access::Reflection { setter, .. } => setter.is_some(),
            Access::Dynamic { .. } => true,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.access, Access::Dynamic { .. })
    }

    /// Full name of the type that declares this property.
    pub fn declaring_type(&self) -> Option<String> {
        match &self.access {
            Access::Reflection { declaring_type, .. } => Some(declaring_type.clone()),
            Access::Dynamic { .. } => self.owner().map(|o| o.full_name().to_string()),
        }
    }

    /// Owner of a dynamic property.
    pub fn owner(&self) -> Option<Arc<ObjectType>> {
        match &self.access {
            Access::Dynamic { owner } => owner.read().upgrade(),
            Access::Reflection { .. } => None,
        }
    }

    /// Bind a dynamic property to its owner. No effect on reflection properties.
    pub fn attach_owner(&self, owner: &Arc<ObjectType>) {
        if let Access::Dynamic { owner: slot } = &self.access {
            *slot.write() = Arc::downgrade(owner);
        }
    }

    /// Attach the resolver used for a type resolved by name.
    pub fn attach_resolver(&self, provider: Weak<dyn MetadataProvider>) {
        if let TypeSlot::Deferred { resolver, .. } = &self.ty {
            *resolver.write() = Some(provider);
        }
    }

    pub(crate) fn has_resolver(&self) -> bool {
        match &self.ty {
            TypeSlot::Ready(_) => true,
            TypeSlot::Deferred { resolver, .. } => resolver.read().is_some(),
        }
    }

    /// Read the property from an object.
    pub fn get_value(&self, source: &dyn Instance) -> Result<Value> {
        match &self.access {
            Access::Reflection {
                getter,
                declaring_type,
                ..
            } => {
                let getter = getter
                    .as_ref()
                    .ok_or_else(|| MetaError::WriteOnly(self.name.clone()))?;
                read_through(getter, source).ok_or_else(|| {
                    MetaError::mismatch(declaring_type.clone(), "unrelated native object")
                })
            }
            Access::Dynamic { .. } => {
                self.require_owner()?;
                let store = source
                    .value_store()
                    .ok_or_else(|| MetaError::NoValueStore(self.name.clone()))?;
                match store.dynamic_value(&self.name) {
                    Some(value) => Ok(value.clone()),
                    None => self.unset_value(),
                }
            }
        }
    }

    /// Write the property on an object.
    pub fn set_value(&self, target: &mut dyn Instance, value: Value) -> Result<()> {
        match &self.access {
            Access::Reflection {
                setter,
                declaring_type,
                ..
            } => {
                let setter = setter
                    .as_ref()
                    .ok_or_else(|| MetaError::ReadOnly(self.name.clone()))?;
                write_through(setter, target, &value).unwrap_or_else(|| {
                    Err(MetaError::mismatch(
                        declaring_type.clone(),
                        "unrelated native object",
                    ))
                })
            }
            Access::Dynamic { .. } => {
                self.require_owner()?;
                let value = self.conform(value)?;
                let store = target
                    .value_store_mut()
                    .ok_or_else(|| MetaError::NoValueStore(self.name.clone()))?;
                store.set_dynamic_value(&self.name, value);
                Ok(())
            }
        }
    }

    /// Read and convert.
    pub fn get<T: FromValue>(&self, source: &dyn Instance) -> Result<T> {
        T::from_value(&self.get_value(source)?)
    }

    /// Convert and write.
    pub fn set<T: Into<Value>>(&self, target: &mut dyn Instance, value: T) -> Result<()> {
        self.set_value(target, value.into())
    }

    fn require_owner(&self) -> Result<Arc<ObjectType>> {
        self.owner()
            .ok_or_else(|| MetaError::DetachedProperty(self.name.clone()))
    }

    /// Value reported for a dynamic property that was never set.
    fn unset_value(&self) -> Result<Value> {
        if let Some(default) = &self.default_value {
            return Ok(default.clone());
        }
        if self.nullable {
            return Ok(Value::Null);
        }
        Ok(self.data_type()?.default_value())
    }

    fn conform(&self, value: Value) -> Result<Value> {
        let data_type = self.data_type()?;
        if value.is_null() && !self.nullable && data_type.as_primitive().is_some() {
            return Err(MetaError::mismatch(data_type.full_name(), "null"));
        }
        data_type.conform(value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.type_name())
            .field("dynamic", &self.is_dynamic())
            .field("nullable", &self.nullable)
            .field("serialize", &self.serialize)
            .finish()
    }
}
