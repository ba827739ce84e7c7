// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Self-description of compiled types.

use crate::descriptor::TypeSpec;
use crate::error::{MetaError, Result};
use crate::native::{CreateContext, Instance};
use crate::value::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Reads a member from a native object; `None` when the object is not of
/// the member's declaring type.
pub type Getter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;

/// Writes a member on a native object; `None` when the object is not of
/// the member's declaring type.
pub type Setter = Arc<dyn Fn(&mut dyn Any, &Value) -> Option<Result<()>> + Send + Sync>;

/// Builds a fresh native object.
pub type Constructor = Arc<dyn Fn(&CreateContext<'_>) -> Result<Box<dyn Instance>> + Send + Sync>;

/// Read a member, walking the object's embedded parent parts.
pub(crate) fn read_through(getter: &Getter, source: &dyn Instance) -> Option<Value> {
    let mut current = Some(source);
    while let Some(instance) = current {
        if let Some(value) = getter(instance.as_any()) {
            return Some(value);
        }
        current = instance.base();
    }
    None
}

/// Write a member, walking the object's embedded parent parts.
pub(crate) fn write_through(
    setter: &Setter,
    target: &mut dyn Instance,
    value: &Value,
) -> Option<Result<()>> {
    if let Some(result) = setter(target.as_any_mut(), value) {
        return Some(result);
    }
    match target.base_mut() {
        Some(base) => write_through(setter, base, value),
        None => None,
    }
}

// ---------------------------------------------------------------------------
// NativeProperty
// ---------------------------------------------------------------------------

/// One public member of a native type.
#[derive(Clone)]
pub struct NativeProperty {
    name: String,
    type_spec: TypeSpec,
    declaring_type: String,
    getter: Option<Getter>,
    setter: Option<Setter>,
    nullable: bool,
    exclude_from_serialization: bool,
    default_value: Option<Value>,
}

impl NativeProperty {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    /// Full name of the native type that declared this member.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn getter(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Marked to never be serialized.
    pub fn is_excluded_from_serialization(&self) -> bool {
        self.exclude_from_serialization
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Read this member from an object.
    pub fn read(&self, source: &dyn Instance) -> Result<Value> {
        let getter = self
            .getter
            .as_ref()
            .ok_or_else(|| MetaError::WriteOnly(self.name.clone()))?;
        read_through(getter, source).ok_or_else(|| {
            MetaError::mismatch(self.declaring_type.clone(), "unrelated native object")
        })
    }

    /// Write this member on an object.
    pub fn write(&self, target: &mut dyn Instance, value: &Value) -> Result<()> {
        let setter = self
            .setter
            .as_ref()
            .ok_or_else(|| MetaError::ReadOnly(self.name.clone()))?;
        write_through(setter, target, value).unwrap_or_else(|| {
            Err(MetaError::mismatch(
                self.declaring_type.clone(),
                "unrelated native object",
            ))
        })
    }
}

impl fmt::Debug for NativeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeProperty")
            .field("name", &self.name)
            .field("type_spec", &self.type_spec)
            .field("declaring_type", &self.declaring_type)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NativeType
// ---------------------------------------------------------------------------

/// Compiled description of a native type.
#[derive(Clone)]
pub struct NativeType {
    full_name: String,
    parent: Option<String>,
    members: Vec<NativeProperty>,
    constructor: Option<Constructor>,
    type_id: Option<TypeId>,
}

impl NativeType {
    /// Start describing the Rust type `T` under a full name.
    pub fn builder<T: Instance>(full_name: impl Into<String>) -> NativeTypeBuilder<T> {
        NativeTypeBuilder::new(full_name)
    }

    /// A type with no Rust counterpart, no members and no constructor.
    pub fn opaque(full_name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            full_name: full_name.into(),
            parent: parent.map(str::to_string),
            members: Vec::new(),
            constructor: None,
            type_id: None,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Full name of the native parent; `None` means the universal root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Every member, including those inherited from the parent.
    pub fn members(&self) -> &[NativeProperty] {
        &self.members
    }

    /// Members declared by this type itself.
    pub fn declared_members(&self) -> impl Iterator<Item = &NativeProperty> {
        self.members
            .iter()
            .filter(move |m| m.declaring_type == self.full_name)
    }

    /// Member by name, declared or inherited.
    pub fn member(&self, name: &str) -> Option<&NativeProperty> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Check whether this describes the Rust type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Build a fresh object.
    pub fn construct(&self, ctx: &CreateContext<'_>) -> Result<Box<dyn Instance>> {
        match &self.constructor {
            Some(ctor) => ctor(ctx),
            None => Err(MetaError::NotInstantiable(self.full_name.clone())),
        }
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeType")
            .field("full_name", &self.full_name)
            .field("parent", &self.parent)
            .field("members", &self.members)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NativeTypeBuilder
// ---------------------------------------------------------------------------

/// Fluent builder describing a Rust type.
pub struct NativeTypeBuilder<T> {
    full_name: String,
    parent: Option<String>,
    members: Vec<NativeProperty>,
    constructor: Option<Constructor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Instance> NativeTypeBuilder<T> {
    /// Create a new builder.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            parent: None,
            members: Vec::new(),
            constructor: None,
            _marker: PhantomData,
        }
    }

    /// Name the parent type without inheriting its members.
    pub fn derives_from(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Derive from a described parent and inherit its members.
    ///
    /// `T` must expose the parent part through [`Instance::base`] for the
    /// inherited accessors to reach it.
    pub fn inherit(mut self, parent: &NativeType) -> Self {
        self.parent = Some(parent.full_name.clone());
        self.members.extend(parent.members.iter().cloned());
        self
    }

    /// Add a read/write member.
    pub fn property<G, S>(
        mut self,
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        let member = self.member(name, type_spec, Some(Self::getter(get)), Some(Self::setter(set)));
        self.members.push(member);
        self
    }

    /// Add a member with only a getter.
    pub fn read_only<G>(
        mut self,
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        get: G,
    ) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let member = self.member(name, type_spec, Some(Self::getter(get)), None);
        self.members.push(member);
        self
    }

    /// Add a member with only a setter.
    pub fn write_only<S>(
        mut self,
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        set: S,
    ) -> Self
    where
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        let member = self.member(name, type_spec, None, Some(Self::setter(set)));
        self.members.push(member);
        self
    }

    /// Mark the last added member as nullable.
    pub fn nullable(mut self) -> Self {
        if let Some(last) = self.members.last_mut() {
            last.nullable = true;
        }
        self
    }

    /// Exclude the last added member from serialization.
    pub fn not_serialized(mut self) -> Self {
        if let Some(last) = self.members.last_mut() {
            last.exclude_from_serialization = true;
        }
        self
    }

    /// Set the default value of the last added member.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if let Some(last) = self.members.last_mut() {
            last.default_value = Some(value.into());
        }
        self
    }

    /// Constructor used by `ObjectType::create_instance`.
    pub fn constructor<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&CreateContext<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |ctx: &CreateContext<'_>| {
            ctor(ctx).map(|instance| Box::new(instance) as Box<dyn Instance>)
        }));
        self
    }

    /// Build the NativeType.
    pub fn build(self) -> NativeType {
        NativeType {
            full_name: self.full_name,
            parent: self.parent,
            members: self.members,
            constructor: self.constructor,
            type_id: Some(TypeId::of::<T>()),
        }
    }

    fn member(
        &self,
        name: impl Into<String>,
        type_spec: impl Into<TypeSpec>,
        getter: Option<Getter>,
        setter: Option<Setter>,
    ) -> NativeProperty {
        NativeProperty {
            name: name.into(),
            type_spec: type_spec.into(),
            declaring_type: self.full_name.clone(),
            getter,
            setter,
            nullable: false,
            exclude_from_serialization: false,
            default_value: None,
        }
    }

    fn getter<G>(get: G) -> Getter
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Arc::new(move |any: &dyn Any| any.downcast_ref::<T>().map(|t| get(t)))
    }

    fn setter<S>(set: S) -> Setter
    where
        S: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        Arc::new(move |any: &mut dyn Any, value: &Value| {
            any.downcast_mut::<T>().map(|t| set(t, value.clone()))
        })
    }
}

impl<T: Instance + Default> NativeTypeBuilder<T> {
    /// Construct with `T::default()`.
    pub fn default_constructor(self) -> Self {
        self.constructor(|_| Ok(T::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;
    use crate::value::FromValue;

    #[derive(Default)]
    struct Entity {
        id: i64,
    }
    crate::impl_instance!(Entity);

    #[derive(Default)]
    struct Customer {
        entity: Entity,
        name: String,
    }
    crate::impl_instance!(Customer, base = entity);

    fn entity_type() -> NativeType {
        NativeType::builder::<Entity>("Crm.Entity")
            .property(
                "Id",
                PrimitiveKind::I64,
                |e: &Entity| e.id.into(),
                |e: &mut Entity, v| {
                    e.id = i64::from_value(&v)?;
                    Ok(())
                },
            )
            .default_constructor()
            .build()
    }

    fn customer_type() -> NativeType {
        NativeType::builder::<Customer>("Crm.Customer")
            .inherit(&entity_type())
            .property(
                "Name",
                PrimitiveKind::String,
                |c: &Customer| c.name.clone().into(),
                |c: &mut Customer, v| {
                    c.name = String::from_value(&v)?;
                    Ok(())
                },
            )
            .default_constructor()
            .build()
    }

    #[test]
    fn test_declared_and_inherited_members() {
        let customer = customer_type();
        assert_eq!(customer.parent(), Some("Crm.Entity"));
        assert_eq!(customer.members().len(), 2);

        let declared: Vec<_> = customer.declared_members().map(|m| m.name()).collect();
        assert_eq!(declared, vec!["Name"]);
        assert_eq!(
            customer.member("Id").map(|m| m.declaring_type()),
            Some("Crm.Entity")
        );
        assert!(customer.is::<Customer>());
        assert!(!customer.is::<Entity>());
    }

    #[test]
    fn test_inherited_accessor_reaches_base_part() {
        let customer = customer_type();
        let mut instance = customer.construct(&CreateContext::empty()).unwrap();

        let id = customer.member("Id").unwrap();
        id.write(instance.as_mut(), &Value::I64(7)).unwrap();
        assert_eq!(id.read(instance.as_ref()).unwrap(), Value::I64(7));

        let name = customer.member("Name").unwrap();
        name.write(instance.as_mut(), &Value::from("Ann")).unwrap();
        assert_eq!(name.read(instance.as_ref()).unwrap(), Value::from("Ann"));
    }

    #[test]
    fn test_accessor_on_unrelated_object_fails() {
        let customer = customer_type();
        let entity = Entity::default();
        let name = customer.member("Name").unwrap();
        assert!(matches!(
            name.read(&entity),
            Err(MetaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_opaque_type_not_constructible() {
        let opaque = NativeType::opaque("Ext.Blob", None);
        assert!(!opaque.is_constructible());
        assert!(matches!(
            opaque.construct(&CreateContext::empty()),
            Err(MetaError::NotInstantiable(_))
        ));
    }

    #[test]
    fn test_member_modifiers_apply_to_last() {
        let ty = NativeType::builder::<Entity>("Crm.Tagged")
            .read_only("Id", PrimitiveKind::I64, |e: &Entity| e.id.into())
            .not_serialized()
            .nullable()
            .with_default(5i64)
            .build();
        let id = ty.member("Id").unwrap();
        assert!(id.is_excluded_from_serialization());
        assert!(id.is_nullable());
        assert!(id.can_read());
        assert!(!id.can_write());
        assert_eq!(id.default_value(), Some(&Value::I64(5)));
    }
}
