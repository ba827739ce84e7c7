// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic record runtime.
//!
//! A [`DynamicRecord`] is an object whose shape comes from its
//! [`ObjectType`]. Reflected properties read and write an optional native
//! carrier; dynamic properties live in the record's own value dictionary.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use typemeta::native::StaticContainers;
//! use typemeta::provider::StandardProvider;
//! use typemeta::{PropertyAccessor, PropertyAccessorExt, Value};
//!
//! let standard = StandardProvider::new(Arc::new(StaticContainers::new()));
//! standard.register_record_type("Crm.Contact", None).unwrap();
//!
//! let mut contact = standard.create_record("Crm.Contact").unwrap();
//! contact.set("FirstName", "Ann").unwrap();
//! contact.set("Visits", 3i32).unwrap();
//!
//! assert_eq!(contact.get::<String>("FirstName").unwrap(), "Ann");
//! assert!(contact.object_type().property("Visits").is_some());
//! assert!(contact.get_property_value("Missing").is_err());
//! ```

use crate::access::{DynamicValueStore, PropertyAccessor};
use crate::descriptor::{ObjectType, PrimitiveKind};
use crate::error::{MetaError, Result};
use crate::native::{Instance, NativeType};
use crate::value::{ObjectRef, Value};
use crate::variables::expand_deferred;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Native type name of the plain record carrier.
pub const RECORD_TYPE_NAME: &str = "DynamicRecord";

/// Native description of [`DynamicRecord`] itself: no members, instances are
/// created by the descriptor rather than a constructor.
pub fn record_native_type() -> NativeType {
    NativeType::builder::<DynamicRecord>(RECORD_TYPE_NAME).build()
}

/// Object with a run-time shape.
pub struct DynamicRecord {
    object_type: Arc<ObjectType>,
    carrier: Option<Box<dyn Instance>>,
    values: HashMap<String, Value>,
}

impl DynamicRecord {
    /// Record without a native carrier.
    pub fn new(object_type: Arc<ObjectType>) -> Self {
        Self {
            object_type,
            carrier: None,
            values: HashMap::new(),
        }
    }

    /// Record wrapping a native object.
    pub fn with_carrier(object_type: Arc<ObjectType>, carrier: Box<dyn Instance>) -> Self {
        Self {
            object_type,
            carrier: Some(carrier),
            values: HashMap::new(),
        }
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    pub fn has_carrier(&self) -> bool {
        self.carrier.is_some()
    }

    /// Native carrier, if it is a `T`.
    pub fn carrier<T: Instance>(&self) -> Option<&T> {
        self.carrier.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub fn carrier_mut<T: Instance>(&mut self) -> Option<&mut T> {
        self.carrier.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Unwrap the native carrier.
    pub fn into_carrier<T: Instance>(self) -> Result<T> {
        let expected = std::any::type_name::<T>();
        let carrier = self
            .carrier
            .ok_or_else(|| MetaError::mismatch(expected, RECORD_TYPE_NAME))?;
        carrier
            .into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| MetaError::mismatch(expected, self.object_type.full_name()))
    }

    /// Move into a shared reference, for use as a property value.
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    /// Raw dynamic values, without descriptor routing or deferred expansion.
    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }
}

impl PropertyAccessor for DynamicRecord {
    fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    /// Descriptor property first, then the value dictionary.
    ///
    /// A string value of the form `$(Name)` is replaced by the current value
    /// of that variable.
    fn get_property_value(&self, name: &str) -> Result<Value> {
        let value = match self.object_type.find_property(name)? {
            Some(property) => property.get_value(self)?,
            None => self
                .values
                .get(name)
                .cloned()
                .ok_or_else(|| MetaError::property_not_found(self.object_type.full_name(), name))?,
        };
        Ok(expand_deferred(value))
    }

    /// Unknown names get a dynamic property typed after the value's exact
    /// primitive kind. Values of the sealed root type only go to the value
    /// dictionary.
    fn set_property_value(&mut self, name: &str, value: Value) -> Result<()> {
        let property = match self.object_type.find_property(name)? {
            Some(property) => property,
            None => {
                let kind = PrimitiveKind::of(&value).ok_or_else(|| {
                    MetaError::UnsupportedDynamicType {
                        property: name.to_string(),
                        kind: value.kind_name().to_string(),
                    }
                })?;
                if self.object_type.is_root() {
                    self.values.insert(name.to_string(), value);
                    return Ok(());
                }
                self.object_type.add_property(name, kind)?
            }
        };
        property.set_value(self, value)
    }
}

/// Native access goes to the carrier when there is one.
impl Instance for DynamicRecord {
    fn as_any(&self) -> &dyn Any {
        match &self.carrier {
            Some(carrier) => carrier.as_any(),
            None => self,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        match self.carrier {
            Some(ref mut carrier) => carrier.as_any_mut(),
            None => self,
        }
    }

    fn into_any(mut self: Box<Self>) -> Box<dyn Any> {
        match self.carrier.take() {
            Some(carrier) => carrier.into_any(),
            None => self,
        }
    }

    fn base(&self) -> Option<&dyn Instance> {
        self.carrier.as_ref()?.base()
    }

    fn base_mut(&mut self) -> Option<&mut dyn Instance> {
        self.carrier.as_mut()?.base_mut()
    }

    fn value_store(&self) -> Option<&dyn DynamicValueStore> {
        Some(&self.values)
    }

    fn value_store_mut(&mut self) -> Option<&mut dyn DynamicValueStore> {
        Some(&mut self.values)
    }
}

impl DynamicValueStore for DynamicRecord {
    fn dynamic_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn set_dynamic_value(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    fn remove_dynamic_value(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    fn dynamic_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

impl fmt::Debug for DynamicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicRecord")
            .field("type", &self.object_type.full_name())
            .field("carrier", &self.carrier.is_some())
            .field("values", &self.values)
            .finish()
    }
}
