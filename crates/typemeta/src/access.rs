// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property-access protocol.
//!
//! Two capabilities that never call into each other:
//!
//! - [`PropertyAccessor`]: descriptor-routed access by property name. Generic
//!   code (templates, rule engines, converters) uses this.
//! - [`DynamicValueStore`]: the raw name→value dictionary behind dynamic
//!   properties. Dynamic property descriptors read and write through this
//!   one only, so a dynamic getter can never re-enter `get_property_value`.

use crate::descriptor::ObjectType;
use crate::error::Result;
use crate::value::{FromValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Raw dictionary backing dynamic properties.
pub trait DynamicValueStore {
    fn dynamic_value(&self, name: &str) -> Option<&Value>;

    fn set_dynamic_value(&mut self, name: &str, value: Value);

    fn remove_dynamic_value(&mut self, name: &str) -> Option<Value>;

    /// Names currently holding a value, unordered.
    fn dynamic_names(&self) -> Vec<String>;
}

impl DynamicValueStore for HashMap<String, Value> {
    fn dynamic_value(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn set_dynamic_value(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }

    fn remove_dynamic_value(&mut self, name: &str) -> Option<Value> {
        self.remove(name)
    }

    fn dynamic_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Get/set a named property on an object whose shape is only known at run time.
pub trait PropertyAccessor {
    /// Descriptor of the object.
    fn object_type(&self) -> &Arc<ObjectType>;

    /// Read a property by name.
    fn get_property_value(&self, name: &str) -> Result<Value>;

    /// Write a property by name.
    fn set_property_value(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Typed helpers over [`PropertyAccessor`].
pub trait PropertyAccessorExt: PropertyAccessor {
    /// Read and convert a property.
    fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(&self.get_property_value(name)?)
    }

    /// Convert and write a property.
    fn set<T: Into<Value>>(&mut self, name: &str, value: T) -> Result<()> {
        self.set_property_value(name, value.into())
    }
}

impl<A: PropertyAccessor + ?Sized> PropertyAccessorExt for A {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_map_value_store() {
        let mut store: HashMap<String, Value> = HashMap::new();
        store.set_dynamic_value("Rank", Value::I32(3));
        assert_eq!(store.dynamic_value("Rank"), Some(&Value::I32(3)));
        assert_eq!(store.dynamic_names(), vec!["Rank".to_string()]);
        assert_eq!(store.remove_dynamic_value("Rank"), Some(Value::I32(3)));
        assert!(store.dynamic_value("Rank").is_none());
    }
}
