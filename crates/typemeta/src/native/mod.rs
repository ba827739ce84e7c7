// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native reflection source.
//!
//! Rust has no runtime reflection, so compiled types describe themselves
//! once through [`NativeTypeBuilder`] and are published in named
//! [`CodeContainer`]s. The introspector searches those containers by full
//! name and turns the winning [`NativeType`] into an object type.
//!
//! # Example
//!
//! ```rust
//! use typemeta::native::{CodeContainer, NativeType};
//! use typemeta::{impl_instance, FromValue, PrimitiveKind};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//! impl_instance!(Point);
//!
//! let point = NativeType::builder::<Point>("Geo.Point")
//!     .property("X", PrimitiveKind::I32, |p: &Point| p.x.into(), |p: &mut Point, v| {
//!         p.x = i32::from_value(&v)?;
//!         Ok(())
//!     })
//!     .read_only("Y", PrimitiveKind::I32, |p: &Point| p.y.into())
//!     .default_constructor()
//!     .build();
//!
//! let container = CodeContainer::new("geo").with_type(point);
//! assert!(container.find("Geo.Point").is_some());
//! ```

mod container;
mod native_type;

pub use container::{CodeContainer, ContainerSource, StaticContainers};
pub use native_type::{Constructor, Getter, NativeProperty, NativeType, NativeTypeBuilder, Setter};

pub(crate) use native_type::{read_through, write_through};

use crate::access::DynamicValueStore;
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A native object that descriptors can read and write.
///
/// `base()` exposes an embedded parent part so reflection accessors declared
/// on an ancestor type still reach their field. `value_store()` exposes the
/// dictionary that backs dynamic properties, if the type has one.
pub trait Instance: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn base(&self) -> Option<&dyn Instance> {
        None
    }

    fn base_mut(&mut self) -> Option<&mut dyn Instance> {
        None
    }

    fn value_store(&self) -> Option<&dyn DynamicValueStore> {
        None
    }

    fn value_store_mut(&mut self) -> Option<&mut dyn DynamicValueStore> {
        None
    }
}

/// Implement [`Instance`] for a struct.
///
/// `base = field` names the embedded parent part, `store = field` names a
/// `HashMap<String, Value>` backing dynamic properties.
#[macro_export]
macro_rules! impl_instance {
    ($ty:ty $(, base = $base:ident)? $(, store = $store:ident)?) => {
        impl $crate::native::Instance for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }

            $(
                fn base(&self) -> ::std::option::Option<&dyn $crate::native::Instance> {
                    ::std::option::Option::Some(&self.$base)
                }

                fn base_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::native::Instance> {
                    ::std::option::Option::Some(&mut self.$base)
                }
            )?

            $(
                fn value_store(&self) -> ::std::option::Option<&dyn $crate::access::DynamicValueStore> {
                    ::std::option::Option::Some(&self.$store)
                }

                fn value_store_mut(
                    &mut self,
                ) -> ::std::option::Option<&mut dyn $crate::access::DynamicValueStore> {
                    ::std::option::Option::Some(&mut self.$store)
                }
            )?
        }
    };
}

// ---------------------------------------------------------------------------
// Service location
// ---------------------------------------------------------------------------

/// Supplies shared services to constructors.
pub trait ServiceLocator: Send + Sync {
    fn service(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Locator with no services.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoServices;

impl ServiceLocator for NoServices {
    fn service(&self, _name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }
}

/// Simple name-keyed service map.
#[derive(Default)]
pub struct ServiceMap {
    services: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under a name, replacing any previous one.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: T) {
        self.services.insert(name.into(), Arc::new(service));
    }

    /// Typed lookup.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.get(name)?.clone().downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceLocator for ServiceMap {
    fn service(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(name).cloned()
    }
}

/// Arguments handed to a native constructor.
#[derive(Clone, Copy)]
pub struct CreateContext<'a> {
    pub services: &'a dyn ServiceLocator,
    pub args: &'a [Value],
}

impl<'a> CreateContext<'a> {
    pub fn new(services: &'a dyn ServiceLocator, args: &'a [Value]) -> Self {
        Self { services, args }
    }

    /// No services, no arguments.
    pub fn empty() -> CreateContext<'static> {
        CreateContext {
            services: &NoServices,
            args: &[],
        }
    }

    /// Typed service lookup.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.service(name)?.downcast::<T>().ok()
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}
