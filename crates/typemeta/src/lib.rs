// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Uniform type metadata and dynamic properties.
//!
//! Describes object types (names, properties, inheritance, defaults) that
//! come either from compiled Rust types or from definitions made at run
//! time, and treats both the same way downstream.
//!
//! # Features
//!
//! - **Descriptors**: [`DataType`], [`ObjectType`] and [`Property`]
//! - **Introspection**: native types published in code containers, cached by name
//! - **Dynamic types**: registered and extended at run time, exportable as definitions
//! - **Resolver chain**: chained, aggregate, manual and standard providers
//! - **Dynamic records**: name-based property access with auto-created properties
//! - **Templates**: `{Name}` / `$(Name)` expansion over dotted property paths
//! - **JSON bridge**: descriptor-driven record serialization
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use typemeta::native::StaticContainers;
//! use typemeta::path::PathResolver;
//! use typemeta::provider::StandardProvider;
//! use typemeta::serialize::JsonConverter;
//! use typemeta::{PrimitiveKind, PropertyAccessorExt};
//!
//! let standard = StandardProvider::new(Arc::new(StaticContainers::new()));
//! let person = standard.register_record_type("Crm.Person", None).unwrap();
//! person.add_property("FirstName", PrimitiveKind::String).unwrap();
//!
//! let mut ann = standard.create_record("Crm.Person").unwrap();
//! ann.set("FirstName", "Ann").unwrap();
//! ann.set("Visits", 3u32).unwrap();
//!
//! let greeting = PathResolver::new().expand(&ann, "Hello {FirstName} ({Visits:D2})");
//! assert_eq!(greeting, "Hello Ann (03)");
//!
//! let json = JsonConverter::new(standard.clone()).to_json(&ann).unwrap();
//! assert_eq!(json["Visits"], 3);
//! ```

pub mod access;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod introspect;
pub mod native;
pub mod path;
pub mod provider;
pub mod record;
pub mod serialize;
pub mod value;
pub mod variables;

pub use access::{DynamicValueStore, PropertyAccessor, PropertyAccessorExt};
pub use config::{ConfigError, MetaConfig};
pub use descriptor::{
    DataType, ObjectOrigin, ObjectType, PrimitiveKind, Property, TypeSpec, ROOT_TYPE_NAME,
};
pub use error::{MetaError, Result};
pub use introspect::Introspector;
pub use native::{CreateContext, Instance, NativeType, ServiceLocator};
pub use provider::{MetadataProvider, MetadataProviderExt, StandardProvider};
pub use record::{DynamicRecord, RECORD_TYPE_NAME};
pub use value::{FromValue, ObjectRef, Value};
