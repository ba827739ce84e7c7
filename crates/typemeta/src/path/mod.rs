// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property paths and template expansion.
//!
//! ```rust
//! use std::sync::Arc;
//! use typemeta::native::StaticContainers;
//! use typemeta::path::PathResolver;
//! use typemeta::provider::StandardProvider;
//! use typemeta::PropertyAccessorExt;
//!
//! let standard = StandardProvider::new(Arc::new(StaticContainers::new()));
//! standard.register_record_type("Crm.Contact", None).unwrap();
//! let mut contact = standard.create_record("Crm.Contact").unwrap();
//! contact.set("FirstName", "Ann").unwrap();
//! contact.set("Orders", 1250i32).unwrap();
//!
//! let resolver = PathResolver::new();
//! assert_eq!(
//!     resolver.expand(&contact, "{FirstName}: {Orders:N0} orders, {Bogus}"),
//!     "Ann: 1,250 orders, {Bogus}"
//! );
//! ```

mod format;
mod resolver;
mod template;

#[cfg(test)]
mod tests;

pub use format::format_integer;
pub use resolver::PathResolver;
pub use template::{parse as parse_template, references, Reference, ReferenceStyle, Segment};
