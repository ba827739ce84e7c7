// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor model.
//!
//! - [`DataType`]: identity and compatibility of any describable type
//! - [`ObjectType`]: named properties, single-parent inheritance, instantiation
//! - [`Property`]: metadata and accessor pair for one member

mod data_type;
mod object_type;
mod property;

pub use data_type::{split_full_name, DataType, PrimitiveKind, TypeSpec};
pub use object_type::{ObjectOrigin, ObjectType, ROOT_TYPE_NAME};
pub use property::Property;
