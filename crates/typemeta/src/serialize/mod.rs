// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization bridge: records to JSON, dynamic definitions to JSON.

mod definition;
mod json;


pub use definition::{
    export_registry, import_definitions, load_definitions, save_definitions, PropertyDefinition,
    TypeDefinition,
};
pub use json::JsonConverter;
