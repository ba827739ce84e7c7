// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Manual name-to-descriptor registry.

use super::MetadataProvider;
use crate::descriptor::{DataType, PrimitiveKind};
use crate::error::{MetaError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Registry filled explicitly by the caller.
pub struct ManualProvider {
    name: String,
    types: RwLock<HashMap<String, DataType>>,
}

impl ManualProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-filled with every primitive kind under its canonical name.
    pub fn with_primitives(name: impl Into<String>) -> Self {
        let types = PrimitiveKind::ALL
            .iter()
            .map(|kind| (kind.full_name().to_string(), DataType::Primitive(*kind)))
            .collect();
        Self {
            name: name.into(),
            types: RwLock::new(types),
        }
    }

    /// Register a descriptor under its own full name.
    pub fn register(&self, data_type: impl Into<DataType>) -> Result<()> {
        let data_type = data_type.into();
        self.register_as(data_type.full_name(), data_type)
    }

    /// Register a descriptor under an alias.
    pub fn register_as(
        &self,
        name: impl Into<String>,
        data_type: impl Into<DataType>,
    ) -> Result<()> {
        let name = name.into();
        let mut types = self.types.write();
        if types.contains_key(&name) {
            return Err(MetaError::DuplicateType(name));
        }
        log::debug!("[typemeta] {}: registered '{}'", self.name, name);
        types.insert(name, data_type.into());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl MetadataProvider for ManualProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn lookup_local(&self, full_name: &str) -> Option<DataType> {
        self.types.read().get(full_name).cloned()
    }
}
