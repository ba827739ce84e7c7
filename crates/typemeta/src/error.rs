// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by every metadata operation.

use thiserror::Error;

/// Errors raised by descriptor lookup, registration and property access.
///
/// All failures are local and synchronous: they are returned at the point of
/// the offending call and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    /// Name resolves to nothing across the whole provider chain.
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Name absent from both the descriptor and the dynamic value store.
    #[error("Property '{property}' not found on type '{type_name}'")]
    PropertyNotFound { type_name: String, property: String },

    /// A property with this name is already declared locally on the type.
    #[error("Property '{property}' already exists on type '{type_name}'")]
    DuplicateProperty { type_name: String, property: String },

    /// A type with this full name is already registered.
    #[error("Type already registered: {0}")]
    DuplicateType(String),

    /// Auto-creation of a dynamic property was attempted for a non-primitive value.
    #[error("Cannot create dynamic property '{property}' for a value of kind {kind}")]
    UnsupportedDynamicType { property: String, kind: String },

    /// An operation needed descriptor resolution but no resolver was attached.
    #[error("No metadata resolver attached to '{0}'")]
    MissingResolver(String),

    /// Value kind does not match what the property or conversion expects.
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Property '{0}' is read-only")]
    ReadOnly(String),

    #[error("Property '{0}' is write-only")]
    WriteOnly(String),

    /// Dynamic property used before its owner type was attached.
    #[error("Dynamic property '{0}' has no owner type")]
    DetachedProperty(String),

    /// Dynamic property used on a target that has no value dictionary.
    #[error("Target of property '{0}' does not store dynamic values")]
    NoValueStore(String),

    /// The universal root type cannot be extended.
    #[error("Type '{0}' is sealed")]
    SealedType(String),

    #[error("Type '{0}' cannot be instantiated")]
    NotInstantiable(String),

    #[error("Invalid property path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MetaError {
    pub(crate) fn property_not_found(type_name: &str, property: &str) -> Self {
        Self::PropertyNotFound {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

impl From<serde_json::Error> for MetaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetaError>;
