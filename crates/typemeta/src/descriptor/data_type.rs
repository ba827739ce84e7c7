// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data type descriptors: identity and compatibility of every describable type.

use crate::descriptor::ObjectType;
use crate::error::{MetaError, Result};
use crate::value::Value;
use crate::variables::parse_deferred;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Primitive type kinds.
///
/// This is also the fixed set a dynamic property can be auto-created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    DateTime,
}

impl PrimitiveKind {
    /// Every primitive kind, in declaration order.
    pub const ALL: [PrimitiveKind; 14] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
        Self::DateTime,
    ];

    /// Canonical type name.
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::DateTime => "datetime",
        }
    }

    /// Look up a kind by canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.full_name() == name)
    }

    /// Exact kind of a value, `None` for null, lists and objects.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(Self::Bool),
            Value::I8(_) => Some(Self::I8),
            Value::I16(_) => Some(Self::I16),
            Value::I32(_) => Some(Self::I32),
            Value::I64(_) => Some(Self::I64),
            Value::U8(_) => Some(Self::U8),
            Value::U16(_) => Some(Self::U16),
            Value::U32(_) => Some(Self::U32),
            Value::U64(_) => Some(Self::U64),
            Value::F32(_) => Some(Self::F32),
            Value::F64(_) => Some(Self::F64),
            Value::Char(_) => Some(Self::Char),
            Value::String(_) => Some(Self::String),
            Value::DateTime(_) => Some(Self::DateTime),
            Value::Null | Value::List(_) | Value::Object(_) => None,
        }
    }

    /// Check if this is an integer kind.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Check if this is a numeric kind.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64)
    }

    /// Default value for the kind.
    // @audit-ok: Simple pattern matching - default value dispatch table
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Char => Value::Char('\0'),
            Self::String => Value::String(String::new()),
            Self::DateTime => Value::DateTime(DateTime::<Utc>::default().fixed_offset()),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

// ---------------------------------------------------------------------------
// TypeSpec
// ---------------------------------------------------------------------------

/// An unresolved reference to a type, as written in definitions.
///
/// Text form: a primitive name (`i32`), `list<inner>`, or any other full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Primitive(PrimitiveKind),
    List(Box<TypeSpec>),
    Named(String),
}

impl TypeSpec {
    /// Parse the text form.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Self::List(Box::new(Self::parse(inner)));
        }
        match PrimitiveKind::from_name(text) {
            Some(kind) => Self::Primitive(kind),
            None => Self::Named(text.to_string()),
        }
    }

    /// List of the given item spec.
    pub fn list_of(item: TypeSpec) -> Self {
        Self::List(Box::new(item))
    }

    /// Text form.
    pub fn full_name(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.full_name().to_string(),
            Self::List(inner) => format!("list<{}>", inner.full_name()),
            Self::Named(name) => name.clone(),
        }
    }

    /// Resolve without any provider, possible when no named type is involved.
    pub fn resolve_builtin(&self) -> Option<DataType> {
        match self {
            Self::Primitive(kind) => Some(DataType::Primitive(*kind)),
            Self::List(inner) => inner.resolve_builtin().map(DataType::list_of),
            Self::Named(_) => None,
        }
    }
}

impl From<PrimitiveKind> for TypeSpec {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<&str> for TypeSpec {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Split a dotted full name into `(namespace, name)`.
///
/// `"Sales.Orders.Order"` gives `("Sales.Orders", "Order")`; a name without
/// a dot has an empty namespace.
pub fn split_full_name(full_name: &str) -> (&str, &str) {
    match full_name.rfind('.') {
        Some(idx) => (&full_name[..idx], &full_name[idx + 1..]),
        None => ("", full_name),
    }
}

/// A resolved type descriptor.
#[derive(Debug, Clone)]
pub enum DataType {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Enumerable of items.
    List(Arc<DataType>),
    /// Object type with properties and inheritance.
    Object(Arc<ObjectType>),
}

impl DataType {
    /// List of the given item type.
    pub fn list_of(item: DataType) -> Self {
        Self::List(Arc::new(item))
    }

    /// Globally unique name within a resolver chain.
    pub fn full_name(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.full_name().to_string(),
            Self::List(item) => format!("list<{}>", item.full_name()),
            Self::Object(obj) => obj.full_name().to_string(),
        }
    }

    /// Last segment of the full name (object types only have a namespace).
    pub fn name(&self) -> String {
        match self {
            Self::Object(obj) => obj.name().to_string(),
            other => other.full_name(),
        }
    }

    /// Namespace part of the full name.
    pub fn namespace(&self) -> String {
        match self {
            Self::Object(obj) => obj.namespace().to_string(),
            _ => String::new(),
        }
    }

    /// Spec form of this type.
    pub fn spec(&self) -> TypeSpec {
        match self {
            Self::Primitive(kind) => TypeSpec::Primitive(*kind),
            Self::List(item) => TypeSpec::list_of(item.spec()),
            Self::Object(obj) => TypeSpec::Named(obj.full_name().to_string()),
        }
    }

    pub fn is_enumerable(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Item type if this is enumerable.
    pub fn item_type(&self) -> Option<&DataType> {
        match self {
            Self::List(item) => Some(item.as_ref()),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Value a fresh property of this type starts with.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(kind) => kind.default_value(),
            Self::List(_) => Value::List(Vec::new()),
            Self::Object(_) => Value::Null,
        }
    }

    /// Monotonic version, bumped when an object type gains properties.
    pub fn version(&self) -> u64 {
        match self {
            Self::Object(obj) => obj.version(),
            _ => 0,
        }
    }

    /// Whether a value of type `other` can be stored where `self` is expected.
    ///
    /// Object compatibility is structural: `other`'s inheritance chain is
    /// walked looking for a full-name match.
    pub fn is_assignable_from(&self, other: &DataType) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::List(a), Self::List(b)) => a.is_assignable_from(b),
            (Self::Object(a), Self::Object(b)) => a.is_assignable_from(b),
            _ => false,
        }
    }

    /// Convert a value so it can be stored where this type is expected.
    ///
    /// Null passes through; nullability is the caller's concern. A whole
    /// `$(Name)` reference is kept as is for every primitive type.
    pub fn conform(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            // `$(Name)` is stored raw and expanded when read.
            (Self::Primitive(_), Value::String(text)) if parse_deferred(&text).is_some() => {
                Ok(Value::String(text))
            }
            (Self::Primitive(kind), value) => value.coerce(*kind),
            (Self::List(item), Value::List(items)) => items
                .into_iter()
                .map(|v| item.conform(v))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (Self::Object(expected), Value::Object(obj)) => match obj.object_type() {
                Some(actual) if !expected.is_assignable_from(&actual) => Err(MetaError::mismatch(
                    expected.full_name(),
                    actual.full_name(),
                )),
                // A locked record is being written through; accept it.
                _ => Ok(Value::Object(obj)),
            },
            (expected, other) => Err(MetaError::mismatch(expected.full_name(), other.kind_name())),
        }
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.full_name() == other.full_name()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl From<PrimitiveKind> for DataType {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<Arc<ObjectType>> for DataType {
    fn from(obj: Arc<ObjectType>) -> Self {
        Self::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(kind.full_name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("decimal"), None);
    }

    #[test]
    fn test_primitive_of_value() {
        assert_eq!(PrimitiveKind::of(&Value::I32(1)), Some(PrimitiveKind::I32));
        assert_eq!(
            PrimitiveKind::of(&Value::from("a")),
            Some(PrimitiveKind::String)
        );
        assert_eq!(PrimitiveKind::of(&Value::Null), None);
        assert_eq!(PrimitiveKind::of(&Value::List(Vec::new())), None);
    }

    #[test]
    fn test_type_spec_parse() {
        assert_eq!(TypeSpec::parse("i32"), TypeSpec::Primitive(PrimitiveKind::I32));
        assert_eq!(
            TypeSpec::parse("list<Sales.Line>"),
            TypeSpec::list_of(TypeSpec::Named("Sales.Line".into()))
        );
        assert_eq!(
            TypeSpec::parse("list<list<string>>").full_name(),
            "list<list<string>>"
        );
        assert!(TypeSpec::parse("list<u8>").resolve_builtin().is_some());
        assert!(TypeSpec::parse("Sales.Line").resolve_builtin().is_none());
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(split_full_name("Sales.Orders.Order"), ("Sales.Orders", "Order"));
        assert_eq!(split_full_name("Order"), ("", "Order"));
    }

    #[test]
    fn test_list_data_type() {
        let list = DataType::list_of(DataType::Primitive(PrimitiveKind::String));
        assert!(list.is_enumerable());
        assert_eq!(list.full_name(), "list<string>");
        assert_eq!(
            list.item_type(),
            Some(&DataType::Primitive(PrimitiveKind::String))
        );
        assert_eq!(list.default_value(), Value::List(Vec::new()));
        assert!(list.is_assignable_from(&DataType::list_of(PrimitiveKind::String.into())));
        assert!(!list.is_assignable_from(&DataType::list_of(PrimitiveKind::I32.into())));
    }

    #[test]
    fn test_conform_keeps_deferred_reference() {
        let stamp = DataType::Primitive(PrimitiveKind::DateTime);
        assert_eq!(
            stamp.conform(Value::from("$(UtcNow)")).unwrap(),
            Value::from("$(UtcNow)")
        );
        assert!(stamp.conform(Value::from("$(UtcNow) later")).is_err());

        let counts = DataType::list_of(PrimitiveKind::I64.into());
        assert_eq!(
            counts
                .conform(Value::List(vec![Value::from("$(Timestamp)"), Value::I32(3)]))
                .unwrap(),
            Value::List(vec![Value::from("$(Timestamp)"), Value::I64(3)])
        );
    }
}
