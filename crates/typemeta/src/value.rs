// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime property values.

use crate::descriptor::{ObjectType, PrimitiveKind};
use crate::error::{MetaError, Result};
use crate::record::DynamicRecord;
use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// A value that any property can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    DateTime(DateTime<FixedOffset>),

    // Composites
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if value holds any integer kind.
    pub fn is_integer(&self) -> bool {
        self.as_i128().is_some()
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            other => PrimitiveKind::of(other).map_or("unknown", |k| k.full_name()),
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer kind, widened.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Any integer kind that fits in an i64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Any numeric kind as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as date-time.
    pub fn as_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as object reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to the given primitive kind.
    ///
    /// Integers convert between kinds when the value fits, any number converts
    /// to a float, single-character strings convert to `char`, and RFC 3339
    /// strings convert to date-times.
    pub fn coerce(&self, kind: PrimitiveKind) -> Result<Value> {
        if PrimitiveKind::of(self) == Some(kind) {
            return Ok(self.clone());
        }
        let fail = || MetaError::mismatch(kind.full_name(), self.kind_name());

        match kind {
            PrimitiveKind::Bool => match self {
                Self::String(s) => s.parse::<bool>().map(Self::Bool).map_err(|_| fail()),
                _ => Err(fail()),
            },
            PrimitiveKind::F32 => self.as_f64().map(|v| Self::F32(v as f32)).ok_or_else(fail),
            PrimitiveKind::F64 => self.as_f64().map(Self::F64).ok_or_else(fail),
            PrimitiveKind::Char => match self {
                Self::String(s) => {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(Self::Char(c)),
                        _ => Err(fail()),
                    }
                }
                _ => Err(fail()),
            },
            PrimitiveKind::String => match self {
                Self::Char(c) => Ok(Self::String(c.to_string())),
                _ => Err(fail()),
            },
            PrimitiveKind::DateTime => match self {
                Self::String(s) => DateTime::parse_from_rfc3339(s)
                    .map(Self::DateTime)
                    .map_err(|_| fail()),
                _ => Err(fail()),
            },
            integer => {
                let wide = self.as_i128().ok_or_else(fail)?;
                Self::integer(integer, wide).ok_or_else(fail)
            }
        }
    }

    /// Build an integer value of the given kind, if it fits.
    fn integer(kind: PrimitiveKind, v: i128) -> Option<Value> {
        match kind {
            PrimitiveKind::I8 => i8::try_from(v).ok().map(Self::I8),
            PrimitiveKind::I16 => i16::try_from(v).ok().map(Self::I16),
            PrimitiveKind::I32 => i32::try_from(v).ok().map(Self::I32),
            PrimitiveKind::I64 => i64::try_from(v).ok().map(Self::I64),
            PrimitiveKind::U8 => u8::try_from(v).ok().map(Self::U8),
            PrimitiveKind::U16 => u16::try_from(v).ok().map(Self::U16),
            PrimitiveKind::U32 => u32::try_from(v).ok().map(Self::U32),
            PrimitiveKind::U64 => u64::try_from(v).ok().map(Self::U64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Object(obj) => f.write_str(&obj.type_name()),
        }
    }
}

// ---------------------------------------------------------------------------
// ObjectRef
// ---------------------------------------------------------------------------

/// Shared handle to a nested record.
///
/// Object references compare by identity, not by content.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<DynamicRecord>>);

impl ObjectRef {
    /// Wrap a record into a shared reference.
    pub fn new(record: DynamicRecord) -> Self {
        Self(Arc::new(RwLock::new(record)))
    }

    /// Lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, DynamicRecord> {
        self.0.read()
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, DynamicRecord> {
        self.0.write()
    }

    /// Check whether both handles point at the same record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Descriptor of the referenced record, `None` while it is write-locked.
    pub fn object_type(&self) -> Option<Arc<ObjectType>> {
        self.0
            .try_read()
            .map(|record| Arc::clone(record.object_type()))
    }

    /// Full name of the referenced record's type.
    pub fn type_name(&self) -> String {
        match self.0.try_read() {
            Some(record) => record.object_type().full_name().to_string(),
            None => "<locked>".to_string(),
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.type_name()).finish()
    }
}

// ---------------------------------------------------------------------------
// Conversions into Value
// ---------------------------------------------------------------------------

macro_rules! impl_from_primitive {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_primitive!(bool, Bool);
impl_from_primitive!(i8, I8);
impl_from_primitive!(i16, I16);
impl_from_primitive!(i32, I32);
impl_from_primitive!(i64, I64);
impl_from_primitive!(u8, U8);
impl_from_primitive!(u16, U16);
impl_from_primitive!(u32, U32);
impl_from_primitive!(u64, U64);
impl_from_primitive!(f32, F32);
impl_from_primitive!(f64, F64);
impl_from_primitive!(char, Char);
impl_from_primitive!(String, String);
impl_from_primitive!(DateTime<FixedOffset>, DateTime);
impl_from_primitive!(ObjectRef, Object);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v.fixed_offset())
    }
}

impl From<DynamicRecord> for Value {
    fn from(v: DynamicRecord) -> Self {
        Self::Object(ObjectRef::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Conversions out of Value
// ---------------------------------------------------------------------------

/// Trait for converting from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value.coerce(PrimitiveKind::$kind)? {
                    Value::$variant(v) => Ok(v),
                    other => Err(MetaError::mismatch(
                        PrimitiveKind::$kind.full_name(),
                        other.kind_name(),
                    )),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, Bool);
impl_from_value!(i8, I8, I8);
impl_from_value!(i16, I16, I16);
impl_from_value!(i32, I32, I32);
impl_from_value!(i64, I64, I64);
impl_from_value!(u8, U8, U8);
impl_from_value!(u16, U16, U16);
impl_from_value!(u32, U32, U32);
impl_from_value!(u64, U64, U64);
impl_from_value!(f32, F32, F32);
impl_from_value!(f64, F64, F64);
impl_from_value!(char, Char, Char);
impl_from_value!(String, String, String);
impl_from_value!(DateTime<FixedOffset>, DateTime, DateTime);

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            other => Err(MetaError::mismatch("object", other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(MetaError::mismatch("list", other.kind_name())),
        }
    }
}
