// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON converter driven by descriptors.

use crate::config::MetaConfig;
use crate::descriptor::{DataType, ObjectType, PrimitiveKind, TypeSpec};
use crate::error::{MetaError, Result};
use crate::native::CreateContext;
use crate::provider::{MetadataProvider, MetadataProviderExt};
use crate::record::DynamicRecord;
use crate::value::{ObjectRef, Value};
use crate::variables::parse_deferred;
use serde_json::{Map, Number, Value as Json};
use std::sync::Arc;

/// Deepest nesting of records the converter follows.
const MAX_NESTING: usize = 64;

/// Converts records to and from JSON objects.
///
/// Each object carries its type's full name under the configured type field.
/// Written members are the serializable, readable properties of the type
/// and its ancestors, with raw stored values (`$(Name)` references are kept).
/// Members on the wire that match neither a descriptor property nor a native
/// member are ignored.
pub struct JsonConverter {
    provider: Arc<dyn MetadataProvider>,
    type_field: String,
}

impl JsonConverter {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self::with_config(provider, &MetaConfig::default())
    }

    pub fn with_config(provider: Arc<dyn MetadataProvider>, config: &MetaConfig) -> Self {
        Self {
            provider,
            type_field: config.type_field.clone(),
        }
    }

    pub fn type_field(&self) -> &str {
        &self.type_field
    }

    // -----------------------------------------------------------------------
    // Write
    // -----------------------------------------------------------------------

    pub fn to_json(&self, record: &DynamicRecord) -> Result<Json> {
        self.write_record(record, 0)
    }

    pub fn to_json_string(&self, record: &DynamicRecord) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json(record)?)?)
    }

    /// Serialize a list of records as a JSON array.
    pub fn save_list(&self, records: &[DynamicRecord]) -> Result<Json> {
        records
            .iter()
            .map(|record| self.to_json(record))
            .collect::<Result<Vec<_>>>()
            .map(Json::Array)
    }

    fn write_record(&self, record: &DynamicRecord, depth: usize) -> Result<Json> {
        if depth > MAX_NESTING {
            return Err(MetaError::Serialization(format!(
                "records nested deeper than {}",
                MAX_NESTING
            )));
        }
        let ty = record.object_type();
        let mut map = Map::new();
        map.insert(self.type_field.clone(), Json::String(ty.full_name().to_string()));

        for property in ty.find_properties(|p| p.serialize() && p.can_read())? {
            let value = property.get_value(record)?;
            map.insert(property.name().to_string(), self.write_value(&value, depth)?);
        }
        for name in record.values().keys() {
            if !map.contains_key(name) {
                log::trace!(
                    "[typemeta] '{}' has no property on '{}', not written",
                    name,
                    ty.full_name()
                );
            }
        }
        Ok(Json::Object(map))
    }

    fn write_value(&self, value: &Value, depth: usize) -> Result<Json> {
        value_to_json(value, &|obj: &ObjectRef| {
            self.write_record(&obj.read(), depth + 1)
        })
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Read a record whose type is named by the type field.
    pub fn from_json(&self, json: &Json) -> Result<DynamicRecord> {
        let ty = self.declared_type(json)?.ok_or_else(|| {
            MetaError::Serialization(format!("missing '{}' member", self.type_field))
        })?;
        self.read_record(json, &ty, 0)
    }

    /// Read a record as the given type, or a subtype named by the type field.
    pub fn from_json_as(&self, json: &Json, ty: &Arc<ObjectType>) -> Result<DynamicRecord> {
        let actual = self.subtype_of(json, ty)?;
        self.read_record(json, &actual, 0)
    }

    pub fn from_json_str(&self, text: &str) -> Result<DynamicRecord> {
        self.from_json(&serde_json::from_str(text)?)
    }

    /// Read a JSON array of records of `ty` (or subtypes).
    pub fn load_list(&self, json: &Json, ty: &Arc<ObjectType>) -> Result<Vec<DynamicRecord>> {
        let items = json
            .as_array()
            .ok_or_else(|| MetaError::Serialization("expected a JSON array".into()))?;
        items.iter().map(|item| self.from_json_as(item, ty)).collect()
    }

    fn declared_type(&self, json: &Json) -> Result<Option<Arc<ObjectType>>> {
        match json.get(&self.type_field) {
            Some(Json::String(name)) => self.provider.require_object_type(name).map(Some),
            Some(other) => Err(MetaError::Serialization(format!(
                "'{}' must be a string, got {}",
                self.type_field, other
            ))),
            None => Ok(None),
        }
    }

    fn subtype_of(&self, json: &Json, expected: &Arc<ObjectType>) -> Result<Arc<ObjectType>> {
        match self.declared_type(json)? {
            Some(actual) if expected.is_assignable_from(&actual) => Ok(actual),
            Some(actual) => Err(MetaError::mismatch(expected.full_name(), actual.full_name())),
            None => Ok(Arc::clone(expected)),
        }
    }

    fn read_record(
        &self,
        json: &Json,
        ty: &Arc<ObjectType>,
        depth: usize,
    ) -> Result<DynamicRecord> {
        if depth > MAX_NESTING {
            return Err(MetaError::Serialization(format!(
                "records nested deeper than {}",
                MAX_NESTING
            )));
        }
        let members = json
            .as_object()
            .ok_or_else(|| MetaError::Serialization("expected a JSON object".into()))?;
        let mut record = ty.create_instance(&CreateContext::empty())?;

        for (name, raw) in members {
            if *name == self.type_field {
                continue;
            }
            if let Some(property) = ty.find_property(name)? {
                if property.serialize() && property.can_write() {
                    let value = self.read_value(raw, Some(&property.data_type()?), depth)?;
                    property.set_value(&mut record, value)?;
                } else {
                    log::trace!(
                        "[typemeta] '{}' on '{}' is not deserialized",
                        name,
                        ty.full_name()
                    );
                }
                continue;
            }
            match ty.native().and_then(|native| native.member(name)) {
                Some(member) if member.can_write() => {
                    let expected = member.type_spec().resolve_builtin();
                    let value = self.read_value(raw, expected.as_ref(), depth)?;
                    member.write(&mut record, &value)?;
                }
                _ => log::trace!("[typemeta] '{}' ignored on '{}'", name, ty.full_name()),
            }
        }
        Ok(record)
    }

    fn read_value(&self, raw: &Json, expected: Option<&DataType>, depth: usize) -> Result<Value> {
        match (expected, raw) {
            (_, Json::Null) => Ok(Value::Null),
            (Some(DataType::Primitive(kind)), raw) => json_to_primitive(raw, *kind),
            (Some(DataType::List(item)), Json::Array(items)) => items
                .iter()
                .map(|v| self.read_value(v, Some(item.as_ref()), depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (Some(DataType::Object(ty)), Json::Object(_)) => {
                let actual = self.subtype_of(raw, ty)?;
                Ok(Value::Object(self.read_record(raw, &actual, depth + 1)?.into_ref()))
            }
            (Some(expected), raw) => Err(MetaError::mismatch(expected.full_name(), json_kind(raw))),
            (None, Json::Array(items)) => items
                .iter()
                .map(|v| self.read_value(v, None, depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (None, Json::Object(_)) => {
                let ty = self.declared_type(raw)?.ok_or_else(|| {
                    MetaError::Serialization(format!(
                        "nested object without '{}' member",
                        self.type_field
                    ))
                })?;
                Ok(Value::Object(self.read_record(raw, &ty, depth + 1)?.into_ref()))
            }
            (None, raw) => json_to_scalar(raw),
        }
    }
}

/// JSON form of any value; records are written by `write_object`.
pub(crate) fn value_to_json<F>(value: &Value, write_object: &F) -> Result<Json>
where
    F: Fn(&ObjectRef) -> Result<Json>,
{
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| value_to_json(item, write_object))
            .collect::<Result<Vec<_>>>()
            .map(Json::Array),
        Value::Object(obj) => write_object(obj),
        primitive => primitive_to_json(primitive),
    }
}

/// JSON read against a declared type spec, without resolving named types.
///
/// Named types only accept scalars.
pub(crate) fn json_to_spec(raw: &Json, spec: &TypeSpec) -> Result<Value> {
    match (spec, raw) {
        (_, Json::Null) => Ok(Value::Null),
        (TypeSpec::Primitive(kind), raw) => json_to_primitive(raw, *kind),
        (TypeSpec::List(item), Json::Array(items)) => items
            .iter()
            .map(|v| json_to_spec(v, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        (TypeSpec::List(_), raw) => Err(MetaError::mismatch(spec.full_name(), json_kind(raw))),
        (TypeSpec::Named(_), raw) => json_to_scalar(raw),
    }
}

/// JSON form of a non-composite value.
pub(crate) fn primitive_to_json(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::I8(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F32(v) => float(f64::from(*v))?,
        Value::F64(v) => float(*v)?,
        Value::Char(v) => Json::String(v.to_string()),
        Value::String(v) => Json::String(v.clone()),
        Value::DateTime(v) => Json::String(v.to_rfc3339()),
        Value::List(_) | Value::Object(_) => {
            return Err(MetaError::Serialization(format!(
                "{} is not a primitive value",
                value.kind_name()
            )))
        }
    })
}

fn float(v: f64) -> Result<Json> {
    Number::from_f64(v)
        .map(Json::Number)
        .ok_or_else(|| MetaError::Serialization(format!("{} has no JSON form", v)))
}

/// Scalar JSON as the closest value, without a target type.
pub(crate) fn json_to_scalar(raw: &Json) -> Result<Value> {
    match raw {
        Json::Null => Ok(Value::Null),
        Json::Bool(v) => Ok(Value::Bool(*v)),
        Json::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::I64(v))
            } else if let Some(v) = n.as_u64() {
                Ok(Value::U64(v))
            } else {
                n.as_f64()
                    .map(Value::F64)
                    .ok_or_else(|| MetaError::Serialization(format!("unsupported number {}", n)))
            }
        }
        Json::String(v) => Ok(Value::String(v.clone())),
        Json::Array(_) | Json::Object(_) => Err(MetaError::mismatch("scalar", json_kind(raw))),
    }
}

/// Scalar JSON converted to a primitive kind.
///
/// A whole `$(Name)` string is kept for every kind.
pub(crate) fn json_to_primitive(raw: &Json, kind: PrimitiveKind) -> Result<Value> {
    match raw {
        Json::String(text) if parse_deferred(text).is_some() => Ok(Value::String(text.clone())),
        raw => json_to_scalar(raw)?.coerce(kind),
    }
}

fn json_kind(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_to_json() {
        assert_eq!(primitive_to_json(&Value::U8(7)).unwrap(), json!(7));
        assert_eq!(primitive_to_json(&Value::Char('x')).unwrap(), json!("x"));
        assert!(primitive_to_json(&Value::F64(f64::NAN)).is_err());
        assert!(primitive_to_json(&Value::List(Vec::new())).is_err());
    }

    #[test]
    fn test_json_to_primitive() {
        assert_eq!(
            json_to_primitive(&json!(300), PrimitiveKind::U16).unwrap(),
            Value::U16(300)
        );
        assert!(json_to_primitive(&json!(300), PrimitiveKind::U8).is_err());
        assert_eq!(
            json_to_primitive(&json!(2), PrimitiveKind::F32).unwrap(),
            Value::F32(2.0)
        );
        assert!(json_to_primitive(&json!([1]), PrimitiveKind::I32).is_err());
        assert_eq!(json_to_scalar(&json!(u64::MAX)).unwrap(), Value::U64(u64::MAX));
        assert_eq!(
            json_to_primitive(&json!("$(Now)"), PrimitiveKind::DateTime).unwrap(),
            Value::from("$(Now)")
        );
        assert!(json_to_primitive(&json!("soon"), PrimitiveKind::DateTime).is_err());
    }

    #[test]
    fn test_json_against_type_spec() {
        let tags = TypeSpec::parse("list<string>");
        assert_eq!(
            json_to_spec(&json!(["a", "b"]), &tags).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert!(json_to_spec(&json!("a"), &tags).is_err());
        assert_eq!(
            json_to_spec(&json!([[1], []]), &TypeSpec::parse("list<list<u8>>")).unwrap(),
            Value::List(vec![Value::List(vec![Value::U8(1)]), Value::List(Vec::new())])
        );
        assert_eq!(
            json_to_spec(&json!(7), &TypeSpec::parse("Crm.Party")).unwrap(),
            Value::I64(7)
        );
    }

    #[test]
    fn test_value_to_json_nests_lists() {
        let value = Value::List(vec![Value::List(vec![Value::U8(1)]), Value::from("x")]);
        let json = value_to_json(&value, &|_: &ObjectRef| Ok(Json::Null)).unwrap();
        assert_eq!(json, json!([[1], "x"]));
    }
}
