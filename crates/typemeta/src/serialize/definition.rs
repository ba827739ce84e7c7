// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Persisted form of dynamic type definitions.
//!
//! Only what was declared at run time is exported: the type name, parent,
//! carrier and dynamic properties. Reflected members come back from the
//! carrier on import.

use super::json::{json_to_spec, value_to_json};
use crate::descriptor::{ObjectType, Property, TypeSpec, ROOT_TYPE_NAME};
use crate::error::{MetaError, Result};
use crate::provider::{DynamicTypeRegistry, MetadataProviderExt};
use crate::record::RECORD_TYPE_NAME;
use crate::value::{ObjectRef, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// PropertyDefinition
// ---------------------------------------------------------------------------

/// One dynamic property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    /// Type in text form (`i32`, `list<string>`, `Sales.Line`).
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default = "default_serialize")]
    pub serialize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

fn default_serialize() -> bool {
    true
}

impl PropertyDefinition {
    pub fn from_property(property: &Property) -> Result<Self> {
        Ok(Self {
            name: property.name().to_string(),
            type_name: property.type_name(),
            nullable: property.is_nullable(),
            serialize: property.serialize(),
            default_value: property
                .default_value()
                .map(|value| default_to_json(property, value))
                .transpose()?,
        })
    }

    /// Rebuild the property. Its type is resolved by name on first use.
    pub fn to_property(&self) -> Result<Property> {
        let spec = TypeSpec::parse(&self.type_name);
        let mut property = Property::dynamic_named(self.name.clone(), spec.clone())
            .nullable(self.nullable)
            .serialized(self.serialize);
        if let Some(raw) = &self.default_value {
            property = property.with_default(json_to_spec(raw, &spec)?);
        }
        Ok(property)
    }
}

fn default_to_json(property: &Property, value: &Value) -> Result<serde_json::Value> {
    value_to_json(value, &|_: &ObjectRef| {
        Err(MetaError::Serialization(format!(
            "record default of '{}' cannot be exported",
            property.name()
        )))
    })
}

// ---------------------------------------------------------------------------
// TypeDefinition
// ---------------------------------------------------------------------------

/// One dynamic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub full_name: String,
    /// Parent full name; absent for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derives_from: Option<String>,
    /// Native carrier full name; absent for plain records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl TypeDefinition {
    /// Definition of a type's run-time declared part.
    pub fn from_object_type(ty: &ObjectType) -> Result<Self> {
        let properties = ty
            .local_properties()
            .iter()
            .filter(|p| p.is_dynamic())
            .map(|p| PropertyDefinition::from_property(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            full_name: ty.full_name().to_string(),
            derives_from: ty
                .parent_name()
                .filter(|name| *name != ROOT_TYPE_NAME)
                .map(str::to_string),
            carrier: ty
                .native()
                .map(|native| native.full_name())
                .filter(|name| *name != RECORD_TYPE_NAME)
                .map(str::to_string),
            properties,
        })
    }
}

/// Definitions of every type in a registry, in registration order.
pub fn export_registry(registry: &DynamicTypeRegistry) -> Result<Vec<TypeDefinition>> {
    registry
        .types()
        .iter()
        .map(|ty| TypeDefinition::from_object_type(ty))
        .collect()
}

/// Rebuild definitions into a registry.
///
/// Owners of the rebuilt properties are attached here and the registry's
/// resolver is attached when it has one. Parents and property types stay
/// unresolved until first used, so a missing type surfaces there rather
/// than during import. Carriers other than the plain record are resolved
/// immediately through the registry's resolver.
///
/// Every definition is built before any is registered: on error the
/// registry is left unchanged.
pub fn import_definitions(
    registry: &DynamicTypeRegistry,
    definitions: &[TypeDefinition],
) -> Result<Vec<Arc<ObjectType>>> {
    let imported = definitions
        .iter()
        .map(|definition| build_type(registry, definition))
        .collect::<Result<Vec<_>>>()?;
    registry.insert_all(&imported)?;
    log::debug!("[typemeta] imported {} type definitions", imported.len());
    Ok(imported)
}

fn build_type(
    registry: &DynamicTypeRegistry,
    definition: &TypeDefinition,
) -> Result<Arc<ObjectType>> {
    let carrier = match definition.carrier.as_deref() {
        None | Some(RECORD_TYPE_NAME) => Arc::clone(registry.record_carrier()),
        Some(name) => {
            let resolver = registry
                .resolver()
                .ok_or_else(|| MetaError::MissingResolver(definition.full_name.clone()))?;
            let carrier_type = resolver.require_object_type(name)?;
            carrier_type
                .native()
                .cloned()
                .ok_or_else(|| MetaError::NotInstantiable(name.to_string()))?
        }
    };

    let parent = definition.derives_from.as_deref().unwrap_or(ROOT_TYPE_NAME);
    let ty = ObjectType::dynamic_deferred(
        definition.full_name.clone(),
        carrier,
        parent,
        None,
    );
    for property in &definition.properties {
        ty.insert_property(property.to_property()?)?;
    }
    Ok(ty)
}

/// Definitions as pretty JSON.
pub fn save_definitions(definitions: &[TypeDefinition]) -> Result<String> {
    Ok(serde_json::to_string_pretty(definitions)?)
}

pub fn load_definitions(text: &str) -> Result<Vec<TypeDefinition>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DataType, PrimitiveKind};
    use serde_json::json;

    #[test]
    fn test_property_definition_defaults() {
        let definition: PropertyDefinition =
            serde_json::from_value(json!({ "name": "Qty", "type": "u32" })).unwrap();
        assert!(!definition.nullable);
        assert!(definition.serialize);
        assert_eq!(definition.default_value, None);
    }

    #[test]
    fn test_export_skips_root_and_record_names() {
        let registry = DynamicTypeRegistry::new("dynamic");
        let ty = registry.register_record_type("Inv.Item", None).unwrap();
        ty.insert_property(
            Property::dynamic("Qty", PrimitiveKind::U32).with_default(1u32),
        )
        .unwrap();

        let definition = TypeDefinition::from_object_type(&ty).unwrap();
        assert_eq!(definition.derives_from, None);
        assert_eq!(definition.carrier, None);
        assert_eq!(definition.properties.len(), 1);
        assert_eq!(definition.properties[0].type_name, "u32");
        assert_eq!(definition.properties[0].default_value, Some(json!(1)));
    }

    #[test]
    fn test_import_attaches_owners() {
        let definitions = vec![TypeDefinition {
            full_name: "Inv.Item".into(),
            derives_from: None,
            carrier: None,
            properties: vec![PropertyDefinition {
                name: "Qty".into(),
                type_name: "u32".into(),
                nullable: false,
                serialize: true,
                default_value: Some(json!(1)),
            }],
        }];
        let registry = DynamicTypeRegistry::new("dynamic");
        let imported = import_definitions(&registry, &definitions).unwrap();

        let qty = imported[0].property("Qty").unwrap();
        assert!(Arc::ptr_eq(&qty.owner().unwrap(), &imported[0]));
        assert_eq!(qty.default_value(), Some(&crate::value::Value::U32(1)));
        assert!(registry.get("Inv.Item").is_some());
    }

    fn item(full_name: &str) -> TypeDefinition {
        TypeDefinition {
            full_name: full_name.into(),
            derives_from: None,
            carrier: None,
            properties: Vec::new(),
        }
    }

    #[test]
    fn test_list_and_deferred_defaults_survive_export() {
        let source = DynamicTypeRegistry::new("dynamic");
        let ty = source.register_record_type("Inv.Batch", None).unwrap();
        ty.insert_property(
            Property::dynamic("Tags", DataType::list_of(PrimitiveKind::String.into()))
                .with_default(vec!["new", "bulk"]),
        )
        .unwrap();
        ty.insert_property(
            Property::dynamic("Received", PrimitiveKind::DateTime).with_default("$(Now)"),
        )
        .unwrap();

        let definitions = export_registry(&source).unwrap();
        let tags = &definitions[0].properties[0];
        assert_eq!(tags.default_value, Some(json!(["new", "bulk"])));

        let target = DynamicTypeRegistry::new("dynamic");
        let text = save_definitions(&definitions).unwrap();
        let imported = import_definitions(&target, &load_definitions(&text).unwrap()).unwrap();

        let tags = imported[0].property("Tags").unwrap();
        assert_eq!(
            tags.default_value(),
            Some(&Value::List(vec![Value::from("new"), Value::from("bulk")]))
        );
        let received = imported[0].property("Received").unwrap();
        assert_eq!(received.default_value(), Some(&Value::from("$(Now)")));
    }

    #[test]
    fn test_record_default_not_exported() {
        let registry = DynamicTypeRegistry::new("dynamic");
        let part = registry.register_record_type("Inv.Part", None).unwrap();
        let ty = registry.register_record_type("Inv.Item", None).unwrap();
        let sample = crate::record::DynamicRecord::new(Arc::clone(&part)).into_ref();
        ty.insert_property(
            Property::dynamic("Sample", DataType::Object(part)).with_default(Value::Object(sample)),
        )
        .unwrap();

        assert!(matches!(
            export_registry(&registry).unwrap_err(),
            MetaError::Serialization(_)
        ));
    }

    #[test]
    fn test_failed_import_leaves_registry_unchanged() {
        let registry = DynamicTypeRegistry::new("dynamic");
        registry.register_record_type("Inv.Stock", None).unwrap();

        let repeated = [item("Inv.A"), item("Inv.B"), item("Inv.A")];
        assert_eq!(
            import_definitions(&registry, &repeated).unwrap_err(),
            MetaError::DuplicateType("Inv.A".into())
        );

        let existing = [item("Inv.A"), item("Inv.Stock")];
        assert_eq!(
            import_definitions(&registry, &existing).unwrap_err(),
            MetaError::DuplicateType("Inv.Stock".into())
        );

        let mut bad_default = item("Inv.C");
        bad_default.properties.push(PropertyDefinition {
            name: "Qty".into(),
            type_name: "u8".into(),
            nullable: false,
            serialize: true,
            default_value: Some(json!("many")),
        });
        let late_failure = [item("Inv.A"), bad_default];
        assert!(import_definitions(&registry, &late_failure).is_err());

        let mut native = item("Inv.D");
        native.carrier = Some("Inv.Native".into());
        let missing_carrier = [item("Inv.A"), native];
        assert_eq!(
            import_definitions(&registry, &missing_carrier).unwrap_err(),
            MetaError::MissingResolver("Inv.D".into())
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Inv.A").is_none());
    }
}
