// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::access::PropertyAccessorExt;
use crate::descriptor::{DataType, ObjectType, PrimitiveKind};
use crate::error::MetaError;
use crate::native::StaticContainers;
use crate::provider::StandardProvider;
use crate::record::DynamicRecord;
use crate::value::Value;
use std::sync::Arc;

fn customer() -> (Arc<StandardProvider>, DynamicRecord) {
    let standard = StandardProvider::new(Arc::new(StaticContainers::new()));
    let address_type = standard.register_record_type("Crm.Address", None).unwrap();
    let customer_type = standard.register_record_type("Crm.Customer", None).unwrap();
    customer_type
        .add_property("Address", DataType::Object(Arc::clone(&address_type)))
        .unwrap();
    customer_type
        .add_property("Tags", DataType::list_of(PrimitiveKind::String.into()))
        .unwrap();

    let mut address = standard.create_record("Crm.Address").unwrap();
    address.set("City", "Lyon").unwrap();

    let mut customer = standard.create_record("Crm.Customer").unwrap();
    customer.set("FirstName", "Ann").unwrap();
    customer.set("Balance", -4200i64).unwrap();
    customer.set("Address", address.into_ref()).unwrap();
    customer.set("Tags", vec!["vip", "eu"]).unwrap();
    (standard, customer)
}

#[test]
fn test_nested_and_indexed_paths() {
    let (_standard, customer) = customer();
    let resolver = PathResolver::new();

    assert_eq!(
        resolver.resolve_path(&customer, "Address.City").unwrap(),
        Value::from("Lyon")
    );
    assert_eq!(
        resolver.resolve_path(&customer, "Tags[1]").unwrap(),
        Value::from("eu")
    );
    assert!(matches!(
        resolver.resolve_path(&customer, "FirstName.Length"),
        Err(MetaError::InvalidPath { .. })
    ));
    assert!(matches!(
        resolver.resolve_path(&customer, "Address.Zip"),
        Err(MetaError::PropertyNotFound { .. })
    ));
    assert!(resolver.try_resolve(&customer, "Tags[5]").is_none());
}

#[test]
fn test_set_path_reaches_nested_record() {
    let (_standard, mut customer) = customer();
    let resolver = PathResolver::new();

    resolver
        .set_path(&mut customer, "Address.City", Value::from("Nantes"))
        .unwrap();
    resolver
        .set_path(&mut customer, "Nickname", Value::from("A."))
        .unwrap();

    assert_eq!(
        resolver.resolve_path(&customer, "Address.City").unwrap(),
        Value::from("Nantes")
    );
    assert_eq!(customer.get::<String>("Nickname").unwrap(), "A.");
    assert!(resolver
        .set_path(&mut customer, "Tags[0]", Value::from("x"))
        .is_err());
}

#[test]
fn test_expand_names_variables_and_unknowns() {
    let (_standard, customer) = customer();
    let resolver = PathResolver::new();

    let out = resolver.expand(&customer, "Hello {FirstName}, it is $(Now)");
    assert!(out.starts_with("Hello Ann, it is "));
    assert!(!out.ends_with("$(Now)"));
    assert!(out.len() > "Hello Ann, it is ".len());

    assert_eq!(resolver.expand(&customer, "{Bogus}"), "{Bogus}");
    assert_eq!(resolver.expand(&customer, "$(Address.Zip)"), "$(Address.Zip)");
    assert_eq!(
        resolver.expand(&customer, "{Address.City} / {Tags[0]}"),
        "Lyon / vip"
    );
}

#[test]
fn test_expand_formats_integers_only() {
    let (_standard, mut customer) = customer();
    customer.set("Score", 2.5f64).unwrap();
    let resolver = PathResolver::new();

    assert_eq!(resolver.expand(&customer, "{Balance:N2}"), "-4,200.00");
    assert_eq!(resolver.expand(&customer, "{Balance:X}"), "FFFFFFFFFFFFEF98");
    assert_eq!(resolver.expand(&customer, "{Score:N2}"), "2.5");
    assert_eq!(resolver.expand(&customer, "{FirstName:D5}"), "Ann");
}

#[test]
fn test_property_shadows_variable() {
    let (_standard, mut customer) = customer();
    customer.set("Now", "frozen").unwrap();
    assert_eq!(PathResolver::new().expand(&customer, "$(Now)"), "frozen");
}

#[test]
fn test_null_renders_empty() {
    let (_standard, customer) = customer();
    let ty = customer.object_type();
    ty.insert_property(
        crate::descriptor::Property::dynamic("Middle", PrimitiveKind::String).nullable(true),
    )
    .unwrap();
    assert_eq!(PathResolver::new().expand(&customer, "[{Middle}]"), "[]");
}

#[test]
fn test_date_time_uses_configured_format() {
    let root = DynamicRecord::new(ObjectType::root());
    let resolver = PathResolver::new();
    let out = resolver.expand(&root, "$(UtcToday)");
    assert!(out.ends_with(" 00:00:00"), "{out}");
}
