// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end metadata scenarios through the public API only.
//
// A native type published in a code container and a run-time type are
// driven through the standard resolver chain, then read and written by name
// exactly as a downstream consumer (serializer, template engine) would.

#![allow(clippy::float_cmp)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use typemeta::native::{CodeContainer, ServiceMap, StaticContainers};
use typemeta::provider::{MetadataProviderExt, StandardProvider};
use typemeta::{
    impl_instance, CreateContext, DataType, FromValue, MetaConfig, MetaError, NativeType,
    PrimitiveKind, Property, PropertyAccessor, PropertyAccessorExt, Value,
};

#[derive(Default)]
struct Party {
    name: String,
}
impl_instance!(Party);

#[derive(Default)]
struct Customer {
    party: Party,
    credit: i64,
}
impl_instance!(Customer, base = party);

struct Ticket {
    code: String,
}
impl_instance!(Ticket);

fn containers() -> Arc<StaticContainers> {
    let party = NativeType::builder::<Party>("Crm.Party")
        .property(
            "Name",
            PrimitiveKind::String,
            |p: &Party| p.name.clone().into(),
            |p: &mut Party, v| {
                p.name = String::from_value(&v)?;
                Ok(())
            },
        )
        .default_constructor()
        .build();
    let customer = NativeType::builder::<Customer>("Crm.Customer")
        .inherit(&party)
        .property(
            "Credit",
            PrimitiveKind::I64,
            |c: &Customer| c.credit.into(),
            |c: &mut Customer, v| {
                c.credit = i64::from_value(&v)?;
                Ok(())
            },
        )
        .default_constructor()
        .build();

    let ticket = NativeType::builder::<Ticket>("Ops.Ticket")
        .read_only("Code", PrimitiveKind::String, |t: &Ticket| t.code.clone().into())
        .constructor(|ctx| {
            let prefix = ctx
                .service::<String>("prefix")
                .ok_or_else(|| MetaError::NotInstantiable("Ops.Ticket".into()))?;
            let number = ctx.arg(0).map_or(Ok(0), i32::from_value)?;
            Ok(Ticket {
                code: format!("{prefix}{number}"),
            })
        })
        .build();

    Arc::new(
        StaticContainers::new()
            .with_container(
                CodeContainer::new("plugins").with_type(NativeType::opaque("Crm.Party", None)),
            )
            .with_container(
                CodeContainer::new("core")
                    .with_type(party)
                    .with_type(customer)
                    .with_type(ticket)
                    .with_type(NativeType::opaque("Ops.Handle", None)),
            ),
    )
}

#[test]
fn test_core_container_wins_over_plugins() {
    let standard = StandardProvider::new(containers());
    let party = standard.require_object_type("Crm.Party").unwrap();
    assert!(party.find_property("Name").unwrap().is_some());

    let config = MetaConfig {
        core_container: "plugins".into(),
        ..MetaConfig::default()
    };
    let standard = StandardProvider::with_config(containers(), config);
    let party = standard.require_object_type("Crm.Party").unwrap();
    assert!(party.find_property("Name").unwrap().is_none());
}

#[test]
fn test_introspected_type_read_and_written_by_name() {
    let standard = StandardProvider::new(containers());
    let mut customer = standard.create_record("Crm.Customer").unwrap();

    customer.set("Name", "Acme").unwrap();
    customer.set("Credit", 2500i64).unwrap();
    assert_eq!(customer.get::<String>("Name").unwrap(), "Acme");

    let native = customer.carrier::<Customer>().unwrap();
    assert_eq!(native.party.name, "Acme");
    assert_eq!(native.credit, 2500);

    let ty = customer.object_type().clone();
    assert_eq!(ty.parent_name(), Some("Crm.Party"));
    let parent = ty.derives_from().unwrap().unwrap();
    assert!(parent.is_assignable_from(&ty));
    assert!(!ty.is_assignable_from(&parent));
}

#[test]
fn test_unknown_property_round_trip() {
    let standard = StandardProvider::new(containers());
    standard.register_record_type("Crm.Note", None).unwrap();
    let mut note = standard.create_record("Crm.Note").unwrap();

    assert_eq!(
        note.get_property_value("Pinned").unwrap_err(),
        MetaError::PropertyNotFound {
            type_name: "Crm.Note".into(),
            property: "Pinned".into(),
        }
    );

    note.set("Pinned", true).unwrap();
    assert!(note.get::<bool>("Pinned").unwrap());
    let pinned = note.object_type().property("Pinned").unwrap();
    assert_eq!(pinned.data_type().unwrap(), DataType::Primitive(PrimitiveKind::Bool));

    let err = note.set("Tags", Value::List(Vec::new())).unwrap_err();
    assert!(matches!(err, MetaError::UnsupportedDynamicType { .. }));
}

#[test]
fn test_derived_property_shadows_inherited() {
    let standard = StandardProvider::new(containers());
    let base = standard.register_record_type("Hr.Person", None).unwrap();
    base.add_property("Code", PrimitiveKind::I32).unwrap();
    let derived = standard
        .register_record_type("Hr.Employee", Some("Hr.Person"))
        .unwrap();
    derived
        .insert_property(Property::dynamic("Code", PrimitiveKind::String).with_default("E-0"))
        .unwrap();

    let all = derived.find_all_properties().unwrap();
    let codes: Vec<_> = all.iter().filter(|p| p.name() == "Code").collect();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].type_name(), "string");

    let employee = standard.create_record("Hr.Employee").unwrap();
    assert_eq!(employee.get::<String>("Code").unwrap(), "E-0");

    assert_eq!(
        derived.add_property("Code", PrimitiveKind::I64).unwrap_err(),
        MetaError::DuplicateProperty {
            type_name: "Hr.Employee".into(),
            property: "Code".into(),
        }
    );
}

#[test]
fn test_native_construction_with_services() {
    let standard = StandardProvider::new(containers());
    let ticket_type = standard.require_object_type("Ops.Ticket").unwrap();

    let mut services = ServiceMap::new();
    services.insert("prefix", String::from("T-"));
    let args = [Value::I32(42)];
    let ticket = ticket_type
        .create_native::<Ticket>(&CreateContext::new(&services, &args))
        .unwrap();
    assert_eq!(ticket.code, "T-42");

    let record = ticket_type
        .create_instance(&CreateContext::new(&services, &[]))
        .unwrap();
    assert_eq!(record.get::<String>("Code").unwrap(), "T-0");

    assert_eq!(
        ticket_type.create_instance(&CreateContext::empty()).unwrap_err(),
        MetaError::NotInstantiable("Ops.Ticket".into())
    );
    let handle = standard.require_object_type("Ops.Handle").unwrap();
    assert_eq!(
        handle.create_instance(&CreateContext::empty()).unwrap_err(),
        MetaError::NotInstantiable("Ops.Handle".into())
    );
}

#[test]
fn test_duplicate_registration_rejected() {
    let standard = StandardProvider::new(containers());
    let first = standard.register_record_type("Ops.Queue", None).unwrap();
    assert_eq!(
        standard.register_record_type("Ops.Queue", None).unwrap_err(),
        MetaError::DuplicateType("Ops.Queue".into())
    );
    assert!(Arc::ptr_eq(&standard.require_object_type("Ops.Queue").unwrap(), &first));
}

#[test]
fn test_root_type_is_sealed() {
    let standard = StandardProvider::new(containers());
    let root = standard.require_object_type("Object").unwrap();
    assert!(root.is_root());
    assert_eq!(
        root.add_property("Anything", PrimitiveKind::I32).unwrap_err(),
        MetaError::SealedType("Object".into())
    );
    assert!(root.is_assignable_from(&standard.require_object_type("Crm.Customer").unwrap()));
}
