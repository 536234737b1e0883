//! Integration tests for graph round trips
//!
//! Tests cover:
//! - Normal-layout class mappings with zero and several members
//! - Nested object graphs (object members, sequence members)
//! - Default typing of under-specified containers

use wiremap_core::{
    ClassMappingBuilder, MappingSet, MappingTable, MixedArray, Serializer, Variant,
};
use wiremap_value::{WireArray, WireValue};

#[derive(Default, Debug, Clone, PartialEq)]
struct Address {
    city: String,
    zip: i32,
}

#[derive(Default, Debug, PartialEq)]
struct Customer {
    name: String,
    age: i32,
    address: Address,
    tags: Vec<String>,
}

#[derive(Default, Debug, PartialEq)]
struct Empty;

fn engine() -> Serializer {
    let table = MappingTable::standard();
    table.register_array::<String>();
    table
        .register_type(
            ClassMappingBuilder::<Address>::new()
                .alias("crm.Address")
                .property("city", |a: &Address| a.city.clone(), |a, v| a.city = v)
                .property("zip", |a: &Address| a.zip, |a, v| a.zip = v),
            None,
        )
        .unwrap();
    table
        .register_type(
            ClassMappingBuilder::<Customer>::new()
                .alias("crm.Customer")
                .property("name", |c: &Customer| c.name.clone(), |c, v| c.name = v)
                .property("age", |c: &Customer| c.age, |c, v| c.age = v)
                .property(
                    "address",
                    |c: &Customer| c.address.clone(),
                    |c, v| c.address = v,
                )
                .property("tags", |c: &Customer| c.tags.clone(), |c, v| c.tags = v),
            None,
        )
        .unwrap();
    table
        .register_type(ClassMappingBuilder::<Empty>::new().alias("crm.Empty"), None)
        .unwrap();
    Serializer::new(table)
}

#[test]
fn test_zero_member_round_trip() {
    let ser = engine();
    let wire = ser.to_wire_value(&Empty).unwrap();
    let object = wire.as_object().unwrap();
    assert_eq!(object.layout.alias(), "crm.Empty");
    assert!(object.members.is_empty());

    let back = ser.to_native_typed::<Empty>(&wire).unwrap();
    assert_eq!(back, Empty);
}

#[test]
fn test_nested_graph_round_trip() {
    let ser = engine();
    let customer = Customer {
        name: "ada".into(),
        age: 36,
        address: Address {
            city: "london".into(),
            zip: 12345,
        },
        tags: vec!["vip".into(), "beta".into()],
    };

    let wire = ser.to_wire_value(&customer).unwrap();
    let object = wire.as_object().unwrap();
    assert_eq!(
        object.layout.members(),
        &["name".to_owned(), "age".into(), "address".into(), "tags".into()]
    );
    // Nested members were converted recursively.
    assert!(object.members[2].as_object().is_some());
    assert!(object.members[3].as_array().is_some());

    let back = ser.to_native_typed::<Customer>(&wire).unwrap();
    assert_eq!(back, customer);
}

#[test]
fn test_member_order_matches_layout_order() {
    let ser = engine();
    let customer = Customer {
        name: "grace".into(),
        age: 1,
        ..Customer::default()
    };
    let wire = ser.to_wire_value(&customer).unwrap();
    let object = wire.as_object().unwrap();
    assert_eq!(object.members[0], WireValue::String("grace".into()));
    assert_eq!(object.members[1], WireValue::CompactInt(1));
}

#[test]
fn test_untyped_array_defaults_to_variant_list() {
    let ser = engine();
    let wire = WireValue::Array(WireArray::dense(vec![
        WireValue::CompactInt(1),
        WireValue::String("two".into()),
        WireValue::Boolean(true),
    ]));

    let variant = ser.to_native_typed::<Variant>(&wire).unwrap();
    let list = variant.downcast_ref::<Vec<Variant>>().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].downcast_ref::<i32>(), Some(&1));
    assert_eq!(list[1].downcast_ref::<String>().map(String::as_str), Some("two"));
    assert_eq!(list[2].downcast_ref::<bool>(), Some(&true));
}

#[test]
fn test_mixed_array_defaults_to_mixed_container() {
    let ser = engine();
    let wire = WireValue::Array(WireArray {
        items: vec![WireValue::CompactInt(1), WireValue::CompactInt(2)],
        properties: vec![("length".into(), WireValue::CompactInt(2))],
    });

    let variant = ser.to_native_typed::<Variant>(&wire).unwrap();
    let mixed = variant.downcast_ref::<MixedArray>().unwrap();
    assert_eq!(mixed.items.len(), 2);
    assert_eq!(mixed.properties.len(), 1);
}

#[test]
fn test_mapping_set_registers_aliased_members_only() {
    let table = MappingTable::standard();
    let set = MappingSet::new()
        .with(
            ClassMappingBuilder::<Address>::new()
                .alias("bulk.Address")
                .property("city", |a: &Address| a.city.clone(), |a, v| a.city = v)
                .property("zip", |a: &Address| a.zip, |a, v| a.zip = v)
                .build()
                .unwrap(),
        )
        .with(ClassMappingBuilder::<Empty>::new().build().unwrap());
    table.register_all(set).unwrap();

    assert!(table.class_mapping_by_alias("bulk.Address").is_some());
    // The untyped member was skipped entirely.
    assert!(table
        .class_mapping_by_type(&wiremap_core::NativeType::of::<Empty>())
        .is_none());
}
