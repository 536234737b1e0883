//! Generic dictionary factory: associative containers
//!
//! Source mapping accepts either an Array wire value (indexed entries
//! keyed by position, then named properties) or an Object wire value
//! (ordered members keyed by member name, then named properties), adding
//! entries in the order encountered. Target mapping always emits named
//! properties, never indexed values.

use crate::catalog::MapOps;
use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::native::NativeType;
use crate::serializer::Serializer;
use crate::table::MappingView;
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::sync::Arc;
use wiremap_value::{WireArray, WireObject, WireValue};

/// Factory for associative container types.
pub struct GenericDictionaryFactory;

impl MapperFactory for GenericDictionaryFactory {
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(view
            .catalog()
            .map(&descriptor.target)
            .map(|ops| Arc::new(DictionaryMapper { ops: Arc::clone(ops) }) as Arc<dyn Mapper>))
    }

    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(view
            .catalog()
            .map(&descriptor.source)
            .map(|ops| Arc::new(DictionaryMapper { ops: Arc::clone(ops) }) as Arc<dyn Mapper>))
    }
}

struct DictionaryMapper {
    ops: Arc<MapOps>,
}

impl DictionaryMapper {
    fn insert_named(
        &self,
        ser: &Serializer,
        map: &mut dyn Any,
        name: &str,
        value: &WireValue,
    ) -> MappingResult<()> {
        let key = self.ops.key_from_name(name)?;
        let converted = ser.to_native(value, self.ops.value())?;
        self.ops.insert(map, key, converted)
    }
}

impl Mapper for DictionaryMapper {
    fn to_wire(&self, ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let mut properties = Vec::with_capacity(self.ops.count(value)?);
        self.ops.visit(value, &mut |key, entry| {
            properties.push((key, ser.to_wire_value(entry)?));
            Ok(())
        })?;
        Ok(WireValue::Array(WireArray {
            items: Vec::new(),
            properties,
        }))
    }

    fn from_array(
        &self,
        ser: &Serializer,
        value: &WireArray,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        let mut map = self.ops.make(value.items.len() + value.properties.len());
        for (index, item) in value.items.iter().enumerate() {
            let key = self.ops.key_from_index(index)?;
            let converted = ser.to_native(item, self.ops.value())?;
            self.ops.insert(&mut *map, key, converted)?;
        }
        for (name, item) in &value.properties {
            self.insert_named(ser, &mut *map, name, item)?;
        }
        Ok(map)
    }

    fn from_object(
        &self,
        ser: &Serializer,
        value: &WireObject,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        if value.external.is_some() {
            return Err(MappingError::ShapeMismatch(format!(
                "externalizable object `{}` cannot be mapped into {}",
                value.layout.alias(),
                self.ops.collection().name()
            )));
        }
        let mut map = self.ops.make(value.members.len() + value.properties.len());
        for (name, member) in value.named_members() {
            self.insert_named(ser, &mut *map, name, member)?;
        }
        for (name, property) in &value.properties {
            self.insert_named(ser, &mut *map, name, property)?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Variant;
    use crate::table::MappingTable;
    use rustc_hash::FxHashMap;
    use std::collections::BTreeMap;

    fn serializer() -> Serializer {
        Serializer::new(MappingTable::standard())
    }

    #[test]
    fn test_array_entries_keyed_by_position_then_name() {
        let ser = serializer();
        ser.table()
            .register_map::<BTreeMap<String, i32>, String, i32>();

        let wire = WireValue::Array(WireArray {
            items: vec![WireValue::CompactInt(10), WireValue::CompactInt(20)],
            properties: vec![("total".into(), WireValue::CompactInt(30))],
        });
        let map = ser.to_native_typed::<BTreeMap<String, i32>>(&wire).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["0"], 10);
        assert_eq!(map["1"], 20);
        assert_eq!(map["total"], 30);
    }

    #[test]
    fn test_integer_keyed_map_from_array() {
        let ser = serializer();
        ser.table().register_map::<BTreeMap<i32, i32>, i32, i32>();

        let wire = WireValue::Array(WireArray::dense(vec![
            WireValue::CompactInt(5),
            WireValue::CompactInt(6),
        ]));
        let map = ser.to_native_typed::<BTreeMap<i32, i32>>(&wire).unwrap();
        assert_eq!(map[&0], 5);
        assert_eq!(map[&1], 6);
    }

    #[test]
    fn test_target_mapping_emits_named_properties_only() {
        let ser = serializer();
        ser.table()
            .register_map::<BTreeMap<String, i32>, String, i32>();

        let mut map = BTreeMap::new();
        map.insert("a".to_owned(), 1_i32);
        map.insert("b".to_owned(), 2_i32);

        let wire = ser.to_wire_value(&map).unwrap();
        let array = wire.as_array().unwrap();
        assert!(array.items.is_empty());
        assert_eq!(array.properties.len(), 2);
    }

    #[test]
    fn test_untyped_object_defaults_to_string_map() {
        let ser = serializer();
        let object = WireObject::new(
            wiremap_value::ClassLayout::shared(
                "",
                wiremap_value::LayoutKind::Dynamic,
                Vec::new(),
            ),
            Vec::new(),
        )
        .unwrap()
        .with_properties(vec![("k".into(), WireValue::CompactInt(1))]);

        let variant = ser
            .to_native_typed::<Variant>(&WireValue::object(object))
            .unwrap();
        let map = variant
            .downcast_ref::<FxHashMap<String, Variant>>()
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"].downcast_ref::<i32>(), Some(&1));
    }
}
