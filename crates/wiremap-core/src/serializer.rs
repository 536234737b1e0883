//! Serializer facade
//!
//! The recursive entry points every mapper uses to convert nested
//! elements and members. The facade resolves mappers through the mapping
//! table per value, so call-stack depth equals graph depth; no lock is
//! held while a mapper runs.

use crate::descriptor::{ContentShape, SourceMappingDescriptor, TargetMappingDescriptor};
use crate::native::{downcast_boxed, NativeType, Variant};
use crate::table::MappingTable;
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::sync::Arc;
use wiremap_value::WireValue;

/// Recursive conversion facade over a shared [`MappingTable`].
pub struct Serializer {
    table: Arc<MappingTable>,
}

impl Serializer {
    /// A facade over the given table.
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self { table }
    }

    /// The underlying table.
    pub fn table(&self) -> &Arc<MappingTable> {
        &self.table
    }

    /// Describe a runtime value's native type.
    pub fn describe(&self, value: &dyn Any) -> NativeType {
        self.table.describe(value)
    }

    /// Convert a native value into a wire value.
    ///
    /// [`Variant`] sources are unwrapped first: `Variant::Null` becomes
    /// wire null, boxed variants convert as their contained type.
    pub fn to_wire_value(&self, value: &dyn Any) -> MappingResult<WireValue> {
        if let Some(variant) = value.downcast_ref::<Variant>() {
            return match variant {
                Variant::Null => Ok(WireValue::Null),
                Variant::Value(inner) => self.to_wire_value(&**inner),
            };
        }

        let descriptor = TargetMappingDescriptor::new(self.describe(value));
        match self.table.target_mapper(&descriptor)? {
            Some(mapper) => mapper.to_wire(self, value),
            None => Err(MappingError::UnsupportedTarget(
                descriptor.source.name().to_owned(),
            )),
        }
    }

    /// Convert a wire value into a native value of the target type.
    ///
    /// A [`Variant`] target resolves through the table's default-native-type
    /// rule for the value's kind and wraps the result.
    pub fn to_native(&self, value: &WireValue, target: &NativeType) -> MappingResult<Box<dyn Any>> {
        if target.is::<Variant>() {
            return Ok(Box::new(self.to_variant(value)?) as Box<dyn Any>);
        }

        let descriptor = SourceMappingDescriptor::for_value(value, target.clone());
        match self.table.source_mapper(&descriptor)? {
            Some(mapper) => mapper.to_native(self, value, target),
            None => Err(MappingError::UnsupportedSource {
                kind: value.kind(),
                target: target.name().to_owned(),
            }),
        }
    }

    /// Convert a wire value into a concrete `T`.
    pub fn to_native_typed<T: Any>(&self, value: &WireValue) -> MappingResult<T> {
        let boxed = self.to_native(value, &NativeType::of::<T>())?;
        downcast_boxed::<T>(boxed, "conversion result")
    }

    fn to_variant(&self, value: &WireValue) -> MappingResult<Variant> {
        let alias = match value {
            WireValue::Object(object) => object.layout.alias(),
            _ => "",
        };
        let default =
            self.table
                .default_native_type(value.kind(), alias, ContentShape::of(value));
        if default.is::<Variant>() {
            // Only wire null defaults to the opaque null.
            return Ok(Variant::Null);
        }
        Ok(Variant::Value(self.to_native(value, &default)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_to_variant() {
        let ser = Serializer::new(MappingTable::standard());
        let variant = ser.to_native_typed::<Variant>(&WireValue::Null).unwrap();
        assert!(variant.is_null());
    }

    #[test]
    fn test_variant_source_unwraps() {
        let ser = Serializer::new(MappingTable::standard());
        let wire = ser.to_wire_value(&Variant::new(5_i32)).unwrap();
        assert_eq!(wire, WireValue::CompactInt(5));

        let wire = ser.to_wire_value(&Variant::Null).unwrap();
        assert_eq!(wire, WireValue::Null);
    }

    #[test]
    fn test_unregistered_target_is_reported() {
        struct Opaque;
        let ser = Serializer::new(MappingTable::standard());
        let err = ser.to_wire_value(&Opaque).unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedTarget(_)));
    }
}
