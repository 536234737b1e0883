//! Base mapper contract and kind dispatch
//!
//! [`Mapper`] is the bidirectional converter contract. Wire→native
//! conversion is routed by an exhaustive match over the wire value's kind,
//! one arm per kind, each arm calling a per-kind hook. Every hook defaults
//! to an "unsupported" error; concrete mappers override only the hooks
//! their kind-set actually supports.

use crate::native::NativeType;
use crate::serializer::Serializer;
use crate::{MappingError, MappingResult};
use std::any::Any;
use wiremap_value::{WireArray, WireDate, WireKind, WireObject, WireValue};

fn unsupported(kind: WireKind, target: &NativeType) -> MappingError {
    MappingError::UnsupportedSource {
        kind,
        target: target.name().to_owned(),
    }
}

/// A bidirectional converter between one category of wire value and one
/// category of native value.
#[allow(unused_variables)]
pub trait Mapper: Send + Sync {
    /// Convert a native value into a wire value.
    fn to_wire(&self, ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Err(MappingError::UnsupportedTarget(
            ser.describe(value).name().to_owned(),
        ))
    }

    /// Convert a wire value into a native value of the target type.
    ///
    /// The default routes by kind; override the per-kind hooks rather than
    /// this method.
    fn to_native(
        &self,
        ser: &Serializer,
        value: &WireValue,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        match value {
            WireValue::Null => self.from_null(ser, target),
            WireValue::Undefined => self.from_undefined(ser, target),
            WireValue::Unsupported => self.from_unsupported(ser, target),
            WireValue::Boolean(b) => self.from_boolean(ser, *b, target),
            WireValue::CompactInt(i) => self.from_compact_int(ser, *i, target),
            WireValue::Number(n) => self.from_number(ser, *n, target),
            WireValue::String(s) => self.from_string(ser, s, target),
            WireValue::Date(d) => self.from_date(ser, d, target),
            WireValue::ByteArray(b) => self.from_byte_array(ser, b, target),
            WireValue::Array(a) => self.from_array(ser, a, target),
            WireValue::Object(o) => self.from_object(ser, o, target),
            WireValue::Xml(x) => self.from_xml(ser, x, target),
        }
    }

    /// Hook for wire null.
    fn from_null(&self, ser: &Serializer, target: &NativeType) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Null, target))
    }

    /// Hook for wire undefined.
    fn from_undefined(&self, ser: &Serializer, target: &NativeType) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Undefined, target))
    }

    /// Hook for wire unsupported.
    fn from_unsupported(
        &self,
        ser: &Serializer,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Unsupported, target))
    }

    /// Hook for wire booleans.
    fn from_boolean(
        &self,
        ser: &Serializer,
        value: bool,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Boolean, target))
    }

    /// Hook for wire compact integers.
    fn from_compact_int(
        &self,
        ser: &Serializer,
        value: i32,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::CompactInt, target))
    }

    /// Hook for wire numbers.
    fn from_number(
        &self,
        ser: &Serializer,
        value: f64,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Number, target))
    }

    /// Hook for wire strings.
    fn from_string(
        &self,
        ser: &Serializer,
        value: &str,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::String, target))
    }

    /// Hook for wire dates.
    fn from_date(
        &self,
        ser: &Serializer,
        value: &WireDate,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Date, target))
    }

    /// Hook for wire byte arrays.
    fn from_byte_array(
        &self,
        ser: &Serializer,
        value: &[u8],
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::ByteArray, target))
    }

    /// Hook for wire arrays.
    fn from_array(
        &self,
        ser: &Serializer,
        value: &WireArray,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Array, target))
    }

    /// Hook for wire objects.
    fn from_object(
        &self,
        ser: &Serializer,
        value: &WireObject,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Object, target))
    }

    /// Hook for wire XML.
    fn from_xml(
        &self,
        ser: &Serializer,
        value: &str,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Err(unsupported(WireKind::Xml, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MappingTable;
    use std::sync::Arc;

    struct OnlyBooleans;

    impl Mapper for OnlyBooleans {
        fn from_boolean(
            &self,
            _ser: &Serializer,
            value: bool,
            _target: &NativeType,
        ) -> MappingResult<Box<dyn Any>> {
            Ok(Box::new(value))
        }
    }

    #[test]
    fn test_dispatch_routes_to_overridden_hook() {
        let ser = Serializer::new(Arc::new(MappingTable::new()));
        let mapper = OnlyBooleans;
        let out = mapper
            .to_native(&ser, &WireValue::Boolean(true), &NativeType::of::<bool>())
            .unwrap();
        assert_eq!(*out.downcast_ref::<bool>().unwrap(), true);
    }

    #[test]
    fn test_unoverridden_hook_reports_kind_and_target() {
        let ser = Serializer::new(Arc::new(MappingTable::new()));
        let mapper = OnlyBooleans;
        let err = mapper
            .to_native(&ser, &WireValue::Number(1.0), &NativeType::of::<bool>())
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("number"));
        assert!(text.contains("bool"));
    }
}
