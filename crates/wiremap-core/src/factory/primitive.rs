//! Primitive factory: fixed table of single-purpose converters
//!
//! One converter per scalar type, matched by exact target type only —
//! under-specified targets are deliberately left to
//! `MappingTable::default_native_type`. Enumerations and `Option<T>`
//! targets resolve through their catalog entries.
//!
//! Integer and enum encoding picks the compact form when the value fits
//! the 29-bit range, otherwise a double; a 64-bit value that a double
//! cannot represent exactly is a precision-loss error, never a silent
//! truncation.

use crate::catalog::{EnumOps, OptionOps};
use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::native::{downcast_ref, NativeType, Undefined, Unsupported, XmlDocument};
use crate::serializer::Serializer;
use crate::table::MappingView;
use crate::{MappingError, MappingResult, COMPACT_INT_MAX, COMPACT_INT_MIN};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::any::{Any, TypeId};
use std::sync::Arc;
use wiremap_value::{WireDate, WireValue};

/// Factory for scalar targets, enumerations and optionals.
pub struct PrimitiveMapperFactory;

impl MapperFactory for PrimitiveMapperFactory {
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(resolve(view, &descriptor.target))
    }

    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(resolve(view, &descriptor.source))
    }
}

fn resolve(view: &MappingView<'_>, native: &NativeType) -> Option<Arc<dyn Mapper>> {
    if let Some((_, mapper)) = CONVERTERS.iter().find(|(id, _)| *id == native.id()) {
        return Some(Arc::clone(mapper));
    }
    if let Some(ops) = view.catalog().enumeration(native) {
        return Some(Arc::new(EnumMapper {
            ops: Arc::clone(ops),
        }));
    }
    if let Some(ops) = view.catalog().option(native) {
        return Some(Arc::new(OptionalMapper {
            ops: Arc::clone(ops),
        }));
    }
    None
}

/// The fixed converter table, ordered by the kinds it serves.
static CONVERTERS: Lazy<Vec<(TypeId, Arc<dyn Mapper>)>> = Lazy::new(|| {
    vec![
        (TypeId::of::<bool>(), Arc::new(BoolMapper) as Arc<dyn Mapper>),
        (TypeId::of::<u8>(), Arc::new(U8Mapper)),
        (TypeId::of::<char>(), Arc::new(CharMapper)),
        (TypeId::of::<DateTime<Utc>>(), Arc::new(DateTimeMapper)),
        (TypeId::of::<Decimal>(), Arc::new(DecimalMapper)),
        (TypeId::of::<f64>(), Arc::new(DoubleMapper)),
        (TypeId::of::<i16>(), Arc::new(I16Mapper)),
        (TypeId::of::<i32>(), Arc::new(I32Mapper)),
        (TypeId::of::<i64>(), Arc::new(I64Mapper)),
        (TypeId::of::<i8>(), Arc::new(I8Mapper)),
        (TypeId::of::<f32>(), Arc::new(SingleMapper)),
        (TypeId::of::<String>(), Arc::new(StringMapper)),
        (TypeId::of::<u16>(), Arc::new(U16Mapper)),
        (TypeId::of::<u32>(), Arc::new(U32Mapper)),
        (TypeId::of::<u64>(), Arc::new(U64Mapper)),
        (TypeId::of::<Undefined>(), Arc::new(UndefinedMapper)),
        (TypeId::of::<Unsupported>(), Arc::new(UnsupportedMapper)),
        (TypeId::of::<XmlDocument>(), Arc::new(XmlMapper)),
    ]
});

/// Compact form when the value fits the 29-bit range, else a double with
/// an exactness check.
fn encode_integer(value: i128) -> MappingResult<WireValue> {
    if value >= COMPACT_INT_MIN as i128 && value <= COMPACT_INT_MAX as i128 {
        return Ok(WireValue::CompactInt(value as i32));
    }
    let double = value as f64;
    if double as i128 != value {
        return Err(MappingError::PrecisionLoss(value));
    }
    Ok(WireValue::Number(double))
}

fn integral(value: f64) -> MappingResult<i128> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(MappingError::Conversion(format!(
            "{value} is not an integral number"
        )));
    }
    Ok(value as i128)
}

fn out_of_range(value: i128, target: &NativeType) -> MappingError {
    MappingError::Conversion(format!("{value} is out of range for {}", target.name()))
}

macro_rules! integer_mapper {
    ($name:ident, $ty:ty) => {
        struct $name;

        impl Mapper for $name {
            fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
                let value = *downcast_ref::<$ty>(value, stringify!($ty))?;
                encode_integer(value as i128)
            }

            fn from_compact_int(
                &self,
                _ser: &Serializer,
                value: i32,
                target: &NativeType,
            ) -> MappingResult<Box<dyn Any>> {
                <$ty>::try_from(value)
                    .map(|v| Box::new(v) as Box<dyn Any>)
                    .map_err(|_| out_of_range(value as i128, target))
            }

            fn from_number(
                &self,
                _ser: &Serializer,
                value: f64,
                target: &NativeType,
            ) -> MappingResult<Box<dyn Any>> {
                let value = integral(value)?;
                <$ty>::try_from(value)
                    .map(|v| Box::new(v) as Box<dyn Any>)
                    .map_err(|_| out_of_range(value, target))
            }
        }
    };
}

integer_mapper!(I8Mapper, i8);
integer_mapper!(I16Mapper, i16);
integer_mapper!(I32Mapper, i32);
integer_mapper!(I64Mapper, i64);
integer_mapper!(U8Mapper, u8);
integer_mapper!(U16Mapper, u16);
integer_mapper!(U32Mapper, u32);
integer_mapper!(U64Mapper, u64);

struct BoolMapper;

impl Mapper for BoolMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Ok(WireValue::Boolean(*downcast_ref::<bool>(value, "bool")?))
    }

    fn from_boolean(
        &self,
        _ser: &Serializer,
        value: bool,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value))
    }
}

struct DoubleMapper;

impl Mapper for DoubleMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Ok(WireValue::Number(*downcast_ref::<f64>(value, "f64")?))
    }

    fn from_number(
        &self,
        _ser: &Serializer,
        value: f64,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value))
    }

    fn from_compact_int(
        &self,
        _ser: &Serializer,
        value: i32,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(f64::from(value)))
    }
}

struct SingleMapper;

impl Mapper for SingleMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Ok(WireValue::Number(f64::from(*downcast_ref::<f32>(
            value, "f32",
        )?)))
    }

    fn from_number(
        &self,
        _ser: &Serializer,
        value: f64,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value as f32))
    }

    fn from_compact_int(
        &self,
        _ser: &Serializer,
        value: i32,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value as f32))
    }
}

struct StringMapper;

impl Mapper for StringMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Ok(WireValue::String(
            downcast_ref::<String>(value, "String")?.clone(),
        ))
    }

    fn from_string(
        &self,
        _ser: &Serializer,
        value: &str,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value.to_owned()))
    }
}

struct CharMapper;

impl Mapper for CharMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        Ok(WireValue::String(
            downcast_ref::<char>(value, "char")?.to_string(),
        ))
    }

    fn from_string(
        &self,
        _ser: &Serializer,
        value: &str,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Box::new(c)),
            _ => Err(MappingError::Conversion(format!(
                "string of length {} does not fit a char",
                value.chars().count()
            ))),
        }
    }
}

struct DateTimeMapper;

impl Mapper for DateTimeMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let instant = downcast_ref::<DateTime<Utc>>(value, "DateTime<Utc>")?;
        Ok(WireValue::Date(WireDate::from_epoch_millis(
            instant.timestamp_millis() as f64,
        )))
    }

    fn from_date(
        &self,
        _ser: &Serializer,
        value: &WireDate,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        if !value.epoch_millis.is_finite() {
            return Err(MappingError::Conversion(
                "date milliseconds are not finite".into(),
            ));
        }
        let millis = value.epoch_millis as i64;
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|instant| Box::new(instant) as Box<dyn Any>)
            .ok_or_else(|| {
                MappingError::Conversion(format!("timestamp {millis}ms is out of range"))
            })
    }
}

struct DecimalMapper;

impl Mapper for DecimalMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let decimal = downcast_ref::<Decimal>(value, "Decimal")?;
        decimal
            .to_f64()
            .map(WireValue::Number)
            .ok_or_else(|| MappingError::Conversion(format!("{decimal} has no double form")))
    }

    fn from_number(
        &self,
        _ser: &Serializer,
        value: f64,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Decimal::from_f64(value)
            .map(|d| Box::new(d) as Box<dyn Any>)
            .ok_or_else(|| MappingError::Conversion(format!("{value} has no decimal form")))
    }

    fn from_compact_int(
        &self,
        _ser: &Serializer,
        value: i32,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(Decimal::from(value)))
    }

    fn from_string(
        &self,
        _ser: &Serializer,
        value: &str,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        value
            .parse::<Decimal>()
            .map(|d| Box::new(d) as Box<dyn Any>)
            .map_err(|e| MappingError::Conversion(format!("`{value}` is not a decimal: {e}")))
    }
}

struct UndefinedMapper;

impl Mapper for UndefinedMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        downcast_ref::<Undefined>(value, "Undefined")?;
        Ok(WireValue::Undefined)
    }

    fn from_undefined(
        &self,
        _ser: &Serializer,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(Undefined))
    }
}

struct UnsupportedMapper;

impl Mapper for UnsupportedMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        downcast_ref::<Unsupported>(value, "Unsupported")?;
        Ok(WireValue::Unsupported)
    }

    fn from_unsupported(
        &self,
        _ser: &Serializer,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(Unsupported))
    }
}

struct XmlMapper;

impl Mapper for XmlMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let document = downcast_ref::<XmlDocument>(value, "XmlDocument")?;
        Ok(WireValue::Xml(document.as_str().to_owned()))
    }

    fn from_xml(
        &self,
        _ser: &Serializer,
        value: &str,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(XmlDocument::new(value)?))
    }
}

struct EnumMapper {
    ops: Arc<EnumOps>,
}

impl Mapper for EnumMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let repr = self.ops.to_repr(value)?;
        encode_integer(repr as i128)
    }

    fn from_compact_int(
        &self,
        _ser: &Serializer,
        value: i32,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        self.ops.from_repr(i64::from(value))
    }

    fn from_number(
        &self,
        _ser: &Serializer,
        value: f64,
        target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        let value = integral(value)?;
        let repr = i64::try_from(value).map_err(|_| out_of_range(value, target))?;
        self.ops.from_repr(repr)
    }

    fn from_string(
        &self,
        _ser: &Serializer,
        value: &str,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        self.ops.from_name(value)
    }
}

struct OptionalMapper {
    ops: Arc<OptionOps>,
}

impl Mapper for OptionalMapper {
    fn to_wire(&self, ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        match self.ops.inspect(value)? {
            Some(inner) => ser.to_wire_value(inner),
            None => Ok(WireValue::Null),
        }
    }

    fn to_native(
        &self,
        ser: &Serializer,
        value: &WireValue,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        match value {
            WireValue::Null | WireValue::Undefined => Ok(self.ops.none()),
            other => {
                let inner = ser.to_native(other, self.ops.inner())?;
                self.ops.wrap(inner)
            }
        }
    }
}
