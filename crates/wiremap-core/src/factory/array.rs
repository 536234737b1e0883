//! Array factory: dense `Vec<T>` sequences
//!
//! `Vec<u8>` is special-cased to the ByteArray wire kind in both
//! directions. Every other registered `Vec<T>` uses the generic Array wire
//! kind, converting each indexed value through the serializer.

use crate::catalog::SequenceOps;
use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::native::{downcast_ref, NativeType};
use crate::serializer::Serializer;
use crate::table::MappingView;
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::sync::Arc;
use wiremap_value::{WireArray, WireValue};

/// Factory for dense sequence types.
pub struct ArrayMapperFactory;

impl MapperFactory for ArrayMapperFactory {
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        if descriptor.target.is::<Vec<u8>>() {
            return Ok(Some(Arc::new(ByteArrayMapper)));
        }
        Ok(view
            .catalog()
            .sequence(&descriptor.target)
            .map(|ops| Arc::new(ArrayMapper { ops: Arc::clone(ops) }) as Arc<dyn Mapper>))
    }

    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        if descriptor.source.is::<Vec<u8>>() {
            return Ok(Some(Arc::new(ByteArrayMapper)));
        }
        Ok(view
            .catalog()
            .sequence(&descriptor.source)
            .map(|ops| Arc::new(ArrayMapper { ops: Arc::clone(ops) }) as Arc<dyn Mapper>))
    }
}

/// `Vec<u8>` ↔ ByteArray.
struct ByteArrayMapper;

impl Mapper for ByteArrayMapper {
    fn to_wire(&self, _ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let bytes = downcast_ref::<Vec<u8>>(value, "byte array source")?;
        Ok(WireValue::ByteArray(bytes.clone()))
    }

    fn from_byte_array(
        &self,
        _ser: &Serializer,
        value: &[u8],
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        Ok(Box::new(value.to_vec()))
    }
}

/// `Vec<T>` ↔ Array, element by element.
struct ArrayMapper {
    ops: Arc<SequenceOps>,
}

impl Mapper for ArrayMapper {
    fn to_wire(&self, ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let mut items = Vec::with_capacity(self.ops.count(value)?);
        self.ops.visit(value, &mut |item| {
            items.push(ser.to_wire_value(item)?);
            Ok(())
        })?;
        Ok(WireValue::Array(WireArray::dense(items)))
    }

    fn from_array(
        &self,
        ser: &Serializer,
        value: &WireArray,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        // Dense sequences have no home for named properties.
        if value.has_properties() {
            return Err(MappingError::ShapeMismatch(format!(
                "wire array with named properties cannot be mapped onto dense sequence {}",
                self.ops.collection().name()
            )));
        }
        let mut sequence = self.ops.make(value.items.len());
        for item in &value.items {
            let element = ser.to_native(item, self.ops.element())?;
            self.ops.push(&mut *sequence, element)?;
        }
        Ok(sequence)
    }
}
