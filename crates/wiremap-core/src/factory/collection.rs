//! Generic collection factory: appendable homogeneous collections
//!
//! Covers collections other than `Vec` and the associative containers.
//! Instances come from the registered strategy chain; the first strategy
//! declaring the requested collection type wins.

use crate::catalog::SequenceOps;
use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::native::NativeType;
use crate::serializer::Serializer;
use crate::table::MappingView;
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::sync::Arc;
use wiremap_value::{WireArray, WireValue};

/// Factory for appendable homogeneous collections.
pub struct GenericCollectionFactory;

impl MapperFactory for GenericCollectionFactory {
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(view
            .catalog()
            .strategy(&descriptor.target)
            .map(|strategy| Arc::new(CollectionMapper { ops: strategy.ops() }) as Arc<dyn Mapper>))
    }

    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(view
            .catalog()
            .strategy(&descriptor.source)
            .map(|strategy| Arc::new(CollectionMapper { ops: strategy.ops() }) as Arc<dyn Mapper>))
    }
}

struct CollectionMapper {
    ops: Arc<SequenceOps>,
}

impl Mapper for CollectionMapper {
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
        if value.has_properties() {
            return Err(MappingError::ShapeMismatch(format!(
                "wire array with named properties cannot be mapped onto collection {}",
                self.ops.collection().name()
            )));
        }
        let mut collection = self.ops.make(value.items.len());
        for item in &value.items {
            let element = ser.to_native(item, self.ops.element())?;
            self.ops.push(&mut *collection, element)?;
        }
        Ok(collection)
    }

    fn from_byte_array(
        &self,
        ser: &Serializer,
        value: &[u8],
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        let mut collection = self.ops.make(value.len());
        if self.ops.element().is::<u8>() {
            for byte in value {
                self.ops.push(&mut *collection, Box::new(*byte))?;
            }
        } else {
            // Convert each byte individually into the element type.
            for byte in value {
                let element =
                    ser.to_native(&WireValue::CompactInt(*byte as i32), self.ops.element())?;
                self.ops.push(&mut *collection, element)?;
            }
        }
        Ok(collection)
    }
}
