//! Mapper factories
//!
//! A factory is a pluggable strategy the mapping table consults in
//! registration order: given a resolution descriptor and a locked read view
//! of the table, it either produces a capable mapper or declines with
//! `None`, letting the next factory try.

use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::mapper::Mapper;
use crate::table::MappingView;
use crate::MappingResult;
use std::sync::Arc;

pub mod array;
pub mod collection;
pub mod dictionary;
pub mod object;
pub mod primitive;

pub use array::ArrayMapperFactory;
pub use collection::GenericCollectionFactory;
pub use dictionary::GenericDictionaryFactory;
pub use object::ObjectMapperFactory;
pub use primitive::PrimitiveMapperFactory;

/// A strategy that produces a [`Mapper`] on demand for a descriptor, or
/// declines.
pub trait MapperFactory: Send + Sync {
    /// Offer a wire→native mapper for the descriptor, or decline.
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>>;

    /// Offer a native→wire mapper for the descriptor, or decline.
    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>>;
}
