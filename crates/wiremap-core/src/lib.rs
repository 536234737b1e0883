//! Wiremap mapping engine
//!
//! This crate converts between the dynamically-typed wire value model
//! ([`wiremap_value`]) and strongly-typed native Rust objects:
//! - Class mapping declarations and the builder that derives them
//! - The mapping table (registries, factories, resolution caches)
//! - Mapper factories for arrays, collections, dictionaries, primitives
//!   and class-backed objects
//! - The serializer facade used for recursive graph conversion

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod catalog;
pub mod descriptor;
pub mod factory;
pub mod mapper;
pub mod mapping;
pub mod native;
pub mod serializer;
pub mod table;

pub use catalog::{
    collection_strategy, enum_ops, Appendable, Associative, CollectionStrategy, EnumOps, MapOps,
    OptionOps, SequenceOps,
};
pub use descriptor::{ContentShape, SourceMappingDescriptor, TargetMappingDescriptor};
pub use factory::MapperFactory;
pub use mapper::Mapper;
pub use mapping::{ClassMapping, ClassMappingBuilder, MappingSet, PropertyMapping};
pub use native::{
    DynamicProperties, Externalizable, MixedArray, NativeType, Undefined, Unsupported, Variant,
    XmlDocument,
};
pub use serializer::Serializer;
pub use table::{MappingTable, MappingView};

use wiremap_value::WireKind;

/// Compact-integer lower bound (29-bit signed range).
pub const COMPACT_INT_MIN: i64 = -(1 << 28);
/// Compact-integer upper bound (29-bit signed range).
pub const COMPACT_INT_MAX: i64 = (1 << 28) - 1;

/// Mapping errors
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// No mapper supports this wire kind for this target type.
    #[error("mapping from wire kind {kind} to type {target} is not supported")]
    UnsupportedSource {
        /// Kind of the incoming wire value.
        kind: WireKind,
        /// Display name of the requested native type.
        target: String,
    },

    /// No mapper supports producing a wire value from this native type.
    #[error("mapping to a wire value is not supported for type {0}")]
    UnsupportedTarget(String),

    /// The native type is already present in the registry.
    #[error("native type {0} is already registered")]
    DuplicateType(String),

    /// The class alias is already present in the registry.
    #[error("class alias `{0}` is already registered")]
    DuplicateAlias(String),

    /// A class mapping declaration is contradictory.
    #[error("invalid class mapping for {type_name}: {message}")]
    Declaration {
        /// Native type being declared.
        type_name: String,
        /// What was contradictory.
        message: String,
    },

    /// A 64-bit value is not exactly representable as a double.
    #[error("value {0} cannot be encoded as a double without precision loss")]
    PrecisionLoss(i128),

    /// A wire value's shape does not fit the target.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Getting or setting a native member or dynamic property failed.
    #[error("failed to access `{property}` on {type_name}: {message}")]
    PropertyAccess {
        /// Owning native type.
        type_name: String,
        /// Member or dynamic property name.
        property: String,
        /// Underlying failure.
        message: String,
    },

    /// A value-level conversion failed (range, parse, malformed content).
    #[error("conversion failed: {0}")]
    Conversion(String),
}

/// Mapping result
pub type MappingResult<T> = Result<T, MappingError>;
