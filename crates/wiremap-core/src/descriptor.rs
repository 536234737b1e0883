//! Mapper resolution descriptors
//!
//! Descriptors are the cache keys for mapper resolution: small value types
//! capturing exactly the shape information a factory needs to decide, never
//! mutated after construction.

use crate::native::NativeType;
use wiremap_value::{WireKind, WireValue};

/// Content-shape flags of a container wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentShape {
    /// The node carries indexed values or ordered members.
    pub has_items: bool,
    /// The node carries named/dynamic properties.
    pub has_properties: bool,
}

impl ContentShape {
    /// Derive the shape flags of a wire value.
    pub fn of(value: &WireValue) -> Self {
        match value {
            WireValue::Array(a) => Self {
                has_items: !a.items.is_empty(),
                has_properties: a.has_properties(),
            },
            WireValue::Object(o) => Self {
                has_items: !o.members.is_empty(),
                has_properties: o.has_properties(),
            },
            _ => Self::default(),
        }
    }
}

/// Key for wire→native mapper resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceMappingDescriptor {
    /// Kind of the incoming wire value.
    pub kind: WireKind,
    /// Class alias carried by the value; empty when absent.
    pub alias: String,
    /// Content-shape flags.
    pub shape: ContentShape,
    /// Requested native target type.
    pub target: NativeType,
}

impl SourceMappingDescriptor {
    /// Build the descriptor for converting `value` into `target`.
    pub fn for_value(value: &WireValue, target: NativeType) -> Self {
        let alias = match value {
            WireValue::Object(o) => o.layout.alias().to_owned(),
            _ => String::new(),
        };
        Self {
            kind: value.kind(),
            alias,
            shape: ContentShape::of(value),
            target,
        }
    }
}

/// Key for native→wire mapper resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetMappingDescriptor {
    /// Native type of the source value.
    pub source: NativeType,
}

impl TargetMappingDescriptor {
    /// Build the descriptor for converting from `source`.
    pub fn new(source: NativeType) -> Self {
        Self { source }
    }
}
