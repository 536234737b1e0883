//! Native-side value and type representation
//!
//! The engine addresses native Rust types through [`NativeType`] — a small,
//! equality-comparable descriptor — and moves instances around as
//! `Box<dyn Any>`. Under-specified conversions produce [`Variant`], the
//! opaque dynamic value. The capability traits here are the explicit
//! replacements for the original's marker interfaces.

use crate::{MappingError, MappingResult};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;

/// Descriptor of one native Rust type.
///
/// Compares and hashes by `TypeId` only; the name is carried for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct NativeType {
    id: TypeId,
    name: &'static str,
}

impl NativeType {
    /// Descriptor for a statically-known type.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Descriptor from a runtime `TypeId` and a display name.
    pub fn from_raw(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this descriptor refers to `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NativeType {}

impl std::hash::Hash for NativeType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Opaque dynamic native value.
///
/// Produced when conversion has no concrete target type; the serializer
/// picks the default native type for the wire value and boxes the result.
pub enum Variant {
    /// Wire null with no typed home.
    Null,
    /// Any boxed native value.
    Value(Box<dyn Any>),
}

impl Variant {
    /// Box a concrete value.
    pub fn new<T: Any>(value: T) -> Self {
        Variant::Value(Box::new(value))
    }

    /// Whether this is the null variant.
    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    /// Borrow the contained value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Variant::Null => None,
            Variant::Value(v) => v.downcast_ref::<T>(),
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Null => write!(f, "Variant::Null"),
            Variant::Value(_) => write!(f, "Variant::Value(..)"),
        }
    }
}

/// Sentinel for the wire `undefined` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Undefined;

/// Sentinel for the wire `unsupported` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unsupported;

/// A well-formed XML document held as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument(String);

impl XmlDocument {
    /// Parse-check the text and wrap it.
    pub fn new(text: impl Into<String>) -> MappingResult<Self> {
        let text = text.into();
        let mut reader = quick_xml::Reader::from_str(&text);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(MappingError::Conversion(format!(
                        "malformed xml document: {e}"
                    )))
                }
            }
        }
        Ok(Self(text))
    }

    /// The document text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Container for wire arrays carrying both indexed values and named
/// properties.
///
/// Insertion by string key routes decimal keys matching the next dense
/// position into `items`; everything else lands in `properties`.
#[derive(Debug, Default)]
pub struct MixedArray {
    /// Dense indexed values.
    pub items: Vec<Variant>,
    /// Named values.
    pub properties: FxHashMap<String, Variant>,
}

impl MixedArray {
    /// An empty mixed array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entry count across both sides.
    pub fn len(&self) -> usize {
        self.items.len() + self.properties.len()
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.properties.is_empty()
    }

    /// Insert by string key, routing dense positions into `items`.
    pub fn insert(&mut self, key: String, value: Variant) {
        match key.parse::<usize>() {
            Ok(index) if index == self.items.len() => self.items.push(value),
            _ => {
                self.properties.insert(key, value);
            }
        }
    }
}

/// Capability: open-ended named properties on a native instance.
///
/// The analog of the original's dynamic-object marker interface. Values
/// cross the boundary as [`Variant`]s.
pub trait DynamicProperties {
    /// Names of the currently-set dynamic properties, in a stable order.
    fn property_names(&self) -> Vec<String>;

    /// Read one dynamic property.
    fn get_property(&self, name: &str) -> MappingResult<Option<Variant>>;

    /// Write one dynamic property.
    fn set_property(&mut self, name: &str, value: Variant) -> MappingResult<()>;
}

/// Capability: the type writes and reads its own opaque wire payload.
pub trait Externalizable {
    /// Produce the opaque payload.
    fn write_external(&self) -> MappingResult<Vec<u8>>;

    /// Restore state from the opaque payload.
    fn read_external(&mut self, data: &[u8]) -> MappingResult<()>;
}

/// Borrow a `dyn Any` as `T`, with a diagnostic context on failure.
pub(crate) fn downcast_ref<'a, T: Any>(value: &'a dyn Any, context: &str) -> MappingResult<&'a T> {
    value.downcast_ref::<T>().ok_or_else(|| {
        MappingError::Conversion(format!(
            "{context}: expected {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Borrow a `dyn Any` mutably as `T`, with a diagnostic context on failure.
pub(crate) fn downcast_mut<'a, T: Any>(value: &'a mut dyn Any, context: &str) -> MappingResult<&'a mut T> {
    value.downcast_mut::<T>().ok_or_else(|| {
        MappingError::Conversion(format!(
            "{context}: expected {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Unbox a `Box<dyn Any>` as `T`, with a diagnostic context on failure.
pub(crate) fn downcast_boxed<T: Any>(value: Box<dyn Any>, context: &str) -> MappingResult<T> {
    value.downcast::<T>().map(|b| *b).map_err(|_| {
        MappingError::Conversion(format!(
            "{context}: expected {}",
            std::any::type_name::<T>()
        ))
    })
}
