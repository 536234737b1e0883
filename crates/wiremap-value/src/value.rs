//! The wire value tagged union
//!
//! [`WireValue`] is the in-memory tree the engine converts to and from
//! native objects. Container nodes own their children; nothing here is
//! shared or lazily decoded.

use crate::kind::WireKind;
use crate::layout::ClassLayout;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while constructing wire values.
#[derive(Debug, Error)]
pub enum ValueError {
    /// An object node's member values did not match its layout.
    #[error("object for `{alias}` carries {got} member values but its layout declares {declared}")]
    MemberCountMismatch {
        /// Alias of the offending layout.
        alias: String,
        /// Members declared by the layout.
        declared: usize,
        /// Member values supplied.
        got: usize,
    },
}

/// Instant as milliseconds since the Unix epoch plus a timezone offset.
///
/// The millisecond field is a double, matching the wire encoding; the
/// offset is carried for fidelity but the instant itself is epoch-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireDate {
    /// Milliseconds since 1970-01-01T00:00:00Z.
    pub epoch_millis: f64,
    /// Timezone offset in minutes east of UTC.
    pub tz_offset_minutes: i16,
}

impl WireDate {
    /// Create a UTC date from epoch milliseconds.
    pub fn from_epoch_millis(epoch_millis: f64) -> Self {
        Self {
            epoch_millis,
            tz_offset_minutes: 0,
        }
    }
}

/// An array node: indexed values plus named/dynamic properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireArray {
    /// Indexed values, dense from position zero.
    pub items: Vec<WireValue>,
    /// Named properties in the order they appeared on the wire.
    pub properties: Vec<(String, WireValue)>,
}

impl WireArray {
    /// An array with indexed values only.
    pub fn dense(items: Vec<WireValue>) -> Self {
        Self {
            items,
            properties: Vec::new(),
        }
    }

    /// Whether the node carries named properties.
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }
}

/// A class-backed object node.
#[derive(Debug, Clone, PartialEq)]
pub struct WireObject {
    /// The shape of this object.
    pub layout: Arc<ClassLayout>,
    /// Member values, positionally matching `layout.members()`.
    pub members: Vec<WireValue>,
    /// Named/dynamic properties in wire order.
    pub properties: Vec<(String, WireValue)>,
    /// Opaque payload for externalizable layouts.
    pub external: Option<Vec<u8>>,
}

impl WireObject {
    /// Create an object node, enforcing the member-count invariant.
    pub fn new(layout: Arc<ClassLayout>, members: Vec<WireValue>) -> Result<Self, ValueError> {
        if members.len() != layout.member_count() {
            return Err(ValueError::MemberCountMismatch {
                alias: layout.alias().to_owned(),
                declared: layout.member_count(),
                got: members.len(),
            });
        }
        Ok(Self {
            layout,
            members,
            properties: Vec::new(),
            external: None,
        })
    }

    /// Attach named properties, preserving order.
    pub fn with_properties(mut self, properties: Vec<(String, WireValue)>) -> Self {
        self.properties = properties;
        self
    }

    /// Attach an externalizable payload.
    pub fn with_external(mut self, payload: Vec<u8>) -> Self {
        self.external = Some(payload);
        self
    }

    /// Whether the node carries named properties.
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Ordered (member name, value) pairs.
    pub fn named_members(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.layout
            .members()
            .iter()
            .map(String::as_str)
            .zip(self.members.iter())
    }
}

/// One decoded wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Explicit null
    Null,
    /// Undefined
    Undefined,
    /// A value the peer could not represent
    Unsupported,
    /// Boolean
    Boolean(bool),
    /// Compact integer
    CompactInt(i32),
    /// Double-precision number
    Number(f64),
    /// UTF-8 string
    String(String),
    /// Date
    Date(WireDate),
    /// Raw bytes
    ByteArray(Vec<u8>),
    /// Array node
    Array(WireArray),
    /// Class-backed object node
    Object(Box<WireObject>),
    /// XML document text
    Xml(String),
}

impl WireValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> WireKind {
        match self {
            WireValue::Null => WireKind::Null,
            WireValue::Undefined => WireKind::Undefined,
            WireValue::Unsupported => WireKind::Unsupported,
            WireValue::Boolean(_) => WireKind::Boolean,
            WireValue::CompactInt(_) => WireKind::CompactInt,
            WireValue::Number(_) => WireKind::Number,
            WireValue::String(_) => WireKind::String,
            WireValue::Date(_) => WireKind::Date,
            WireValue::ByteArray(_) => WireKind::ByteArray,
            WireValue::Array(_) => WireKind::Array,
            WireValue::Object(_) => WireKind::Object,
            WireValue::Xml(_) => WireKind::Xml,
        }
    }

    /// Wrap an object node.
    pub fn object(object: WireObject) -> Self {
        WireValue::Object(Box::new(object))
    }

    /// Extract a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a compact integer.
    pub fn as_compact_int(&self) -> Option<i32> {
        match self {
            WireValue::CompactInt(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            WireValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract an array node.
    pub fn as_array(&self) -> Option<&WireArray> {
        match self {
            WireValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Extract an object node.
    pub fn as_object(&self) -> Option<&WireObject> {
        match self {
            WireValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Null => write!(f, "null"),
            WireValue::Undefined => write!(f, "undefined"),
            WireValue::Unsupported => write!(f, "unsupported"),
            WireValue::Boolean(b) => write!(f, "{}", b),
            WireValue::CompactInt(i) => write!(f, "{}", i),
            WireValue::Number(n) => write!(f, "{}", n),
            WireValue::String(s) => write!(f, "\"{}\"", s),
            WireValue::Date(d) => write!(f, "date({})", d.epoch_millis),
            WireValue::ByteArray(b) => write!(f, "bytes[{}]", b.len()),
            WireValue::Array(a) => {
                write!(f, "[{} items", a.items.len())?;
                if a.has_properties() {
                    write!(f, ", {} properties", a.properties.len())?;
                }
                write!(f, "]")
            }
            WireValue::Object(o) => write!(f, "object<{}>", o.layout.alias()),
            WireValue::Xml(_) => write!(f, "xml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKind;

    #[test]
    fn test_kind_tags() {
        assert_eq!(WireValue::Null.kind(), WireKind::Null);
        assert_eq!(WireValue::CompactInt(3).kind(), WireKind::CompactInt);
        assert_eq!(
            WireValue::Array(WireArray::dense(vec![])).kind(),
            WireKind::Array
        );
    }

    #[test]
    fn test_object_member_count_invariant() {
        let layout = ClassLayout::shared(
            "test.Pair",
            LayoutKind::Normal,
            vec!["a".into(), "b".into()],
        );
        let ok = WireObject::new(
            Arc::clone(&layout),
            vec![WireValue::CompactInt(1), WireValue::CompactInt(2)],
        );
        assert!(ok.is_ok());

        let err = WireObject::new(layout, vec![WireValue::CompactInt(1)]);
        assert!(matches!(
            err,
            Err(ValueError::MemberCountMismatch {
                declared: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_named_members_zip_layout_order() {
        let layout = ClassLayout::shared(
            "test.Pair2",
            LayoutKind::Normal,
            vec!["a".into(), "b".into()],
        );
        let object = WireObject::new(
            layout,
            vec![WireValue::CompactInt(1), WireValue::CompactInt(2)],
        )
        .unwrap();
        let names: Vec<&str> = object.named_members().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(WireValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(WireValue::Number(1.5).as_number(), Some(1.5));
        assert_eq!(WireValue::String("hi".into()).as_str(), Some("hi"));
        assert_eq!(WireValue::Null.as_bool(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", WireValue::Null), "null");
        assert_eq!(format!("{}", WireValue::CompactInt(7)), "7");
        assert_eq!(format!("{}", WireValue::ByteArray(vec![1, 2])), "bytes[2]");
    }
}
