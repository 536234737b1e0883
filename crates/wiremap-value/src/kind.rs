//! The closed enumeration of wire value kinds

use std::fmt;

/// Kind tag for a [`WireValue`](crate::WireValue).
///
/// The enumeration is closed: every value the decoding layer can hand the
/// engine falls into exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// Explicit null
    Null,
    /// Undefined (distinct from null on the wire)
    Undefined,
    /// A value the peer could not represent
    Unsupported,
    /// Boolean
    Boolean,
    /// Compact (29-bit range) integer
    CompactInt,
    /// Double-precision number
    Number,
    /// UTF-8 string
    String,
    /// Instant as milliseconds since the epoch plus a timezone offset
    Date,
    /// Raw byte buffer
    ByteArray,
    /// Sequence with indexed values and optional named properties
    Array,
    /// Class-backed object
    Object,
    /// XML document text
    Xml,
}

impl WireKind {
    /// Stable lowercase name, used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            WireKind::Null => "null",
            WireKind::Undefined => "undefined",
            WireKind::Unsupported => "unsupported",
            WireKind::Boolean => "boolean",
            WireKind::CompactInt => "compact-int",
            WireKind::Number => "number",
            WireKind::String => "string",
            WireKind::Date => "date",
            WireKind::ByteArray => "byte-array",
            WireKind::Array => "array",
            WireKind::Object => "object",
            WireKind::Xml => "xml",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(WireKind::CompactInt.name(), "compact-int");
        assert_eq!(WireKind::ByteArray.name(), "byte-array");
        assert_eq!(format!("{}", WireKind::Object), "object");
    }

    #[test]
    fn test_kind_equality() {
        assert_eq!(WireKind::Null, WireKind::Null);
        assert_ne!(WireKind::Null, WireKind::Undefined);
    }
}
