//! Class layout descriptors
//!
//! A [`ClassLayout`] records how a class-backed wire value is shaped: its
//! alias, its layout kind, and the ordered list of member names. Layouts are
//! immutable and interned so that one shared allocation exists per distinct
//! (alias, kind, members) triple.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

/// The three class shapes a wire object can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Fixed members only
    Normal,
    /// Fixed members plus open-ended named properties
    Dynamic,
    /// Single opaque payload written by the type itself
    Externalizable,
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Normal => f.write_str("normal"),
            LayoutKind::Dynamic => f.write_str("dynamic"),
            LayoutKind::Externalizable => f.write_str("externalizable"),
        }
    }
}

/// Immutable descriptor of a class-backed wire value's shape.
///
/// Two layouts are equal iff alias, kind and the ordered member-name list
/// all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassLayout {
    alias: String,
    kind: LayoutKind,
    members: Vec<String>,
}

static INTERNED: Lazy<Mutex<FxHashSet<Arc<ClassLayout>>>> =
    Lazy::new(|| Mutex::new(FxHashSet::default()));

impl ClassLayout {
    /// Create a layout without interning it.
    pub fn new(alias: impl Into<String>, kind: LayoutKind, members: Vec<String>) -> Self {
        Self {
            alias: alias.into(),
            kind,
            members,
        }
    }

    /// Create or reuse the shared layout for this (alias, kind, members)
    /// triple.
    pub fn shared(alias: impl Into<String>, kind: LayoutKind, members: Vec<String>) -> Arc<Self> {
        let candidate = Self::new(alias, kind, members);
        let mut pool = INTERNED.lock();
        if let Some(existing) = pool.get(&candidate) {
            return Arc::clone(existing);
        }
        let shared = Arc::new(candidate);
        pool.insert(Arc::clone(&shared));
        shared
    }

    /// The class alias; empty for untyped objects.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The layout kind.
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Ordered member names.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of fixed members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the layout carries no alias.
    pub fn is_untyped(&self) -> bool {
        self.alias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_equality() {
        let a = ClassLayout::new("com.Point", LayoutKind::Normal, vec!["x".into(), "y".into()]);
        let b = ClassLayout::new("com.Point", LayoutKind::Normal, vec!["x".into(), "y".into()]);
        assert_eq!(a, b);

        let c = ClassLayout::new("com.Point", LayoutKind::Dynamic, vec!["x".into(), "y".into()]);
        assert_ne!(a, c);

        let d = ClassLayout::new("com.Point", LayoutKind::Normal, vec!["y".into(), "x".into()]);
        assert_ne!(a, d);
    }

    #[test]
    fn test_shared_layouts_are_interned() {
        let a = ClassLayout::shared("intern.A", LayoutKind::Normal, vec!["m".into()]);
        let b = ClassLayout::shared("intern.A", LayoutKind::Normal, vec!["m".into()]);
        assert!(Arc::ptr_eq(&a, &b));

        let c = ClassLayout::shared("intern.A", LayoutKind::Normal, vec!["n".into()]);
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_untyped() {
        let layout = ClassLayout::new("", LayoutKind::Dynamic, vec![]);
        assert!(layout.is_untyped());
        assert_eq!(layout.member_count(), 0);
    }
}
