//! Type catalog: statically-constructed operation tables
//!
//! The catalog replaces runtime reflection. Every container, enumeration or
//! optional a conversion can target is registered up front; registration
//! monomorphizes the concrete type into a type-erased operation table the
//! factories consult through the mapping table's read view.

use crate::native::{downcast_boxed, downcast_mut, downcast_ref, MixedArray, NativeType, Variant};
use crate::{MappingError, MappingResult};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;
use std::sync::Arc;

/// An appendable homogeneous collection over elements of type `T`.
pub trait Appendable<T: Any>: Any + Sized {
    /// Construct with an initial-capacity hint.
    fn with_capacity(capacity: usize) -> Self;

    /// Append one element.
    fn append(&mut self, item: T);

    /// Visit elements in iteration order.
    fn for_each(&self, f: &mut dyn FnMut(&T) -> MappingResult<()>) -> MappingResult<()>;

    /// Element count.
    fn len(&self) -> usize;
}

impl<T: Any> Appendable<T> for Vec<T> {
    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn append(&mut self, item: T) {
        self.push(item);
    }

    fn for_each(&self, f: &mut dyn FnMut(&T) -> MappingResult<()>) -> MappingResult<()> {
        for item in self {
            f(item)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: Any> Appendable<T> for VecDeque<T> {
    fn with_capacity(capacity: usize) -> Self {
        VecDeque::with_capacity(capacity)
    }

    fn append(&mut self, item: T) {
        self.push_back(item);
    }

    fn for_each(&self, f: &mut dyn FnMut(&T) -> MappingResult<()>) -> MappingResult<()> {
        for item in self {
            f(item)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: Any + Eq + Hash, S: BuildHasher + Default + Any> Appendable<T> for HashSet<T, S> {
    fn with_capacity(capacity: usize) -> Self {
        HashSet::with_capacity_and_hasher(capacity, S::default())
    }

    fn append(&mut self, item: T) {
        self.insert(item);
    }

    fn for_each(&self, f: &mut dyn FnMut(&T) -> MappingResult<()>) -> MappingResult<()> {
        for item in self {
            f(item)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: Any + Ord> Appendable<T> for BTreeSet<T> {
    fn with_capacity(_capacity: usize) -> Self {
        BTreeSet::new()
    }

    fn append(&mut self, item: T) {
        self.insert(item);
    }

    fn for_each(&self, f: &mut dyn FnMut(&T) -> MappingResult<()>) -> MappingResult<()> {
        for item in self {
            f(item)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// Type-erased operations over one concrete sequence type.
pub struct SequenceOps {
    collection: NativeType,
    element: NativeType,
    make: Arc<dyn Fn(usize) -> Box<dyn Any> + Send + Sync>,
    push: Arc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> MappingResult<()> + Send + Sync>,
    visit: Arc<
        dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any) -> MappingResult<()>) -> MappingResult<()>
            + Send
            + Sync,
    >,
    count: Arc<dyn Fn(&dyn Any) -> MappingResult<usize> + Send + Sync>,
}

impl SequenceOps {
    /// Operations for an [`Appendable`] collection `C` over `T`.
    pub fn for_collection<C: Appendable<T>, T: Any>() -> Arc<Self> {
        let collection = NativeType::of::<C>();
        let context = collection.name();
        Arc::new(Self {
            collection: collection.clone(),
            element: NativeType::of::<T>(),
            make: Arc::new(|capacity| Box::new(C::with_capacity(capacity)) as Box<dyn Any>),
            push: Arc::new(move |any, item| {
                let collection = downcast_mut::<C>(any, context)?;
                collection.append(downcast_boxed::<T>(item, context)?);
                Ok(())
            }),
            visit: Arc::new(move |any, f| {
                let collection = downcast_ref::<C>(any, context)?;
                collection.for_each(&mut |item: &T| f(item as &dyn Any))
            }),
            count: Arc::new(move |any| Ok(downcast_ref::<C>(any, context)?.len())),
        })
    }

    /// Operations for `Vec<T>`.
    pub fn of_vec<T: Any>() -> Arc<Self> {
        Self::for_collection::<Vec<T>, T>()
    }

    /// The collection type.
    pub fn collection(&self) -> &NativeType {
        &self.collection
    }

    /// The element type.
    pub fn element(&self) -> &NativeType {
        &self.element
    }

    /// Construct an instance with a capacity hint.
    pub fn make(&self, capacity: usize) -> Box<dyn Any> {
        (self.make)(capacity)
    }

    /// Append one boxed element.
    pub fn push(&self, collection: &mut dyn Any, item: Box<dyn Any>) -> MappingResult<()> {
        (self.push)(collection, item)
    }

    /// Visit elements in iteration order.
    pub fn visit(
        &self,
        collection: &dyn Any,
        f: &mut dyn FnMut(&dyn Any) -> MappingResult<()>,
    ) -> MappingResult<()> {
        (self.visit)(collection, f)
    }

    /// Element count.
    pub fn count(&self, collection: &dyn Any) -> MappingResult<usize> {
        (self.count)(collection)
    }
}

/// One entry in the collection-construction strategy chain.
///
/// A strategy declares the (collection, element) pair it can instantiate
/// and supplies the operations for it. Strategies are consulted in
/// registration order, first match wins.
pub trait CollectionStrategy: Send + Sync {
    /// The collection type this strategy instantiates.
    fn collection(&self) -> &NativeType;

    /// The element type this strategy instantiates with.
    fn element(&self) -> &NativeType;

    /// Whether this strategy can build the requested collection type.
    fn accepts(&self, collection: &NativeType) -> bool {
        collection == self.collection()
    }

    /// The operation table.
    fn ops(&self) -> Arc<SequenceOps>;
}

struct TypedStrategy {
    ops: Arc<SequenceOps>,
}

impl CollectionStrategy for TypedStrategy {
    fn collection(&self) -> &NativeType {
        self.ops.collection()
    }

    fn element(&self) -> &NativeType {
        self.ops.element()
    }

    fn ops(&self) -> Arc<SequenceOps> {
        Arc::clone(&self.ops)
    }
}

/// Strategy for an [`Appendable`] collection `C` over `T`.
pub fn collection_strategy<C: Appendable<T>, T: Any>() -> Arc<dyn CollectionStrategy> {
    Arc::new(TypedStrategy {
        ops: SequenceOps::for_collection::<C, T>(),
    })
}

/// An associative container over keys `K` and values `V`.
pub trait Associative<K: Any, V: Any>: Any + Sized {
    /// Construct with an initial-capacity hint.
    fn with_capacity(capacity: usize) -> Self;

    /// Insert one entry.
    fn insert_entry(&mut self, key: K, value: V);

    /// Visit entries in iteration order.
    fn for_each(&self, f: &mut dyn FnMut(&K, &V) -> MappingResult<()>) -> MappingResult<()>;

    /// Entry count.
    fn len(&self) -> usize;
}

impl<K: Any + Eq + Hash, V: Any, S: BuildHasher + Default + Any> Associative<K, V>
    for HashMap<K, V, S>
{
    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn for_each(&self, f: &mut dyn FnMut(&K, &V) -> MappingResult<()>) -> MappingResult<()> {
        for (key, value) in self {
            f(key, value)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<K: Any + Ord, V: Any> Associative<K, V> for BTreeMap<K, V> {
    fn with_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn for_each(&self, f: &mut dyn FnMut(&K, &V) -> MappingResult<()>) -> MappingResult<()> {
        for (key, value) in self {
            f(key, value)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl Associative<String, Variant> for MixedArray {
    fn with_capacity(capacity: usize) -> Self {
        let mut mixed = MixedArray::new();
        mixed.items.reserve(capacity);
        mixed
    }

    fn insert_entry(&mut self, key: String, value: Variant) {
        self.insert(key, value);
    }

    fn for_each(
        &self,
        f: &mut dyn FnMut(&String, &Variant) -> MappingResult<()>,
    ) -> MappingResult<()> {
        for (index, item) in self.items.iter().enumerate() {
            f(&index.to_string(), item)?;
        }
        for (key, value) in &self.properties {
            f(key, value)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// Type-erased operations over one concrete associative container.
pub struct MapOps {
    collection: NativeType,
    key: NativeType,
    value: NativeType,
    make: Arc<dyn Fn(usize) -> Box<dyn Any> + Send + Sync>,
    insert: Arc<dyn Fn(&mut dyn Any, Box<dyn Any>, Box<dyn Any>) -> MappingResult<()> + Send + Sync>,
    key_from_name: Arc<dyn Fn(&str) -> MappingResult<Box<dyn Any>> + Send + Sync>,
    visit: Arc<
        dyn Fn(&dyn Any, &mut dyn FnMut(String, &dyn Any) -> MappingResult<()>) -> MappingResult<()>
            + Send
            + Sync,
    >,
    count: Arc<dyn Fn(&dyn Any) -> MappingResult<usize> + Send + Sync>,
}

impl MapOps {
    /// Operations for an [`Associative`] container `M` over `K`/`V`.
    ///
    /// Keys are restored from wire names with `FromStr` and stringified
    /// with `ToString` when mapping back out.
    pub fn for_map<M, K, V>() -> Arc<Self>
    where
        M: Associative<K, V>,
        K: Any + FromStr + ToString,
        K::Err: Display,
        V: Any,
    {
        let collection = NativeType::of::<M>();
        let context = collection.name();
        Arc::new(Self {
            collection: collection.clone(),
            key: NativeType::of::<K>(),
            value: NativeType::of::<V>(),
            make: Arc::new(|capacity| Box::new(M::with_capacity(capacity)) as Box<dyn Any>),
            insert: Arc::new(move |any, key, value| {
                let map = downcast_mut::<M>(any, context)?;
                map.insert_entry(
                    downcast_boxed::<K>(key, context)?,
                    downcast_boxed::<V>(value, context)?,
                );
                Ok(())
            }),
            key_from_name: Arc::new(move |name| {
                let key = K::from_str(name).map_err(|e| {
                    MappingError::Conversion(format!(
                        "key `{name}` is not valid for {context}: {e}"
                    ))
                })?;
                Ok(Box::new(key) as Box<dyn Any>)
            }),
            visit: Arc::new(move |any, f| {
                let map = downcast_ref::<M>(any, context)?;
                map.for_each(&mut |key: &K, value: &V| f(key.to_string(), value as &dyn Any))
            }),
            count: Arc::new(move |any| Ok(downcast_ref::<M>(any, context)?.len())),
        })
    }

    /// The container type.
    pub fn collection(&self) -> &NativeType {
        &self.collection
    }

    /// The key type.
    pub fn key(&self) -> &NativeType {
        &self.key
    }

    /// The value type.
    pub fn value(&self) -> &NativeType {
        &self.value
    }

    /// Construct an instance with a capacity hint.
    pub fn make(&self, capacity: usize) -> Box<dyn Any> {
        (self.make)(capacity)
    }

    /// Insert one boxed entry.
    pub fn insert(
        &self,
        map: &mut dyn Any,
        key: Box<dyn Any>,
        value: Box<dyn Any>,
    ) -> MappingResult<()> {
        (self.insert)(map, key, value)
    }

    /// Restore a key from a wire property name.
    pub fn key_from_name(&self, name: &str) -> MappingResult<Box<dyn Any>> {
        (self.key_from_name)(name)
    }

    /// Restore a key from an indexed position.
    pub fn key_from_index(&self, index: usize) -> MappingResult<Box<dyn Any>> {
        (self.key_from_name)(&index.to_string())
    }

    /// Visit entries with stringified keys.
    pub fn visit(
        &self,
        map: &dyn Any,
        f: &mut dyn FnMut(String, &dyn Any) -> MappingResult<()>,
    ) -> MappingResult<()> {
        (self.visit)(map, f)
    }

    /// Entry count.
    pub fn count(&self, map: &dyn Any) -> MappingResult<usize> {
        (self.count)(map)
    }
}

/// Explicit variant table for one enumeration type.
pub struct EnumOps {
    native: NativeType,
    to_repr: Arc<dyn Fn(&dyn Any) -> MappingResult<i64> + Send + Sync>,
    from_repr: Arc<dyn Fn(i64) -> MappingResult<Box<dyn Any>> + Send + Sync>,
    from_name: Arc<dyn Fn(&str) -> MappingResult<Box<dyn Any>> + Send + Sync>,
}

/// Build the operation table for enumeration `E` from an explicit
/// (name, discriminant, value) variant table.
pub fn enum_ops<E: Any + Clone + PartialEq + Send + Sync>(
    variants: Vec<(&'static str, i64, E)>,
) -> Arc<EnumOps> {
    let native = NativeType::of::<E>();
    let context = native.name();
    let variants = Arc::new(variants);

    let to_table = Arc::clone(&variants);
    let repr_table = Arc::clone(&variants);
    let name_table = Arc::clone(&variants);

    Arc::new(EnumOps {
        native,
        to_repr: Arc::new(move |any| {
            let value = downcast_ref::<E>(any, context)?;
            to_table
                .iter()
                .find(|(_, _, v)| v == value)
                .map(|(_, repr, _)| *repr)
                .ok_or_else(|| {
                    MappingError::Conversion(format!("value of {context} is not in its variant table"))
                })
        }),
        from_repr: Arc::new(move |repr| {
            repr_table
                .iter()
                .find(|(_, r, _)| *r == repr)
                .map(|(_, _, v)| Box::new(v.clone()) as Box<dyn Any>)
                .ok_or_else(|| {
                    MappingError::Conversion(format!("no variant of {context} has discriminant {repr}"))
                })
        }),
        from_name: Arc::new(move |name| {
            name_table
                .iter()
                .find(|(n, _, _)| *n == name)
                .map(|(_, _, v)| Box::new(v.clone()) as Box<dyn Any>)
                .ok_or_else(|| {
                    MappingError::Conversion(format!("no variant of {context} is named `{name}`"))
                })
        }),
    })
}

impl EnumOps {
    /// The enumeration type.
    pub fn native(&self) -> &NativeType {
        &self.native
    }

    /// The discriminant of a value.
    pub fn to_repr(&self, value: &dyn Any) -> MappingResult<i64> {
        (self.to_repr)(value)
    }

    /// The value with a discriminant.
    pub fn from_repr(&self, repr: i64) -> MappingResult<Box<dyn Any>> {
        (self.from_repr)(repr)
    }

    /// The value with a variant name.
    pub fn from_name(&self, name: &str) -> MappingResult<Box<dyn Any>> {
        (self.from_name)(name)
    }
}

/// Type-erased operations over one `Option<T>`.
pub struct OptionOps {
    native: NativeType,
    inner: NativeType,
    wrap: Arc<dyn Fn(Box<dyn Any>) -> MappingResult<Box<dyn Any>> + Send + Sync>,
    none: Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>,
    inspect: Arc<
        dyn for<'a> Fn(&'a dyn Any) -> MappingResult<Option<&'a dyn Any>> + Send + Sync,
    >,
}

impl OptionOps {
    /// Operations for `Option<T>`.
    pub fn of<T: Any>() -> Arc<Self> {
        fn inspect<T: Any>(any: &dyn Any) -> MappingResult<Option<&dyn Any>> {
            let option = downcast_ref::<Option<T>>(any, std::any::type_name::<Option<T>>())?;
            Ok(option.as_ref().map(|v| v as &dyn Any))
        }

        let native = NativeType::of::<Option<T>>();
        let context = native.name();
        Arc::new(Self {
            native,
            inner: NativeType::of::<T>(),
            wrap: Arc::new(move |value| {
                Ok(Box::new(Some(downcast_boxed::<T>(value, context)?)) as Box<dyn Any>)
            }),
            none: Arc::new(|| Box::new(None::<T>) as Box<dyn Any>),
            inspect: Arc::new(inspect::<T>),
        })
    }

    /// The `Option<T>` type.
    pub fn native(&self) -> &NativeType {
        &self.native
    }

    /// The inner `T` type.
    pub fn inner(&self) -> &NativeType {
        &self.inner
    }

    /// Wrap an inner value into `Some`.
    pub fn wrap(&self, value: Box<dyn Any>) -> MappingResult<Box<dyn Any>> {
        (self.wrap)(value)
    }

    /// Produce `None`.
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }

    /// Borrow the inner value, if set.
    pub fn inspect<'a>(&self, value: &'a dyn Any) -> MappingResult<Option<&'a dyn Any>> {
        (self.inspect)(value)
    }
}

/// Registered operation tables, keyed by native type.
#[derive(Default)]
pub struct TypeCatalog {
    sequences: FxHashMap<TypeId, Arc<SequenceOps>>,
    strategies: Vec<Arc<dyn CollectionStrategy>>,
    maps: FxHashMap<TypeId, Arc<MapOps>>,
    enums: FxHashMap<TypeId, Arc<EnumOps>>,
    options: FxHashMap<TypeId, Arc<OptionOps>>,
    names: FxHashMap<TypeId, &'static str>,
}

impl TypeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_sequence(&mut self, ops: Arc<SequenceOps>) {
        self.note_name(ops.collection());
        self.note_name(ops.element());
        self.sequences.insert(ops.collection().id(), ops);
    }

    pub(crate) fn add_strategy(&mut self, strategy: Arc<dyn CollectionStrategy>) {
        self.note_name(strategy.collection());
        self.note_name(strategy.element());
        self.strategies.push(strategy);
    }

    pub(crate) fn add_map(&mut self, ops: Arc<MapOps>) {
        self.note_name(ops.collection());
        self.note_name(ops.key());
        self.note_name(ops.value());
        self.maps.insert(ops.collection().id(), ops);
    }

    pub(crate) fn add_enum(&mut self, ops: Arc<EnumOps>) {
        self.note_name(ops.native());
        self.enums.insert(ops.native().id(), ops);
    }

    pub(crate) fn add_option(&mut self, ops: Arc<OptionOps>) {
        self.note_name(ops.native());
        self.note_name(ops.inner());
        self.options.insert(ops.native().id(), ops);
    }

    pub(crate) fn note_name(&mut self, native: &NativeType) {
        self.names.insert(native.id(), native.name());
    }

    /// Sequence operations for a `Vec` type.
    pub fn sequence(&self, native: &NativeType) -> Option<&Arc<SequenceOps>> {
        self.sequences.get(&native.id())
    }

    /// First collection strategy accepting a collection type.
    pub fn strategy(&self, native: &NativeType) -> Option<&Arc<dyn CollectionStrategy>> {
        self.strategies.iter().find(|s| s.accepts(native))
    }

    /// Map operations for an associative type.
    pub fn map(&self, native: &NativeType) -> Option<&Arc<MapOps>> {
        self.maps.get(&native.id())
    }

    /// Enum operations for an enumeration type.
    pub fn enumeration(&self, native: &NativeType) -> Option<&Arc<EnumOps>> {
        self.enums.get(&native.id())
    }

    /// Option operations for an `Option<T>` type.
    pub fn option(&self, native: &NativeType) -> Option<&Arc<OptionOps>> {
        self.options.get(&native.id())
    }

    /// Display name for a runtime `TypeId`, if registered.
    pub fn name_of(&self, id: TypeId) -> Option<&'static str> {
        self.names.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_ops_push_and_visit() {
        let ops = SequenceOps::of_vec::<i32>();
        let mut seq = ops.make(2);
        ops.push(&mut *seq, Box::new(1_i32)).unwrap();
        ops.push(&mut *seq, Box::new(2_i32)).unwrap();
        assert_eq!(ops.count(&*seq).unwrap(), 2);

        let mut seen = Vec::new();
        ops.visit(&*seq, &mut |item| {
            seen.push(*item.downcast_ref::<i32>().unwrap());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![1, 2]);

        // Element type is enforced.
        assert!(ops.push(&mut *seq, Box::new("x".to_owned())).is_err());
    }

    #[test]
    fn test_collection_strategy_accepts_by_type() {
        let strategy = collection_strategy::<VecDeque<i32>, i32>();
        assert!(strategy.accepts(&NativeType::of::<VecDeque<i32>>()));
        assert!(!strategy.accepts(&NativeType::of::<Vec<i32>>()));
        assert_eq!(strategy.element(), &NativeType::of::<i32>());
    }

    #[test]
    fn test_map_ops_keys_round_trip() {
        let ops = MapOps::for_map::<BTreeMap<i32, String>, i32, String>();
        let mut map = ops.make(0);
        let key = ops.key_from_name("7").unwrap();
        ops.insert(&mut *map, key, Box::new("seven".to_owned())).unwrap();
        assert_eq!(ops.count(&*map).unwrap(), 1);

        let mut entries = Vec::new();
        ops.visit(&*map, &mut |key, value| {
            entries.push((key, value.downcast_ref::<String>().unwrap().clone()));
            Ok(())
        })
        .unwrap();
        assert_eq!(entries, vec![("7".to_owned(), "seven".to_owned())]);

        assert!(ops.key_from_name("not-a-number").is_err());
    }

    #[test]
    fn test_mixed_array_is_associative() {
        let ops = MapOps::for_map::<MixedArray, String, Variant>();
        let mut map = ops.make(0);
        ops.insert(
            &mut *map,
            ops.key_from_index(0).unwrap(),
            Box::new(Variant::new(10_i32)),
        )
        .unwrap();
        ops.insert(
            &mut *map,
            ops.key_from_name("label").unwrap(),
            Box::new(Variant::new("x".to_owned())),
        )
        .unwrap();

        let mixed = map.downcast_ref::<MixedArray>().unwrap();
        assert_eq!(mixed.items.len(), 1);
        assert_eq!(mixed.properties.len(), 1);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Blue,
    }

    #[test]
    fn test_enum_ops_lookups() {
        let ops = enum_ops::<Color>(vec![("Red", 0, Color::Red), ("Blue", 5, Color::Blue)]);
        assert_eq!(ops.to_repr(&Color::Blue).unwrap(), 5);

        let red = ops.from_repr(0).unwrap();
        assert_eq!(*red.downcast_ref::<Color>().unwrap(), Color::Red);

        let blue = ops.from_name("Blue").unwrap();
        assert_eq!(*blue.downcast_ref::<Color>().unwrap(), Color::Blue);

        assert!(ops.from_repr(9).is_err());
        assert!(ops.from_name("Green").is_err());
    }

    #[test]
    fn test_option_ops() {
        let ops = OptionOps::of::<String>();
        let some = ops.wrap(Box::new("v".to_owned())).unwrap();
        let inner = ops.inspect(&*some).unwrap().unwrap();
        assert_eq!(inner.downcast_ref::<String>().unwrap(), "v");

        let none = ops.none();
        assert!(ops.inspect(&*none).unwrap().is_none());
    }

    #[test]
    fn test_catalog_lookup_and_names() {
        let mut catalog = TypeCatalog::new();
        catalog.add_sequence(SequenceOps::of_vec::<i32>());
        catalog.add_map(MapOps::for_map::<BTreeMap<i32, String>, i32, String>());

        assert!(catalog.sequence(&NativeType::of::<Vec<i32>>()).is_some());
        assert!(catalog.sequence(&NativeType::of::<Vec<u8>>()).is_none());
        assert!(catalog
            .map(&NativeType::of::<BTreeMap<i32, String>>())
            .is_some());
        assert!(catalog.name_of(TypeId::of::<Vec<i32>>()).is_some());
    }
}
