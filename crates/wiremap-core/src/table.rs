//! The mapping table
//!
//! Central, thread-safe registry of class mappings, mapper factories and
//! the type catalog, plus the two mapper-resolution caches. All public
//! operations hold one coarse-grained mutex for their full duration;
//! nothing blocks on I/O while holding it.

use crate::catalog::{
    CollectionStrategy, EnumOps, MapOps, OptionOps, SequenceOps, TypeCatalog,
};
use crate::descriptor::{ContentShape, SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::{
    ArrayMapperFactory, GenericCollectionFactory, GenericDictionaryFactory, MapperFactory,
    ObjectMapperFactory, PrimitiveMapperFactory,
};
use crate::mapper::Mapper;
use crate::mapping::{ClassMapping, ClassMappingBuilder, MappingSet};
use crate::native::{MixedArray, NativeType, Undefined, Unsupported, Variant, XmlDocument};
use crate::{MappingError, MappingResult};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;
use wiremap_value::WireKind;

pub(crate) struct TableState {
    by_alias: FxHashMap<String, Arc<ClassMapping>>,
    by_type: FxHashMap<std::any::TypeId, Arc<ClassMapping>>,
    factories: Vec<Arc<dyn MapperFactory>>,
    source_cache: FxHashMap<SourceMappingDescriptor, Option<Arc<dyn Mapper>>>,
    target_cache: FxHashMap<TargetMappingDescriptor, Option<Arc<dyn Mapper>>>,
    catalog: TypeCatalog,
}

/// Locked read view of the table, handed to factories during resolution.
pub struct MappingView<'a> {
    state: &'a TableState,
}

impl<'a> MappingView<'a> {
    /// Look up a class mapping by alias.
    pub fn class_mapping_by_alias(&self, alias: &str) -> Option<Arc<ClassMapping>> {
        self.state.by_alias.get(alias).cloned()
    }

    /// Look up a class mapping by native type.
    pub fn class_mapping_by_type(&self, native: &NativeType) -> Option<Arc<ClassMapping>> {
        self.state.by_type.get(&native.id()).cloned()
    }

    /// The registered type catalog.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.state.catalog
    }
}

/// Process-scoped registry of class mappings, factories, catalog entries
/// and resolution caches.
///
/// Constructed empty and populated by explicit registration calls. After
/// the table is in service, any further registration change must be
/// followed by [`clear_caches`](Self::clear_caches), or stale results (a
/// cached "no mapper" included) may persist.
pub struct MappingTable {
    state: Mutex<TableState>,
}

impl MappingTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                by_alias: FxHashMap::default(),
                by_type: FxHashMap::default(),
                factories: Vec::new(),
                source_cache: FxHashMap::default(),
                target_cache: FxHashMap::default(),
                catalog: TypeCatalog::new(),
            }),
        }
    }

    /// A table with the built-in factories and catalog entries registered.
    pub fn standard() -> Arc<Self> {
        let table = Arc::new(Self::new());
        table.register_builtins();
        table
    }

    /// Register the built-in factories (array, collection, dictionary,
    /// primitive, object — consulted in that order) and the default
    /// catalog entries for under-specified conversions.
    pub fn register_builtins(&self) {
        self.register_mapper_factory(Arc::new(ArrayMapperFactory));
        self.register_mapper_factory(Arc::new(GenericCollectionFactory));
        self.register_mapper_factory(Arc::new(GenericDictionaryFactory));
        self.register_mapper_factory(Arc::new(PrimitiveMapperFactory));
        self.register_mapper_factory(Arc::new(ObjectMapperFactory));

        self.register_array::<Variant>();
        self.register_array::<u8>();
        self.register_collection_strategy(crate::catalog::collection_strategy::<
            VecDeque<Variant>,
            Variant,
        >());
        self.register_map::<FxHashMap<String, Variant>, String, Variant>();
        self.register_map::<MixedArray, String, Variant>();

        self.register_optional::<bool>();
        self.register_optional::<i32>();
        self.register_optional::<i64>();
        self.register_optional::<f64>();
        self.register_optional::<String>();

        let mut state = self.state.lock();
        for native in [
            NativeType::of::<bool>(),
            NativeType::of::<u8>(),
            NativeType::of::<i8>(),
            NativeType::of::<i16>(),
            NativeType::of::<u16>(),
            NativeType::of::<i32>(),
            NativeType::of::<u32>(),
            NativeType::of::<i64>(),
            NativeType::of::<u64>(),
            NativeType::of::<f32>(),
            NativeType::of::<f64>(),
            NativeType::of::<char>(),
            NativeType::of::<String>(),
            NativeType::of::<DateTime<Utc>>(),
            NativeType::of::<rust_decimal::Decimal>(),
            NativeType::of::<XmlDocument>(),
            NativeType::of::<Undefined>(),
            NativeType::of::<Unsupported>(),
            NativeType::of::<Variant>(),
        ] {
            state.catalog.note_name(&native);
        }
    }

    /// Append a mapper factory; factories are consulted in registration
    /// order, first match wins.
    pub fn register_mapper_factory(&self, factory: Arc<dyn MapperFactory>) {
        self.state.lock().factories.push(factory);
    }

    /// Register a class mapping under both its alias and its native type.
    ///
    /// Fails without touching either lookup table if the native type, or a
    /// non-empty alias, is already registered.
    pub fn register_class_mapping(&self, mapping: ClassMapping) -> MappingResult<()> {
        let mut state = self.state.lock();
        let alias = mapping.layout().alias().to_owned();

        if state.by_type.contains_key(&mapping.native().id()) {
            return Err(MappingError::DuplicateType(mapping.native().name().to_owned()));
        }
        if !alias.is_empty() && state.by_alias.contains_key(&alias) {
            return Err(MappingError::DuplicateAlias(alias));
        }

        state.catalog.note_name(mapping.native());
        for property in mapping.properties() {
            state.catalog.note_name(property.target());
        }

        let mapping = Arc::new(mapping);
        if !alias.is_empty() {
            state.by_alias.insert(alias, Arc::clone(&mapping));
        }
        state.by_type.insert(mapping.native().id(), mapping);
        Ok(())
    }

    /// Build a declaration and register the result.
    pub fn register_type<T: Any + Default>(
        &self,
        builder: ClassMappingBuilder<T>,
        alias_override: Option<&str>,
    ) -> MappingResult<()> {
        self.register_class_mapping(builder.build_with_alias(alias_override)?)
    }

    /// Register every mapping in the set that carries a non-empty alias.
    pub fn register_all(&self, set: MappingSet) -> MappingResult<()> {
        for mapping in set.into_mappings() {
            if mapping.layout().is_untyped() {
                continue;
            }
            self.register_class_mapping(mapping)?;
        }
        Ok(())
    }

    /// Register `Vec<T>` as a convertible sequence type.
    pub fn register_array<T: Any>(&self) {
        self.state
            .lock()
            .catalog
            .add_sequence(SequenceOps::of_vec::<T>());
    }

    /// Append a collection-construction strategy; strategies are consulted
    /// in registration order, first match wins.
    pub fn register_collection_strategy(&self, strategy: Arc<dyn CollectionStrategy>) {
        self.state.lock().catalog.add_strategy(strategy);
    }

    /// Register an associative container type.
    pub fn register_map<M, K, V>(&self)
    where
        M: crate::catalog::Associative<K, V>,
        K: Any + std::str::FromStr + ToString,
        K::Err: std::fmt::Display,
        V: Any,
    {
        self.state
            .lock()
            .catalog
            .add_map(MapOps::for_map::<M, K, V>());
    }

    /// Register an enumeration's variant table.
    pub fn register_enum(&self, ops: Arc<EnumOps>) {
        self.state.lock().catalog.add_enum(ops);
    }

    /// Register `Option<T>` as a convertible target.
    pub fn register_optional<T: Any>(&self) {
        self.state.lock().catalog.add_option(OptionOps::of::<T>());
    }

    /// Resolve a wire→native mapper, consulting and filling the cache.
    ///
    /// A `None` result ("no factory matched") is cached too; repeated
    /// identical lookups never rescan the factories.
    pub fn source_mapper(
        &self,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        let mut state = self.state.lock();
        if let Some(cached) = state.source_cache.get(descriptor) {
            return Ok(cached.clone());
        }

        let factories = state.factories.clone();
        let mut resolved = None;
        {
            let view = MappingView { state: &*state };
            for factory in &factories {
                if let Some(mapper) = factory.source_mapper(&view, descriptor)? {
                    resolved = Some(mapper);
                    break;
                }
            }
        }
        state
            .source_cache
            .insert(descriptor.clone(), resolved.clone());
        Ok(resolved)
    }

    /// Resolve a native→wire mapper, consulting and filling the cache.
    pub fn target_mapper(
        &self,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        let mut state = self.state.lock();
        if let Some(cached) = state.target_cache.get(descriptor) {
            return Ok(cached.clone());
        }

        let factories = state.factories.clone();
        let mut resolved = None;
        {
            let view = MappingView { state: &*state };
            for factory in &factories {
                if let Some(mapper) = factory.target_mapper(&view, descriptor)? {
                    resolved = Some(mapper);
                    break;
                }
            }
        }
        state
            .target_cache
            .insert(descriptor.clone(), resolved.clone());
        Ok(resolved)
    }

    /// Look up a class mapping by alias.
    pub fn class_mapping_by_alias(&self, alias: &str) -> Option<Arc<ClassMapping>> {
        self.state.lock().by_alias.get(alias).cloned()
    }

    /// Look up a class mapping by native type.
    pub fn class_mapping_by_type(&self, native: &NativeType) -> Option<Arc<ClassMapping>> {
        self.state.lock().by_type.get(&native.id()).cloned()
    }

    /// The native type an under-specified wire value defaults to.
    ///
    /// The wire-kind enumeration is closed, so every kind has an entry.
    pub fn default_native_type(
        &self,
        kind: WireKind,
        alias: &str,
        shape: ContentShape,
    ) -> NativeType {
        match kind {
            WireKind::Array => match (shape.has_items, shape.has_properties) {
                (_, false) => NativeType::of::<Vec<Variant>>(),
                (false, true) => NativeType::of::<FxHashMap<String, Variant>>(),
                (true, true) => NativeType::of::<MixedArray>(),
            },
            WireKind::Boolean => NativeType::of::<bool>(),
            WireKind::ByteArray => NativeType::of::<Vec<u8>>(),
            WireKind::Date => NativeType::of::<DateTime<Utc>>(),
            WireKind::CompactInt => NativeType::of::<i32>(),
            WireKind::Null => NativeType::of::<Variant>(),
            WireKind::Number => NativeType::of::<f64>(),
            WireKind::Object => match self.class_mapping_by_alias(alias) {
                Some(mapping) => mapping.native().clone(),
                None => NativeType::of::<FxHashMap<String, Variant>>(),
            },
            WireKind::String => NativeType::of::<String>(),
            WireKind::Undefined => NativeType::of::<Undefined>(),
            WireKind::Unsupported => NativeType::of::<Unsupported>(),
            WireKind::Xml => NativeType::of::<XmlDocument>(),
        }
    }

    /// Drop both resolution caches without touching the registries.
    pub fn clear_caches(&self) {
        let mut state = self.state.lock();
        state.source_cache.clear();
        state.target_cache.clear();
    }

    /// Describe a runtime value's native type, with a registered display
    /// name when one exists.
    pub fn describe(&self, value: &dyn Any) -> NativeType {
        let id = value.type_id();
        let name = self
            .state
            .lock()
            .catalog
            .name_of(id)
            .unwrap_or("<unregistered>");
        NativeType::from_raw(id, name)
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::new()
    }
}
