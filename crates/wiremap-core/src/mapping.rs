//! Class mappings and the declaration builder
//!
//! A [`ClassMapping`] ties one native type to one [`ClassLayout`] and a set
//! of [`PropertyMapping`]s. Declarations are explicit and assembled once at
//! startup through [`ClassMappingBuilder`]; the builder enforces the same
//! derivation rules the original derived from reflection metadata.

use crate::native::{DynamicProperties, Externalizable, NativeType};
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use wiremap_value::{ClassLayout, LayoutKind};

type Getter = Arc<dyn Fn(&dyn Any) -> MappingResult<Box<dyn Any>> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> MappingResult<()> + Send + Sync>;
type Constructor = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;
type DynRef =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> MappingResult<&'a dyn DynamicProperties> + Send + Sync>;
type DynMut = Arc<
    dyn for<'a> Fn(&'a mut dyn Any) -> MappingResult<&'a mut dyn DynamicProperties> + Send + Sync,
>;
type ExtRef =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> MappingResult<&'a dyn Externalizable> + Send + Sync>;
type ExtMut =
    Arc<dyn for<'a> Fn(&'a mut dyn Any) -> MappingResult<&'a mut dyn Externalizable> + Send + Sync>;

/// One native member ↔ wire property association.
pub struct PropertyMapping {
    wire_name: String,
    dynamic: bool,
    target: NativeType,
    get: Getter,
    set: Setter,
}

impl PropertyMapping {
    /// The property's name on the wire.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Whether the property is carried as a dynamic property.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Native type of the member.
    pub fn target(&self) -> &NativeType {
        &self.target
    }

    /// Read the member from an instance.
    pub fn get(&self, instance: &dyn Any) -> MappingResult<Box<dyn Any>> {
        (self.get)(instance)
    }

    /// Write the member on an instance.
    pub fn set(&self, instance: &mut dyn Any, value: Box<dyn Any>) -> MappingResult<()> {
        (self.set)(instance, value)
    }
}

impl std::fmt::Debug for PropertyMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMapping")
            .field("wire_name", &self.wire_name)
            .field("dynamic", &self.dynamic)
            .field("target", &self.target.name())
            .finish()
    }
}

/// Type-erased instance operations: construction plus capability
/// projections.
pub(crate) struct InstanceOps {
    pub(crate) construct: Constructor,
    pub(crate) dynamic: Option<(DynRef, DynMut)>,
    pub(crate) external: Option<(ExtRef, ExtMut)>,
}

/// Immutable association of one native type, one layout, and its property
/// mappings.
pub struct ClassMapping {
    native: NativeType,
    layout: Arc<ClassLayout>,
    properties: Vec<PropertyMapping>,
    ops: InstanceOps,
}

impl ClassMapping {
    /// The mapped native type.
    pub fn native(&self) -> &NativeType {
        &self.native
    }

    /// The wire-side layout.
    pub fn layout(&self) -> &Arc<ClassLayout> {
        &self.layout
    }

    /// All property mappings, declaration order.
    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    /// Find a property mapping by wire name.
    pub fn find_property(&self, wire_name: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.wire_name == wire_name)
    }

    /// Default-construct a fresh instance.
    pub fn construct(&self) -> Box<dyn Any> {
        (self.ops.construct)()
    }

    /// Whether the mapped type declares the dynamic-property capability.
    pub fn is_dynamic(&self) -> bool {
        self.ops.dynamic.is_some()
    }

    /// Project an instance onto its dynamic-property capability.
    pub fn dynamic_ref<'a>(
        &self,
        instance: &'a dyn Any,
    ) -> MappingResult<Option<&'a dyn DynamicProperties>> {
        match &self.ops.dynamic {
            Some((project, _)) => project(instance).map(Some),
            None => Ok(None),
        }
    }

    /// Mutably project an instance onto its dynamic-property capability.
    pub fn dynamic_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
    ) -> MappingResult<Option<&'a mut dyn DynamicProperties>> {
        match &self.ops.dynamic {
            Some((_, project)) => project(instance).map(Some),
            None => Ok(None),
        }
    }

    /// Project an instance onto its externalizable capability.
    pub fn external_ref<'a>(
        &self,
        instance: &'a dyn Any,
    ) -> MappingResult<Option<&'a dyn Externalizable>> {
        match &self.ops.external {
            Some((project, _)) => project(instance).map(Some),
            None => Ok(None),
        }
    }

    /// Mutably project an instance onto its externalizable capability.
    pub fn external_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
    ) -> MappingResult<Option<&'a mut dyn Externalizable>> {
        match &self.ops.external {
            Some((_, project)) => project(instance).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ClassMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassMapping")
            .field("native", &self.native.name())
            .field("alias", &self.layout.alias())
            .field("kind", &self.layout.kind())
            .field("properties", &self.properties.len())
            .finish()
    }
}

fn access_error(type_name: &'static str, property: &str, message: &str) -> MappingError {
    MappingError::PropertyAccess {
        type_name: type_name.to_owned(),
        property: property.to_owned(),
        message: message.to_owned(),
    }
}

/// Per-type mapping declaration.
///
/// Declares the alias, capabilities and properties of one native type and
/// derives the [`ClassMapping`]. Derivation rules:
/// - alias: explicit override (empty string means untyped) → declared alias
///   → empty
/// - layout kind: Normal, upgraded by [`dynamic`](Self::dynamic) /
///   [`externalizable`](Self::externalizable); the two upgrades conflict
/// - non-dynamic properties' wire names, in declaration order, become the
///   layout's member-name list
pub struct ClassMappingBuilder<T> {
    alias: Option<String>,
    properties: Vec<PropertyMapping>,
    dynamic: Option<(DynRef, DynMut)>,
    external: Option<(ExtRef, ExtMut)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Default> ClassMappingBuilder<T> {
    /// Start a declaration for `T`.
    pub fn new() -> Self {
        Self {
            alias: None,
            properties: Vec::new(),
            dynamic: None,
            external: None,
            _marker: PhantomData,
        }
    }

    /// Declare the class alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Declare one member with its wire name and accessors.
    pub fn property<M: Any>(
        self,
        wire_name: impl Into<String>,
        get: impl Fn(&T) -> M + Send + Sync + 'static,
        set: impl Fn(&mut T, M) + Send + Sync + 'static,
    ) -> Self {
        self.declare(wire_name.into(), false, get, set)
    }

    /// Declare one member carried as a dynamic property.
    pub fn dynamic_property<M: Any>(
        self,
        wire_name: impl Into<String>,
        get: impl Fn(&T) -> M + Send + Sync + 'static,
        set: impl Fn(&mut T, M) + Send + Sync + 'static,
    ) -> Self {
        self.declare(wire_name.into(), true, get, set)
    }

    fn declare<M: Any>(
        mut self,
        wire_name: String,
        dynamic: bool,
        get: impl Fn(&T) -> M + Send + Sync + 'static,
        set: impl Fn(&mut T, M) + Send + Sync + 'static,
    ) -> Self {
        let type_name = std::any::type_name::<T>();
        let get_name = wire_name.clone();
        let set_name = wire_name.clone();
        let erased_get: Getter = Arc::new(move |any| {
            let instance = any
                .downcast_ref::<T>()
                .ok_or_else(|| access_error(type_name, &get_name, "instance type mismatch"))?;
            Ok(Box::new(get(instance)) as Box<dyn Any>)
        });
        let erased_set: Setter = Arc::new(move |any, value| {
            let instance = any
                .downcast_mut::<T>()
                .ok_or_else(|| access_error(type_name, &set_name, "instance type mismatch"))?;
            let value = value
                .downcast::<M>()
                .map_err(|_| access_error(type_name, &set_name, "member value type mismatch"))?;
            set(instance, *value);
            Ok(())
        });
        self.properties.push(PropertyMapping {
            wire_name,
            dynamic,
            target: NativeType::of::<M>(),
            get: erased_get,
            set: erased_set,
        });
        self
    }

    /// Declare the dynamic-property capability.
    pub fn dynamic(mut self) -> Self
    where
        T: DynamicProperties,
    {
        fn project<T: Any + DynamicProperties>(
            any: &dyn Any,
        ) -> MappingResult<&dyn DynamicProperties> {
            match any.downcast_ref::<T>() {
                Some(instance) => Ok(instance as &dyn DynamicProperties),
                None => Err(access_error(
                    std::any::type_name::<T>(),
                    "<dynamic>",
                    "instance type mismatch",
                )),
            }
        }

        fn project_mut<T: Any + DynamicProperties>(
            any: &mut dyn Any,
        ) -> MappingResult<&mut dyn DynamicProperties> {
            match any.downcast_mut::<T>() {
                Some(instance) => Ok(instance as &mut dyn DynamicProperties),
                None => Err(access_error(
                    std::any::type_name::<T>(),
                    "<dynamic>",
                    "instance type mismatch",
                )),
            }
        }

        self.dynamic = Some((Arc::new(project::<T>), Arc::new(project_mut::<T>)));
        self
    }

    /// Declare the externalizable capability.
    pub fn externalizable(mut self) -> Self
    where
        T: Externalizable,
    {
        fn project<T: Any + Externalizable>(any: &dyn Any) -> MappingResult<&dyn Externalizable> {
            match any.downcast_ref::<T>() {
                Some(instance) => Ok(instance as &dyn Externalizable),
                None => Err(access_error(
                    std::any::type_name::<T>(),
                    "<external>",
                    "instance type mismatch",
                )),
            }
        }

        fn project_mut<T: Any + Externalizable>(
            any: &mut dyn Any,
        ) -> MappingResult<&mut dyn Externalizable> {
            match any.downcast_mut::<T>() {
                Some(instance) => Ok(instance as &mut dyn Externalizable),
                None => Err(access_error(
                    std::any::type_name::<T>(),
                    "<external>",
                    "instance type mismatch",
                )),
            }
        }

        self.external = Some((Arc::new(project::<T>), Arc::new(project_mut::<T>)));
        self
    }

    /// Derive the mapping with the declared alias.
    pub fn build(self) -> MappingResult<ClassMapping> {
        self.build_with_alias(None)
    }

    /// Derive the mapping, optionally overriding the alias.
    ///
    /// An explicit empty override means "untyped/no alias".
    pub fn build_with_alias(self, alias_override: Option<&str>) -> MappingResult<ClassMapping> {
        let type_name = std::any::type_name::<T>();
        let declaration = |message: &str| MappingError::Declaration {
            type_name: type_name.to_owned(),
            message: message.to_owned(),
        };

        let alias = match alias_override {
            Some(alias) => alias.to_owned(),
            None => self.alias.unwrap_or_default(),
        };

        // Capability conflicts are rejected before any property is examined.
        if self.dynamic.is_some() && self.external.is_some() {
            return Err(declaration("cannot be both dynamic and externalizable"));
        }
        if self.external.is_some() && alias.is_empty() {
            return Err(declaration("externalizable type requires a non-empty alias"));
        }

        let kind = if self.external.is_some() {
            LayoutKind::Externalizable
        } else if self.dynamic.is_some() {
            LayoutKind::Dynamic
        } else {
            LayoutKind::Normal
        };

        if kind == LayoutKind::Externalizable && !self.properties.is_empty() {
            return Err(declaration(
                "externalizable types must not declare property mappings",
            ));
        }

        let members: Vec<String> = self
            .properties
            .iter()
            .filter(|p| !p.dynamic)
            .map(|p| p.wire_name.clone())
            .collect();
        let layout = ClassLayout::shared(alias, kind, members);

        Ok(ClassMapping {
            native: NativeType::of::<T>(),
            layout,
            properties: self.properties,
            ops: InstanceOps {
                construct: Arc::new(|| Box::new(T::default()) as Box<dyn Any>),
                dynamic: self.dynamic,
                external: self.external,
            },
        })
    }
}

impl<T: Any + Default> Default for ClassMappingBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A batch of built class mappings.
///
/// The analog of scanning a compiled module for alias-tagged types: bulk
/// registration takes every member carrying a non-empty alias.
#[derive(Default)]
pub struct MappingSet {
    mappings: Vec<ClassMapping>,
}

impl MappingSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping.
    pub fn with(mut self, mapping: ClassMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Number of mappings in the set.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub(crate) fn into_mappings(self) -> Vec<ClassMapping> {
        self.mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::Variant;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct Point {
        x: f64,
        y: f64,
    }

    fn point_builder() -> ClassMappingBuilder<Point> {
        ClassMappingBuilder::<Point>::new()
            .alias("geom.Point")
            .property("x", |p: &Point| p.x, |p, v| p.x = v)
            .property("y", |p: &Point| p.y, |p, v| p.y = v)
    }

    #[derive(Default)]
    struct Bag {
        extra: FxHashMap<String, String>,
    }

    impl DynamicProperties for Bag {
        fn property_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.extra.keys().cloned().collect();
            names.sort();
            names
        }

        fn get_property(&self, name: &str) -> MappingResult<Option<Variant>> {
            Ok(self.extra.get(name).map(|v| Variant::new(v.clone())))
        }

        fn set_property(&mut self, name: &str, value: Variant) -> MappingResult<()> {
            let text = value
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_default();
            self.extra.insert(name.to_owned(), text);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Blob(Vec<u8>);

    impl Externalizable for Blob {
        fn write_external(&self) -> MappingResult<Vec<u8>> {
            Ok(self.0.clone())
        }

        fn read_external(&mut self, data: &[u8]) -> MappingResult<()> {
            self.0 = data.to_vec();
            Ok(())
        }
    }

    #[derive(Default)]
    struct Both;

    impl DynamicProperties for Both {
        fn property_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn get_property(&self, _: &str) -> MappingResult<Option<Variant>> {
            Ok(None)
        }
        fn set_property(&mut self, _: &str, _: Variant) -> MappingResult<()> {
            Ok(())
        }
    }

    impl Externalizable for Both {
        fn write_external(&self) -> MappingResult<Vec<u8>> {
            Ok(Vec::new())
        }
        fn read_external(&mut self, _: &[u8]) -> MappingResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_member_list_follows_declaration_order() {
        let mapping = point_builder().build().unwrap();
        assert_eq!(mapping.layout().alias(), "geom.Point");
        assert_eq!(mapping.layout().kind(), LayoutKind::Normal);
        assert_eq!(mapping.layout().members(), &["x".to_owned(), "y".to_owned()]);
    }

    #[test]
    fn test_dynamic_properties_excluded_from_members() {
        let mapping = ClassMappingBuilder::<Bag>::new()
            .alias("test.Bag")
            .dynamic()
            .dynamic_property(
                "note",
                |b: &Bag| b.extra.get("note").cloned().unwrap_or_default(),
                |b, v: String| {
                    b.extra.insert("note".into(), v);
                },
            )
            .build()
            .unwrap();
        assert_eq!(mapping.layout().kind(), LayoutKind::Dynamic);
        assert!(mapping.layout().members().is_empty());
        assert_eq!(mapping.properties().len(), 1);
    }

    #[test]
    fn test_alias_override_beats_declared_alias() {
        let overridden = point_builder()
            .build_with_alias(Some("geom.P2"))
            .unwrap();
        assert_eq!(overridden.layout().alias(), "geom.P2");

        // Explicit empty override means untyped.
        let untyped = point_builder().build_with_alias(Some("")).unwrap();
        assert!(untyped.layout().is_untyped());
    }

    #[test]
    fn test_externalizable_requires_alias() {
        let err = ClassMappingBuilder::<Blob>::new()
            .externalizable()
            .build()
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("externalizable type requires a non-empty alias"));
    }

    #[test]
    fn test_dynamic_and_externalizable_conflict() {
        let err = ClassMappingBuilder::<Both>::new()
            .alias("test.Both")
            .dynamic()
            .externalizable()
            .build()
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot be both dynamic and externalizable"));
    }

    #[test]
    fn test_externalizable_rejects_property_mappings() {
        let err = ClassMappingBuilder::<Blob>::new()
            .alias("test.Blob")
            .externalizable()
            .property("len", |b: &Blob| b.0.len() as i32, |_, _: i32| {})
            .build()
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("externalizable types must not declare property mappings"));
    }

    #[test]
    fn test_erased_accessors_round_trip() {
        let mapping = point_builder().build().unwrap();
        let mut instance = mapping.construct();

        let x = mapping.find_property("x").unwrap();
        x.set(&mut *instance, Box::new(2.5_f64)).unwrap();
        let got = x.get(&*instance).unwrap();
        assert_eq!(*got.downcast_ref::<f64>().unwrap(), 2.5);

        // Wrong member value type is reported with context.
        let err = x.set(&mut *instance, Box::new("nope".to_owned())).unwrap_err();
        assert!(err.to_string().contains("failed to access `x`"));
    }
}
