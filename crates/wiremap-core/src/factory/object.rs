//! Object factory: class-backed objects
//!
//! Both directions require a `ClassMapping` resolvable from the mapping
//! table — by alias for wire→native, by native type for native→wire.

use crate::descriptor::{SourceMappingDescriptor, TargetMappingDescriptor};
use crate::factory::MapperFactory;
use crate::mapper::Mapper;
use crate::mapping::ClassMapping;
use crate::native::NativeType;
use crate::serializer::Serializer;
use crate::table::MappingView;
use crate::{MappingError, MappingResult};
use std::any::Any;
use std::sync::Arc;
use wiremap_value::{LayoutKind, WireObject, WireValue};

/// Factory for types with a registered class mapping.
pub struct ObjectMapperFactory;

impl MapperFactory for ObjectMapperFactory {
    fn source_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &SourceMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        if descriptor.alias.is_empty() {
            return Ok(None);
        }
        Ok(view
            .class_mapping_by_alias(&descriptor.alias)
            .map(|mapping| Arc::new(ObjectMapper { mapping }) as Arc<dyn Mapper>))
    }

    fn target_mapper(
        &self,
        view: &MappingView<'_>,
        descriptor: &TargetMappingDescriptor,
    ) -> MappingResult<Option<Arc<dyn Mapper>>> {
        Ok(view
            .class_mapping_by_type(&descriptor.source)
            .map(|mapping| Arc::new(ObjectMapper { mapping }) as Arc<dyn Mapper>))
    }
}

struct ObjectMapper {
    mapping: Arc<ClassMapping>,
}

impl ObjectMapper {
    fn dynamic_access_error(&self, property: &str, source: &MappingError) -> MappingError {
        MappingError::PropertyAccess {
            type_name: self.mapping.native().name().to_owned(),
            property: property.to_owned(),
            message: source.to_string(),
        }
    }

    fn apply_property(
        &self,
        ser: &Serializer,
        instance: &mut dyn Any,
        name: &str,
        value: &WireValue,
    ) -> MappingResult<()> {
        if let Some(property) = self.mapping.find_property(name) {
            let converted = ser.to_native(value, property.target())?;
            property.set(instance, converted)?;
            // A dynamic-flagged mapping is mirrored into the capability
            // when the instance exposes one.
            if property.is_dynamic() {
                let variant = ser.to_native_typed(value)?;
                if let Some(dynamic) = self.mapping.dynamic_mut(instance)? {
                    dynamic
                        .set_property(name, variant)
                        .map_err(|e| self.dynamic_access_error(name, &e))?;
                }
            }
            return Ok(());
        }

        let variant = ser.to_native_typed(value)?;
        match self.mapping.dynamic_mut(instance)? {
            Some(dynamic) => dynamic
                .set_property(name, variant)
                .map_err(|e| self.dynamic_access_error(name, &e)),
            None => Err(MappingError::ShapeMismatch(format!(
                "no property mapping for `{name}` and type {} is not dynamic",
                self.mapping.native().name()
            ))),
        }
    }
}

impl Mapper for ObjectMapper {
    fn to_wire(&self, ser: &Serializer, value: &dyn Any) -> MappingResult<WireValue> {
        let layout = self.mapping.layout();

        if layout.kind() == LayoutKind::Externalizable {
            let external = self.mapping.external_ref(value)?.ok_or_else(|| {
                MappingError::Conversion(format!(
                    "{} has an externalizable layout but no capability",
                    self.mapping.native().name()
                ))
            })?;
            let payload = external.write_external()?;
            let object = WireObject::new(Arc::clone(layout), Vec::new())
                .map_err(|e| MappingError::Conversion(e.to_string()))?
                .with_external(payload);
            return Ok(WireValue::object(object));
        }

        let mut members = Vec::with_capacity(layout.member_count());
        for property in self.mapping.properties().iter().filter(|p| !p.is_dynamic()) {
            let member = property.get(value)?;
            members.push(ser.to_wire_value(&*member)?);
        }

        let mut properties = Vec::new();
        for property in self.mapping.properties().iter().filter(|p| p.is_dynamic()) {
            let member = property.get(value)?;
            properties.push((property.wire_name().to_owned(), ser.to_wire_value(&*member)?));
        }
        if let Some(dynamic) = self.mapping.dynamic_ref(value)? {
            for name in dynamic.property_names() {
                let entry = dynamic
                    .get_property(&name)
                    .map_err(|e| self.dynamic_access_error(&name, &e))?;
                if let Some(variant) = entry {
                    properties.push((name, ser.to_wire_value(&variant)?));
                }
            }
        }

        let object = WireObject::new(Arc::clone(layout), members)
            .map_err(|e| MappingError::Conversion(e.to_string()))?
            .with_properties(properties);
        Ok(WireValue::object(object))
    }

    fn from_object(
        &self,
        ser: &Serializer,
        value: &WireObject,
        _target: &NativeType,
    ) -> MappingResult<Box<dyn Any>> {
        let mut instance = self.mapping.construct();

        if self.mapping.layout().kind() == LayoutKind::Externalizable {
            let payload = value.external.as_deref().ok_or_else(|| {
                MappingError::ShapeMismatch(format!(
                    "object for `{}` carries no externalizable payload",
                    value.layout.alias()
                ))
            })?;
            let external = self.mapping.external_mut(&mut *instance)?.ok_or_else(|| {
                MappingError::Conversion(format!(
                    "{} has an externalizable layout but no capability",
                    self.mapping.native().name()
                ))
            })?;
            external.read_external(payload)?;
            return Ok(instance);
        }

        // Incoming members are matched by ordered position against the
        // incoming layout's member-name list, then resolved by wire name.
        for (name, member) in value.named_members() {
            self.apply_property(ser, &mut *instance, name, member)?;
        }
        for (name, property) in &value.properties {
            self.apply_property(ser, &mut *instance, name, property)?;
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ClassMappingBuilder;
    use crate::native::{DynamicProperties, Externalizable, Variant};
    use crate::table::MappingTable;
    use rustc_hash::FxHashMap;
    use wiremap_value::ClassLayout;

    fn serializer() -> Serializer {
        Serializer::new(MappingTable::standard())
    }

    #[derive(Default, Debug, PartialEq)]
    struct Account {
        id: i32,
        name: String,
    }

    fn register_account(ser: &Serializer) {
        ser.table()
            .register_type(
                ClassMappingBuilder::<Account>::new()
                    .alias("app.Account")
                    .property("id", |a: &Account| a.id, |a, v| a.id = v)
                    .property("name", |a: &Account| a.name.clone(), |a, v| a.name = v),
                None,
            )
            .unwrap();
    }

    #[test]
    fn test_object_round_trip() {
        let ser = serializer();
        register_account(&ser);

        let account = Account {
            id: 7,
            name: "ada".into(),
        };
        let wire = ser.to_wire_value(&account).unwrap();
        let object = wire.as_object().unwrap();
        assert_eq!(object.layout.alias(), "app.Account");
        assert_eq!(object.members.len(), 2);

        let back = ser.to_native_typed::<Account>(&wire).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn test_unknown_property_on_non_dynamic_type_fails() {
        let ser = serializer();
        register_account(&ser);

        let layout = ClassLayout::shared("app.Account", LayoutKind::Normal, vec![
            "id".into(),
            "name".into(),
        ]);
        let object = WireObject::new(
            layout,
            vec![WireValue::CompactInt(1), WireValue::String("x".into())],
        )
        .unwrap()
        .with_properties(vec![("stray".into(), WireValue::Null)]);

        let err = ser
            .to_native_typed::<Account>(&WireValue::object(object))
            .unwrap_err();
        assert!(err.to_string().contains("is not dynamic"));
    }

    #[derive(Default)]
    struct Session {
        user: String,
        extra: FxHashMap<String, String>,
    }

    impl DynamicProperties for Session {
        fn property_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.extra.keys().cloned().collect();
            names.sort();
            names
        }

        fn get_property(&self, name: &str) -> MappingResult<Option<Variant>> {
            Ok(self.extra.get(name).map(|v| Variant::new(v.clone())))
        }

        fn set_property(&mut self, name: &str, value: Variant) -> MappingResult<()> {
            let text = match value.downcast_ref::<String>() {
                Some(s) => s.clone(),
                None => {
                    return Err(MappingError::Conversion(
                        "session properties are strings".into(),
                    ))
                }
            };
            self.extra.insert(name.to_owned(), text);
            Ok(())
        }
    }

    fn register_session(ser: &Serializer) {
        ser.table()
            .register_type(
                ClassMappingBuilder::<Session>::new()
                    .alias("app.Session")
                    .dynamic()
                    .property("user", |s: &Session| s.user.clone(), |s, v| s.user = v),
                None,
            )
            .unwrap();
    }

    #[test]
    fn test_dynamic_type_accepts_unknown_properties() {
        let ser = serializer();
        register_session(&ser);

        let layout = ClassLayout::shared("app.Session", LayoutKind::Dynamic, vec!["user".into()]);
        let object = WireObject::new(layout, vec![WireValue::String("ada".into())])
            .unwrap()
            .with_properties(vec![("tag".into(), WireValue::String("beta".into()))]);

        let back = ser
            .to_native_typed::<Session>(&WireValue::object(object))
            .unwrap();
        assert_eq!(back.user, "ada");
        assert_eq!(back.extra["tag"], "beta");
    }

    #[test]
    fn test_dynamic_enumeration_is_emitted_and_errors_are_rewrapped() {
        let ser = serializer();
        register_session(&ser);

        let mut session = Session {
            user: "ada".into(),
            extra: FxHashMap::default(),
        };
        session.extra.insert("tag".into(), "beta".into());

        let wire = ser.to_wire_value(&session).unwrap();
        let object = wire.as_object().unwrap();
        assert_eq!(object.members.len(), 1);
        assert_eq!(object.properties.len(), 1);
        assert_eq!(object.properties[0].0, "tag");
    }

    #[derive(Default)]
    struct Token(Vec<u8>);

    impl Externalizable for Token {
        fn write_external(&self) -> MappingResult<Vec<u8>> {
            Ok(self.0.clone())
        }

        fn read_external(&mut self, data: &[u8]) -> MappingResult<()> {
            self.0 = data.to_vec();
            Ok(())
        }
    }

    #[test]
    fn test_externalizable_payload_round_trip() {
        let ser = serializer();
        ser.table()
            .register_type(
                ClassMappingBuilder::<Token>::new()
                    .alias("app.Token")
                    .externalizable(),
                None,
            )
            .unwrap();

        let token = Token(vec![9, 9, 9]);
        let wire = ser.to_wire_value(&token).unwrap();
        let object = wire.as_object().unwrap();
        assert_eq!(object.external.as_deref(), Some(&[9_u8, 9, 9][..]));
        assert!(object.members.is_empty());

        let back = ser.to_native_typed::<Token>(&wire).unwrap();
        assert_eq!(back.0, vec![9, 9, 9]);
    }
}
