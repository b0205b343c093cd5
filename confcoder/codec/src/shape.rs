//! Classifies decode targets and encode values without touching a payload.
//!
//! A type's serde implementation announces its data model through the first
//! call it makes on a `Deserializer` or `Serializer`: derived structs ask for
//! `deserialize_struct`, `HashMap` asks for `deserialize_map`, self-describing
//! values such as `serde_json::Value` ask for `deserialize_any`. The probes
//! below answer that first call by aborting with the observed shape.

use core::fmt::{self, Display, Formatter};

use displaydoc::Display as DisplayDoc;
use serde::de::{self, DeserializeOwned, Visitor};
use serde::ser::{self, Impossible, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, DisplayDoc)]
pub enum Shape {
    /// struct
    Struct,
    /// map
    Map,
    /// untyped
    Untyped,
    /// sequence
    Sequence,
    /// scalar
    Scalar,
    /// enum
    Enum,
}

impl Shape {
    /// Probes the shape `T` deserializes from.
    pub fn of_target<T: DeserializeOwned>() -> Self {
        match T::deserialize(ShapeProbe) {
            Ok(_) => Shape::Scalar,
            Err(ProbeError::Found(shape)) => shape,
            Err(ProbeError::Custom) => Shape::Scalar,
        }
    }

    /// Probes the shape `value` serializes into.
    pub fn of_value<T: Serialize + ?Sized>(value: &T) -> Self {
        match value.serialize(ShapeProbe) {
            Ok(shape) | Err(ProbeError::Found(shape)) => shape,
            Err(ProbeError::Custom) => Shape::Scalar,
        }
    }

    /// Whether the shape is a schema-less keyed value.
    pub fn is_untyped_map(self) -> bool {
        matches!(self, Shape::Map | Shape::Untyped)
    }

    /// Whether a configuration document can be bound to this shape at all.
    pub fn is_keyed(self) -> bool {
        matches!(self, Shape::Struct | Shape::Map | Shape::Untyped)
    }
}

#[derive(Debug)]
enum ProbeError {
    Found(Shape),
    Custom,
}

impl Display for ProbeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Found(shape) => write!(f, "probed shape: {shape}"),
            ProbeError::Custom => write!(f, "probe aborted"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl de::Error for ProbeError {
    fn custom<T: Display>(_msg: T) -> Self {
        ProbeError::Custom
    }
}

impl ser::Error for ProbeError {
    fn custom<T: Display>(_msg: T) -> Self {
        ProbeError::Custom
    }
}

struct ShapeProbe;

macro_rules! probe_deserialize {
    ($($method:ident => $shape:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
                Err(ProbeError::Found(Shape::$shape))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ShapeProbe {
    type Error = ProbeError;

    probe_deserialize! {
        deserialize_any => Untyped,
        deserialize_bool => Scalar,
        deserialize_i8 => Scalar,
        deserialize_i16 => Scalar,
        deserialize_i32 => Scalar,
        deserialize_i64 => Scalar,
        deserialize_i128 => Scalar,
        deserialize_u8 => Scalar,
        deserialize_u16 => Scalar,
        deserialize_u32 => Scalar,
        deserialize_u64 => Scalar,
        deserialize_u128 => Scalar,
        deserialize_f32 => Scalar,
        deserialize_f64 => Scalar,
        deserialize_char => Scalar,
        deserialize_str => Scalar,
        deserialize_string => Scalar,
        deserialize_bytes => Scalar,
        deserialize_byte_buf => Scalar,
        deserialize_unit => Scalar,
        deserialize_seq => Sequence,
        deserialize_map => Map,
        deserialize_identifier => Scalar,
        deserialize_ignored_any => Scalar,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_some(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Found(Shape::Scalar))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Found(Shape::Sequence))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Found(Shape::Sequence))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Found(Shape::Struct))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Found(Shape::Enum))
    }
}

macro_rules! probe_serialize {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Shape, ProbeError> {
                Ok(Shape::Scalar)
            }
        )*
    };
}

impl ser::Serializer for ShapeProbe {
    type Ok = Shape;
    type Error = ProbeError;
    type SerializeSeq = Impossible<Shape, ProbeError>;
    type SerializeTuple = Impossible<Shape, ProbeError>;
    type SerializeTupleStruct = Impossible<Shape, ProbeError>;
    type SerializeTupleVariant = Impossible<Shape, ProbeError>;
    type SerializeMap = Impossible<Shape, ProbeError>;
    type SerializeStruct = Impossible<Shape, ProbeError>;
    type SerializeStructVariant = Impossible<Shape, ProbeError>;

    probe_serialize! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    }

    fn serialize_none(self) -> Result<Shape, ProbeError> {
        Ok(Shape::Scalar)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Shape, ProbeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Shape, ProbeError> {
        Ok(Shape::Scalar)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Shape, ProbeError> {
        Ok(Shape::Enum)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Shape, ProbeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Shape, ProbeError> {
        Ok(Shape::Enum)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, ProbeError> {
        Err(ProbeError::Found(Shape::Sequence))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, ProbeError> {
        Err(ProbeError::Found(Shape::Sequence))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, ProbeError> {
        Err(ProbeError::Found(Shape::Sequence))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, ProbeError> {
        Err(ProbeError::Found(Shape::Enum))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, ProbeError> {
        Err(ProbeError::Found(Shape::Map))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, ProbeError> {
        Err(ProbeError::Found(Shape::Struct))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, ProbeError> {
        Err(ProbeError::Found(Shape::Enum))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde_derive::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Wrapped(Server);

    #[test]
    fn targets_are_classified_by_their_deserialize_impl() {
        assert_eq!(Shape::of_target::<Server>(), Shape::Struct);
        assert_eq!(Shape::of_target::<Option<Server>>(), Shape::Struct);
        assert_eq!(Shape::of_target::<Wrapped>(), Shape::Struct);
        assert_eq!(Shape::of_target::<HashMap<String, String>>(), Shape::Map);
        assert_eq!(Shape::of_target::<BTreeMap<String, u32>>(), Shape::Map);
        assert_eq!(Shape::of_target::<serde_json::Value>(), Shape::Untyped);
        assert_eq!(Shape::of_target::<Vec<Server>>(), Shape::Sequence);
        assert_eq!(Shape::of_target::<String>(), Shape::Scalar);
    }

    #[test]
    fn values_are_classified_by_their_serialize_impl() {
        let server = Server::default();
        assert_eq!(Shape::of_value(&server), Shape::Struct);
        assert_eq!(Shape::of_value(&Some(&server)), Shape::Struct);
        assert_eq!(Shape::of_value(&Wrapped(Server::default())), Shape::Struct);

        let mut map = HashMap::new();
        map.insert("k".to_owned(), 1u8);
        assert_eq!(Shape::of_value(&map), Shape::Map);

        let json = serde_json::json!({ "title": "T" });
        assert_eq!(Shape::of_value(&json), Shape::Map);
        assert_eq!(Shape::of_value(&serde_json::json!([1, 2])), Shape::Sequence);
        assert_eq!(Shape::of_value("plain"), Shape::Scalar);
    }

    #[test]
    fn keyed_shapes() {
        assert!(Shape::Struct.is_keyed());
        assert!(!Shape::Struct.is_untyped_map());
        assert!(Shape::Untyped.is_untyped_map());
        assert!(!Shape::Sequence.is_keyed());
    }
}
