pub mod ini;
pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

pub use self::ini::IniCodec;
pub use self::json::JsonCodec;
pub use self::toml::TomlCodec;
pub use self::xml::XmlCodec;
pub use self::yaml::YamlCodec;
use crate::error::{Direction, Error};
use crate::format::Format;
use crate::shape::Shape;

/// A trait that defines how configuration values are decoded/encoded in one format.
pub trait Codec {
    const FORMAT: Format;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error>;

    /// Formats without an encoder keep this default and report themselves
    /// unsupported.
    fn encode<T: Serialize + ?Sized, W: Write>(_value: &T, _writer: W) -> Result<(), Error> {
        Err(Error::unsupported_format(
            Self::FORMAT.extension(),
            Direction::Encoder,
        ))
    }
}

/// Checks that `format` can decode into a `T` without looking at any payload.
pub fn check_decode<T: DeserializeOwned>(format: Format) -> Result<(), Error> {
    let caps = format.capabilities();
    if !caps.decode {
        return Err(Error::unsupported_format(
            format.extension(),
            Direction::Decoder,
        ));
    }

    let shape = Shape::of_target::<T>();
    trace!("decode target for {} probed as {}", format, shape);
    check_shape(format, shape, caps.map_decode, Direction::Decoder)
}

/// Checks that `format` can encode `value` without producing any output.
pub fn check_encode<T: Serialize + ?Sized>(format: Format, value: &T) -> Result<(), Error> {
    let caps = format.capabilities();
    if !caps.encode {
        return Err(Error::unsupported_format(
            format.extension(),
            Direction::Encoder,
        ));
    }

    let shape = Shape::of_value(value);
    trace!("encode value for {} probed as {}", format, shape);
    check_shape(format, shape, caps.map_encode, Direction::Encoder)
}

fn check_shape(
    format: Format,
    shape: Shape,
    supports_map: bool,
    direction: Direction,
) -> Result<(), Error> {
    if !shape.is_keyed() || (shape.is_untyped_map() && !supports_map) {
        return Err(Error::UnsupportedShape {
            format,
            shape,
            direction,
        });
    }
    Ok(())
}

/// Decodes `payload` as `format` into a fresh `T`.
pub fn decode<T: DeserializeOwned>(format: Format, payload: &str) -> Result<T, Error> {
    check_decode::<T>(format)?;

    match format {
        Format::Json => JsonCodec::decode(payload),
        Format::Toml => TomlCodec::decode(payload),
        Format::Yaml => YamlCodec::decode(payload),
        Format::Xml => XmlCodec::decode(payload),
        Format::Ini => IniCodec::decode(payload),
    }
}

/// Encodes `value` as `format` into `writer`.
pub fn encode<T: Serialize + ?Sized, W: Write>(
    format: Format,
    value: &T,
    writer: W,
) -> Result<(), Error> {
    check_encode(format, value)?;

    match format {
        Format::Json => JsonCodec::encode(value, writer),
        Format::Toml => TomlCodec::encode(value, writer),
        Format::Yaml => YamlCodec::encode(value, writer),
        Format::Xml => XmlCodec::encode(value, writer),
        Format::Ini => IniCodec::encode(value, writer),
    }
}
