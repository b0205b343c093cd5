use std::io::Write;

use quick_xml::se::Serializer;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::Error;
use crate::format::Format;

const INDENT_SIZE: usize = 4;

/// An XML codec that uses `quick-xml`'s serde support.
///
/// Struct fields bind to child elements by their serde name and to attributes
/// when renamed with a leading `@`. The root element is named after the
/// encoded struct.
#[derive(Clone, Copy, Debug)]
pub struct XmlCodec;

impl Codec for XmlCodec {
    const FORMAT: Format = Format::Xml;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error> {
        Ok(quick_xml::de::from_str(payload.trim_start())?)
    }

    fn encode<T: Serialize + ?Sized, W: Write>(value: &T, mut writer: W) -> Result<(), Error> {
        let mut buffer = String::new();
        let mut ser = Serializer::new(&mut buffer);
        ser.indent(' ', INDENT_SIZE);
        value.serialize(ser)?;

        writer.write_all(buffer.as_bytes())?;
        Ok(())
    }
}
