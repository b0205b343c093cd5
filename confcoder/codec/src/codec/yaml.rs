use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::Error;
use crate::format::Format;

/// A YAML codec that uses `serde_yaml` with its default formatting.
#[derive(Clone, Copy, Debug)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    const FORMAT: Format = Format::Yaml;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error> {
        Ok(serde_yaml::from_str(payload)?)
    }

    fn encode<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<(), Error> {
        Ok(serde_yaml::to_writer(writer, value)?)
    }
}
