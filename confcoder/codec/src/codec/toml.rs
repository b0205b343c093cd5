use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::Error;
use crate::format::Format;

/// A TOML codec that uses the `toml` crate.
///
/// Output goes through `toml::to_string_pretty`, which lays arrays out one
/// element per line with four-space indentation.
#[derive(Clone, Copy, Debug)]
pub struct TomlCodec;

impl Codec for TomlCodec {
    const FORMAT: Format = Format::Toml;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error> {
        Ok(::toml::from_str(payload)?)
    }

    fn encode<T: Serialize + ?Sized, W: Write>(value: &T, mut writer: W) -> Result<(), Error> {
        let text = ::toml::to_string_pretty(value)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}
