//! Sectioned INI decoding on top of `rust-ini`.
//!
//! `rust-ini` only parses the text; binding onto typed structs is done by the
//! serde deserializer in [`de`]. Sections bind to the target struct field of
//! the same name, compared case-insensitively with `-` and `_` treated alike.

mod de;

use core::fmt::{self, Display, Formatter};

use serde::de::DeserializeOwned;

use super::Codec;
use crate::error::Error;
use crate::format::Format;

pub use self::de::from_str;

#[derive(Debug)]
pub enum IniError {
    Parse(::ini::ParseError),
    /// A section with no field to hold it.
    UnknownSection(String),
    /// A variable with no field to hold it.
    UnknownVariable {
        section: Option<String>,
        name: String,
    },
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
    Message(String),
}

impl Display for IniError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IniError::Parse(e) => write!(f, "{e}"),
            IniError::UnknownSection(section) => {
                write!(f, "can't store data at section `{section}`")
            }
            IniError::UnknownVariable {
                section: Some(section),
                name,
            } => write!(f, "invalid variable: section `{section}`, variable `{name}`"),
            IniError::UnknownVariable {
                section: None,
                name,
            } => write!(f, "invalid variable: `{name}` outside of any section"),
            IniError::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for `{name}`: expected {expected}"),
            IniError::Message(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for IniError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IniError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl serde::de::Error for IniError {
    fn custom<T: Display>(msg: T) -> Self {
        IniError::Message(msg.to_string())
    }
}

/// An INI codec; decode only.
#[derive(Clone, Copy, Debug)]
pub struct IniCodec;

impl Codec for IniCodec {
    const FORMAT: Format = Format::Ini;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error> {
        Ok(from_str(payload)?)
    }
}
