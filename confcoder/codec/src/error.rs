use std::io;

use displaydoc::Display;

use crate::codec::ini::IniError;
use crate::format::Format;
use crate::shape::Shape;

/// Which half of the facade raised an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Direction {
    /// decoder
    Decoder,
    /// encoder
    Encoder,
}

#[derive(Debug, Display)]
pub enum Error {
    /// ext `{ext}` not supported by {direction}
    UnsupportedFormat { ext: String, direction: Direction },
    /// type not supported by {direction}: {format} has no representation for {shape} values
    UnsupportedShape {
        format: Format,
        shape: Shape,
        direction: Direction,
    },
    /// json error: `{0}`
    Json(serde_json::Error),
    /// toml decode error: `{0}`
    TomlDe(toml::de::Error),
    /// toml encode error: `{0}`
    TomlSer(toml::ser::Error),
    /// yaml error: `{0}`
    Yaml(serde_yaml::Error),
    /// xml error: `{0}`
    Xml(quick_xml::DeError),
    /// ini error: `{0}`
    Ini(IniError),
    /// I/O error: `{0}`
    Io(io::Error),
}

impl Error {
    pub fn unsupported_format(ext: impl Into<String>, direction: Direction) -> Self {
        Self::UnsupportedFormat {
            ext: ext.into(),
            direction,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnsupportedFormat { .. } | Self::UnsupportedShape { .. } => None,
            Self::Json(e) => Some(e),
            Self::TomlDe(e) => Some(e),
            Self::TomlSer(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::Xml(e) => Some(e),
            Self::Ini(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::TomlDe(error)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(error: toml::ser::Error) -> Self {
        Self::TomlSer(error)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Yaml(error)
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(error: quick_xml::DeError) -> Self {
        Self::Xml(error)
    }
}

impl From<IniError> for Error {
    fn from(error: IniError) -> Self {
        Self::Ini(error)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
