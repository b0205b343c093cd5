use core::str::FromStr;
use std::path::Path;

use displaydoc::Display;

/// The configuration formats the facade knows how to dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Format {
    /// json
    Json,
    /// toml
    Toml,
    /// yaml
    Yaml,
    /// xml
    Xml,
    /// ini
    Ini,
}

/// What a format's codec can do, consulted before any payload is touched.
///
/// `map_decode` and `map_encode` describe whether the format has a native
/// representation for schema-less keyed values (`HashMap`, `serde_json::Value`,
/// ...). XML and INI only bind onto typed structs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub decode: bool,
    pub encode: bool,
    pub map_decode: bool,
    pub map_encode: bool,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Toml,
        Format::Yaml,
        Format::Xml,
        Format::Ini,
    ];

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Format::Json | Format::Toml | Format::Yaml => Capabilities {
                decode: true,
                encode: true,
                map_decode: true,
                map_encode: true,
            },
            Format::Xml => Capabilities {
                decode: true,
                encode: true,
                map_decode: false,
                map_encode: false,
            },
            Format::Ini => Capabilities {
                decode: true,
                encode: false,
                map_decode: false,
                map_encode: false,
            },
        }
    }

    /// The canonical file extension, without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
            Format::Ini => "ini",
        }
    }

    /// Infers the format from the extension of `path`, if it has a known one.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "yaml" | "yml" => Ok(Format::Yaml),
            "xml" => Ok(Format::Xml),
            "ini" => Ok(Format::Ini),
            _ => Err(s.to_owned()),
        }
    }
}
