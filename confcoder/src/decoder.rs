use std::fmt::{self, Debug, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use confcoder_codec::{codec, Direction, Error as CodecError, Format};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ConfigError, Error};
use crate::locator::{DefaultLocator, FsLocator};

/// Decodes one configuration payload into a caller-chosen type.
///
/// The payload is resolved when the decoder is built, so a decoder that
/// exists always holds the text it will decode.
#[derive(Clone, Debug)]
pub struct Decoder {
    ext: String,
    format: Option<Format>,
    data: String,
}

impl Decoder {
    pub fn builder<'a>() -> DecoderBuilder<'a> {
        DecoderBuilder::default()
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Decodes the payload into a new `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        let format = self
            .format
            .ok_or_else(|| CodecError::unsupported_format(&self.ext, Direction::Decoder))?;

        debug!("Decoding {} bytes as {}", self.data.len(), format);
        Ok(codec::decode(format, &self.data)?)
    }

    /// Decodes the payload into `target`, leaving it untouched on error.
    pub fn decode_into<T: DeserializeOwned>(self, target: &mut T) -> Result<(), Error> {
        *target = self.decode()?;
        Ok(())
    }
}

/// Collects the options of a [`Decoder`]. Later calls override earlier ones.
#[derive(Default)]
pub struct DecoderBuilder<'a> {
    ext: Option<String>,
    data: Option<String>,
    reader: Option<Box<dyn Read + 'a>>,
    path: Option<PathBuf>,
    locator: Option<Box<dyn DefaultLocator + 'a>>,
}

impl<'a> DecoderBuilder<'a> {
    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn reader(mut self, reader: impl Read + 'a) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Reads the payload from `path`; its extension supplies `ext` when none is set.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn locator(mut self, locator: impl DefaultLocator + 'a) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    /// Resolves the payload: `data`, then `reader`, then `path`, then the
    /// locator's `default.<ext>`.
    pub fn build(self) -> Result<Decoder, Error> {
        let ext = match (self.ext, &self.path) {
            (Some(ext), _) if !ext.is_empty() => ext,
            (_, Some(path)) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| !ext.is_empty())
                .map(str::to_owned)
                .ok_or(ConfigError::MissingExt)?,
            _ => return Err(ConfigError::MissingExt.into()),
        };

        let format = ext.parse::<Format>().ok();
        if format.is_none() {
            debug!("Unrecognized ext `{}`, skipping payload resolution", ext);
            return Ok(Decoder {
                ext,
                format,
                data: String::new(),
            });
        }

        let data = match (self.data, self.reader, self.path) {
            (Some(data), _, _) if !data.is_empty() => data,
            (_, Some(mut reader), _) => {
                debug!("Draining reader for {} payload", ext);
                let mut data = String::new();
                reader.read_to_string(&mut data)?;
                data
            }
            (_, None, Some(path)) => {
                debug!("Reading {} payload from {}", ext, path.display());
                let mut data = String::new();
                File::open(path)?.read_to_string(&mut data)?;
                data
            }
            _ => match self.locator {
                Some(locator) => locator.read_default(&ext)?,
                None => FsLocator::default().read_default(&ext)?,
            },
        };

        Ok(Decoder { ext, format, data })
    }
}

impl Debug for DecoderBuilder<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderBuilder")
            .field("ext", &self.ext)
            .field("data", &self.data)
            .field("reader", &self.reader.is_some())
            .field("path", &self.path)
            .field("locator", &self.locator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::io::{self, Cursor, Write};

    use confcoder_codec::Shape;
    use serde_derive::Deserialize;
    use serde_json::Value;

    use super::*;
    use crate::error::ErrorKind;

    /// Fails the test if the decoder touches the fallback file.
    struct NoDefault;

    impl DefaultLocator for NoDefault {
        fn read_default(&self, ext: &str) -> io::Result<String> {
            panic!("unexpected read of default.{ext}")
        }

        fn open_default(&self, ext: &str) -> io::Result<Box<dyn Write>> {
            panic!("unexpected open of default.{ext}")
        }
    }

    struct Fixed<'a> {
        payload: &'static str,
        reads: &'a Cell<usize>,
    }

    impl DefaultLocator for Fixed<'_> {
        fn read_default(&self, _ext: &str) -> io::Result<String> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.payload.to_owned())
        }

        fn open_default(&self, _ext: &str) -> io::Result<Box<dyn Write>> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }
    }

    #[derive(Debug, Default, Deserialize)]
    struct Section {
        enable: bool,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Ini {
        section: Section,
    }

    #[derive(Debug, Deserialize)]
    struct Misnamed {
        #[allow(dead_code)]
        switches: Section,
    }

    #[test]
    fn missing_ext_fails_before_any_io() {
        let err = Decoder::builder()
            .data("{}")
            .locator(NoDefault)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = Decoder::builder().ext("").locator(NoDefault).build().unwrap_err();
        assert_eq!(err.to_string(), "ext must be set");
    }

    #[test]
    fn json_into_untyped_map() {
        let decoder = Decoder::builder()
            .ext("json")
            .data(r#"{"title":"T","database":{"server":"1.2.3.4","ports":[1,2,3]}}"#)
            .build()
            .unwrap();

        let mut result: HashMap<String, Value> = HashMap::new();
        decoder.decode_into(&mut result).unwrap();

        assert_eq!(result["title"], "T");
        let ports = result["database"]
            .as_object()
            .and_then(|db| db["ports"].as_array())
            .unwrap();
        assert_eq!(ports.len(), 3);
        assert_eq!(
            ports.iter().filter_map(Value::as_u64).collect::<Vec<_>>(),
            [1, 2, 3]
        );
    }

    #[test]
    fn ini_section_binds_by_field_name() {
        let payload = "; A comment line\n[section]\nenable = true\n";

        let mut ini = Ini::default();
        Decoder::builder()
            .ext("ini")
            .data(payload)
            .build()
            .unwrap()
            .decode_into(&mut ini)
            .unwrap();
        assert!(ini.section.enable);

        let err = Decoder::builder()
            .ext("ini")
            .data(payload)
            .build()
            .unwrap()
            .decode::<Misnamed>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn map_targets_fail_for_xml_and_ini() {
        for ext in ["xml", "ini"] {
            let err = Decoder::builder()
                .ext(ext)
                .data("<persons/>")
                .build()
                .unwrap()
                .decode::<HashMap<String, Value>>()
                .unwrap_err();
            assert!(matches!(
                err,
                Error::Codec(CodecError::UnsupportedShape {
                    shape: Shape::Map,
                    ..
                })
            ));
        }
    }

    #[test]
    fn unknown_ext_fails_at_decode_without_io() {
        let decoder = Decoder::builder()
            .ext("csv")
            .locator(NoDefault)
            .build()
            .unwrap();
        assert_eq!(decoder.format(), None);

        let err = decoder.decode::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.to_string(), "ext `csv` not supported by decoder");
    }

    #[test]
    fn data_wins_over_reader_and_default() {
        let reads = Cell::new(0);
        let decoder = Decoder::builder()
            .ext("yaml")
            .reader(Cursor::new("from: reader"))
            .data("from: data")
            .locator(Fixed {
                payload: "from: default",
                reads: &reads,
            })
            .build()
            .unwrap();
        assert_eq!(decoder.data(), "from: data");
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn empty_data_falls_back_to_reader() {
        let decoder = Decoder::builder()
            .ext("yaml")
            .data("")
            .reader(Cursor::new("from: reader"))
            .locator(NoDefault)
            .build()
            .unwrap();
        assert_eq!(decoder.data(), "from: reader");
    }

    #[test]
    fn default_payload_is_used_last() {
        let reads = Cell::new(0);
        let value: Value = Decoder::builder()
            .ext("toml")
            .locator(Fixed {
                payload: "from = \"default\"",
                reads: &reads,
            })
            .build()
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(value["from"], "default");
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn later_options_override_earlier_ones() {
        let decoder = Decoder::builder()
            .ext("xml")
            .data("a: 1")
            .ext("yaml")
            .build()
            .unwrap();
        assert_eq!(decoder.ext(), "yaml");
        assert_eq!(decoder.format(), Some(Format::Yaml));
    }

    #[test]
    fn missing_default_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Decoder::builder()
            .ext("json")
            .locator(FsLocator::new(dir.path()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn path_supplies_payload_and_ext() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "title: from file\n").unwrap();

        let decoder = Decoder::builder().path(&path).build().unwrap();
        assert_eq!(decoder.format(), Some(Format::Yaml));

        let value: Value = decoder.decode().unwrap();
        assert_eq!(value["title"], "from file");
    }

    #[test]
    fn reader_failures_surface_as_io_errors() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }

        let err = Decoder::builder()
            .ext("json")
            .reader(Broken)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "I/O error: `disk on fire`");
    }
}
