use std::fmt::{self, Debug, Formatter};
use std::io::Write;

use confcoder_codec::{codec, Direction, Error as CodecError, Format};
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, Error};
use crate::locator::{DefaultLocator, FsLocator};

/// Encodes one value into a configuration format.
///
/// Without an explicit writer the output is appended to the locator's
/// `default.<ext>`, which is opened only after the format and the value's
/// shape have been accepted and is closed before [`Encoder::encode`] returns.
pub struct Encoder<'a, T: ?Sized> {
    ext: String,
    format: Option<Format>,
    obj: &'a T,
    writer: Option<Box<dyn Write + 'a>>,
    locator: Box<dyn DefaultLocator + 'a>,
}

impl<'a, T: Serialize + ?Sized> Encoder<'a, T> {
    pub fn builder() -> EncoderBuilder<'a, T> {
        EncoderBuilder::default()
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn encode(self) -> Result<(), Error> {
        let format = self
            .format
            .ok_or_else(|| CodecError::unsupported_format(&self.ext, Direction::Encoder))?;
        codec::check_encode(format, self.obj)?;

        let mut sink = match self.writer {
            Some(writer) => writer,
            None => self.locator.open_default(&self.ext)?,
        };

        debug!("Encoding value as {}", format);
        codec::encode(format, self.obj, &mut sink)?;
        sink.flush()?;
        Ok(())
    }
}

impl<T: ?Sized> Debug for Encoder<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("ext", &self.ext)
            .field("format", &self.format)
            .field("writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

/// Collects the options of an [`Encoder`]. Later calls override earlier ones.
pub struct EncoderBuilder<'a, T: ?Sized> {
    ext: Option<String>,
    obj: Option<&'a T>,
    writer: Option<Box<dyn Write + 'a>>,
    locator: Option<Box<dyn DefaultLocator + 'a>>,
}

impl<T: ?Sized> Default for EncoderBuilder<'_, T> {
    fn default() -> Self {
        Self {
            ext: None,
            obj: None,
            writer: None,
            locator: None,
        }
    }
}

impl<'a, T: Serialize + ?Sized> EncoderBuilder<'a, T> {
    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    pub fn obj(mut self, obj: &'a T) -> Self {
        self.obj = Some(obj);
        self
    }

    pub fn writer(mut self, writer: impl Write + 'a) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn locator(mut self, locator: impl DefaultLocator + 'a) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    pub fn build(self) -> Result<Encoder<'a, T>, Error> {
        let ext = self
            .ext
            .filter(|ext| !ext.is_empty())
            .ok_or(ConfigError::MissingExt)?;
        let obj = self.obj.ok_or(ConfigError::MissingObj)?;

        Ok(Encoder {
            format: ext.parse().ok(),
            ext,
            obj,
            writer: self.writer,
            locator: self
                .locator
                .unwrap_or_else(|| Box::new(FsLocator::default())),
        })
    }
}

impl<T: ?Sized> Debug for EncoderBuilder<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderBuilder")
            .field("ext", &self.ext)
            .field("obj", &self.obj.is_some())
            .field("writer", &self.writer.is_some())
            .field("locator", &self.locator.is_some())
            .finish()
    }
}
