use std::io;

use confcoder_codec::Error as CodecError;
use derive_more::From;
use displaydoc::Display;

/// A builder was asked to build without a required option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ConfigError {
    /// ext must be set
    MissingExt,
    /// obj must be set
    MissingObj,
}

#[derive(Debug, Display, From)]
pub enum Error {
    /// {0}
    Config(ConfigError),
    /// I/O error: `{0}`
    Io(io::Error),
    /// {0}
    Codec(CodecError),
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    UnsupportedShape,
    UnsupportedFormat,
    Codec,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::Codec(CodecError::Io(_)) => ErrorKind::Io,
            Error::Codec(CodecError::UnsupportedShape { .. }) => ErrorKind::UnsupportedShape,
            Error::Codec(CodecError::UnsupportedFormat { .. }) => ErrorKind::UnsupportedFormat,
            Error::Codec(_) => ErrorKind::Codec,
        }
    }
}

impl std::error::Error for ConfigError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Codec(e) => Some(e),
        }
    }
}
