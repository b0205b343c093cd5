#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(
    warnings,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod locator;

pub use decoder::{Decoder, DecoderBuilder};
pub use encoder::{Encoder, EncoderBuilder};
pub use error::{ConfigError, Error, ErrorKind};
pub use locator::{DefaultLocator, FsLocator};

/// Re-exports the format tags, capability table and codecs.
pub mod codec {
    pub use confcoder_codec::*;
}
