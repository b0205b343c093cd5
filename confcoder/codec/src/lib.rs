#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(
    warnings,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

pub mod codec;
pub mod error;
pub mod format;
pub mod shape;

pub use codec::{check_decode, check_encode, decode, encode, Codec};
pub use error::{Direction, Error};
pub use format::{Capabilities, Format};
pub use shape::Shape;
