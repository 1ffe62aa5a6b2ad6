//! Purpose: Define the stable public Rust API boundary for keycodec.
//! Exports: Facade types, transformers, date formats, engines, and whole-value helpers.
//! Role: Public, additive-only surface over the `core` modules.
//! Invariants: Callers never need to import `core` paths directly.

mod codec;
mod file;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::date::{DateFormat, DateTransform, PatternFormat, Rfc3339Format};
pub use crate::core::decoder::Decoder;
pub use crate::core::encoder::Encoder;
pub use crate::core::engine::{
    CborEngine, DecodeEngine, EncodeEngine, Engine, JsonEngine, JsonOptions,
};
pub use crate::core::error::{Error, ErrorKind, Shape};
pub use crate::core::key::{AnyKey, CodingKey};
pub use crate::core::keyed::{Keyed, KeyedDecode, KeyedEncode};
pub use crate::core::transform::{DecodeTransform, EncodeTransform, FnTransform};
pub use codec::{
    decode_bytes, decode_bytes_with, decode_keyed, decode_keyed_with, encode_keyed,
    encode_keyed_with, encode_value, encode_value_with,
};
pub use file::{load, save};
