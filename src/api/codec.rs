//! Purpose: Whole-value encode/decode wrappers around the engines.
//! Exports: `encode_value`, `decode_bytes`, `encode_keyed`, `decode_keyed` and `_with` variants.
//! Role: One-call conversions between typed values and bytes.
//! Invariants: `None` for the engine always means `Engine::default()` (compact JSON).
//! Invariants: Keyed variants keep facade error kinds instead of flattening them.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::decoder::Decoder;
use crate::core::encoder::Encoder;
use crate::core::engine::{DecodeEngine, EncodeEngine, Engine};
use crate::core::error::Error;
use crate::core::keyed::{KeyedDecode, KeyedEncode};

/// Encodes `value` with `engine`, or compact JSON when `engine` is `None`.
pub fn encode_value<T: Serialize + ?Sized>(
    value: &T,
    engine: Option<&Engine>,
) -> Result<Vec<u8>, Error> {
    encode_value_with(value, &engine.copied().unwrap_or_default())
}

pub fn encode_value_with<T, E>(value: &T, engine: &E) -> Result<Vec<u8>, Error>
where
    T: Serialize + ?Sized,
    E: EncodeEngine + ?Sized,
{
    engine.encode(value)
}

/// Decodes `bytes` with `engine`, or JSON when `engine` is `None`.
pub fn decode_bytes<T: DeserializeOwned>(
    bytes: &[u8],
    engine: Option<&Engine>,
) -> Result<T, Error> {
    decode_bytes_with(bytes, &engine.copied().unwrap_or_default())
}

pub fn decode_bytes_with<T, E>(bytes: &[u8], engine: &E) -> Result<T, Error>
where
    T: DeserializeOwned,
    E: DecodeEngine + ?Sized,
{
    engine.decode(bytes)
}

pub fn encode_keyed<T: KeyedEncode + ?Sized>(
    value: &T,
    engine: Option<&Engine>,
) -> Result<Vec<u8>, Error> {
    encode_keyed_with(value, &engine.copied().unwrap_or_default())
}

pub fn encode_keyed_with<T, E>(value: &T, engine: &E) -> Result<Vec<u8>, Error>
where
    T: KeyedEncode + ?Sized,
    E: EncodeEngine + ?Sized,
{
    let mut encoder = Encoder::new();
    value.encode_to(&mut encoder)?;
    engine.encode(encoder.value())
}

pub fn decode_keyed<T: KeyedDecode>(bytes: &[u8], engine: Option<&Engine>) -> Result<T, Error> {
    decode_keyed_with(bytes, &engine.copied().unwrap_or_default())
}

pub fn decode_keyed_with<T, E>(bytes: &[u8], engine: &E) -> Result<T, Error>
where
    T: KeyedDecode,
    E: DecodeEngine + ?Sized,
{
    let value: Value = engine.decode(bytes)?;
    T::decode_from(&Decoder::new(&value))
}
