//! Purpose: Let types describe their own keyed representation.
//! Exports: `KeyedEncode`, `KeyedDecode`, `Keyed`.
//! Role: Bridge hand-written keyed impls into serde so they nest anywhere.
//! Invariants: `Keyed<T>` serializes exactly the tree `T::encode_to` builds.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use serde_json::Value;

use crate::core::decoder::Decoder;
use crate::core::encoder::Encoder;
use crate::core::error::Error;

pub trait KeyedEncode {
    fn encode_to(&self, encoder: &mut Encoder) -> Result<(), Error>;
}

pub trait KeyedDecode: Sized {
    fn decode_from(decoder: &Decoder<'_>) -> Result<Self, Error>;
}

impl<T: KeyedEncode + ?Sized> KeyedEncode for &T {
    fn encode_to(&self, encoder: &mut Encoder) -> Result<(), Error> {
        (**self).encode_to(encoder)
    }
}

impl<T: KeyedEncode> KeyedEncode for Box<T> {
    fn encode_to(&self, encoder: &mut Encoder) -> Result<(), Error> {
        (**self).encode_to(encoder)
    }
}

impl<T: KeyedDecode> KeyedDecode for Box<T> {
    fn decode_from(decoder: &Decoder<'_>) -> Result<Self, Error> {
        T::decode_from(decoder).map(Box::new)
    }
}

/// Serde adapter for keyed types.
///
/// Facade errors raised inside are flattened into the outer serializer's
/// error message; use `encode_keyed`/`decode_keyed` to keep their kinds.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct Keyed<T>(pub T);

impl<T> Keyed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Keyed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<T: KeyedEncode> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut encoder = Encoder::new();
        self.0.encode_to(&mut encoder).map_err(ser::Error::custom)?;
        encoder.into_value().serialize(serializer)
    }
}

impl<'de, T: KeyedDecode> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        T::decode_from(&Decoder::new(&value))
            .map(Keyed)
            .map_err(de::Error::custom)
    }
}
