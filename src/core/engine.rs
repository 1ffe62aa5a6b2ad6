//! Purpose: Whole-value encode/decode engines behind the facade.
//! Exports: `EncodeEngine`, `DecodeEngine`, `JsonEngine`, `JsonOptions`, `CborEngine`, `Engine`.
//! Role: Bytes-in/bytes-out boundary; the only place format crates are called.
//! Invariants: Encoders return bytes only after the whole value encoded successfully.
//! Invariants: Engine failures surface as `ErrorKind::Encode` / `ErrorKind::Decode`.
//! Invariants: The JSON engine rejects NaN and infinity; CBOR carries them through.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};
use crate::core::finite::ensure_finite;

pub trait EncodeEngine {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error>;
}

pub trait DecodeEngine {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl JsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JsonEngine {
    options: JsonOptions,
}

impl JsonEngine {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> JsonOptions {
        self.options
    }
}

impl EncodeEngine for JsonEngine {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        ensure_finite(value)?;
        let encoded = if self.options.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(|err| {
            Error::new(ErrorKind::Encode)
                .with_message("failed to encode json")
                .with_source(err)
        })
    }
}

impl DecodeEngine for JsonEngine {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(bytes).map_err(|err| {
            let kind = if err.is_data() {
                ErrorKind::TypeMismatch
            } else {
                ErrorKind::Decode
            };
            Error::new(kind)
                .with_message(format!("failed to decode json: {err}"))
                .with_source(err)
        })
    }
}

/// Compact binary engine (CBOR).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CborEngine;

impl EncodeEngine for CborEngine {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        serde_cbor::to_vec(&value).map_err(|err| {
            Error::new(ErrorKind::Encode)
                .with_message("failed to encode cbor")
                .with_source(err)
        })
    }
}

impl DecodeEngine for CborEngine {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        serde_cbor::from_slice(bytes).map_err(|err| {
            let kind = if err.is_data() {
                ErrorKind::TypeMismatch
            } else {
                ErrorKind::Decode
            };
            Error::new(kind)
                .with_message(format!("failed to decode cbor: {err}"))
                .with_source(err)
        })
    }
}

/// Runtime-selectable engine. The default is compact JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Engine {
    Json(JsonEngine),
    Cbor(CborEngine),
}

impl Engine {
    pub fn json() -> Self {
        Self::Json(JsonEngine::default())
    }

    pub fn json_pretty() -> Self {
        Self::Json(JsonEngine::new(JsonOptions::new().with_pretty(true)))
    }

    pub fn cbor() -> Self {
        Self::Cbor(CborEngine)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Cbor(_) => "cbor",
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::json()),
            "cbor" => Ok(Self::cbor()),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown engine `{other}`"))
                .with_hint("Supported engines: json, cbor.")),
        }
    }
}

impl EncodeEngine for Engine {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        match self {
            Self::Json(engine) => engine.encode(value),
            Self::Cbor(engine) => engine.encode(value),
        }
    }
}

impl DecodeEngine for Engine {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Error> {
        match self {
            Self::Json(engine) => engine.decode(bytes),
            Self::Cbor(engine) => engine.decode(bytes),
        }
    }
}
