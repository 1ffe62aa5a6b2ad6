//! Purpose: Read side of the keyed codec facade.
//! Exports: `Decoder`.
//! Role: Typed, key-addressed reads over a borrowed serialized value tree.
//! Invariants: The decoder never owns or mutates the tree it reads.
//! Invariants: Missing keys and unparseable values are distinct failures.
//! Invariants: `decode_array_lossy` is the only operation that swallows errors.
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::core::date::{DateFormat, DateTransform};
use crate::core::error::{Error, ErrorKind, Shape};
use crate::core::key::{AnyKey, CodingKey};
use crate::core::keyed::KeyedDecode;
use crate::core::transform::DecodeTransform;

/// Keyed and single-value reads over a borrowed value.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    value: &'a Value,
    path: Vec<String>,
}

impl<'a> Decoder<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            path: Vec::new(),
        }
    }

    /// Keys leading from the root to this container.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Decodes the whole context as one value.
    pub fn decode_single<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(self.value).map_err(|err| {
            let err = mismatch(err);
            if self.path.is_empty() {
                err
            } else {
                err.with_path(self.path.iter().cloned())
            }
        })
    }

    pub fn contains<K: CodingKey>(&self, key: K) -> bool {
        self.value
            .as_object()
            .is_some_and(|map| map.contains_key(key.as_str()))
    }

    /// Keys present in this container, in stored order.
    pub fn keys(&self) -> Result<Vec<AnyKey>, Error> {
        Ok(self.object()?.keys().map(AnyKey::new).collect())
    }

    /// True when `key` is present and holds an explicit null.
    pub fn is_null<K: CodingKey>(&self, key: K) -> Result<bool, Error> {
        let key = AnyKey::of(&key);
        Ok(self.required(&key)?.is_null())
    }

    pub fn decode<T: DeserializeOwned, K: CodingKey>(&self, key: K) -> Result<T, Error> {
        let key = AnyKey::of(&key);
        let raw = self.required(&key)?;
        T::deserialize(raw).map_err(|err| self.at(&key, mismatch(err)))
    }

    /// Like `decode`, but an absent key (or an explicit null) yields `None`.
    ///
    /// A present value of the wrong shape is still an error.
    pub fn decode_if_present<T: DeserializeOwned, K: CodingKey>(
        &self,
        key: K,
    ) -> Result<Option<T>, Error> {
        let key = AnyKey::of(&key);
        match self.optional(&key)? {
            Some(raw) => T::deserialize(raw)
                .map(Some)
                .map_err(|err| self.at(&key, mismatch(err))),
            None => Ok(None),
        }
    }

    /// Decodes the transformer's wire type under `key`, then converts it.
    pub fn decode_with<X: DecodeTransform, K: CodingKey>(
        &self,
        key: K,
        transform: X,
    ) -> Result<X::Target, Error> {
        let key = AnyKey::of(&key);
        let raw = self.required(&key)?;
        let source = <X::Source as Deserialize>::deserialize(raw)
            .map_err(|err| self.at(&key, mismatch(err)))?;
        transform.decode(source).map_err(|err| self.at(&key, err))
    }

    pub fn decode_if_present_with<X: DecodeTransform, K: CodingKey>(
        &self,
        key: K,
        transform: X,
    ) -> Result<Option<X::Target>, Error> {
        let key = AnyKey::of(&key);
        let Some(raw) = self.optional(&key)? else {
            return Ok(None);
        };
        let source = <X::Source as Deserialize>::deserialize(raw)
            .map_err(|err| self.at(&key, mismatch(err)))?;
        transform
            .decode(source)
            .map(Some)
            .map_err(|err| self.at(&key, err))
    }

    pub fn decode_date<F: DateFormat, K: CodingKey>(
        &self,
        key: K,
        format: F,
    ) -> Result<OffsetDateTime, Error> {
        self.decode_with(key, DateTransform(format))
    }

    /// Best-effort sequence decode.
    ///
    /// Elements that fail to decode as `T` are dropped without any error
    /// or count reaching the caller; survivors keep their original order.
    /// The key itself must still be present and hold an array.
    pub fn decode_array_lossy<T: DeserializeOwned, K: CodingKey>(
        &self,
        key: K,
    ) -> Result<Vec<T>, Error> {
        let key = AnyKey::of(&key);
        let raw = self.required(&key)?;
        let Value::Array(items) = raw else {
            return Err(self.at(&key, shape_mismatch(Shape::Array, raw)));
        };

        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match T::deserialize(item) {
                Ok(value) => decoded.push(value),
                Err(err) => {
                    tracing::debug!(key = %key, index, error = %err, "dropping undecodable element");
                }
            }
        }
        Ok(decoded)
    }

    /// Keyed container nested under `key`.
    pub fn nested<K: CodingKey>(&self, key: K) -> Result<Decoder<'a>, Error> {
        let key = AnyKey::of(&key);
        let raw = self.required(&key)?;
        if !raw.is_object() {
            return Err(self.at(&key, shape_mismatch(Shape::Object, raw)));
        }
        let mut path = self.path.clone();
        path.push(key.as_str().to_string());
        Ok(Decoder { value: raw, path })
    }

    /// Decodes a type that reads its own keyed representation.
    pub fn decode_keyed<T: KeyedDecode, K: CodingKey>(&self, key: K) -> Result<T, Error> {
        let key = AnyKey::of(&key);
        let nested = self.nested(&key)?;
        T::decode_from(&nested).map_err(|err| self.at(&key, err))
    }

    fn object(&self) -> Result<&'a Map<String, Value>, Error> {
        self.value.as_object().ok_or_else(|| {
            let err = shape_mismatch(Shape::Object, self.value)
                .with_hint("Keyed access needs an object; use decode_single for bare values.");
            if self.path.is_empty() {
                err
            } else {
                err.with_path(self.path.iter().cloned())
            }
        })
    }

    fn optional(&self, key: &AnyKey) -> Result<Option<&'a Value>, Error> {
        Ok(self
            .object()?
            .get(key.as_str())
            .filter(|value| !value.is_null()))
    }

    fn required(&self, key: &AnyKey) -> Result<&'a Value, Error> {
        self.object()?.get(key.as_str()).ok_or_else(|| {
            self.at(
                key,
                Error::new(ErrorKind::KeyNotFound)
                    .with_message(format!("no value for key {:?}", key.as_str())),
            )
        })
    }

    fn at(&self, key: &AnyKey, err: Error) -> Error {
        err.locate(&self.path, key.as_str())
    }
}

// serde only reports its expectation as text, so `expected` stays unset here.
fn mismatch(err: serde_json::Error) -> Error {
    Error::new(ErrorKind::TypeMismatch)
        .with_message(err.to_string())
        .with_source(err)
}

fn shape_mismatch(expected: Shape, found: &Value) -> Error {
    Error::new(ErrorKind::TypeMismatch)
        .with_message(format!("expected {expected}, found {}", Shape::of(found)))
        .with_expected(expected)
}
