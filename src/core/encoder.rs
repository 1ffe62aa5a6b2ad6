//! Purpose: Write side of the keyed codec facade.
//! Exports: `Encoder`.
//! Role: Typed, key-addressed writes into an owned serialized value tree.
//! Invariants: Every write is encoded off to the side and inserted only on success.
//! Invariants: A context written in single-value mode rejects keyed writes, even when it holds null.
//! Invariants: NaN and infinite floats are rejected rather than written as null.
use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::core::date::{DateFormat, DateTransform};
use crate::core::error::{Error, ErrorKind, Shape};
use crate::core::finite::ensure_finite;
use crate::core::key::{AnyKey, CodingKey};
use crate::core::keyed::KeyedEncode;
use crate::core::transform::EncodeTransform;

#[derive(Clone, Debug, Default)]
pub struct Encoder {
    value: Value,
    path: Vec<String>,
    single: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replaces the whole context with `value`.
    ///
    /// Once written this way the context stays single-valued.
    pub fn encode_single<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let encoded = to_tree(value).map_err(|err| {
            if self.path.is_empty() {
                err
            } else {
                err.with_path(self.path.iter().cloned())
            }
        })?;
        self.value = encoded;
        self.single = true;
        Ok(())
    }

    pub fn encode<T: Serialize + ?Sized, K: CodingKey>(
        &mut self,
        value: &T,
        key: K,
    ) -> Result<(), Error> {
        let key = AnyKey::of(&key);
        let encoded = to_tree(value).map_err(|err| self.at(&key, err))?;
        self.insert(key, encoded)
    }

    /// Writes `value` when it is `Some`; `None` leaves the key absent.
    pub fn encode_if_present<T: Serialize + ?Sized, K: CodingKey>(
        &mut self,
        value: Option<&T>,
        key: K,
    ) -> Result<(), Error> {
        match value {
            Some(value) => self.encode(value, key),
            None => Ok(()),
        }
    }

    pub fn encode_null<K: CodingKey>(&mut self, key: K) -> Result<(), Error> {
        self.insert(AnyKey::of(&key), Value::Null)
    }

    /// Converts `value` through the transformer, then writes the result under `key`.
    pub fn encode_with<X: EncodeTransform, K: CodingKey>(
        &mut self,
        value: &X::Source,
        key: K,
        transform: X,
    ) -> Result<(), Error> {
        let key = AnyKey::of(&key);
        let target = transform.encode(value).map_err(|err| self.at(&key, err))?;
        self.encode(&target, key)
    }

    pub fn encode_date<F: DateFormat, K: CodingKey>(
        &mut self,
        value: &OffsetDateTime,
        key: K,
        format: F,
    ) -> Result<(), Error> {
        self.encode_with(value, key, DateTransform(format))
    }

    /// Builds a keyed container under `key`; nothing is written if `build` fails.
    pub fn nested<K, F>(&mut self, key: K, build: F) -> Result<(), Error>
    where
        K: CodingKey,
        F: FnOnce(&mut Encoder) -> Result<(), Error>,
    {
        let key = AnyKey::of(&key);
        let mut path = self.path.clone();
        path.push(key.as_str().to_string());
        let mut child = Encoder {
            value: Value::Object(Map::new()),
            path,
            single: false,
        };
        build(&mut child).map_err(|err| self.at(&key, err))?;
        self.insert(key, child.value)
    }

    pub fn encode_keyed<T: KeyedEncode + ?Sized, K: CodingKey>(
        &mut self,
        value: &T,
        key: K,
    ) -> Result<(), Error> {
        self.nested(key, |child| value.encode_to(child))
    }

    fn insert(&mut self, key: AnyKey, encoded: Value) -> Result<(), Error> {
        if self.single {
            return Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!(
                    "cannot write key into a context holding a single {}",
                    Shape::of(&self.value)
                ))
                .with_expected(Shape::Object)
                .with_hint("A context written with encode_single takes no keyed writes.")
                .locate(&self.path, key.as_str()));
        }
        if self.value.is_null() {
            self.value = Value::Object(Map::new());
        }
        match &mut self.value {
            Value::Object(map) => {
                map.insert(key.as_str().to_string(), encoded);
                Ok(())
            }
            other => Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!(
                    "cannot write key into a context holding a single {}",
                    Shape::of(other)
                ))
                .with_expected(Shape::Object)
                .locate(&self.path, key.as_str())),
        }
    }

    fn at(&self, key: &AnyKey, err: Error) -> Error {
        err.locate(&self.path, key.as_str())
    }
}

fn to_tree<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    ensure_finite(value)?;
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Encode)
            .with_message(err.to_string())
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::core::date::Rfc3339Format;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::transform::FnTransform;
    use serde_json::json;
    use std::collections::HashMap;
    use time::macros::datetime;

    #[test]
    fn keyed_writes_build_an_ordered_object() {
        let mut encoder = Encoder::new();
        encoder.encode("ada", "name").expect("name");
        encoder.encode(&36, "age").expect("age");
        encoder.encode_if_present::<String, _>(None, "nickname").expect("skip");
        encoder.encode_null("manager").expect("null");

        let value = encoder.into_value();
        assert_eq!(value, json!({"name": "ada", "age": 36, "manager": null}));
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["name", "age", "manager"]);
    }

    #[test]
    fn single_value_context_rejects_keyed_writes() {
        let mut encoder = Encoder::new();
        encoder.encode_single(&7u8).expect("single");
        let err = encoder.encode(&1, "extra").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(encoder.value(), &json!(7));
    }

    #[test]
    fn null_single_value_still_rejects_keyed_writes() {
        let mut encoder = Encoder::new();
        encoder.encode_single(&None::<i32>).expect("single");
        let err = encoder.encode(&1, "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.key(), Some("a"));
        assert!(encoder.encode_null("b").is_err());
        assert_eq!(encoder.value(), &json!(null));

        let mut unit = Encoder::new();
        unit.encode_single(&()).expect("unit");
        assert!(unit.nested("child", |_| Ok(())).is_err());
    }

    #[test]
    fn non_finite_floats_are_encode_errors() {
        let mut encoder = Encoder::new();
        encoder.encode(&1.5, "kept").expect("finite");

        let err = encoder.encode(&f64::INFINITY, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(err.key(), Some("x"));

        let err = encoder.encode(&vec![1.0f32, f32::NAN], "list").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(encoder.value(), &json!({"kept": 1.5}));

        let err = Encoder::new().encode_single(&f64::NEG_INFINITY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
    }

    #[test]
    fn failed_transform_leaves_no_partial_write() {
        let mut encoder = Encoder::new();
        encoder.encode(&1, "kept").expect("kept");

        let positive = FnTransform::new(
            |value: &i64| -> Result<u64, String> {
                u64::try_from(*value).map_err(|_| format!("{value} is negative"))
            },
            |value: u64| -> Result<i64, String> {
                i64::try_from(value).map_err(|err| err.to_string())
            },
        );
        let err = encoder.encode_with(&-5, "count", &positive).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransformFailure);
        assert_eq!(err.key(), Some("count"));
        assert_eq!(encoder.value(), &json!({"kept": 1}));
    }

    #[test]
    fn unencodable_value_is_encode_error() {
        let mut encoder = Encoder::new();
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = encoder.encode(&bad, "map").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(encoder.value(), &json!(null));
    }

    #[test]
    fn nested_failure_discards_child_and_reports_path() {
        let mut encoder = Encoder::new();
        let err = encoder
            .nested("user", |user| {
                user.encode("ada", "name")?;
                user.nested("address", |_| {
                    Err(Error::new(ErrorKind::TransformFailure).with_message("boom"))
                })
            })
            .unwrap_err();
        assert_eq!(err.key(), Some("address"));
        assert_eq!(err.path(), ["user".to_string()]);
        assert_eq!(encoder.value(), &json!(null));

        encoder
            .nested("user", |user| user.encode("ada", "name"))
            .expect("nested");
        assert_eq!(encoder.into_value(), json!({"user": {"name": "ada"}}));
    }

    #[test]
    fn dates_are_written_as_formatted_strings() {
        let mut encoder = Encoder::new();
        encoder
            .encode_date(&datetime!(2024-03-15 09:30 UTC), "at", Rfc3339Format)
            .expect("date");
        assert_eq!(encoder.into_value(), json!({"at": "2024-03-15T09:30:00Z"}));
    }
}
