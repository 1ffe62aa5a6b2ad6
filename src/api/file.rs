//! Purpose: Convenience save/load of whole values to and from files.
//! Exports: `save`, `load`.
//! Role: Thin wrappers: whole-value encode then a single byte write, or read then decode.
//! Invariants: Nothing touches the file unless encoding fully succeeded.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::codec::{decode_bytes, encode_value};
use crate::core::engine::Engine;
use crate::core::error::{Error, ErrorKind};

pub fn save<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
    engine: Option<&Engine>,
) -> Result<(), Error> {
    let path = path.as_ref();
    let bytes = encode_value(value, engine)?;
    std::fs::write(path, &bytes).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to write {}", path.display()))
            .with_source(err)
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved encoded value");
    Ok(())
}

pub fn load<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    engine: Option<&Engine>,
) -> Result<T, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded encoded value");
    decode_bytes(&bytes, engine)
}

#[cfg(test)]
mod tests {
    use super::{load, save};
    use crate::core::engine::Engine;
    use crate::core::error::ErrorKind;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("doc.cbor");
        let value = json!({"k": [1, 2, 3]});

        save(&path, &value, Some(&Engine::cbor())).expect("save");
        let back: Value = load(&path, Some(&Engine::cbor())).expect("load");
        assert_eq!(back, value);
    }

    #[test]
    fn failed_encode_never_creates_the_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.json");
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not json");

        let err = save(&path, &bad, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load::<Value>(temp.path().join("nope.json"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
