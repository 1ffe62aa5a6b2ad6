//! Purpose: Single error type shared by the facade, engines, and CLI.
//! Exports: `Error`, `ErrorKind`, `Shape`, `to_exit_code`.
//! Role: Carry a stable kind plus optional key, coding path, and cause.
//! Invariants: Kinds are stable; the CLI exit code mapping never changes meaning.
use std::error::Error as StdError;
use std::fmt;

use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    KeyNotFound,
    TypeMismatch,
    DataCorrupted,
    TransformFailure,
    Encode,
    Decode,
    Io,
    Usage,
}

/// Structural type of a serialized value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Shape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    key: Option<String>,
    path: Vec<String>,
    expected: Option<Shape>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            key: None,
            path: Vec::new(),
            expected: None,
            hint: None,
            source: None,
        }
    }

    /// Failure raised by a caller-supplied transformer.
    pub fn transform(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::TransformFailure).with_boxed_source(source.into())
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Keys of the containers enclosing the failing key, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Container shape the facade required, for failures it detects itself:
    /// keyed access on a non-object, `nested` on a non-object, and
    /// `decode_array_lossy` on a non-array.
    ///
    /// Leaf mismatches reported by serde (a number read as a string, say)
    /// leave this unset; serde's own expectation is in `message`.
    pub fn expected(&self) -> Option<Shape> {
        self.expected
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected(mut self, expected: Shape) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_boxed_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    // Errors bubbling out of nested containers already know where they happened.
    pub(crate) fn locate(mut self, path: &[String], key: &str) -> Self {
        if self.key.is_none() {
            self.key = Some(key.to_string());
            self.path = path.to_vec();
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        } else if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(key) = &self.key {
            if self.path.is_empty() {
                write!(f, " (key: {key})")?;
            } else {
                write!(f, " (key: {}.{key})", self.path.join("."))?;
            }
        }
        if let Some(expected) = self.expected {
            write!(f, " (expected: {expected})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Usage => 2,
        ErrorKind::KeyNotFound => 3,
        ErrorKind::TypeMismatch => 4,
        ErrorKind::DataCorrupted => 5,
        ErrorKind::TransformFailure => 6,
        ErrorKind::Encode => 7,
        ErrorKind::Decode => 8,
        ErrorKind::Io => 9,
    }
}
