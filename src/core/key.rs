//! Purpose: Key abstraction for keyed container access.
//! Exports: `CodingKey`, `AnyKey`.
//! Role: Let call sites pass raw strings or their own typed key enums.
//! Invariants: Two keys are equal iff their string forms are equal.
//! Invariants: Wrapping a string never changes its string form.
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A key addressing one entry of a keyed container.
///
/// Typed key enums implement this by mapping each variant to its wire name:
///
/// ```ignore
/// enum UserKey { Name, Email }
///
/// impl CodingKey for UserKey {
///     fn as_str(&self) -> &str {
///         match self {
///             UserKey::Name => "name",
///             UserKey::Email => "email",
///         }
///     }
/// }
/// ```
pub trait CodingKey {
    fn as_str(&self) -> &str;

    fn int_value(&self) -> Option<usize> {
        None
    }
}

impl CodingKey for str {
    fn as_str(&self) -> &str {
        self
    }
}

impl CodingKey for String {
    fn as_str(&self) -> &str {
        self
    }
}

impl<K: CodingKey + ?Sized> CodingKey for &K {
    fn as_str(&self) -> &str {
        (**self).as_str()
    }

    fn int_value(&self) -> Option<usize> {
        (**self).int_value()
    }
}

/// Ad-hoc key built from any other key or a plain string.
#[derive(Clone, Debug)]
pub struct AnyKey {
    name: String,
    index: Option<usize>,
}

impl AnyKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Positional key; its string form is the decimal index.
    pub fn index(index: usize) -> Self {
        Self {
            name: index.to_string(),
            index: Some(index),
        }
    }

    pub fn of<K: CodingKey + ?Sized>(key: &K) -> Self {
        Self {
            name: key.as_str().to_string(),
            index: key.int_value(),
        }
    }
}

impl CodingKey for AnyKey {
    fn as_str(&self) -> &str {
        &self.name
    }

    fn int_value(&self) -> Option<usize> {
        self.index
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AnyKey {}

impl PartialOrd for AnyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for AnyKey {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl From<&str> for AnyKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AnyKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{AnyKey, CodingKey};
    use std::collections::HashSet;

    enum Field {
        Title,
        Slot(usize),
    }

    impl CodingKey for Field {
        fn as_str(&self) -> &str {
            match self {
                Field::Title => "title",
                Field::Slot(_) => "slot",
            }
        }

        fn int_value(&self) -> Option<usize> {
            match self {
                Field::Title => None,
                Field::Slot(index) => Some(*index),
            }
        }
    }

    #[test]
    fn string_key_wraps_without_index() {
        let key = AnyKey::from("title");
        assert_eq!(key.as_str(), "title");
        assert_eq!(key.int_value(), None);
        assert_eq!(key, AnyKey::of(&Field::Title));
    }

    #[test]
    fn equality_ignores_numeric_form() {
        let positional = AnyKey::index(3);
        assert_eq!(positional.as_str(), "3");
        assert_eq!(positional.int_value(), Some(3));
        assert_eq!(positional, AnyKey::new("3"));
        assert_eq!(AnyKey::of(&Field::Slot(7)).int_value(), Some(7));
    }

    #[test]
    fn distinct_strings_never_collide() {
        let names = ["a", "A", "a ", " a", "a.b", "", "ä"];
        let keys: HashSet<AnyKey> = names.iter().map(|name| AnyKey::from(*name)).collect();
        assert_eq!(keys.len(), names.len());
        for name in names {
            assert_eq!(AnyKey::from(name).as_str(), name);
        }
    }

    #[test]
    fn ordering_follows_string_form() {
        let mut keys = vec![AnyKey::new("b"), AnyKey::index(10), AnyKey::new("a")];
        keys.sort();
        let names: Vec<&str> = keys.iter().map(|key| key.as_str()).collect();
        assert_eq!(names, ["10", "a", "b"]);
    }
}
