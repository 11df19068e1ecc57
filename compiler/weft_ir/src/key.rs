//! Path segments and dotted paths.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::Name;

/// A single path segment.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Key {
    /// An ordinary name segment.
    Name(Name),
    /// The `_` placeholder segment.
    Placeholder,
    /// Sentinel under which a scope stores the prototype for its children.
    ///
    /// Never produced by the parser; enumeration skips it.
    Prototype,
}

impl Key {
    /// Shorthand for `Key::Name(Name::from(text))`.
    pub fn name(text: &str) -> Self {
        Key::Name(Name::from(text))
    }

    /// Returns the name if this is a `Name` segment.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Key::Name(name) => Some(name),
            Key::Placeholder | Key::Prototype => None,
        }
    }

    /// Whether this key may be used as a segment of a bind path.
    pub fn is_permitted(&self) -> bool {
        match self {
            Key::Name(name) => name.is_segment(),
            Key::Placeholder | Key::Prototype => true,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name.as_str()),
            Key::Placeholder => f.write_str("_"),
            Key::Prototype => f.write_str("<proto>"),
        }
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::name(text)
    }
}

impl From<Name> for Key {
    fn from(name: Name) -> Self {
        Key::Name(name)
    }
}

/// An ordered sequence of keys, rendered as `a.b.c`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Path(Vec<Key>);

impl Path {
    /// Create a path from keys.
    pub fn new(keys: Vec<Key>) -> Self {
        Path(keys)
    }

    /// Parse dotted text. `_` segments become [`Key::Placeholder`].
    ///
    /// Parsing never fails; malformed segments such as empty strings are kept
    /// so that binding can report them.
    pub fn parse(text: &str) -> Self {
        Path(
            text.split('.')
                .map(|segment| {
                    if segment == "_" {
                        Key::Placeholder
                    } else {
                        Key::name(segment)
                    }
                })
                .collect(),
        )
    }

    /// The keys of this path.
    #[inline]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Consume the path, returning its keys.
    pub fn into_keys(self) -> Vec<Key> {
        self.0
    }
}

impl Deref for Path {
    type Target = [Key];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<[Key]> for Path {
    fn borrow(&self) -> &[Key] {
        &self.0
    }
}

impl From<&[Key]> for Path {
    fn from(keys: &[Key]) -> Self {
        Path(keys.to_vec())
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Path(keys)
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
