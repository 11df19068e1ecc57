//! Statement tokens as produced by the parser.
//!
//! An [`Entry`] is one parsed statement: an ordered run of [`Word`]s. Directive
//! dispatch splits an entry around the governing word with [`Entry::slice`].

use std::fmt;

use crate::{Key, Name};

/// A single token of a statement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Word {
    /// Unquoted text, eligible for lookup.
    Bare(Name),
    /// Quoted text, always taken literally by directives.
    Quoted(Name),
}

impl Word {
    /// Create a bare word.
    pub fn bare(text: &str) -> Self {
        Word::Bare(Name::from(text))
    }

    /// Create a quoted word.
    pub fn quoted(text: &str) -> Self {
        Word::Quoted(Name::from(text))
    }

    /// Reduce this word to a single path segment.
    pub fn flatten(&self) -> Key {
        match self {
            Word::Bare(name) if name == "_" => Key::Placeholder,
            Word::Bare(name) | Word::Quoted(name) => Key::Name(name.clone()),
        }
    }

    /// The raw text of the word, without quotes.
    pub fn text(&self) -> &str {
        match self {
            Word::Bare(name) | Word::Quoted(name) => name.as_str(),
        }
    }

    /// Returns `true` for quoted words.
    pub fn is_quoted(&self) -> bool {
        matches!(self, Word::Quoted(_))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Word::Bare(name) => write!(f, "{name}"),
            Word::Quoted(name) => write!(f, "{:?}", name.as_str()),
        }
    }
}

/// An ordered, sliceable sequence of words.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Entry {
    words: Vec<Word>,
}

impl Entry {
    /// Create an entry from words.
    pub fn new(words: Vec<Word>) -> Self {
        Entry { words }
    }

    /// Convenience constructor from bare word texts.
    pub fn bare(texts: &[&str]) -> Self {
        texts.iter().map(|text| Word::bare(text)).collect()
    }

    /// Number of words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the entry has no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The word at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    /// Iterate over words in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    /// The words as a slice.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Sub-entry covering words `start..end`.
    ///
    /// Bounds are clamped to the entry, so an out-of-range slice is empty
    /// rather than a panic.
    pub fn slice(&self, start: usize, end: usize) -> Entry {
        let end = end.min(self.words.len());
        let start = start.min(end);
        Entry {
            words: self.words[start..end].to_vec(),
        }
    }

    /// Flatten every word into a path segment.
    pub fn to_keys(&self) -> Vec<Key> {
        self.words.iter().map(Word::flatten).collect()
    }
}

impl FromIterator<Word> for Entry {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        Entry {
            words: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Entry {
    type Item = &'a Word;
    type IntoIter = std::slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, word) in self.words.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}
