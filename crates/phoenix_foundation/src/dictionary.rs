//! Persistent word dictionary.
//!
//! Maps upper-cased surface words to stable integer ids. The dictionary is
//! shared across compiler runs: it is loaded before compiling, grows as rules
//! reference new words, and is rewritten wholesale when anything was added.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Identifier of a dictionary word. Id 0 is never assigned.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordId(pub(crate) u32);

impl WordId {
    /// The null label shared with epsilon arcs.
    pub const NULL: WordId = WordId(0);

    /// Creates a word id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Word ↔ id table with a dirty flag.
#[derive(Clone, Debug, Default)]
pub struct WordDictionary {
    words: BTreeMap<WordId, Arc<str>>,
    ids: HashMap<Arc<str>, WordId>,
    max_id: u32,
    dirty: bool,
}

impl WordDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-normalizes a word the way the dictionary stores it.
    #[must_use]
    pub fn normalize(word: &str) -> String {
        word.to_uppercase()
    }

    /// Loads a dictionary file of `WORD id` lines.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a format error
    /// naming the first malformed line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parses dictionary text. `source` names the text in error messages.
    ///
    /// # Errors
    ///
    /// Returns a format error for a line that is not `WORD id` with a
    /// positive id.
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let mut dict = Self::new();
        for (n, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let id = fields
                .next()
                .and_then(|f| f.parse::<u32>().ok())
                .filter(|&id| id > 0)
                .ok_or_else(|| Error::format(source, n + 1, format!("bad dictionary entry: {line}")))?;
            dict.insert(&Self::normalize(word), WordId(id));
        }
        Ok(dict)
    }

    fn insert(&mut self, word: &str, id: WordId) {
        let text: Arc<str> = word.into();
        if let Some(previous) = self.words.insert(id, text.clone()) {
            log::warn!("dictionary id {} reassigned from {previous} to {word}", id.0);
            self.ids.remove(&previous);
        }
        if let Some(old) = self.ids.insert(text, id) {
            if old != id {
                log::warn!("dictionary word {word} listed twice, keeping id {}", id.0);
                self.words.remove(&old);
            }
        }
        self.max_id = self.max_id.max(id.0);
    }

    /// Looks up a word (case-insensitively).
    #[must_use]
    pub fn lookup(&self, word: &str) -> Option<WordId> {
        self.ids
            .get(word)
            .or_else(|| self.ids.get(Self::normalize(word).as_str()))
            .copied()
    }

    /// Returns the id of a word, adding it with the next free id if absent.
    ///
    /// Adding a word marks the dictionary dirty.
    pub fn add_if_absent(&mut self, word: &str) -> WordId {
        let normalized = Self::normalize(word);
        if let Some(&id) = self.ids.get(normalized.as_str()) {
            return id;
        }
        let id = WordId(self.max_id + 1);
        self.insert(&normalized, id);
        self.dirty = true;
        id
    }

    /// Gets the text of a word id.
    #[must_use]
    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(&id).map(AsRef::as_ref)
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the dictionary has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Largest assigned id.
    #[must_use]
    pub const fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Returns true if words were added since loading or saving.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Iterates words in id order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &str)> {
        self.words.iter().map(|(id, w)| (*id, w.as_ref()))
    }

    /// Renders the whole dictionary as `WORD id` lines in id order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (id, word) in self.iter() {
            let _ = writeln!(out, "{word} {}", id.0);
        }
        out
    }

    /// Rewrites the dictionary file and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|e| Error::io(path, e))?;
        self.dirty = false;
        Ok(())
    }
}
