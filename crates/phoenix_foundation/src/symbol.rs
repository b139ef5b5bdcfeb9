//! Symbol interning for grammar compilation.
//!
//! Net names, non-terminals and words share one table of dense ids. Id 0 is
//! the reserved null symbol `*`. Net names are registered first, from the net
//! list, so they occupy ids `1..=last_net` and their symbol id doubles as
//! their net number.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Capacity, Error, ErrorKind, Result};

/// Interned symbol identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// The reserved null/epsilon symbol.
    pub const NULL: SymbolId = SymbolId(0);

    /// Creates a symbol id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// The class a symbol was created with. It never changes afterwards.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolClass {
    /// The reserved null symbol.
    Null,
    /// A net name such as `[Date]`.
    Net,
    /// A rewritable placeholder such as `<NP>` or a macro name.
    NonTerminal,
    /// A literal word.
    Word,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Net => "net",
            Self::NonTerminal => "non-terminal",
            Self::Word => "word",
        };
        f.write_str(name)
    }
}

/// Bidirectional symbol ↔ id table with a fixed capacity.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    strings: Vec<Arc<str>>,
    classes: Vec<SymbolClass>,
    index: HashMap<Arc<str>, SymbolId>,
    last_net: u32,
    limit: usize,
}

impl SymbolTable {
    /// Text of the reserved null symbol.
    pub const NULL_TEXT: &'static str = "*";

    /// Creates a table holding at most `limit` symbols, with the null symbol
    /// pre-interned at id 0.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let null: Arc<str> = Self::NULL_TEXT.into();
        let mut index = HashMap::new();
        index.insert(null.clone(), SymbolId::NULL);
        Self {
            strings: vec![null],
            classes: vec![SymbolClass::Null],
            index,
            last_net: 0,
            limit,
        }
    }

    /// Registers the net names from the net list, in order.
    ///
    /// Returns the id of the last net.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateNet`] if a name repeats, or an overflow
    /// if the list does not fit in the table.
    pub fn register_nets<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<u32> {
        for name in names {
            if self.index.contains_key(name) {
                return Err(Error::new(ErrorKind::DuplicateNet(name.to_string())));
            }
            let id = self.push(name, SymbolClass::Net)?;
            self.last_net = id.0;
        }
        Ok(self.last_net)
    }

    /// Resolves a registered net name. Nets cannot be created after
    /// registration, so an unknown name yields `None`.
    #[must_use]
    pub fn intern_net(&self, name: &str) -> Option<SymbolId> {
        self.find(name)
            .filter(|id| self.class(*id) == Some(SymbolClass::Net))
    }

    /// Interns a non-terminal.
    ///
    /// # Errors
    ///
    /// Fails if the text already names a symbol of another class, or on overflow.
    pub fn intern_non_terminal(&mut self, name: &str) -> Result<SymbolId> {
        self.intern(name, SymbolClass::NonTerminal)
    }

    /// Interns a word.
    ///
    /// # Errors
    ///
    /// Fails if the text already names a symbol of another class, or on overflow.
    pub fn intern_word(&mut self, word: &str) -> Result<SymbolId> {
        self.intern(word, SymbolClass::Word)
    }

    fn intern(&mut self, text: &str, class: SymbolClass) -> Result<SymbolId> {
        if let Some(&id) = self.index.get(text) {
            let existing = self.classes[id.0 as usize];
            if existing == class {
                return Ok(id);
            }
            return Err(Error::new(ErrorKind::SymbolClass {
                symbol: text.to_string(),
                existing,
            }));
        }
        self.push(text, class)
    }

    fn push(&mut self, text: &str, class: SymbolClass) -> Result<SymbolId> {
        if self.strings.len() >= self.limit {
            return Err(Error::arena_overflow(Capacity::Symbol, self.limit));
        }
        let raw = u32::try_from(self.strings.len())
            .map_err(|_| Error::arena_overflow(Capacity::Symbol, self.limit))?;
        let id = SymbolId(raw);
        let arc: Arc<str> = text.into();
        self.strings.push(arc.clone());
        self.classes.push(class);
        self.index.insert(arc, id);
        Ok(id)
    }

    /// Gets the text of a symbol.
    #[must_use]
    pub fn lookup(&self, id: SymbolId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Finds the id of a symbol text.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<SymbolId> {
        self.index.get(text).copied()
    }

    /// Gets the class of a symbol.
    #[must_use]
    pub fn class(&self, id: SymbolId) -> Option<SymbolClass> {
        self.classes.get(id.0 as usize).copied()
    }

    /// Id of the last registered net (0 when none are registered).
    #[must_use]
    pub const fn last_net(&self) -> u32 {
        self.last_net
    }

    /// Number of symbols, including the null symbol.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if only the null symbol is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Iterates registered nets as `(id, name)`.
    pub fn nets(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.strings
            .iter()
            .zip(0u32..)
            .skip(1)
            .take(self.last_net as usize)
            .map(|(name, raw)| (SymbolId(raw), name.as_ref()))
    }

    /// Forgets every symbol interned after the net names.
    ///
    /// Called between nets so that non-terminal names are scoped to the net
    /// that defines them.
    pub fn reset(&mut self) {
        let keep = self.last_net as usize + 1;
        for dropped in self.strings.drain(keep..) {
            self.index.remove(&dropped);
        }
        self.classes.truncate(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_symbol_is_reserved() {
        let table = SymbolTable::new(16);
        assert_eq!(table.find("*"), Some(SymbolId::NULL));
        assert_eq!(table.lookup(SymbolId::NULL), Some("*"));
        assert_eq!(table.class(SymbolId::NULL), Some(SymbolClass::Null));
        assert!(table.is_empty());
    }

    #[test]
    fn nets_occupy_low_ids() {
        let mut table = SymbolTable::new(16);
        let last = table.register_nets(["[Greeting]", "[Date]"]).unwrap();
        assert_eq!(last, 2);
        assert_eq!(table.intern_net("[Greeting]"), Some(SymbolId::new(1)));
        assert_eq!(table.intern_net("[Date]"), Some(SymbolId::new(2)));
        assert_eq!(table.intern_net("[Time]"), None);

        let names: Vec<_> = table.nets().map(|(_, name)| name).collect();
        assert_eq!(names, vec!["[Greeting]", "[Date]"]);
    }

    #[test]
    fn duplicate_net_is_rejected() {
        let mut table = SymbolTable::new(16);
        let err = table.register_nets(["[A]", "[A]"]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateNet(ref n) if n == "[A]"));
    }

    #[test]
    fn class_never_changes() {
        let mut table = SymbolTable::new(16);
        let nt = table.intern_non_terminal("<NP>").unwrap();
        assert_eq!(table.intern_non_terminal("<NP>").unwrap(), nt);

        let err = table.intern_word("<NP>").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::SymbolClass { existing: SymbolClass::NonTerminal, .. }
        ));
    }

    #[test]
    fn overflow_at_limit() {
        let mut table = SymbolTable::new(2);
        table.intern_word("HELLO").unwrap();
        let err = table.intern_word("THERE").unwrap_err();
        assert_eq!(err.overflow().map(|l| l.capacity), Some(Capacity::Symbol));
    }

    #[test]
    fn reset_keeps_nets_only() {
        let mut table = SymbolTable::new(16);
        table.register_nets(["[A]"]).unwrap();
        table.intern_non_terminal("<X>").unwrap();
        table.intern_word("HELLO").unwrap();
        assert_eq!(table.len(), 4);

        table.reset();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("<X>"), None);
        assert_eq!(table.find("HELLO"), None);
        assert_eq!(table.intern_net("[A]"), Some(SymbolId::new(1)));

        // Ids are dense again after reset.
        assert_eq!(table.intern_word("THERE").unwrap(), SymbolId::new(2));
    }
}
