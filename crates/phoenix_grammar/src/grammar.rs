//! The loaded grammar.
//!
//! [`Grammar`] is immutable once built. Parsers borrow it, so one grammar can
//! serve any number of parsers, each with its own arenas.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use phoenix_foundation::{Capacity, Error, Result, WordDictionary, WordId};

use crate::frames::{FrameDef, FrameId, parse_frames};
use crate::net::{Net, NetId};
use crate::netfile::{NetFile, read_nets};
use crate::priorities::parse_priorities;

/// Paths of the files that make up a compiled grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrammarFiles {
    /// Word dictionary.
    pub dictionary: PathBuf,
    /// Compiled net file.
    pub nets: PathBuf,
    /// Frame definitions, if any.
    pub frames: Option<PathBuf>,
    /// Net priorities, if any.
    pub priorities: Option<PathBuf>,
}

impl GrammarFiles {
    /// Default dictionary file name.
    pub const DICTIONARY: &'static str = "base.dic";
    /// Default frames file name.
    pub const FRAMES: &'static str = "forms";
    /// Default priorities file name.
    pub const PRIORITIES: &'static str = "NET_PRIORITIES";

    /// The standard layout of grammar `name` in `dir`: `base.dic`,
    /// `<name>.net`, and `forms` and `NET_PRIORITIES` when they exist.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>, name: &str) -> Self {
        let dir = dir.as_ref();
        let optional = |file: &str| {
            let path = dir.join(file);
            path.exists().then_some(path)
        };
        Self {
            dictionary: dir.join(Self::DICTIONARY),
            nets: dir.join(format!("{name}.net")),
            frames: optional(Self::FRAMES),
            priorities: optional(Self::PRIORITIES),
        }
    }

    /// Sets the frames file.
    #[must_use]
    pub fn with_frames(mut self, path: impl Into<PathBuf>) -> Self {
        self.frames = Some(path.into());
        self
    }

    /// Sets the priorities file.
    #[must_use]
    pub fn with_priorities(mut self, path: impl Into<PathBuf>) -> Self {
        self.priorities = Some(path.into());
        self
    }
}

/// A compiled grammar ready for parsing.
#[derive(Clone, Debug)]
pub struct Grammar {
    dictionary: WordDictionary,
    /// Indexed by net number - 1. Nets listed but never compiled are `None`.
    nets: Vec<Option<Net>>,
    names: HashMap<String, NetId>,
    frames: Vec<FrameDef>,
    priorities: HashMap<NetId, u32>,
    max_priority: u32,
}

impl Grammar {
    /// Builds a grammar from a dictionary and parsed net file.
    ///
    /// # Errors
    ///
    /// Returns a format error for a net numbered 0 or listed twice.
    pub fn new(dictionary: WordDictionary, file: NetFile) -> Result<Self> {
        let highest = file.nets.iter().map(|n| n.id.index() as usize).max().unwrap_or(0);
        let mut nets: Vec<Option<Net>> = vec![None; file.declared.max(highest)];
        let mut names = HashMap::new();

        for net in file.nets {
            let Some(slot) = (net.id.index() as usize).checked_sub(1).and_then(|i| nets.get_mut(i)) else {
                return Err(Error::format("nets", 0, format!("{} has invalid number 0", net.name)));
            };
            if slot.is_some() {
                return Err(Error::format("nets", 0, format!("net {} defined twice", net.id.index())));
            }
            names.insert(net.name.clone(), net.id);
            *slot = Some(net);
        }

        Ok(Self {
            dictionary,
            nets,
            names,
            frames: Vec::new(),
            priorities: HashMap::new(),
            max_priority: 0,
        })
    }

    /// Sets the frame definitions.
    #[must_use]
    pub fn with_frames(mut self, frames: Vec<FrameDef>) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the net priorities.
    #[must_use]
    pub fn with_priorities(mut self, priorities: HashMap<NetId, u32>) -> Self {
        self.max_priority = priorities.values().copied().max().unwrap_or(0);
        self.priorities = priorities;
        self
    }

    /// Loads a grammar from its files.
    ///
    /// `sym_buf_size` bounds the text of words and net names held in memory.
    ///
    /// # Errors
    ///
    /// Returns I/O errors for unreadable files, format errors for malformed
    /// ones, and a `SymBufSize` overflow if the names do not fit.
    pub fn load(files: &GrammarFiles, sym_buf_size: usize) -> Result<Self> {
        let dictionary = WordDictionary::load(&files.dictionary)?;
        let text = read(&files.nets)?;
        let net_file = read_nets(&text, &files.nets.display().to_string())?;
        let mut grammar = Self::new(dictionary, net_file)?;
        grammar.check_symbol_space(sym_buf_size)?;

        if let Some(path) = &files.frames {
            let frames = parse_frames(&read(path)?, &path.display().to_string(), |name| {
                grammar.net_by_name(name)
            })?;
            grammar.frames = frames;
        }
        if let Some(path) = &files.priorities {
            let priorities = parse_priorities(&read(path)?, &path.display().to_string(), |name| {
                grammar.net_by_name(name)
            })?;
            grammar = grammar.with_priorities(priorities);
        }

        log::info!(
            "loaded grammar: {} nets, {} words, {} frames",
            grammar.nets().count(),
            grammar.dictionary.len(),
            grammar.frames.len()
        );
        Ok(grammar)
    }

    /// Checks that word and net name text fits in `limit` bytes, counting one
    /// terminator per name.
    ///
    /// # Errors
    ///
    /// Returns a `SymBufSize` overflow.
    pub fn check_symbol_space(&self, limit: usize) -> Result<()> {
        let words: usize = self.dictionary.iter().map(|(_, w)| w.len() + 1).sum();
        let names: usize = self.nets().map(|n| n.name.len() + 1).sum();
        if words + names > limit {
            return Err(Error::arena_overflow(Capacity::SymBuf, limit));
        }
        Ok(())
    }

    /// The word dictionary.
    #[must_use]
    pub const fn dictionary(&self) -> &WordDictionary {
        &self.dictionary
    }

    /// Text of a word id.
    #[must_use]
    pub fn word(&self, id: WordId) -> Option<&str> {
        self.dictionary.word(id)
    }

    /// Gets a compiled net.
    #[must_use]
    pub fn net(&self, id: NetId) -> Option<&Net> {
        (id.index() as usize)
            .checked_sub(1)
            .and_then(|i| self.nets.get(i))
            .and_then(Option::as_ref)
    }

    /// Finds a net by its bracketed name.
    #[must_use]
    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.names.get(name).copied()
    }

    /// Iterates compiled nets in number order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.iter().flatten()
    }

    /// Number of net slots (the net list length).
    #[must_use]
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Frame definitions.
    #[must_use]
    pub fn frames(&self) -> &[FrameDef] {
        &self.frames
    }

    /// Gets a frame.
    #[must_use]
    pub fn frame(&self, id: FrameId) -> Option<&FrameDef> {
        self.frames.get(id.index())
    }

    /// Iterates frames with their ids.
    pub fn frame_ids(&self) -> impl Iterator<Item = (FrameId, &FrameDef)> {
        self.frames
            .iter()
            .zip(0u32..)
            .map(|(frame, raw)| (FrameId::new(raw), frame))
    }

    /// Priority of a net (0 if unlisted).
    #[must_use]
    pub fn priority(&self, id: NetId) -> u32 {
        self.priorities.get(&id).copied().unwrap_or(0)
    }

    /// Highest priority level in use.
    #[must_use]
    pub const fn max_priority(&self) -> u32 {
        self.max_priority
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{ArcKind, NetArc, State, StateId};
    use crate::netfile::write_nets;

    fn hello_net() -> Net {
        let mut net = Net::new(NetId::new(2), "[Greeting]");
        net.states = vec![
            State {
                arcs: vec![NetArc::new(ArcKind::Word(WordId::new(1)), StateId::new(1))],
                is_final: false,
            },
            State {
                arcs: vec![],
                is_final: true,
            },
        ];
        net
    }

    #[test]
    fn nets_are_indexed_by_number() {
        let file = NetFile {
            declared: 3,
            nets: vec![hello_net()],
        };
        let grammar = Grammar::new(WordDictionary::new(), file).unwrap();
        assert_eq!(grammar.net_count(), 3);
        assert!(grammar.net(NetId::new(1)).is_none());
        assert_eq!(grammar.net(NetId::new(2)).unwrap().name, "[Greeting]");
        assert!(grammar.net(NetId::new(0)).is_none());
        assert!(grammar.net(NetId::new(9)).is_none());
        assert_eq!(grammar.net_by_name("[Greeting]"), Some(NetId::new(2)));
    }

    #[test]
    fn duplicate_net_number_is_rejected() {
        let file = NetFile {
            declared: 2,
            nets: vec![hello_net(), hello_net()],
        };
        assert!(Grammar::new(WordDictionary::new(), file).is_err());
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.dic"), "HELLO 1\n").unwrap();
        fs::write(dir.path().join("g.net"), write_nets(2, &[hello_net()])).unwrap();
        fs::write(dir.path().join("forms"), "FUNCTION: Hi\nNETS:\n[Greeting]\n;\n").unwrap();
        fs::write(dir.path().join("NET_PRIORITIES"), "[Greeting] 3\n").unwrap();

        let files = GrammarFiles::in_dir(dir.path(), "g");
        let grammar = Grammar::load(&files, 1000).unwrap();
        assert_eq!(grammar.frames().len(), 1);
        assert_eq!(grammar.frames()[0].slots, vec![NetId::new(2)]);
        assert_eq!(grammar.priority(NetId::new(2)), 3);
        assert_eq!(grammar.max_priority(), 3);
        assert_eq!(grammar.word(WordId::new(1)), Some("HELLO"));
    }

    #[test]
    fn symbol_space_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.dic"), "HELLO 1\n").unwrap();
        fs::write(dir.path().join("g.net"), write_nets(2, &[hello_net()])).unwrap();

        let files = GrammarFiles::in_dir(dir.path(), "g");
        let err = Grammar::load(&files, 8).unwrap_err();
        assert_eq!(err.overflow().map(|l| l.capacity), Some(Capacity::SymBuf));
    }

    #[test]
    fn missing_optional_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let files = GrammarFiles::in_dir(dir.path(), "g");
        assert!(files.frames.is_none());
        assert!(files.priorities.is_none());
        assert!(Grammar::load(&files, 100).is_err());
    }
}
