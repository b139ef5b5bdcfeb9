//! Nets: named automata over words and calls to other nets.

use std::fmt;

use phoenix_foundation::{SymbolId, WordId};

/// Net number. Nets are numbered from 1 in net-list order; the number equals
/// the net's symbol id during compilation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NetId(u32);

impl NetId {
    /// Creates a net id from its raw number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw net number.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<SymbolId> for NetId {
    fn from(id: SymbolId) -> Self {
        Self(id.index())
    }
}

impl fmt::Debug for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetId({})", self.0)
    }
}

/// Index of a state within its net. State 0 is the start state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StateId(u32);

impl StateId {
    /// The start state of every net.
    pub const START: StateId = StateId(0);

    /// Creates a state id from its raw index.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the index as `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What an arc does when followed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArcKind {
    /// Epsilon transition; consumes nothing.
    Null,
    /// Consumes one input word.
    Word(WordId),
    /// Matches the called net at the current position.
    Call(NetId),
}

/// A transition out of a state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetArc {
    /// Label.
    pub kind: ArcKind,
    /// Destination state.
    pub dest: StateId,
    /// Grammatical head marker.
    pub head: bool,
    /// Inline feature string copied from the rule.
    pub feature: Option<String>,
}

impl NetArc {
    /// Creates an unmarked arc without features.
    #[must_use]
    pub fn new(kind: ArcKind, dest: StateId) -> Self {
        Self {
            kind,
            dest,
            head: false,
            feature: None,
        }
    }
}

/// A state with its outgoing arcs in order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct State {
    /// Outgoing arcs.
    pub arcs: Vec<NetArc>,
    /// Whether reaching this state completes the net.
    pub is_final: bool,
}

/// One compiled net.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Net {
    /// Net number.
    pub id: NetId,
    /// Bracketed name, e.g. `[Date]`.
    pub name: String,
    /// States, indexed by [`StateId`].
    pub states: Vec<State>,
    /// Whether every call in the net targets a non-concept net.
    pub concept_leaf: bool,
    /// Feature string from the net header.
    pub feature: Option<String>,
}

impl Net {
    /// Creates an empty net.
    #[must_use]
    pub fn new(id: NetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            states: Vec::new(),
            concept_leaf: false,
            feature: None,
        }
    }

    /// Gets a state by id.
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Number of states.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.states.len()
    }

    /// Total number of arcs.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    /// Iterates the nets this net calls, in arc order, with repeats.
    pub fn calls(&self) -> impl Iterator<Item = NetId> + '_ {
        self.states
            .iter()
            .flat_map(|s| s.arcs.iter())
            .filter_map(|arc| match arc.kind {
                ArcKind::Call(net) => Some(net),
                _ => None,
            })
    }
}
