//! The construction automaton of the net being compiled.
//!
//! Unlike a finished [`Net`], construction arcs remember their source state
//! and may still be labelled with a non-terminal. Every non-terminal arc has
//! a [`NonTerminalRecord`]; resolving the record splices the symbol's rules
//! between the arc's endpoints. Non-terminal arcs are dropped when the net is
//! finished.

use phoenix_foundation::{Arena, ArenaId, Capacity, Result, SymbolId, WordId, arena_id};
use phoenix_grammar::{ArcKind, Net, NetArc, NetId, State, StateId};

use crate::config::CompilerConfig;

arena_id! {
    /// A state of the construction automaton.
    pub struct NfaStateId;
}

arena_id! {
    /// An arc of the construction automaton.
    pub struct NfaArcId;
}

arena_id! {
    /// A non-terminal record.
    pub struct NonTermId;
}

/// Arc label during construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Label {
    /// Epsilon.
    Null,
    /// Dictionary word.
    Word(WordId),
    /// Call to another net.
    Call(NetId),
    /// Placeholder still to be rewritten.
    NonTerminal(SymbolId),
}

/// A construction arc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaArc {
    /// Label.
    pub label: Label,
    /// Source state.
    pub from: NfaStateId,
    /// Destination state.
    pub to: NfaStateId,
    /// Head marker.
    pub head: bool,
    /// Inline feature string.
    pub feature: Option<String>,
}

/// A construction state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NfaState {
    /// Outgoing arcs in creation order.
    pub arcs: Vec<NfaArcId>,
    /// Final flag.
    pub is_final: bool,
}

/// One occurrence of a non-terminal arc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonTerminalRecord {
    /// The non-terminal.
    pub symbol: SymbolId,
    /// The arc labelled with it.
    pub arc: NfaArcId,
    /// How many rules were spliced into the arc.
    pub rewritten: u32,
    /// The record whose rewriting created this arc.
    pub parent: Option<NonTermId>,
}

/// States, arcs and non-terminal records of one net.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Arena<NfaStateId, NfaState>,
    arcs: Arena<NfaArcId, NfaArc>,
    records: Arena<NonTermId, NonTerminalRecord>,
}

impl Nfa {
    /// Creates an empty automaton with the configured capacities.
    #[must_use]
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            states: Arena::new(Capacity::Nfa, config.max_nfa),
            arcs: Arena::new(Capacity::SucLink, config.max_suc_link),
            records: Arena::new(Capacity::NonTerm, config.max_non_term),
        }
    }

    /// Adds a non-final state.
    ///
    /// # Errors
    ///
    /// Returns a `MaxNfa` overflow.
    pub fn add_state(&mut self) -> Result<NfaStateId> {
        self.states.alloc(NfaState::default())
    }

    /// Marks a state final.
    pub fn set_final(&mut self, state: NfaStateId) {
        if let Some(state) = self.states.get_mut(state) {
            state.is_final = true;
        }
    }

    /// Adds an arc and links it into its source state.
    ///
    /// # Errors
    ///
    /// Returns a `MaxSucLink` overflow.
    pub fn add_arc(&mut self, arc: NfaArc) -> Result<NfaArcId> {
        let from = arc.from;
        let id = self.arcs.alloc(arc)?;
        if let Some(state) = self.states.get_mut(from) {
            state.arcs.push(id);
        }
        Ok(id)
    }

    /// Adds an epsilon arc.
    ///
    /// # Errors
    ///
    /// Returns a `MaxSucLink` overflow.
    pub fn add_null(&mut self, from: NfaStateId, to: NfaStateId) -> Result<NfaArcId> {
        self.add_arc(NfaArc {
            label: Label::Null,
            from,
            to,
            head: false,
            feature: None,
        })
    }

    /// Records a non-terminal arc for later rewriting.
    ///
    /// # Errors
    ///
    /// Returns a `MaxNonTerm` overflow.
    pub fn record(&mut self, symbol: SymbolId, arc: NfaArcId, parent: Option<NonTermId>) -> Result<NonTermId> {
        self.records.alloc(NonTerminalRecord {
            symbol,
            arc,
            rewritten: 0,
            parent,
        })
    }

    /// Gets an arc.
    #[must_use]
    pub fn arc(&self, id: NfaArcId) -> Option<&NfaArc> {
        self.arcs.get(id)
    }

    /// Gets a state.
    #[must_use]
    pub fn state(&self, id: NfaStateId) -> Option<&NfaState> {
        self.states.get(id)
    }

    /// Gets a record.
    #[must_use]
    pub fn non_terminal(&self, id: NonTermId) -> Option<&NonTerminalRecord> {
        self.records.get(id)
    }

    /// Counts one more rule spliced into a record's arc.
    pub fn mark_rewritten(&mut self, id: NonTermId) {
        if let Some(record) = self.records.get_mut(id) {
            record.rewritten += 1;
        }
    }

    /// All records in creation order.
    pub fn non_terminals(&self) -> impl Iterator<Item = (NonTermId, &NonTerminalRecord)> {
        self.records.iter()
    }

    /// Number of records created so far.
    #[must_use]
    pub fn non_terminal_count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if `symbol` labels one of the records that led to `id`.
    #[must_use]
    pub fn expands_within(&self, id: NonTermId, symbol: SymbolId) -> bool {
        let mut next = self.records.get(id).and_then(|r| r.parent);
        while let Some(ancestor) = next {
            let Some(record) = self.records.get(ancestor) else {
                break;
            };
            if record.symbol == symbol {
                return true;
            }
            next = record.parent;
        }
        false
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of arcs that survive into the finished net.
    #[must_use]
    pub fn terminal_arc_count(&self) -> usize {
        self.arcs
            .as_slice()
            .iter()
            .filter(|a| !matches!(a.label, Label::NonTerminal(_)))
            .count()
    }

    /// Clears everything for the next net.
    pub fn reset(&mut self) {
        self.states.reset();
        self.arcs.reset();
        self.records.reset();
    }

    /// Builds the finished net, dropping non-terminal arcs.
    #[must_use]
    pub fn to_net(&self, id: NetId, name: &str, feature: Option<String>) -> Net {
        let mut net = Net::new(id, name);
        net.feature = feature;
        net.states = self
            .states
            .as_slice()
            .iter()
            .map(|state| State {
                arcs: state
                    .arcs
                    .iter()
                    .filter_map(|&a| self.arcs.get(a))
                    .filter_map(|arc| {
                        let kind = match arc.label {
                            Label::Null => ArcKind::Null,
                            Label::Word(word) => ArcKind::Word(word),
                            Label::Call(net) => ArcKind::Call(net),
                            Label::NonTerminal(_) => return None,
                        };
                        Some(NetArc {
                            kind,
                            dest: StateId::new(arc.to.raw()),
                            head: arc.head,
                            feature: arc.feature.clone(),
                        })
                    })
                    .collect(),
                is_final: state.is_final,
            })
            .collect();
        net
    }
}
