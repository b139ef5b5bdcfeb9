//! Splicing one rule into the automaton.
//!
//! Rewriting a non-terminal arc `S -<X>-> D` with a rule lays the rule's
//! tokens out as a path from `S` that ends in `D`, so the net's start and end
//! states never move. Per token, with `cur` starting at `S`:
//!
//! ```text
//! plain          cur -tok-> N
//! *tok           cur -tok-> N,  cur -ε-> N
//! +tok           cur -tok-> N,  N -tok-> N
//! *+tok          cur -ε-> N,    N -tok-> N      (first, or after a repeat)
//!                cur -tok-> cur                 (after a plain token)
//! ```
//!
//! The last token targets `D` instead of a fresh `N`; a repeating last token
//! keeps its loop state and leaves it through `-ε-> D`. A looping `*+tok`
//! never attaches to `S` itself or to a state that already loops, so two
//! adjacent repeats cannot bleed into each other.

use phoenix_foundation::{Error, ErrorKind, Result};

use crate::nfa::{Label, Nfa, NfaArc, NfaStateId, NonTermId};

/// A rule token with its symbol resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedToken {
    /// Arc label.
    pub label: Label,
    /// `*` decoration.
    pub optional: bool,
    /// `+` decoration.
    pub self_loop: bool,
    /// `!` decoration.
    pub head: bool,
    /// `.{...}` decoration.
    pub feature: Option<String>,
}

impl ResolvedToken {
    /// An undecorated token.
    #[must_use]
    pub fn plain(label: Label) -> Self {
        Self {
            label,
            optional: false,
            self_loop: false,
            head: false,
            feature: None,
        }
    }
}

/// Applies rules to non-terminal arcs of one automaton.
pub struct NetBuilder<'a> {
    nfa: &'a mut Nfa,
}

impl<'a> NetBuilder<'a> {
    /// Creates a builder over an automaton.
    pub fn new(nfa: &'a mut Nfa) -> Self {
        Self { nfa }
    }

    /// Splices `tokens` between the endpoints of `record`'s arc.
    ///
    /// Non-terminal tokens produce new records whose parent is `record`.
    ///
    /// # Errors
    ///
    /// Returns an overflow if a capacity is exhausted, or an internal error
    /// for an empty rule or unknown record.
    pub fn rewrite(&mut self, record: NonTermId, tokens: &[ResolvedToken]) -> Result<()> {
        let arc = self
            .nfa
            .non_terminal(record)
            .and_then(|r| self.nfa.arc(r.arc))
            .ok_or_else(|| Error::new(ErrorKind::Internal("unknown non-terminal record".into())))?;
        let (source, dest) = (arc.from, arc.to);
        let Some((last, init)) = tokens.split_last() else {
            return Err(Error::new(ErrorKind::Internal("empty rule".into())));
        };

        let mut cur = source;
        let mut prev_self = true;
        for token in init {
            if token.optional && token.self_loop {
                cur = self.loop_state(cur, prev_self)?;
                self.token_arc(record, token, cur, cur)?;
            } else {
                let next = self.nfa.add_state()?;
                self.token_arc(record, token, cur, next)?;
                if token.optional {
                    self.nfa.add_null(cur, next)?;
                }
                if token.self_loop {
                    self.token_arc(record, token, next, next)?;
                }
                cur = next;
            }
            prev_self = token.self_loop;
        }

        if last.optional && last.self_loop {
            let looping = self.loop_state(cur, prev_self)?;
            self.token_arc(record, last, looping, looping)?;
            self.nfa.add_null(looping, dest)?;
        } else if last.self_loop {
            let looping = self.nfa.add_state()?;
            self.token_arc(record, last, cur, looping)?;
            self.token_arc(record, last, looping, looping)?;
            self.nfa.add_null(looping, dest)?;
        } else {
            self.token_arc(record, last, cur, dest)?;
            if last.optional {
                self.nfa.add_null(cur, dest)?;
            }
        }
        Ok(())
    }

    /// The state a `*+` token loops on: a fresh state behind an epsilon arc
    /// when `cur` is the rule start or already loops, otherwise `cur` itself.
    fn loop_state(&mut self, cur: NfaStateId, prev_self: bool) -> Result<NfaStateId> {
        if !prev_self {
            return Ok(cur);
        }
        let state = self.nfa.add_state()?;
        self.nfa.add_null(cur, state)?;
        Ok(state)
    }

    fn token_arc(
        &mut self,
        record: NonTermId,
        token: &ResolvedToken,
        from: NfaStateId,
        to: NfaStateId,
    ) -> Result<()> {
        let arc = self.nfa.add_arc(NfaArc {
            label: token.label,
            from,
            to,
            head: token.head,
            feature: token.feature.clone(),
        })?;
        if let Label::NonTerminal(symbol) = token.label {
            self.nfa.record(symbol, arc, Some(record))?;
        }
        Ok(())
    }
}
