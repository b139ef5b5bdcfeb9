//! First-word tables for bigram pruning.
//!
//! For each net, the words that can begin a match of it; for each state, the
//! words that can be consumed next and whether the state can reach a final
//! state without input. With these the matcher skips nets that cannot start
//! at a position and abandons paths the next word cannot continue.

use std::collections::{HashMap, HashSet};

use phoenix_foundation::WordId;
use phoenix_grammar::{ArcKind, Grammar, Net, NetId, StateId};

/// What can happen next from one state, before looking through calls.
#[derive(Clone, Debug, Default)]
struct Closure {
    words: HashSet<WordId>,
    calls: HashSet<NetId>,
    ends: bool,
}

#[derive(Clone, Debug, Default)]
struct Follow {
    words: HashSet<WordId>,
    ends: bool,
}

/// Per-grammar pruning tables.
#[derive(Clone, Debug, Default)]
pub struct BigramTables {
    first: HashMap<NetId, HashSet<WordId>>,
    follow: HashMap<(NetId, StateId), Follow>,
}

impl BigramTables {
    /// Computes the tables for every net of a grammar.
    #[must_use]
    pub fn build(grammar: &Grammar) -> Self {
        let closures: HashMap<(NetId, StateId), Closure> = grammar
            .nets()
            .flat_map(|net| {
                (0..net.node_count()).map(move |i| {
                    let state = StateId::new(u32::try_from(i).unwrap_or(u32::MAX));
                    ((net.id, state), closure(net, state))
                })
            })
            .collect();

        // first(net) depends on first(callee); iterate to a fixed point
        let mut first: HashMap<NetId, HashSet<WordId>> =
            grammar.nets().map(|net| (net.id, HashSet::new())).collect();
        loop {
            let mut changed = false;
            for net in grammar.nets() {
                let Some(start) = closures.get(&(net.id, StateId::START)) else {
                    continue;
                };
                let words = expand(start, &first);
                let entry = first.entry(net.id).or_default();
                if words.len() != entry.len() {
                    *entry = words;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let follow = closures
            .iter()
            .map(|(&key, c)| {
                let follow = Follow {
                    words: expand(c, &first),
                    ends: c.ends,
                };
                (key, follow)
            })
            .collect();

        Self { first, follow }
    }

    /// Returns true if `net` can begin with `word`.
    #[must_use]
    pub fn can_start(&self, net: NetId, word: Option<WordId>) -> bool {
        word.is_some_and(|w| self.first.get(&net).is_some_and(|set| set.contains(&w)))
    }

    /// Returns true if a path entering `state` of `net` can go on when the
    /// next word is `next`.
    #[must_use]
    pub fn can_continue(&self, net: NetId, state: StateId, next: Option<WordId>) -> bool {
        let Some(follow) = self.follow.get(&(net, state)) else {
            return false;
        };
        follow.ends || next.is_some_and(|w| follow.words.contains(&w))
    }

    /// Words that can begin `net`.
    pub fn first_words(&self, net: NetId) -> impl Iterator<Item = WordId> + '_ {
        self.first.get(&net).into_iter().flatten().copied()
    }
}

fn closure(net: &Net, from: StateId) -> Closure {
    let mut result = Closure::default();
    let mut seen = HashSet::from([from]);
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        let Some(state) = net.state(id) else {
            continue;
        };
        result.ends |= state.is_final;
        for arc in &state.arcs {
            match arc.kind {
                ArcKind::Null => {
                    if seen.insert(arc.dest) {
                        stack.push(arc.dest);
                    }
                }
                ArcKind::Word(word) => {
                    result.words.insert(word);
                }
                ArcKind::Call(callee) => {
                    result.calls.insert(callee);
                }
            }
        }
    }
    result
}

fn expand(closure: &Closure, first: &HashMap<NetId, HashSet<WordId>>) -> HashSet<WordId> {
    let mut words = closure.words.clone();
    for callee in &closure.calls {
        if let Some(set) = first.get(callee) {
            words.extend(set.iter().copied());
        }
    }
    words
}
