//! Matching nets against a script.
//!
//! [`ChartParser`] tries every active net at every position. A net is matched
//! by walking provisional paths through its states: word arcs consume the
//! word at the path's position, call arcs splice in every edge the called
//! net produces at that position, and epsilon arcs move without input. Each
//! time a path stands on a final state after consuming input, the span is
//! recorded as an edge.
//!
//! A call back into a net that is still being matched at the same position
//! returns the edges that net has found so far, starting from none. The net
//! is then matched again with its larger seed until a round adds no new span.
//! Nets matched underneath it meanwhile are not memoised, since they saw an
//! unfinished seed.

use std::collections::HashSet;

use log::{debug, trace, warn};

use phoenix_foundation::{ArenaLimit, Result, WordId};
use phoenix_grammar::{ArcKind, Grammar, Net, NetId, StateId};

use crate::chart::{Attempt, Chart, EdgeId};
use crate::config::ParserConfig;
use crate::prune::BigramTables;
use crate::script::Script;

/// Most sub-net edges one path may collect.
pub const PATH_TREE_DEPTH: usize = 50;

/// A net being matched, innermost last.
#[derive(Clone, Debug)]
struct Frame {
    net: NetId,
    pos: usize,
    /// Called back into while open; needs another round.
    head: bool,
    /// Ran under an open head, so its result may be incomplete.
    tainted: bool,
}

#[derive(Clone, Debug)]
struct Path {
    state: StateId,
    pos: usize,
    children: Vec<EdgeId>,
}

/// Fills a [`Chart`] with the edges of one sentence.
pub struct ChartParser<'g> {
    grammar: &'g Grammar,
    chart: Chart,
    prune: Option<BigramTables>,
    max_paths: usize,
    stack: Vec<Frame>,
}

impl<'g> ChartParser<'g> {
    /// Creates a chart parser. Pruning tables are built here when
    /// `BIGRAM_PRUNE` is on.
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: &ParserConfig) -> Self {
        let prune = config.bigram_prune.then(|| BigramTables::build(grammar));
        Self {
            grammar,
            chart: Chart::new(config),
            prune,
            max_paths: config.max_paths,
            stack: Vec::new(),
        }
    }

    /// The chart of the last sentence.
    #[must_use]
    pub const fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Matches `active` nets at every position of `script`.
    ///
    /// An arena overflow stops the pass; the edges found so far stay in the
    /// chart and the exhausted limit is returned.
    pub fn parse(&mut self, script: &Script, active: &[NetId]) -> Option<ArenaLimit> {
        self.chart.reset(script.len());
        self.stack.clear();
        for pos in 0..script.len() {
            for &net in active {
                if let Err(err) = self.match_net(script, net, pos) {
                    warn!("chart pass stopped at position {pos}: {err}");
                    return err.overflow().copied();
                }
            }
        }
        debug!("chart: {} edges over {} positions", self.chart.edge_count(), script.len());
        None
    }

    /// Matches one net at one position, returning its edges.
    ///
    /// # Errors
    ///
    /// Returns an overflow when an edge arena is full.
    pub fn match_net(&mut self, script: &Script, id: NetId, start: usize) -> Result<Vec<EdgeId>> {
        match self.chart.attempt(id, start) {
            Attempt::InProgress(seed) => {
                let seed = seed.to_vec();
                self.mark_cycle(id, start);
                return Ok(seed);
            }
            Attempt::Done(edges) => return Ok(edges.to_vec()),
            Attempt::Unattempted => {}
        }

        let grammar = self.grammar;
        let Some(net) = grammar.net(id) else {
            self.chart.close(id, start, Vec::new());
            return Ok(Vec::new());
        };
        if let Some(tables) = &self.prune {
            if !tables.can_start(id, script.word(start)) {
                self.chart.close(id, start, Vec::new());
                return Ok(Vec::new());
            }
        }

        self.chart.open(id, start, Vec::new());
        self.stack.push(Frame {
            net: id,
            pos: start,
            head: false,
            tainted: false,
        });
        let grown = self.grow(script, net, start);
        let frame = self.stack.pop();
        let edges = grown?;

        if !edges.is_empty() {
            trace!("{} at {start}: {} edges", net.name, edges.len());
        }
        if frame.is_some_and(|f| f.tainted) {
            self.chart.forget(id, start);
        } else {
            self.chart.close(id, start, edges.clone());
        }
        Ok(edges)
    }

    /// Expands the innermost frame's net, again with the edges found so far
    /// as its seed for as long as it was called back into and grew.
    fn grow(&mut self, script: &Script, net: &Net, start: usize) -> Result<Vec<EdgeId>> {
        let mut edges: Vec<EdgeId> = Vec::new();
        loop {
            let mut grew = false;
            for edge in self.expand(script, net, start)? {
                if !edges.contains(&edge) {
                    edges.push(edge);
                    grew = true;
                }
            }
            let Some(frame) = self.stack.last_mut() else {
                return Ok(edges);
            };
            if !(frame.head && grew) {
                return Ok(edges);
            }
            frame.head = false;
            trace!("{} at {start}: another round from {} edges", net.name, edges.len());
            self.chart.open(net.id, start, edges.clone());
        }
    }

    /// Marks the open frame for `(net, pos)` as a head and every frame opened
    /// above it as tainted.
    fn mark_cycle(&mut self, net: NetId, pos: usize) {
        let Some(head) = self.stack.iter().rposition(|f| f.net == net && f.pos == pos) else {
            return;
        };
        self.stack[head].head = true;
        for frame in &mut self.stack[head + 1..] {
            frame.tainted = true;
        }
    }

    fn expand(&mut self, script: &Script, net: &Net, start: usize) -> Result<Vec<EdgeId>> {
        let mut agenda = vec![Path {
            state: StateId::START,
            pos: start,
            children: Vec::new(),
        }];
        let mut seen = HashSet::from([(StateId::START, start)]);
        let mut ends = HashSet::new();
        let mut edges = Vec::new();

        while let Some(path) = agenda.pop() {
            let Some(state) = net.state(path.state) else {
                continue;
            };
            if state.is_final && path.pos > start && ends.insert(path.pos) {
                edges.push(self.chart.add_edge(net.id, start, path.pos, &path.children)?);
            }

            for arc in &state.arcs {
                match arc.kind {
                    ArcKind::Null => {
                        let next = Path {
                            state: arc.dest,
                            ..path.clone()
                        };
                        push(&mut agenda, &mut seen, next);
                    }
                    ArcKind::Word(word) => {
                        if script.word(path.pos) != Some(word)
                            || !self.may_continue(net.id, arc.dest, script.word(path.pos + 1))
                        {
                            continue;
                        }
                        let next = Path {
                            state: arc.dest,
                            pos: path.pos + 1,
                            children: path.children.clone(),
                        };
                        push(&mut agenda, &mut seen, next);
                    }
                    ArcKind::Call(callee) => {
                        if path.children.len() >= PATH_TREE_DEPTH {
                            continue;
                        }
                        for edge in self.match_net(script, callee, path.pos)? {
                            let Some(end) = self.chart.edge(edge).map(|e| e.end) else {
                                continue;
                            };
                            let mut children = path.children.clone();
                            children.push(edge);
                            let next = Path {
                                state: arc.dest,
                                pos: end,
                                children,
                            };
                            push(&mut agenda, &mut seen, next);
                        }
                    }
                }
            }

            if self.max_paths > 0 && agenda.len() > self.max_paths {
                // paths that have covered the fewest words go first
                agenda.sort_by_key(|p| p.pos);
                let excess = agenda.len() - self.max_paths;
                agenda.drain(..excess);
            }
        }
        Ok(edges)
    }

    fn may_continue(&self, net: NetId, state: StateId, next: Option<WordId>) -> bool {
        self.prune
            .as_ref()
            .is_none_or(|tables| tables.can_continue(net, state, next))
    }
}

fn push(agenda: &mut Vec<Path>, seen: &mut HashSet<(StateId, usize)>, path: Path) {
    if seen.insert((path.state, path.pos)) {
        agenda.push(path);
    }
}
