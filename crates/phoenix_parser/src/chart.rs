//! Edges and the position-indexed chart.
//!
//! An [`Edge`] records that a net matched the script over `[start, end)`.
//! Edges, their child pointers and their chart links each live in their own
//! fixed-capacity arena, so one sentence can never allocate without bound.
//! The chart also remembers, per `(net, position)`, whether the net has been
//! attempted there and which edges it produced. A net/span pair gets at most
//! one edge.

use std::collections::HashMap;

use phoenix_foundation::{Arena, Capacity, Result, Span, arena_id};
use phoenix_grammar::NetId;

use crate::config::ParserConfig;

arena_id! {
    /// An edge in the chart.
    pub struct EdgeId;
}

arena_id! {
    /// Membership of an edge in its start position's bucket.
    pub struct EdgeLinkId;
}

arena_id! {
    /// One child pointer of an edge.
    pub struct ChildSlotId;
}

/// A successful match of one net over a span of the script.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    /// The matched net.
    pub net: NetId,
    /// First position covered.
    pub start: usize,
    /// One past the last position covered.
    pub end: usize,
    /// Words covered.
    pub score: usize,
    /// Sub-net edges in left-to-right order.
    pub children: Span,
}

/// Links an edge into the bucket of its start position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgeLink {
    /// The linked edge.
    pub edge: EdgeId,
}

/// What the chart knows about a net at a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attempt<'a> {
    /// Never tried.
    Unattempted,
    /// Being matched further up the call stack, with the edges its earlier
    /// rounds found.
    InProgress(&'a [EdgeId]),
    /// Finished, with the edges found (possibly none).
    Done(&'a [EdgeId]),
}

#[derive(Clone, Debug)]
enum Memo {
    InProgress(Vec<EdgeId>),
    Done(Vec<EdgeId>),
}

/// Edges of one sentence.
pub struct Chart {
    edges: Arena<EdgeId, Edge>,
    links: Arena<EdgeLinkId, EdgeLink>,
    children: Arena<ChildSlotId, EdgeId>,
    buckets: Vec<Vec<EdgeLinkId>>,
    memo: HashMap<(NetId, usize), Memo>,
    spans: HashMap<(NetId, usize, usize), EdgeId>,
}

impl Chart {
    /// Creates an empty chart with the configured capacities.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            edges: Arena::new(Capacity::EdgeBuf, config.edge_buf_size),
            links: Arena::new(Capacity::ChartBuf, config.chart_buf_size),
            children: Arena::new(Capacity::PeBuf, config.pe_buf_size),
            buckets: Vec::new(),
            memo: HashMap::new(),
            spans: HashMap::new(),
        }
    }

    /// Clears everything and prepares one bucket per script position.
    pub fn reset(&mut self, positions: usize) {
        self.edges.reset();
        self.links.reset();
        self.children.reset();
        self.buckets.clear();
        self.buckets.resize_with(positions, Vec::new);
        self.memo.clear();
        self.spans.clear();
    }

    /// What is known about `net` at `pos`.
    #[must_use]
    pub fn attempt(&self, net: NetId, pos: usize) -> Attempt<'_> {
        match self.memo.get(&(net, pos)) {
            None => Attempt::Unattempted,
            Some(Memo::InProgress(seed)) => Attempt::InProgress(seed),
            Some(Memo::Done(edges)) => Attempt::Done(edges),
        }
    }

    pub(crate) fn open(&mut self, net: NetId, pos: usize, seed: Vec<EdgeId>) {
        self.memo.insert((net, pos), Memo::InProgress(seed));
    }

    /// Drops what is known about `net` at `pos`, so the next call matches it
    /// again.
    pub(crate) fn forget(&mut self, net: NetId, pos: usize) {
        self.memo.remove(&(net, pos));
    }

    pub(crate) fn close(&mut self, net: NetId, pos: usize, edges: Vec<EdgeId>) {
        self.memo.insert((net, pos), Memo::Done(edges));
    }

    /// Adds an edge and links it into the bucket of `start`. If the net
    /// already has an edge over `[start, end)`, that edge is returned instead.
    ///
    /// # Errors
    ///
    /// Returns an `EdgeBufSize`, `ChartBufSize` or `PeBufSize` overflow.
    pub fn add_edge(&mut self, net: NetId, start: usize, end: usize, children: &[EdgeId]) -> Result<EdgeId> {
        if let Some(&existing) = self.spans.get(&(net, start, end)) {
            return Ok(existing);
        }
        let children = self.children.alloc_span(children)?;
        let edge = self.edges.alloc(Edge {
            net,
            start,
            end,
            score: end - start,
            children,
        })?;
        let link = self.links.alloc(EdgeLink { edge })?;
        if let Some(bucket) = self.buckets.get_mut(start) {
            bucket.push(link);
        }
        self.spans.insert((net, start, end), edge);
        Ok(edge)
    }

    /// Gets an edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Child edges of an edge.
    #[must_use]
    pub fn children(&self, edge: &Edge) -> &[EdgeId] {
        self.children.span(edge.children)
    }

    /// Edges starting at `pos`, in the order they were found.
    pub fn bucket(&self, pos: usize) -> impl Iterator<Item = EdgeId> + '_ {
        self.buckets
            .get(pos)
            .into_iter()
            .flatten()
            .filter_map(|&link| self.links.get(link).map(|l| l.edge))
    }

    /// Number of positions.
    #[must_use]
    pub fn positions(&self) -> usize {
        self.buckets.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
