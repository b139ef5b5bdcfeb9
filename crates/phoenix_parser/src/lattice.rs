//! The slot lattice.
//!
//! Chains chart edges of slot nets into non-overlapping slot sequences and
//! ranks the sequences that explain the most words.
//!
//! Cells are indexed by end position. Walking the chart left to right, every
//! slot edge starting at `p` extends the best cell ending at or before `p`.
//! A cell keeps only its best sequences (most words, then fewest slots, then
//! fewest frames); equally good sequences share the cell. Each sequence node
//! remembers, for every frame its slot belongs to, how many frame instances a
//! sequence needs if that frame is open at this slot. Walking back from the
//! least fragmented nodes of the winning cell assigns a frame to every slot.

use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use phoenix_foundation::{Arena, ArenaLimit, Capacity, Result, Span, arena_id};
use phoenix_grammar::{FrameId, Grammar, NetId};

use crate::chart::{Chart, Edge, EdgeId};
use crate::config::ParserConfig;
use crate::history::FrameHistory;

arena_id! {
    /// A node of a slot sequence.
    pub struct SeqNodeId;
}

arena_id! {
    /// One fragmentation record of a sequence node.
    pub struct FidCellId;
}

arena_id! {
    /// One priority histogram counter.
    pub struct PriCellId;
}

arena_id! {
    /// One step of a frame-labelling walk.
    pub struct FrameNodeId;
}

/// Frame instances needed if `frame` is open at a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameCount {
    /// The frame.
    pub frame: FrameId,
    /// Frame instances used up to and including this slot.
    pub count: usize,
}

/// The last slot of a sequence and a link to the rest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SeqNode {
    /// The slot edge.
    pub edge: EdgeId,
    /// The sequence before this slot.
    pub prev: Option<SeqNodeId>,
    /// [`FrameCount`]s, one per frame of the slot net.
    pub fids: Span,
    /// Smallest count in `fids`.
    pub min_frag: usize,
    /// Slots per priority level, lowest level first.
    pub priorities: Span,
}

#[derive(Copy, Clone, Debug)]
struct FrameNode {
    seq: SeqNodeId,
    frame: Option<FrameId>,
    count: usize,
    next: Option<FrameNodeId>,
}

#[derive(Clone, Debug, Default)]
struct Cell {
    score: usize,
    slots: usize,
    frames: usize,
    nodes: Vec<SeqNodeId>,
}

impl Cell {
    fn rank(&self) -> (usize, Reverse<usize>, Reverse<usize>) {
        (self.score, Reverse(self.slots), Reverse(self.frames))
    }
}

/// Which nets fill slots, and of which frames.
#[derive(Clone, Debug, Default)]
pub struct SlotIndex {
    active: Vec<NetId>,
    frames: HashMap<NetId, Vec<FrameId>>,
    framed: bool,
}

impl SlotIndex {
    /// Indexes the slot nets of a grammar's frames. Without frames every net
    /// is a slot.
    #[must_use]
    pub fn new(grammar: &Grammar) -> Self {
        let mut index = Self::default();
        for (id, frame) in grammar.frame_ids() {
            for &net in &frame.slots {
                let frames = index.frames.entry(net).or_default();
                if frames.is_empty() {
                    index.active.push(net);
                }
                if !frames.contains(&id) {
                    frames.push(id);
                }
            }
        }
        index.framed = !index.frames.is_empty();
        if !index.framed {
            for net in grammar.nets() {
                index.active.push(net.id);
                index.frames.insert(net.id, Vec::new());
            }
        }
        index
    }

    /// Nets to match at every position, in frame-file order.
    #[must_use]
    pub fn active(&self) -> &[NetId] {
        &self.active
    }

    /// Frames that `net` is a slot of; `None` if it fills no slot.
    #[must_use]
    pub fn frames_of(&self, net: NetId) -> Option<&[FrameId]> {
        self.frames.get(&net).map(Vec::as_slice)
    }

    /// Returns true if the grammar defines frames.
    #[must_use]
    pub const fn is_framed(&self) -> bool {
        self.framed
    }
}

/// One slot of a candidate parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotChoice {
    /// The slot edge.
    pub edge: EdgeId,
    /// The frame the slot is assigned to; `None` without frames.
    pub frame: Option<FrameId>,
}

/// A ranked interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Slots in input order.
    pub slots: Vec<SlotChoice>,
    /// Words covered.
    pub score: usize,
    /// Frame instances used.
    pub frames: usize,
    /// Slots per priority level, lowest level first.
    pub histogram: Vec<u32>,
    /// Summed history recency of the frames used.
    pub recency: usize,
}

/// The ranked candidates of one sentence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lattice {
    /// Best first.
    pub candidates: Vec<Candidate>,
    /// Set when an arena filled up while building.
    pub overflow: Option<ArenaLimit>,
}

/// Builds and ranks slot sequences.
pub struct LatticeBuilder {
    nodes: Arena<SeqNodeId, SeqNode>,
    fids: Arena<FidCellId, FrameCount>,
    priorities: Arena<PriCellId, u32>,
    labels: Arena<FrameNodeId, FrameNode>,
    slot_seq_len: usize,
    parse_buf_size: usize,
    max_parses: usize,
    all_parses: bool,
}

impl LatticeBuilder {
    /// Creates a builder with the configured capacities.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            nodes: Arena::new(Capacity::SeqBuf, config.seq_buf_size),
            fids: Arena::new(Capacity::FidBuf, config.fid_buf_size),
            priorities: Arena::new(Capacity::PriBuf, config.pri_buf_size),
            labels: Arena::new(Capacity::FrameBuf, config.frame_buf_size),
            slot_seq_len: config.slot_seq_len,
            parse_buf_size: config.parse_buf_size,
            max_parses: config.max_parses,
            all_parses: config.all_parses,
        }
    }

    /// Builds the lattice of a filled chart.
    ///
    /// `history` is consulted only when given. Arena overflows are not
    /// errors: the candidates found before the overflow are ranked and
    /// returned with the exhausted limit.
    pub fn build(
        &mut self,
        grammar: &Grammar,
        slots: &SlotIndex,
        chart: &Chart,
        history: Option<&FrameHistory>,
    ) -> Lattice {
        self.nodes.reset();
        self.fids.reset();
        self.priorities.reset();
        self.labels.reset();

        let mut lattice = Lattice::default();
        let levels = grammar.max_priority() as usize + 1;
        let cells = match self.fill(grammar, slots, chart, levels) {
            Ok(cells) => cells,
            Err((cells, limit)) => {
                warn!("slot lattice truncated: {limit}");
                lattice.overflow = Some(limit);
                cells
            }
        };

        let Some(best) = cells
            .iter()
            .skip(1)
            .flatten()
            .fold(None::<&Cell>, |best, cell| match best {
                Some(b) if (b.score, Reverse(b.slots)) >= (cell.score, Reverse(cell.slots)) => Some(b),
                _ => Some(cell),
            })
        else {
            debug!("slot lattice: no slot edges");
            return lattice;
        };

        let ends: Vec<SeqNodeId> = best
            .nodes
            .iter()
            .copied()
            .filter(|&id| self.nodes.get(id).is_some_and(|n| n.min_frag == best.frames))
            .collect();

        let (labelled, overflow) = self.label(&ends);
        if let Some(limit) = overflow {
            warn!("frame labelling truncated: {limit}");
            lattice.overflow.get_or_insert(limit);
        }

        let mut candidates: Vec<Candidate> = labelled
            .into_iter()
            .map(|(head, last)| self.candidate(head, last, best.score, history))
            .collect();
        candidates.sort_by(compare);

        let mut seen = HashSet::new();
        let keep = if self.all_parses { self.max_parses } else { self.max_parses.min(1) };
        let mut fills = 0;
        for candidate in candidates {
            if lattice.candidates.len() >= keep {
                break;
            }
            let key: Vec<_> = candidate
                .slots
                .iter()
                .map(|s| (chart.edge(s.edge).map(edge_key), s.frame))
                .collect();
            if !seen.insert(key) {
                continue;
            }
            if fills + candidate.slots.len() > self.parse_buf_size {
                let limit = ArenaLimit {
                    capacity: Capacity::ParseBuf,
                    limit: self.parse_buf_size,
                };
                warn!("parses truncated: {limit}");
                lattice.overflow.get_or_insert(limit);
                break;
            }
            fills += candidate.slots.len();
            lattice.candidates.push(candidate);
        }

        debug!(
            "slot lattice: {} nodes, best score {} in {} slots, {} parses",
            self.nodes.len(),
            best.score,
            best.slots,
            lattice.candidates.len()
        );
        lattice
    }

    /// Number of sequence nodes built for the last sentence.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[allow(clippy::type_complexity)]
    fn fill(
        &mut self,
        grammar: &Grammar,
        slots: &SlotIndex,
        chart: &Chart,
        levels: usize,
    ) -> std::result::Result<Vec<Option<Cell>>, (Vec<Option<Cell>>, ArenaLimit)> {
        let positions = chart.positions();
        let mut cells: Vec<Option<Cell>> = vec![None; positions + 1];
        cells[0] = Some(Cell::default());
        let mut best = 0;

        for pos in 0..positions {
            if let (Some(cell), Some(current)) = (&cells[pos], &cells[best]) {
                if cell.rank() > current.rank() {
                    best = pos;
                }
            }
            let Some(pred) = cells[best].clone() else {
                continue;
            };
            if pred.slots >= self.slot_seq_len {
                continue;
            }

            for id in chart.bucket(pos) {
                let Some(edge) = chart.edge(id) else {
                    continue;
                };
                let Some(frames) = slots.frames_of(edge.net) else {
                    continue;
                };
                let level = (grammar.priority(edge.net) as usize).min(levels - 1);
                if let Err(err) = self.extend(&mut cells, &pred, id, edge, frames, level, levels) {
                    match err.overflow() {
                        Some(&limit) => return Err((cells, limit)),
                        None => warn!("slot lattice: {err}"),
                    }
                }
            }
        }
        Ok(cells)
    }

    #[allow(clippy::too_many_arguments)]
    fn extend(
        &mut self,
        cells: &mut [Option<Cell>],
        pred: &Cell,
        id: EdgeId,
        edge: &Edge,
        frames: &[FrameId],
        level: usize,
        levels: usize,
    ) -> Result<()> {
        let prevs: Vec<Option<SeqNodeId>> = if pred.nodes.is_empty() {
            vec![None]
        } else {
            pred.nodes.iter().copied().map(Some).collect()
        };

        let mut pending = Vec::with_capacity(prevs.len());
        for prev in prevs {
            let (before, prev_min, mut histogram) = match prev.and_then(|p| self.nodes.get(p)) {
                Some(node) => (
                    self.fids.span(node.fids).to_vec(),
                    node.min_frag,
                    self.priorities.span(node.priorities).to_vec(),
                ),
                None => (Vec::new(), 0, vec![0; levels]),
            };
            let counts: Vec<FrameCount> = frames
                .iter()
                .map(|&frame| FrameCount {
                    frame,
                    count: before
                        .iter()
                        .find(|c| c.frame == frame)
                        .map_or(prev_min + 1, |c| c.count),
                })
                .collect();
            let min_frag = counts.iter().map(|c| c.count).min().unwrap_or(0);
            if let Some(slot) = histogram.get_mut(level) {
                *slot += 1;
            }
            pending.push((prev, counts, min_frag, histogram));
        }

        let candidate = Cell {
            score: pred.score + edge.score,
            slots: pred.slots + 1,
            frames: pending.iter().map(|p| p.2).min().unwrap_or(0),
            nodes: Vec::new(),
        };
        let Some(target) = cells.get_mut(edge.end) else {
            return Ok(());
        };
        let ordering = target.as_ref().map_or(Ordering::Greater, |t| candidate.rank().cmp(&t.rank()));
        if ordering == Ordering::Less {
            return Ok(());
        }

        let mut nodes = Vec::with_capacity(pending.len());
        for (prev, counts, min_frag, histogram) in pending {
            let fids = self.fids.alloc_span(&counts)?;
            let priorities = self.priorities.alloc_span(&histogram)?;
            nodes.push(self.nodes.alloc(SeqNode {
                edge: id,
                prev,
                fids,
                min_frag,
                priorities,
            })?);
        }

        match (ordering, target) {
            (Ordering::Equal, Some(cell)) => cell.nodes.extend(nodes),
            (_, target) => *target = Some(Cell { nodes, ..candidate }),
        }
        Ok(())
    }

    /// Walks back from each end node, returning `(first step, end node)` for
    /// every complete frame labelling.
    fn label(&mut self, ends: &[SeqNodeId]) -> (Vec<(FrameNodeId, SeqNodeId)>, Option<ArenaLimit>) {
        let mut stack = Vec::new();
        let mut done = Vec::new();
        if let Err(err) = self.seed(ends, &mut stack) {
            return (done, err.overflow().copied());
        }

        while let Some((step, last)) = stack.pop() {
            let Some(&node) = self.labels.get(step) else {
                continue;
            };
            let Some(prev) = self.nodes.get(node.seq).and_then(|s| s.prev) else {
                if node.count <= 1 {
                    done.push((step, last));
                }
                continue;
            };
            for (frame, count) in self.predecessors(node, prev).into_iter().rev() {
                let next = FrameNode {
                    seq: prev,
                    frame,
                    count,
                    next: Some(step),
                };
                match self.labels.alloc(next) {
                    Ok(id) => stack.push((id, last)),
                    Err(err) => return (done, err.overflow().copied()),
                }
            }
        }
        (done, None)
    }

    fn seed(&mut self, ends: &[SeqNodeId], stack: &mut Vec<(FrameNodeId, SeqNodeId)>) -> Result<()> {
        for &end in ends.iter().rev() {
            let Some(node) = self.nodes.get(end).copied() else {
                continue;
            };
            let counts = self.fids.span(node.fids).to_vec();
            let labels: Vec<(Option<FrameId>, usize)> = if counts.is_empty() {
                vec![(None, 0)]
            } else {
                counts
                    .iter()
                    .filter(|c| c.count == node.min_frag)
                    .map(|c| (Some(c.frame), c.count))
                    .collect()
            };
            for (frame, count) in labels.into_iter().rev() {
                let step = FrameNode {
                    seq: end,
                    frame,
                    count,
                    next: None,
                };
                let id = self.labels.alloc(step)?;
                stack.push((id, end));
            }
        }
        Ok(())
    }

    /// Labels the slot before `node` can take.
    fn predecessors(&self, node: FrameNode, prev: SeqNodeId) -> Vec<(Option<FrameId>, usize)> {
        let Some(seq) = self.nodes.get(prev) else {
            return Vec::new();
        };
        let counts = self.fids.span(seq.fids);
        let Some(frame) = node.frame else {
            return vec![(None, 0)];
        };
        counts
            .iter()
            .filter(|c| {
                let same = c.frame == frame && c.count == node.count;
                let opens = c.frame != frame && c.count + 1 == node.count && seq.min_frag + 1 == node.count;
                same || opens
            })
            .map(|c| (Some(c.frame), c.count))
            .collect()
    }

    fn candidate(&self, head: FrameNodeId, last: SeqNodeId, score: usize, history: Option<&FrameHistory>) -> Candidate {
        let mut slots = Vec::new();
        let mut step = self.labels.get(head).copied();
        while let Some(node) = step {
            if let Some(seq) = self.nodes.get(node.seq) {
                slots.push(SlotChoice {
                    edge: seq.edge,
                    frame: node.frame,
                });
            }
            step = node.next.and_then(|id| self.labels.get(id).copied());
        }

        let mut runs: Vec<FrameId> = slots.iter().filter_map(|s| s.frame).collect();
        runs.dedup();
        let recency = history.map_or(0, |h| {
            let used: HashSet<FrameId> = runs.iter().copied().collect();
            used.into_iter().map(|f| h.recency(f)).sum()
        });
        let histogram = self
            .nodes
            .get(last)
            .map(|n| self.priorities.span(n.priorities).to_vec())
            .unwrap_or_default();

        Candidate {
            slots,
            score,
            frames: runs.len(),
            histogram,
            recency,
        }
    }
}

fn edge_key(edge: &Edge) -> (NetId, usize, usize) {
    (edge.net, edge.start, edge.end)
}

/// Best first: more words, fewer slots, more slots at higher priority
/// levels, more recent frames, fewer frames.
fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.slots.len().cmp(&b.slots.len()))
        .then_with(|| b.histogram.iter().rev().cmp(a.histogram.iter().rev()))
        .then(b.recency.cmp(&a.recency))
        .then(a.frames.cmp(&b.frames))
}
