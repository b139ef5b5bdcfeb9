//! Parse results.
//!
//! A [`Parse`] is a sequence of slot fills, each a [`ParseTree`] of the
//! matched slot net. Spans are input token positions, so a consumer can map
//! slots back onto the words it handed in.
//!
//! Two text forms are produced:
//!
//! ```text
//! Flight:                          Flight:[Depart].[City].BOSTON
//! [Depart] ( FROM [City] ( BOSTON ) )
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use serde::Serialize;

use phoenix_foundation::{ArenaLimit, Capacity, Error, Result};
use phoenix_grammar::Grammar;

use crate::chart::{Chart, EdgeId};
use crate::script::Script;

/// A matched net and what it covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    /// Net name, brackets included.
    pub net: String,
    /// First input token covered.
    pub start: usize,
    /// One past the last input token covered.
    pub end: usize,
    /// True for concept leaf nets.
    pub leaf: bool,
    /// Words and sub-nets in order.
    pub nodes: Vec<ParseNode>,
}

/// One element of a [`ParseTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseNode {
    /// A word matched directly by the net.
    Word(String),
    /// A called net.
    Net(ParseTree),
}

impl ParseTree {
    /// Builds the tree of a chart edge.
    #[must_use]
    pub fn from_edge(grammar: &Grammar, chart: &Chart, script: &Script, id: EdgeId) -> Option<Self> {
        let edge = chart.edge(id)?;
        let net = grammar.net(edge.net)?;
        let mut children = chart.children(edge).iter().peekable();
        let mut nodes = Vec::new();

        let mut pos = edge.start;
        while pos < edge.end {
            let next = children.peek().and_then(|&&c| chart.edge(c).map(|e| (c, e.start, e.end)));
            match next {
                Some((child, start, end)) if start == pos => {
                    children.next();
                    nodes.push(ParseNode::Net(Self::from_edge(grammar, chart, script, child)?));
                    pos = end.max(pos + 1);
                }
                _ => {
                    if let Some(word) = script.get(pos) {
                        nodes.push(ParseNode::Word(word.text.clone()));
                    }
                    pos += 1;
                }
            }
        }

        Some(Self {
            net: net.name.clone(),
            start: script.token_start(edge.start),
            end: script.token_end(edge.end),
            leaf: net.concept_leaf,
            nodes,
        })
    }

    /// All words under this tree, in order.
    #[must_use]
    pub fn words(&self) -> Vec<&str> {
        let mut words = Vec::new();
        self.collect_words(&mut words);
        words
    }

    fn collect_words<'a>(&'a self, out: &mut Vec<&'a str>) {
        for node in &self.nodes {
            match node {
                ParseNode::Word(w) => out.push(w),
                ParseNode::Net(tree) => tree.collect_words(out),
            }
        }
    }

    fn render_full(&self, out: &mut String) {
        out.push_str(&self.net);
        out.push_str(" (");
        for node in &self.nodes {
            out.push(' ');
            match node {
                ParseNode::Word(w) => out.push_str(w),
                ParseNode::Net(tree) => tree.render_full(out),
            }
        }
        out.push_str(" )");
    }

    /// `path.[Net].WORDS` for every concept leaf under this tree. A tree
    /// without leaves below it is reported whole.
    fn render_extracts(&self, path: &str, out: &mut Vec<String>) {
        let path = format!("{path}{}", self.net);
        let subtrees: Vec<&Self> = self
            .nodes
            .iter()
            .filter_map(|n| match n {
                ParseNode::Net(tree) => Some(tree),
                ParseNode::Word(_) => None,
            })
            .collect();
        if self.leaf || subtrees.is_empty() || !subtrees.iter().any(|t| t.has_leaf()) {
            out.push(format!("{path}.{}", self.words().join(" ")));
            return;
        }
        for tree in subtrees.into_iter().filter(|t| t.has_leaf()) {
            tree.render_extracts(&format!("{path}."), out);
        }
    }

    fn has_leaf(&self) -> bool {
        self.leaf
            || self.nodes.iter().any(|n| match n {
                ParseNode::Net(tree) => tree.has_leaf(),
                ParseNode::Word(_) => false,
            })
    }
}

/// A slot and the frame it was assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotFill {
    /// Frame name; `None` when the grammar has no frames.
    pub frame: Option<String>,
    /// The slot's tree.
    pub tree: ParseTree,
}

/// One interpretation of a sentence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Parse {
    /// Slots in input order.
    pub slots: Vec<SlotFill>,
    /// Words covered, boundary symbols included.
    pub score: usize,
    /// Frame instances used.
    pub frames: usize,
    /// Input tokens no slot covers.
    pub unparsed: Vec<String>,
}

/// Text form of a parse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Frame headers and bracketed trees.
    #[default]
    Full,
    /// One `Frame:[Slot].[Leaf].WORDS` line per concept leaf.
    Extracts,
}

impl Parse {
    /// Renders the parse.
    #[must_use]
    pub fn render(&self, mode: RenderMode) -> String {
        let mut out = String::new();
        match mode {
            RenderMode::Full => {
                let mut frame = None;
                for slot in &self.slots {
                    if slot.frame.is_some() && slot.frame != frame {
                        frame.clone_from(&slot.frame);
                        let _ = writeln!(out, "{}:", slot.frame.as_deref().unwrap_or_default());
                    }
                    slot.tree.render_full(&mut out);
                    out.push('\n');
                }
            }
            RenderMode::Extracts => {
                for slot in &self.slots {
                    let prefix = slot.frame.as_ref().map(|f| format!("{f}:")).unwrap_or_default();
                    let mut lines = Vec::new();
                    slot.tree.render_extracts(&prefix, &mut lines);
                    for line in lines {
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

/// Everything the parser knows about one sentence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    /// Input tokens, upper-cased.
    pub tokens: Vec<String>,
    /// Parses, best first.
    pub parses: Vec<Parse>,
    /// Input tokens missing from the dictionary.
    pub oov: Vec<String>,
    /// The first buffer that filled up, if any.
    pub overflow: Option<ArenaLimit>,
}

impl ParseOutcome {
    /// Returns the best parse.
    #[must_use]
    pub fn best(&self) -> Option<&Parse> {
        self.parses.first()
    }

    /// Renders every parse, numbered.
    ///
    /// # Errors
    ///
    /// Returns a `StringBufSize` overflow if the text exceeds `limit` bytes.
    pub fn render(&self, mode: RenderMode, limit: usize) -> Result<String> {
        let mut out = String::new();
        if self.parses.is_empty() {
            out.push_str("No parse\n");
        }
        for (i, parse) in self.parses.iter().enumerate() {
            let _ = writeln!(out, "Parse {}:", i + 1);
            out.push_str(&parse.render(mode));
            if !parse.unparsed.is_empty() {
                let _ = writeln!(out, "Unparsed: {}", parse.unparsed.join(" "));
            }
        }
        if out.len() > limit {
            return Err(Error::arena_overflow(Capacity::StringBuf, limit));
        }
        Ok(out)
    }
}

/// Input tokens not covered by any of `edges`.
pub(crate) fn unparsed(chart: &Chart, script: &Script, edges: &[EdgeId]) -> Vec<String> {
    let covered: HashSet<usize> = edges
        .iter()
        .filter_map(|&id| chart.edge(id))
        .flat_map(|e| e.start..e.end)
        .filter_map(|pos| script.get(pos).and_then(|w| w.source))
        .collect();
    script
        .tokens()
        .iter()
        .enumerate()
        .filter(|(i, _)| !covered.contains(i))
        .map(|(_, t)| t.clone())
        .collect()
}
