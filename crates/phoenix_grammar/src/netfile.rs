//! The compiled net file.
//!
//! ```text
//! Number of Nets= 2
//! [Greeting] 1 3 0 _
//! 0  1 0
//! 		12    0    2    0    _
//! 1  0 1
//! 2  2 0
//! 		14    0    1    0    _
//! 		0    0    1    0    _
//! ```
//!
//! Line 1 declares how many nets the net list has. Each compiled net follows
//! as a header `name id nodeCount leafFlag feature`, then one line per state
//! `index  arcCount finalFlag`, each followed by its arcs
//! `tokenId callNetId destState headFlag feature-or-_`. A call arc has a
//! non-zero call net; a null arc has token and call both 0.

use std::fmt::Write as _;
use std::str::SplitWhitespace;

use phoenix_foundation::{Error, Result, WordId};

use crate::net::{ArcKind, Net, NetArc, NetId, State, StateId};

const HEADER_PREFIX: &str = "Number of Nets=";

/// Parsed contents of a net file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NetFile {
    /// Number of nets in the net list (some may not be compiled).
    pub declared: usize,
    /// Compiled nets in file order.
    pub nets: Vec<Net>,
}

/// Renders nets in the net-file format.
#[must_use]
pub fn write_nets(declared: usize, nets: &[Net]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER_PREFIX} {declared}");
    for net in nets {
        write_net(&mut out, net);
    }
    out
}

fn write_net(out: &mut String, net: &Net) {
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        net.name,
        net.id.index(),
        net.node_count(),
        u8::from(net.concept_leaf),
        net.feature.as_deref().unwrap_or("_")
    );
    for (i, state) in net.states.iter().enumerate() {
        let _ = writeln!(out, "{i}  {} {}", state.arcs.len(), u8::from(state.is_final));
        for arc in &state.arcs {
            let (tok, call) = match arc.kind {
                ArcKind::Null => (0, 0),
                ArcKind::Word(word) => (word.index(), 0),
                ArcKind::Call(net) => (net.index(), net.index()),
            };
            let _ = writeln!(
                out,
                "\t\t{tok}    {call}    {}    {}    {}",
                arc.dest.raw(),
                u8::from(arc.head),
                arc.feature.as_deref().unwrap_or("_")
            );
        }
    }
}

/// Parses a net file. `source` names the text in error messages.
///
/// # Errors
///
/// Returns a format error naming the first line that does not fit the
/// format, including arcs whose destination is outside their net.
pub fn read_nets(text: &str, source: &str) -> Result<NetFile> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (n, first) = lines
        .next()
        .ok_or_else(|| Error::format(source, 1, "empty net file"))?;
    let declared = first
        .trim()
        .strip_prefix(HEADER_PREFIX)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| Error::format(source, n, format!("expected '{HEADER_PREFIX} N'")))?;

    let mut nets = Vec::new();
    while let Some((n, header)) = lines.next() {
        let mut fields = header.split_whitespace();
        let name = fields
            .next()
            .ok_or_else(|| Error::format(source, n, "missing net name"))?;
        let id = number(&mut fields, source, n, "net id")?;
        let node_count = number(&mut fields, source, n, "node count")? as usize;
        let leaf = number(&mut fields, source, n, "leaf flag")?;
        let feature = rest(fields).filter(|f| f != "_");

        let mut net = Net::new(NetId::new(id), name);
        net.concept_leaf = leaf == 1;
        net.feature = feature;

        for expected in 0..node_count {
            let (n, line) = lines
                .next()
                .ok_or_else(|| Error::format(source, n, format!("{name}: missing state {expected}")))?;
            let mut fields = line.split_whitespace();
            let index = number(&mut fields, source, n, "state index")?;
            if index as usize != expected {
                return Err(Error::format(source, n, format!("expected state {expected}, found {index}")));
            }
            let arc_count = number(&mut fields, source, n, "arc count")?;
            let is_final = number(&mut fields, source, n, "final flag")? == 1;

            let mut state = State {
                arcs: Vec::with_capacity(arc_count as usize),
                is_final,
            };
            for _ in 0..arc_count {
                let (n, line) = lines
                    .next()
                    .ok_or_else(|| Error::format(source, n, format!("{name}: missing arc")))?;
                state.arcs.push(read_arc(line, node_count, source, n)?);
            }
            net.states.push(state);
        }
        nets.push(net);
    }

    Ok(NetFile { declared, nets })
}

fn read_arc(line: &str, node_count: usize, source: &str, n: usize) -> Result<NetArc> {
    let mut fields = line.split_whitespace();
    let tok = number(&mut fields, source, n, "token id")?;
    let call = number(&mut fields, source, n, "call net")?;
    let dest = number(&mut fields, source, n, "destination")?;
    let head = number(&mut fields, source, n, "head flag")? == 1;
    let feature = rest(fields).filter(|f| f != "_");

    if dest as usize >= node_count {
        return Err(Error::format(source, n, format!("destination {dest} out of range")));
    }
    let kind = match (tok, call) {
        (_, call) if call > 0 => ArcKind::Call(NetId::new(call)),
        (0, 0) => ArcKind::Null,
        (tok, _) => ArcKind::Word(WordId::new(tok)),
    };
    Ok(NetArc {
        kind,
        dest: StateId::new(dest),
        head,
        feature,
    })
}

fn number(fields: &mut SplitWhitespace<'_>, source: &str, n: usize, what: &str) -> Result<u32> {
    fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| Error::format(source, n, format!("bad or missing {what}")))
}

fn rest(fields: SplitWhitespace<'_>) -> Option<String> {
    let joined = fields.collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}
