//! Frame definitions.
//!
//! ```text
//! # flight queries
//! FUNCTION: Flight
//! NETS:
//!     [Origin]
//!     [Destination]
//! ;
//! ```
//!
//! Slot nets are listed in priority order. Names that are not nets of the
//! grammar are reported and left out of the frame.

use phoenix_foundation::{Error, Result};

use crate::net::NetId;

/// Index of a frame in [`Grammar::frames`](crate::Grammar::frames).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FrameId(u32);

impl FrameId {
    /// Creates a frame id from its raw index.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the index as `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One frame: a name and its slot nets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameDef {
    /// Frame name.
    pub name: String,
    /// Slot nets in priority order.
    pub slots: Vec<NetId>,
}

/// Parses a frames file, resolving slot names with `resolve`.
///
/// # Errors
///
/// Returns a format error if a frame has no `NETS:` line or is not closed
/// with `;`.
pub fn parse_frames(
    text: &str,
    source: &str,
    resolve: impl Fn(&str) -> Option<NetId>,
) -> Result<Vec<FrameDef>> {
    let mut frames = Vec::new();
    let mut lines = text.lines().enumerate().map(|(n, l)| (n + 1, l.trim()));

    while let Some((n, line)) = lines.next() {
        if line.starts_with('#') {
            continue;
        }
        let Some(name) = line
            .strip_prefix("FUNCTION:")
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            continue;
        };

        if !lines.by_ref().any(|(_, l)| l.starts_with("NETS:")) {
            return Err(Error::format(source, n, format!("frame {name} has no NETS: line")));
        }

        let mut frame = FrameDef {
            name: name.to_string(),
            slots: Vec::new(),
        };
        let mut closed = false;
        for (_, slot) in lines.by_ref() {
            if slot.starts_with(';') {
                closed = true;
                break;
            }
            if !slot.starts_with('[') {
                continue;
            }
            match resolve(slot) {
                Some(net) => frame.slots.push(net),
                None => log::warn!("frame {name}: can't find net for slot {slot}"),
            }
        }
        if !closed {
            return Err(Error::format(source, n, format!("frame {name} is not terminated by ';'")));
        }
        frames.push(frame);
    }

    Ok(frames)
}
