//! Net priorities.
//!
//! One `[Net] level` pair per line; `#` starts a comment. Nets without an
//! entry have priority 0. Priorities only break ties between parses that
//! cover the input equally well.

use std::collections::HashMap;

use phoenix_foundation::{Error, Result};

use crate::net::NetId;

/// Parses a priorities file, resolving net names with `resolve`.
///
/// # Errors
///
/// Returns a format error for a line without a numeric level.
pub fn parse_priorities(
    text: &str,
    source: &str,
    resolve: impl Fn(&str) -> Option<NetId>,
) -> Result<HashMap<NetId, u32>> {
    let mut priorities = HashMap::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(name), Some(level)) = (fields.next(), fields.next()) else {
            return Err(Error::format(source, n + 1, format!("expected '[Net] level': {line}")));
        };
        let level: u32 = level
            .parse()
            .map_err(|_| Error::format(source, n + 1, format!("bad priority {level}")))?;
        match resolve(name) {
            Some(net) => {
                priorities.insert(net, level);
            }
            None => log::warn!("priority for unknown net {name}"),
        }
    }
    Ok(priorities)
}
