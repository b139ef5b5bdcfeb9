//! Concept-leaf marking.
//!
//! A concept net is one whose name starts with an upper-case letter after the
//! bracket (`[Date]`, not `[date_digits]`). A concept leaf is a concept net
//! that calls no other concept net, so its fill bottoms out without further
//! semantic structure.

use std::collections::HashSet;

use crate::net::{Net, NetId};

/// Returns true if a bracketed net name denotes a concept.
#[must_use]
pub fn is_concept_name(name: &str) -> bool {
    name.strip_prefix('[')
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

/// Sets [`Net::concept_leaf`] on every net.
///
/// Calls to nets missing from `nets` count as non-concept calls.
pub fn mark_concept_leaves(nets: &mut [Net]) {
    let concepts: HashSet<NetId> = nets
        .iter()
        .filter(|net| is_concept_name(&net.name))
        .map(|net| net.id)
        .collect();

    for net in nets.iter_mut() {
        let leaf = concepts.contains(&net.id) && !net.calls().any(|called| concepts.contains(&called));
        net.concept_leaf = leaf;
    }
}
