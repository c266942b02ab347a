//! Thompson construction: compiles a [`RegexNode`] tree into an epsilon-NFA
//! fragment with a single entry and single exit node.
//!
//! The edge vocabulary stays minimal: epsilon edges and single-range symbol
//! edges only. `+`, `?`, and `{m,n}` are expressed as compositions of the
//! concatenation, star, and bypass gadgets rather than new edge types.

use super::{Nfa, NfaFragment};
use crate::regex::{CharSet, RegexNode};

/// Build a fragment for `node`, allocating every state in the caller's arena.
///
/// Using one arena per start state guarantees all of its rules share a single
/// id space, which the combinator and subset constructor rely on.
pub fn thompson(node: &RegexNode, nfa: &mut Nfa) -> NfaFragment {
    match node {
        RegexNode::Literal(c) => {
            let entry = nfa.add_state();
            let exit = nfa.add_state();
            nfa.add_transition(entry, *c..=*c, exit);
            NfaFragment { entry, exit }
        }
        RegexNode::Class(set) => class_fragment(set, nfa),
        RegexNode::Concat(items) => {
            // Iterative chaining: recursion depth stays bounded by the tree
            // depth the parser enforces, not by the pattern's length
            let entry = nfa.add_state();
            let mut cursor = entry;
            for item in items {
                let part = thompson(item, nfa);
                nfa.add_epsilon(cursor, part.entry);
                cursor = part.exit;
            }
            NfaFragment {
                entry,
                exit: cursor,
            }
        }
        RegexNode::Alt(branches) => {
            let entry = nfa.add_state();
            let exit = nfa.add_state();
            for branch in branches {
                let part = thompson(branch, nfa);
                nfa.add_epsilon(entry, part.entry);
                nfa.add_epsilon(part.exit, exit);
            }
            NfaFragment { entry, exit }
        }
        RegexNode::Star(inner) => star_fragment(inner, nfa),
        RegexNode::Plus(inner) => {
            // One mandatory copy followed by a star
            let first = thompson(inner, nfa);
            let rest = star_fragment(inner, nfa);
            nfa.add_epsilon(first.exit, rest.entry);
            NfaFragment {
                entry: first.entry,
                exit: rest.exit,
            }
        }
        RegexNode::Optional(inner) => optional_fragment(inner, nfa),
        RegexNode::Repeat { node, min, max } => {
            // `min` mandatory copies, then either a star tail or bounded
            // optional copies
            let entry = nfa.add_state();
            let mut cursor = entry;
            for _ in 0..*min {
                let copy = thompson(node, nfa);
                nfa.add_epsilon(cursor, copy.entry);
                cursor = copy.exit;
            }
            match max {
                None => {
                    let tail = star_fragment(node, nfa);
                    nfa.add_epsilon(cursor, tail.entry);
                    cursor = tail.exit;
                }
                Some(max) => {
                    for _ in *min..*max {
                        let copy = optional_fragment(node, nfa);
                        nfa.add_epsilon(cursor, copy.entry);
                        cursor = copy.exit;
                    }
                }
            }
            NfaFragment {
                entry,
                exit: cursor,
            }
        }
    }
}

fn class_fragment(set: &CharSet, nfa: &mut Nfa) -> NfaFragment {
    let entry = nfa.add_state();
    let exit = nfa.add_state();
    // Negation is expanded against the full alphabet here, not at parse time
    for (start, end) in set.expanded_ranges() {
        nfa.add_transition(entry, start..=end, exit);
    }
    NfaFragment { entry, exit }
}

fn star_fragment(inner: &RegexNode, nfa: &mut Nfa) -> NfaFragment {
    let entry = nfa.add_state();
    let exit = nfa.add_state();
    let body = thompson(inner, nfa);
    nfa.add_epsilon(entry, body.entry);
    nfa.add_epsilon(entry, exit); // zero repetitions
    nfa.add_epsilon(body.exit, body.entry); // repeat
    nfa.add_epsilon(body.exit, exit);
    NfaFragment { entry, exit }
}

fn optional_fragment(inner: &RegexNode, nfa: &mut Nfa) -> NfaFragment {
    let entry = nfa.add_state();
    let exit = nfa.add_state();
    let body = thompson(inner, nfa);
    nfa.add_epsilon(entry, body.entry);
    nfa.add_epsilon(entry, exit);
    nfa.add_epsilon(body.exit, exit);
    NfaFragment { entry, exit }
}
