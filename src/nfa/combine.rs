//! Fragment combinator: merges the per-rule fragments of one start state into
//! a single automaton behind a synthetic start node.
//!
//! Rules declared under the same start-state name accumulate into one
//! automaton; rules under different names never share nodes, mirroring
//! inclusive start conditions in classic lex tools.

use super::{AcceptInfo, Nfa, NfaFragment, NodeId};
use crate::rule::ActionTag;

/// A rule's fragment paired with its declaration order and action.
#[derive(Debug, Clone, Copy)]
pub struct TaggedFragment {
    pub order: u32,
    pub action: ActionTag,
    pub fragment: NfaFragment,
}

/// Wire the given fragments, in declaration order, behind a fresh synthetic
/// start node and tag each rule's exit with its accept info.
///
/// Returns the synthetic start node's id.
pub fn combine(fragments: &[TaggedFragment], nfa: &mut Nfa) -> NodeId {
    let start = nfa.add_state();
    for tagged in fragments {
        nfa.add_epsilon(start, tagged.fragment.entry);
        nfa.set_accept(
            tagged.fragment.exit,
            AcceptInfo {
                order: tagged.order,
                action: tagged.action,
            },
        );
    }
    start
}
