//! # NFA Construction
//!
//! Epsilon-NFA arena plus the Thompson builder and the per-start-state
//! fragment combinator.
//!
//! Nodes live in a flat arena and are addressed by integer index, never by
//! owning references, so the cycles introduced by `*` and `+` need no special
//! lifetime handling. All fragments for one start state share one arena, which
//! is what lets the combinator wire them together with plain epsilon edges.

pub mod builder;
pub mod combine;

pub use builder::thompson;
pub use combine::combine;

use crate::rule::ActionTag;

/// Arena index of an NFA node.
pub type NodeId = u32;

/// Inclusive character range labeling a symbol edge.
pub type CharRange = std::ops::RangeInclusive<char>;

/// Accepting information carried by a rule's exit node.
///
/// `order` is the rule's declaration order; when subset construction merges
/// several accepting nodes into one DFA state, the smallest `order` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AcceptInfo {
    pub order: u32,
    pub action: ActionTag,
}

/// One NFA node: symbol edges, epsilon edges, and optional accept tag.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub(crate) transitions: Vec<(CharRange, NodeId)>,
    pub(crate) epsilon: Vec<NodeId>,
    pub(crate) accept: Option<AcceptInfo>,
}

/// Node arena for one start state's automaton.
#[derive(Debug, Default)]
pub struct Nfa {
    states: Vec<NfaState>,
}

/// Transient handle to a sub-automaton with a single entry and single exit.
///
/// Discarded once the combinator absorbs it into the start state's NFA.
#[derive(Debug, Clone, Copy)]
pub struct NfaFragment {
    pub entry: NodeId,
    pub exit: NodeId,
}

// Arena sizes stay far below u32::MAX
#[allow(clippy::cast_possible_truncation)]
impl Nfa {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> NodeId {
        let id = self.states.len() as NodeId;
        self.states.push(NfaState::default());
        id
    }

    #[must_use]
    pub fn state(&self, id: NodeId) -> &NfaState {
        &self.states[id as usize]
    }

    pub(crate) fn state_mut(&mut self, id: NodeId) -> &mut NfaState {
        &mut self.states[id as usize]
    }

    pub fn add_epsilon(&mut self, from: NodeId, to: NodeId) {
        self.state_mut(from).epsilon.push(to);
    }

    pub fn add_transition(&mut self, from: NodeId, range: CharRange, to: NodeId) {
        self.state_mut(from).transitions.push((range, to));
    }

    pub fn set_accept(&mut self, id: NodeId, accept: AcceptInfo) {
        self.state_mut(id).accept = Some(accept);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
