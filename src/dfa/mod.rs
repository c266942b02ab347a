//! # Deterministic Automata
//!
//! DFA representation, the subset constructor that produces it, and the flat
//! transition-table emitter consumed by downstream code generators.

pub mod subset;
pub mod table;

pub use subset::determinize;
pub use table::TransitionTable;

use crate::nfa::{AcceptInfo, CharRange};

/// State ID in the DFA
///
/// Uses u32, which is sufficient for all practical DFA sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StateId(pub u32);

impl StateId {
    /// The distinguished dead state: lexical failure. No outgoing transitions,
    /// no accept. Every missing transition leads here.
    pub const DEAD: Self = Self(0);

    #[must_use]
    pub const fn is_dead(self) -> bool {
        self.0 == 0
    }
}

/// One DFA state: range transitions sorted for binary search, plus the
/// winning accept of its underlying NFA subset (smallest declaration order).
#[derive(Debug, Clone, Default)]
pub struct DfaState {
    transitions: Vec<(CharRange, StateId)>,
    accept: Option<AcceptInfo>,
}

impl DfaState {
    pub(crate) fn add_transition(&mut self, range: CharRange, target: StateId) {
        self.transitions.push((range, target));
    }

    /// Sort transitions by range start once construction is done, enabling
    /// O(log n) lookup. Ranges are disjoint by construction.
    pub(crate) fn finalize(&mut self) {
        self.transitions.sort_by_key(|(range, _)| *range.start());
    }

    /// Find the transition whose range contains `c` via binary search.
    #[must_use]
    pub fn find_transition(&self, c: char) -> Option<StateId> {
        self.transitions
            .binary_search_by(|(range, _)| {
                if c < *range.start() {
                    std::cmp::Ordering::Greater
                } else if c > *range.end() {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|idx| self.transitions[idx].1)
    }

    #[must_use]
    pub const fn accept(&self) -> Option<AcceptInfo> {
        self.accept
    }

    pub(crate) fn set_accept(&mut self, accept: Option<AcceptInfo>) {
        self.accept = accept;
    }

    #[must_use]
    pub fn transitions(&self) -> &[(CharRange, StateId)] {
        &self.transitions
    }
}

/// Deterministic automaton for one start state.
///
/// State 0 is always the dead state. Built once by [`determinize`] and then
/// read-only; there is no update-in-place after construction.
#[derive(Debug)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: StateId,
}

// State counts stay far below u32::MAX
#[allow(clippy::cast_possible_truncation)]
impl Dfa {
    pub(crate) fn new() -> Self {
        Self {
            // Slot 0 is the dead state
            states: vec![DfaState::default()],
            start: StateId::DEAD,
        }
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(DfaState::default());
        id
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut DfaState {
        &mut self.states[id.0 as usize]
    }

    pub(crate) fn set_start(&mut self, start: StateId) {
        self.start = start;
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id.0 as usize]
    }

    #[must_use]
    pub const fn start(&self) -> StateId {
        self.start
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &DfaState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateId(idx as u32), state))
    }
}
