//! Flat transition-table emission.
//!
//! Serializes a [`Dfa`] into the dense form a generated lexer embeds: the
//! alphabet is collapsed into global equivalence classes (characters that
//! behave identically in every state), and transitions become one row-major
//! `state_count x class_count` array of next-state ids with [`StateId::DEAD`]
//! as the no-transition sentinel, plus a per-state accept array. The core
//! does not know the target syntax; the surrounding code generator renders
//! these arrays however its runtime expects.

use super::{Dfa, StateId};
use crate::nfa::{AcceptInfo, CharRange};

/// Dense DFA table for one start state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionTable {
    /// Equivalence-class ranges, sorted by start; index = class id.
    classes: Vec<CharRange>,
    /// Row-major `[state][class]` next-state ids, `DEAD` where undefined.
    next: Vec<StateId>,
    /// Winning accept per state, `None` for non-accepting states.
    accept: Vec<Option<AcceptInfo>>,
    start: StateId,
}

impl TransitionTable {
    /// Flatten a DFA. Pure and read-only: the DFA is not modified, and equal
    /// DFAs produce equal tables.
    #[must_use]
    pub fn from_dfa(dfa: &Dfa) -> Self {
        // Global boundary set across every state's transitions. Splitting at
        // all endpoints makes each transition an exact union of classes.
        let mut edges: Vec<(u32, u32)> = Vec::new();
        for (_, state) in dfa.states() {
            for (range, _) in state.transitions() {
                edges.push((*range.start() as u32, *range.end() as u32));
            }
        }
        let mut bounds: Vec<u32> = Vec::with_capacity(edges.len() * 2);
        for &(lo, hi) in &edges {
            bounds.push(lo);
            bounds.push(hi + 1);
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut classes: Vec<CharRange> = Vec::new();
        let mut class_bounds: Vec<(u32, u32)> = Vec::new();
        for window in bounds.windows(2) {
            let (lo, hi) = (window[0], window[1] - 1);
            let covered = edges
                .iter()
                .any(|&(edge_lo, edge_hi)| edge_lo <= lo && hi <= edge_hi);
            if covered && let Some(range) = super::subset::scalar_range(lo, hi) {
                classes.push(range);
                class_bounds.push((lo, hi));
            }
        }

        let state_count = dfa.state_count();
        let class_count = classes.len();
        let mut next = vec![StateId::DEAD; state_count * class_count];
        let mut accept = vec![None; state_count];

        for (id, state) in dfa.states() {
            accept[id.0 as usize] = state.accept();
            for (range, target) in state.transitions() {
                let (lo, hi) = (*range.start() as u32, *range.end() as u32);
                let first = class_bounds.partition_point(|&(class_lo, _)| class_lo < lo);
                for (offset, &(_, class_hi)) in class_bounds[first..].iter().enumerate() {
                    if class_hi > hi {
                        break;
                    }
                    next[id.0 as usize * class_count + first + offset] = *target;
                }
            }
        }

        Self {
            classes,
            next,
            accept,
            start: dfa.start(),
        }
    }

    #[must_use]
    pub const fn start(&self) -> StateId {
        self.start
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Equivalence class of `c`, if any class covers it.
    #[must_use]
    pub fn class_of(&self, c: char) -> Option<usize> {
        self.classes
            .binary_search_by(|range| {
                if c < *range.start() {
                    std::cmp::Ordering::Greater
                } else if c > *range.end() {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    /// Transition on `c`; [`StateId::DEAD`] when no transition exists.
    #[must_use]
    pub fn next_state(&self, state: StateId, c: char) -> StateId {
        match self.class_of(c) {
            Some(class) => self.next[state.0 as usize * self.classes.len() + class],
            None => StateId::DEAD,
        }
    }

    #[must_use]
    pub fn accept(&self, state: StateId) -> Option<AcceptInfo> {
        self.accept[state.0 as usize]
    }

    /// The raw row-major next-state array, for embedding as an array literal.
    #[must_use]
    pub fn rows(&self) -> &[StateId] {
        &self.next
    }

    /// The equivalence-class ranges, index = class id.
    #[must_use]
    pub fn classes(&self) -> &[CharRange] {
        &self.classes
    }

    #[must_use]
    pub fn has_accepting_state(&self) -> bool {
        self.accept.iter().any(Option::is_some)
    }

    /// Longest-match scan from the front of `input`.
    ///
    /// Follows transitions while they exist, remembering the last accepting
    /// state seen; on a dead transition or end of input, rolls back to that
    /// state and returns its action with the matched byte length. `None`
    /// means no rule matched any prefix: a lexical error at this position.
    /// A zero-length result is possible when the automaton accepts the empty
    /// string; [`Diagnostic::PotentialInfiniteMatch`] warns about exactly
    /// that case.
    ///
    /// [`Diagnostic::PotentialInfiniteMatch`]: crate::error::Diagnostic::PotentialInfiniteMatch
    #[must_use]
    pub fn scan_token(&self, input: &str) -> Option<(usize, AcceptInfo)> {
        let mut state = self.start;
        let mut best = self.accept(state).map(|accept| (0, accept));
        let mut len = 0;

        for c in input.chars() {
            let next = self.next_state(state, c);
            if next.is_dead() {
                break;
            }
            state = next;
            len += c.len_utf8();
            if let Some(accept) = self.accept(state) {
                best = Some((len, accept));
            }
        }
        best
    }
}
