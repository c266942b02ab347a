//! Worklist subset construction (NFA to DFA).
//!
//! DFA states are identified by the canonical sorted list of NFA node ids
//! they represent; subsets reaching the same signature reuse the same state,
//! which bounds the DFA by the number of distinct reachable subsets. The
//! alphabet seen by each subset is partitioned into disjoint elementary
//! ranges at the edge-endpoint boundaries, so transitions stay range-based
//! instead of one per character.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;

use super::{Dfa, StateId};
use crate::error::CompileError;
use crate::nfa::{AcceptInfo, CharRange, Nfa, NodeId};

/// Canonical dedup key: the sorted NFA subset behind a DFA state.
type Signature = SmallVec<[NodeId; 8]>;

/// Convert an NFA into an equivalent DFA rooted at `start`.
///
/// Construction is a pure function of the NFA: states are numbered in
/// breadth-first discovery order from a deterministic worklist, so running it
/// twice on the same NFA yields identical tables.
///
/// # Errors
///
/// Returns [`CompileError::Internal`] if a reused subset signature disagrees
/// with the accept tag recorded when the state was first created. That can
/// only happen through a generator bug, and aborting beats emitting an
/// unsound table.
pub fn determinize(nfa: &Nfa, start: NodeId) -> Result<Dfa, CompileError> {
    let mut dfa = Dfa::new();
    let mut signatures: HashMap<Signature, StateId, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut worklist: VecDeque<(Signature, StateId)> = VecDeque::new();

    let initial = closure(nfa, &[start]);
    let initial_id = dfa.add_state();
    dfa.set_start(initial_id);
    dfa.state_mut(initial_id)
        .set_accept(subset_accept(nfa, &initial));
    signatures.insert(initial.clone(), initial_id);
    worklist.push_back((initial, initial_id));

    while let Some((subset, current)) = worklist.pop_front() {
        // All symbol edges leaving this subset, as scalar-value intervals
        let mut edges: Vec<(u32, u32, NodeId)> = Vec::new();
        for &id in &subset {
            for (range, target) in &nfa.state(id).transitions {
                edges.push((*range.start() as u32, *range.end() as u32, *target));
            }
        }

        // Partition at every edge endpoint; each window between consecutive
        // boundaries is covered by a fixed set of edges
        let mut bounds: Vec<u32> = Vec::with_capacity(edges.len() * 2);
        for &(lo, hi, _) in &edges {
            bounds.push(lo);
            bounds.push(hi + 1);
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut outgoing: Vec<(u32, u32, StateId)> = Vec::new();
        for window in bounds.windows(2) {
            let (lo, hi) = (window[0], window[1] - 1);
            let mut targets: SmallVec<[NodeId; 8]> = edges
                .iter()
                .filter(|&&(edge_lo, edge_hi, _)| edge_lo <= lo && hi <= edge_hi)
                .map(|&(_, _, target)| target)
                .collect();
            if targets.is_empty() {
                // The empty subset is the dead state; no transition recorded
                continue;
            }
            targets.sort_unstable();
            targets.dedup();

            let successor = closure(nfa, &targets);
            let target_id = match signatures.get(&successor) {
                Some(&id) => {
                    // Dedup invariant: a reused signature must carry the same
                    // accept it was created with
                    if dfa.state(id).accept() != subset_accept(nfa, &successor) {
                        return Err(CompileError::internal(format!(
                            "subset signature for DFA state {} resolved to a different accept tag",
                            id.0
                        )));
                    }
                    id
                }
                None => {
                    let id = dfa.add_state();
                    dfa.state_mut(id).set_accept(subset_accept(nfa, &successor));
                    signatures.insert(successor.clone(), id);
                    worklist.push_back((successor, id));
                    id
                }
            };
            outgoing.push((lo, hi, target_id));
        }

        for (lo, hi, target) in coalesce(outgoing) {
            if let Some(range) = scalar_range(lo, hi) {
                dfa.state_mut(current).add_transition(range, target);
            }
        }
        dfa.state_mut(current).finalize();
    }

    Ok(dfa)
}

/// Epsilon closure: `seed` plus everything reachable via epsilon edges only.
/// Depth-first with a visited set, so the cycles introduced by `*`/`+` are
/// handled. Returns the canonical sorted signature.
fn closure(nfa: &Nfa, seed: &[NodeId]) -> Signature {
    let mut visited: HashSet<NodeId> = seed.iter().copied().collect();
    let mut stack: Vec<NodeId> = seed.to_vec();
    while let Some(id) = stack.pop() {
        for &next in &nfa.state(id).epsilon {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }
    let mut signature: Signature = visited.into_iter().collect();
    signature.sort_unstable();
    signature
}

/// The winning accept of a subset: smallest declaration order among its
/// accepting members, i.e. among patterns matching the same longest prefix
/// the rule declared earliest in the script wins.
fn subset_accept(nfa: &Nfa, subset: &Signature) -> Option<AcceptInfo> {
    subset
        .iter()
        .filter_map(|&id| nfa.state(id).accept)
        .min_by_key(|accept| accept.order)
}

/// Merge adjacent intervals that lead to the same state, keeping the
/// transition list compact after over-eager partitioning.
fn coalesce(mut intervals: Vec<(u32, u32, StateId)>) -> Vec<(u32, u32, StateId)> {
    intervals.sort_unstable_by_key(|&(lo, _, _)| lo);
    let mut merged: Vec<(u32, u32, StateId)> = Vec::with_capacity(intervals.len());
    for (lo, hi, target) in intervals {
        match merged.last_mut() {
            Some((_, prev_hi, prev_target)) if *prev_target == target && *prev_hi + 1 == lo => {
                *prev_hi = hi;
            }
            _ => merged.push((lo, hi, target)),
        }
    }
    merged
}

/// Build a char range from scalar-value bounds, clamping away the surrogate
/// gap that interval arithmetic may have wandered into.
pub(crate) fn scalar_range(lo: u32, hi: u32) -> Option<CharRange> {
    let lo = if (0xD800..=0xDFFF).contains(&lo) {
        0xE000
    } else {
        lo
    };
    let hi = if (0xD800..=0xDFFF).contains(&hi) {
        0xD7FF
    } else {
        hi
    };
    if lo > hi {
        return None;
    }
    Some(char::from_u32(lo)?..=char::from_u32(hi)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::combine::TaggedFragment;
    use crate::nfa::{combine, thompson};
    use crate::regex::parse;
    use crate::rule::ActionRegistry;

    fn build(patterns: &[&str]) -> (Dfa, Vec<crate::rule::ActionTag>) {
        let mut registry = ActionRegistry::new();
        let mut nfa = Nfa::new();
        let mut fragments = Vec::new();
        let mut tags = Vec::new();
        for (order, pattern) in patterns.iter().enumerate() {
            let tag = registry.intern(&format!("T{order}"));
            tags.push(tag);
            let fragment = thompson(&parse(pattern).unwrap(), &mut nfa);
            fragments.push(TaggedFragment {
                order: order as u32,
                action: tag,
                fragment,
            });
        }
        let start = combine(&fragments, &mut nfa);
        (determinize(&nfa, start).unwrap(), tags)
    }

    /// Longest-match walk over the DFA, for assertions.
    fn scan(dfa: &Dfa, input: &str) -> Option<(usize, AcceptInfo)> {
        let mut state = dfa.start();
        let mut best = dfa.state(state).accept().map(|a| (0, a));
        let mut len = 0;
        for c in input.chars() {
            let Some(next) = dfa.state(state).find_transition(c) else {
                break;
            };
            state = next;
            len += c.len_utf8();
            if let Some(accept) = dfa.state(state).accept() {
                best = Some((len, accept));
            }
        }
        best
    }

    #[test]
    fn test_closure_handles_star_cycles() {
        let mut nfa = Nfa::new();
        let fragment = thompson(&parse("a*").unwrap(), &mut nfa);
        let signature = closure(&nfa, &[fragment.entry]);
        // Entry, body entry, and exit are epsilon-reachable; no hang on the
        // body-exit -> body-entry cycle
        assert!(signature.contains(&fragment.entry));
        assert!(signature.contains(&fragment.exit));
    }

    #[test]
    fn test_deterministic_transitions() {
        let (dfa, _) = build(&["[a-z]+", "if"]);
        for (_, state) in dfa.states() {
            let transitions = state.transitions();
            for pair in transitions.windows(2) {
                // Sorted and disjoint: at most one transition per symbol
                assert!(*pair[0].0.end() < *pair[1].0.start());
            }
        }
    }

    #[test]
    fn test_longest_match_wins() {
        let (dfa, tags) = build(&["a", "ab"]);
        let (len, accept) = scan(&dfa, "ab").unwrap();
        assert_eq!(len, 2);
        assert_eq!(accept.action, tags[1]);
    }

    #[test]
    fn test_first_rule_wins_ties() {
        // Both match "if" with length 2; the earlier declaration wins
        let (dfa, tags) = build(&["[a-z]+", "if"]);
        let (len, accept) = scan(&dfa, "if").unwrap();
        assert_eq!(len, 2);
        assert_eq!(accept.order, 0);
        assert_eq!(accept.action, tags[0]);
    }

    #[test]
    fn test_keyword_first_beats_ident() {
        let (dfa, tags) = build(&["if", "[a-z]+"]);
        let (_, accept) = scan(&dfa, "if").unwrap();
        assert_eq!(accept.action, tags[0]);
        let (_, accept) = scan(&dfa, "iffy").unwrap();
        // Longer match flips to the identifier rule
        assert_eq!(accept.action, tags[1]);
    }

    #[test]
    fn test_construction_is_reproducible() {
        let (first, _) = build(&["[a-z]+", "[0-9]+", "if|else"]);
        let (second, _) = build(&["[a-z]+", "[0-9]+", "if|else"]);
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(first.start(), second.start());
        for ((_, a), (_, b)) in first.states().zip(second.states()) {
            assert_eq!(a.transitions(), b.transitions());
            assert_eq!(a.accept(), b.accept());
        }
    }

    #[test]
    fn test_dead_state_has_no_exits() {
        let (dfa, _) = build(&["ab"]);
        let dead = dfa.state(StateId::DEAD);
        assert!(dead.transitions().is_empty());
        assert!(dead.accept().is_none());
    }

    #[test]
    fn test_overlapping_classes_partition() {
        let (dfa, tags) = build(&["[a-m]x", "[h-z]y"]);
        let (_, accept) = scan(&dfa, "cx").unwrap();
        assert_eq!(accept.action, tags[0]);
        let (_, accept) = scan(&dfa, "ty").unwrap();
        assert_eq!(accept.action, tags[1]);
        // Overlap region can still reach both exits
        let (_, accept) = scan(&dfa, "jy").unwrap();
        assert_eq!(accept.action, tags[1]);
        let (_, accept) = scan(&dfa, "jx").unwrap();
        assert_eq!(accept.action, tags[0]);
    }

    #[test]
    fn test_coalesce_merges_adjacent_same_target() {
        let merged = coalesce(vec![
            ('a' as u32, 'c' as u32, StateId(2)),
            ('d' as u32, 'f' as u32, StateId(2)),
            ('g' as u32, 'h' as u32, StateId(3)),
        ]);
        assert_eq!(
            merged,
            vec![
                ('a' as u32, 'f' as u32, StateId(2)),
                ('g' as u32, 'h' as u32, StateId(3)),
            ]
        );
    }

    #[test]
    fn test_nullable_pattern_accepts_at_start() {
        let (dfa, _) = build(&["[a-z]*"]);
        assert!(dfa.state(dfa.start()).accept().is_some());
    }
}
