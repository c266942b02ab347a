//! Structural diagnostics over a built automaton.
//!
//! These are warnings, not errors: they never block table emission. All
//! findings for all start states are accumulated and handed back in one
//! consolidated list.

use hashbrown::HashSet;

use crate::dfa::Dfa;
use crate::error::Diagnostic;
use crate::rule::{ActionRegistry, ActionTag, RuleDescriptor};

/// Inspect one start state's DFA against the rules that went into it.
///
/// `compiled` holds the rules that survived pattern parsing; rules dropped
/// for syntax errors have already been reported and are not re-flagged here.
pub(crate) fn analyze(
    start_state: &str,
    dfa: &Dfa,
    compiled: &[&RuleDescriptor],
    registry: &ActionRegistry,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // Which rules actually win somewhere in the DFA
    let mut winners: HashSet<u32, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut any_accepting = false;
    for (_, state) in dfa.states() {
        if let Some(accept) = state.accept() {
            winners.insert(accept.order);
            any_accepting = true;
        }
    }

    if !any_accepting {
        diagnostics.push(Diagnostic::EmptyStartState {
            name: start_state.into(),
        });
    }

    // A rule whose accept never survives tie-breaking is dead: some earlier
    // rule matches everything it matches, at equal or greater length
    for rule in compiled {
        if !winners.contains(&rule.order) {
            diagnostics.push(Diagnostic::UnreachableRule {
                start_state: start_state.into(),
                order: rule.order,
                action: resolve(registry, rule.action),
            });
        }
    }

    // A nullable automaton matches the empty string, so a scanner driving it
    // can emit zero-length tokens forever on input no rule consumes
    if dfa.state(dfa.start()).accept().is_some() {
        diagnostics.push(Diagnostic::PotentialInfiniteMatch {
            start_state: start_state.into(),
        });
    }

    diagnostics
}

fn resolve(registry: &ActionRegistry, tag: ActionTag) -> compact_str::CompactString {
    registry.resolve(tag).into()
}
