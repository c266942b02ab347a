//! Pipeline orchestration: rule descriptors in, per-start-state tables and a
//! consolidated diagnostics list out.
//!
//! The compiler is a single-pass batch tool: parse each rule's pattern, build
//! its NFA fragment, combine fragments per start state, determinize, analyze,
//! and emit. A malformed pattern drops only its own rule; everything else
//! proceeds, so the caller sees all problems from one invocation. Automata of
//! different start states share nothing, which is what makes the `parallel`
//! feature a pure drop-in.

use compact_str::CompactString;
use hashbrown::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analysis;
use crate::dfa::{Dfa, TransitionTable, determinize};
use crate::error::{CompileError, Diagnostic};
use crate::nfa::combine::TaggedFragment;
use crate::nfa::{Nfa, combine, thompson};
use crate::regex;
use crate::rule::{ActionRegistry, INITIAL_STATE, RuleDescriptor};

/// One start state's emitted table.
#[derive(Debug)]
pub struct CompiledAutomaton {
    pub start_state: CompactString,
    pub table: TransitionTable,
}

/// Result of one compilation run.
///
/// `automata` is ordered by first declaration of each start state, with
/// [`INITIAL_STATE`] always first; `diagnostics` covers every rule and every
/// start state.
#[derive(Debug)]
pub struct CompileOutput {
    pub automata: Vec<CompiledAutomaton>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Look up a start state's automaton by name.
    #[must_use]
    pub fn automaton(&self, start_state: &str) -> Option<&CompiledAutomaton> {
        self.automata
            .iter()
            .find(|automaton| automaton.start_state == start_state)
    }
}

/// Compile a rule list into one DFA table per start state.
///
/// [`INITIAL_STATE`] is always present in the output, even when no rule
/// declares it; un-annotated rules are expected to arrive already assigned to
/// it by the outer script parser.
///
/// # Errors
///
/// Only internal invariant violations abort the run. Malformed patterns and
/// structural problems are reported through `CompileOutput::diagnostics`.
pub fn compile(
    rules: &[RuleDescriptor],
    registry: &ActionRegistry,
) -> Result<CompileOutput, CompileError> {
    let grouped = group_by_start_state(rules);

    #[cfg(feature = "parallel")]
    let stages: Vec<Stage<'_>> = grouped
        .par_iter()
        .map(|(name, rules)| build_automaton(name, rules))
        .collect::<Result<_, CompileError>>()?;

    #[cfg(not(feature = "parallel"))]
    let stages: Vec<Stage<'_>> = grouped
        .iter()
        .map(|(name, rules)| build_automaton(name, rules))
        .collect::<Result<_, CompileError>>()?;

    let mut automata = Vec::with_capacity(stages.len());
    let mut diagnostics = Vec::new();
    for stage in stages {
        diagnostics.extend(stage.parse_diagnostics);
        diagnostics.extend(analysis::analyze(
            &stage.name,
            &stage.dfa,
            &stage.compiled,
            registry,
        ));
        automata.push(CompiledAutomaton {
            start_state: stage.name,
            table: TransitionTable::from_dfa(&stage.dfa),
        });
    }

    Ok(CompileOutput {
        automata,
        diagnostics,
    })
}

/// Group rules by start-state name, preserving first-declaration order of the
/// names and declaration order within each group. The default state is always
/// the first group.
fn group_by_start_state(rules: &[RuleDescriptor]) -> Vec<(CompactString, Vec<&RuleDescriptor>)> {
    let mut names: Vec<CompactString> = vec![CompactString::const_new(INITIAL_STATE)];
    let mut groups: HashMap<CompactString, Vec<&RuleDescriptor>, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    groups.insert(CompactString::const_new(INITIAL_STATE), Vec::new());

    for rule in rules {
        if !groups.contains_key(&rule.start_state) {
            names.push(rule.start_state.clone());
            groups.insert(rule.start_state.clone(), Vec::new());
        }
        if let Some(group) = groups.get_mut(&rule.start_state) {
            group.push(rule);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let rules = groups.remove(&name).unwrap_or_default();
            (name, rules)
        })
        .collect()
}

/// Per-start-state pipeline result, before analysis and emission.
struct Stage<'a> {
    name: CompactString,
    dfa: Dfa,
    parse_diagnostics: Vec<Diagnostic>,
    compiled: Vec<&'a RuleDescriptor>,
}

/// Parse, build, combine, and determinize one start state's rules.
fn build_automaton<'a>(
    name: &CompactString,
    rules: &[&'a RuleDescriptor],
) -> Result<Stage<'a>, CompileError> {
    let mut parse_diagnostics = Vec::new();
    let mut nfa = Nfa::new();
    let mut fragments = Vec::new();
    let mut compiled = Vec::new();

    for &rule in rules {
        match regex::parse(&rule.pattern) {
            Ok(node) => {
                let fragment = thompson(&node, &mut nfa);
                fragments.push(TaggedFragment {
                    order: rule.order,
                    action: rule.action,
                    fragment,
                });
                compiled.push(rule);
            }
            Err(error) => {
                // Drop this rule, keep the rest of the start state usable
                parse_diagnostics.push(Diagnostic::ParseError {
                    start_state: name.clone(),
                    pattern: rule.pattern.clone(),
                    position: error.position,
                    message: error.kind.to_string(),
                });
            }
        }
    }

    let start = combine(&fragments, &mut nfa);
    let dfa = determinize(&nfa, start)?;

    Ok(Stage {
        name: name.clone(),
        dfa,
        parse_diagnostics,
        compiled,
    })
}
