//! # Relex
//!
//! A lexical-analyzer generator core: compiles named sets of regular-expression
//! rules into table-driven deterministic finite automata.
//!
//! ## Overview
//!
//! Relex is the automaton half of a lex-style tool. It consumes a flat list of
//! rules, each a (start state, pattern, action tag) triple with a declaration
//! order, and produces per start state a compact transition table plus an
//! accepting-state-to-action mapping. It supports:
//!
//! - **Classic lex pattern syntax**: literals, escapes, bracket expressions
//!   with ranges and negation, `.`, grouping, `|`, `*`, `+`, `?`, `{m,n}`
//! - **Start conditions**: rules grouped by named start state, each compiled
//!   into an independent automaton
//! - **Longest match, first rule wins**: overlapping patterns resolve to the
//!   longest prefix, ties to the earliest declaration
//! - **Batch diagnostics**: malformed patterns, shadowed rules, empty start
//!   states, and empty-match hazards are all reported from a single run
//!
//! Script-file reading and target-source templating are the surrounding
//! tool's job; relex neither performs I/O nor knows the target syntax.
//!
//! ## Quick Start
//!
//! ```rust
//! use relex::RuleSetBuilder;
//!
//! let (output, registry) = RuleSetBuilder::new()
//!     .rule_in_initial("if", "KW_IF")
//!     .rule_in_initial("[a-z][a-z0-9]*", "IDENT")
//!     .rule_in_initial("[0-9]+", "NUMBER")
//!     .rule_in_initial("[ \t\n]+", "WHITESPACE")
//!     .compile()?;
//!
//! assert!(output.diagnostics.is_empty());
//!
//! let table = &output.automaton(relex::INITIAL_STATE).unwrap().table;
//! let (len, accept) = table.scan_token("ifx = 1").unwrap();
//! // Longest match: "ifx" is an identifier, not the keyword plus an "x"
//! assert_eq!(len, 3);
//! assert_eq!(registry.resolve(accept.action), "IDENT");
//! # Ok::<(), relex::CompileError>(())
//! ```
//!
//! ## Modules
//!
//! - [`rule`] - Rule descriptors, the action-tag registry, and the builder
//! - [`regex`] - Pattern parsing into a regex syntax tree
//! - [`nfa`] - Thompson construction and per-start-state combination
//! - [`dfa`] - Subset construction and transition-table emission
//! - [`error`] - Error and diagnostic types

mod analysis;
pub mod compile;
pub mod dfa;
pub mod error;
pub mod nfa;
pub mod regex;
pub mod rule;

// Re-export commonly used types
pub use compile::{CompileOutput, CompiledAutomaton, compile};
pub use dfa::{Dfa, DfaState, StateId, TransitionTable, determinize};
pub use error::{CompileError, Diagnostic, PatternError, PatternErrorKind};
pub use nfa::{AcceptInfo, Nfa, NfaFragment, NodeId};
pub use regex::{CharSet, RegexNode, parse};
pub use rule::{ActionRegistry, ActionTag, INITIAL_STATE, RuleDescriptor, RuleSetBuilder};
