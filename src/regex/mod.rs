//! # Pattern Parsing
//!
//! Parses one rule pattern into a [`RegexNode`] syntax tree.
//!
//! The supported syntax is the classic lex vocabulary: literals, escapes,
//! bracket expressions with ranges and negation, `.`, grouping, alternation,
//! and the repetition operators `*`, `+`, `?`, and `{m,n}`. Negated classes
//! stay symbolic here; they are expanded against the full alphabet during NFA
//! construction.

pub mod ast;
pub mod parser;

pub use ast::{CharSet, RegexNode};
pub use parser::parse;
