//! # Error Types
//!
//! Error and diagnostic types for rule compilation.
//!
//! Three categories exist, with different propagation rules:
//!
//! - [`PatternError`]: a malformed regular expression. Recoverable per rule;
//!   the offending rule is dropped from its start state and reported, and
//!   compilation of the remaining rules proceeds.
//! - [`Diagnostic`]: structural findings (shadowed rules, empty start states,
//!   automata that admit empty matches). Never fatal, always reported.
//! - [`CompileError`]: an internal invariant violation. Fatal, because it
//!   indicates a bug in the generator rather than bad input, and aborts the
//!   run instead of emitting an unsound table.
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich rendering.

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic as MietteDiagnostic;

/// Pattern syntax error with location information
///
/// `position` is a character offset into the pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(MietteDiagnostic))]
#[error("{kind}")]
pub struct PatternError {
    pub position: u32,
    #[source]
    pub kind: PatternErrorKind,
}

/// Types of pattern syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(MietteDiagnostic))]
pub enum PatternErrorKind {
    #[error("unmatched '('")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::unmatched_paren)))]
    UnmatchedParen,

    #[error("unexpected ')'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::unexpected_paren)))]
    UnexpectedParen,

    #[error("'{op}' has nothing to repeat")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::dangling_operator)))]
    DanglingOperator { op: char },

    #[error("invalid range '{start}-{end}' in character class")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::invalid_range)))]
    InvalidRange { start: char, end: char },

    #[error("unterminated character class")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::unterminated_class)))]
    UnterminatedClass,

    #[error("pattern ends with a bare '\\'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::trailing_escape)))]
    TrailingEscape,

    #[error("malformed repetition bound: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::malformed_repeat)))]
    MalformedRepeat { reason: CompactString },

    #[error("repetition bound exceeds the limit of {limit}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::repeat_too_large)))]
    RepeatTooLarge { limit: u32 },

    #[error("empty pattern or alternation branch")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::empty_pattern)))]
    EmptyPattern,

    #[error("pattern nesting exceeds the depth limit of {limit}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::nesting_too_deep)))]
    NestingTooDeep { limit: u32 },
}

/// A non-fatal finding surfaced to the caller alongside the emitted tables.
///
/// The caller receives one consolidated list covering all rules and all start
/// states from a single invocation, not just the first problem encountered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(MietteDiagnostic))]
pub enum Diagnostic {
    /// A rule's pattern failed to parse; the rule was dropped.
    #[error("in {start_state}: pattern `{pattern}` is malformed at offset {position}: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::parse_error)))]
    ParseError {
        start_state: CompactString,
        pattern: CompactString,
        position: u32,
        message: String,
    },

    /// A rule can never win a match because earlier rules shadow it entirely.
    #[error("in {start_state}: rule #{order} (`{action}`) is unreachable; earlier rules shadow it")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::unreachable_rule)))]
    UnreachableRule {
        start_state: CompactString,
        order: u32,
        action: CompactString,
    },

    /// A start state ended up with no accepting DFA state at all.
    #[error("start state {name} has no usable rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::empty_start_state)))]
    EmptyStartState { name: CompactString },

    /// The automaton accepts the empty string, so a scanner driving it can
    /// emit zero-length tokens forever on input no rule consumes.
    #[error("start state {start_state} matches the empty string; malformed input may loop")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::infinite_match)))]
    PotentialInfiniteMatch { start_state: CompactString },
}

/// Fatal compilation failure.
///
/// Only internal invariant violations abort the run; every input-caused
/// problem is reported through [`Diagnostic`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(MietteDiagnostic))]
pub enum CompileError {
    #[error("internal invariant violated: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(relex::internal)))]
    Internal { message: String },
}

impl CompileError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Diagnostic {
    /// The start state this diagnostic concerns.
    #[must_use]
    pub fn start_state(&self) -> &str {
        match self {
            Self::ParseError { start_state, .. }
            | Self::UnreachableRule { start_state, .. }
            | Self::PotentialInfiniteMatch { start_state } => start_state,
            Self::EmptyStartState { name } => name,
        }
    }
}
