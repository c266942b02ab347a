//! Recursive-descent parser for rule patterns.
//!
//! Grammar, in descending precedence: alternation (`|`) binds loosest, then
//! concatenation, then the postfix repetition operators (`*`, `+`, `?`,
//! `{m,n}`), then atoms (literal character, escape, bracket expression,
//! `.`, parenthesized group).
//!
//! The parser does not attempt recovery: the first syntax error aborts this
//! pattern and the caller drops the rule, reports the error, and continues
//! with the remaining rules.

use super::ast::{CharSet, RegexNode};
use crate::error::{PatternError, PatternErrorKind};

/// Bound on group nesting and on repetition operators stacked onto one atom.
/// Alternation and concatenation build flat n-ary nodes, so these two are the
/// only sources of syntax-tree depth; keeping both under this limit keeps
/// every later recursive walk of the tree shallow.
const MAX_DEPTH: u32 = 64;

/// Upper bound accepted in `{m,n}`, bounding NFA size for bounded repetition.
const REPEAT_LIMIT: u32 = 1024;

/// Parse one pattern string into a syntax tree.
///
/// # Errors
///
/// Returns a [`PatternError`] carrying the character offset of the problem
/// for malformed patterns: unmatched parentheses, dangling repetition
/// operators, invalid class ranges such as `z-a`, unterminated bracket
/// expressions, and malformed `{m,n}` bounds.
pub fn parse(pattern: &str) -> Result<RegexNode, PatternError> {
    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
    };
    let node = parser.alternation(0)?;
    match parser.peek() {
        None => Ok(node),
        // alternation() only stops at end of input or an unconsumed ')'
        Some(_) => Err(parser.error_here(PatternErrorKind::UnexpectedParen)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn offset(&self) -> u32 {
        u32::try_from(self.pos).unwrap_or(u32::MAX)
    }

    fn error_here(&self, kind: PatternErrorKind) -> PatternError {
        PatternError {
            position: self.offset(),
            kind,
        }
    }

    fn error_at(position: u32, kind: PatternErrorKind) -> PatternError {
        PatternError { position, kind }
    }

    fn alternation(&mut self, depth: u32) -> Result<RegexNode, PatternError> {
        let mut branches = vec![self.concatenation(depth)?];
        while self.eat('|') {
            branches.push(self.concatenation(depth)?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            RegexNode::Alt(branches)
        })
    }

    fn concatenation(&mut self, depth: u32) -> Result<RegexNode, PatternError> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.postfix(depth)?);
        }
        match items.len() {
            0 => Err(self.error_here(PatternErrorKind::EmptyPattern)),
            1 => Ok(items.remove(0)),
            _ => Ok(RegexNode::Concat(items)),
        }
    }

    fn postfix(&mut self, depth: u32) -> Result<RegexNode, PatternError> {
        let mut node = self.atom(depth)?;
        let mut stacked = 0u32;
        loop {
            if matches!(self.peek(), Some('*' | '+' | '?' | '{')) {
                // Each stacked operator adds one level of tree depth
                stacked += 1;
                if stacked > MAX_DEPTH {
                    return Err(
                        self.error_here(PatternErrorKind::NestingTooDeep { limit: MAX_DEPTH })
                    );
                }
            }
            match self.peek() {
                Some('*') => {
                    self.bump();
                    node = RegexNode::Star(Box::new(node));
                }
                Some('+') => {
                    self.bump();
                    node = RegexNode::Plus(Box::new(node));
                }
                Some('?') => {
                    self.bump();
                    node = RegexNode::Optional(Box::new(node));
                }
                Some('{') => {
                    let (min, max) = self.bounds()?;
                    node = RegexNode::Repeat {
                        node: Box::new(node),
                        min,
                        max,
                    };
                }
                _ => return Ok(node),
            }
        }
    }

    fn atom(&mut self, depth: u32) -> Result<RegexNode, PatternError> {
        match self.peek() {
            Some('(') => {
                let open = self.offset();
                if depth + 1 > MAX_DEPTH {
                    return Err(Self::error_at(
                        open,
                        PatternErrorKind::NestingTooDeep { limit: MAX_DEPTH },
                    ));
                }
                self.bump();
                let inner = self.alternation(depth + 1)?;
                if !self.eat(')') {
                    return Err(Self::error_at(open, PatternErrorKind::UnmatchedParen));
                }
                Ok(inner)
            }
            Some('[') => Ok(RegexNode::Class(self.bracket_expression()?)),
            Some('.') => {
                self.bump();
                Ok(RegexNode::Class(CharSet::any_but_newline()))
            }
            Some('\\') => Ok(RegexNode::Literal(self.escape()?)),
            Some(op @ ('*' | '+' | '?' | '{')) => {
                Err(self.error_here(PatternErrorKind::DanglingOperator { op }))
            }
            Some(')') => Err(self.error_here(PatternErrorKind::UnexpectedParen)),
            Some(c) => {
                self.bump();
                Ok(RegexNode::Literal(c))
            }
            None => Err(self.error_here(PatternErrorKind::EmptyPattern)),
        }
    }

    fn escape(&mut self) -> Result<char, PatternError> {
        let backslash = self.offset();
        self.bump();
        let Some(c) = self.bump() else {
            return Err(Self::error_at(backslash, PatternErrorKind::TrailingEscape));
        };
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            // Any other escaped character stands for itself
            other => other,
        })
    }

    fn bracket_expression(&mut self) -> Result<CharSet, PatternError> {
        let open = self.offset();
        self.bump(); // '['
        let negated = self.eat('^');
        let mut ranges = Vec::new();
        let mut first = true;

        loop {
            match self.peek() {
                None => {
                    return Err(Self::error_at(open, PatternErrorKind::UnterminatedClass));
                }
                // `]` in first position is a literal member, per lex convention
                Some(']') if !first => {
                    self.bump();
                    return Ok(CharSet::new(ranges, negated));
                }
                Some(_) => {}
            }
            first = false;

            let item_pos = self.offset();
            let start = self.class_char(open)?;
            // `a-z` is a range unless the `-` is last in the class
            if self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c != ']') {
                self.bump();
                let end = self.class_char(open)?;
                if end < start {
                    return Err(Self::error_at(
                        item_pos,
                        PatternErrorKind::InvalidRange { start, end },
                    ));
                }
                ranges.push((start, end));
            } else {
                ranges.push((start, start));
            }
        }
    }

    fn class_char(&mut self, open: u32) -> Result<char, PatternError> {
        match self.peek() {
            Some('\\') => self.escape(),
            Some(c) => {
                self.bump();
                Ok(c)
            }
            None => Err(Self::error_at(open, PatternErrorKind::UnterminatedClass)),
        }
    }

    /// Parse `{m}`, `{m,}`, or `{m,n}` after a repeatable atom.
    fn bounds(&mut self) -> Result<(u32, Option<u32>), PatternError> {
        let open = self.offset();
        self.bump(); // '{'

        let min = self.bound_number(open)?;
        let max = if self.eat(',') {
            if self.peek() == Some('}') {
                None
            } else {
                Some(self.bound_number(open)?)
            }
        } else {
            Some(min)
        };

        if !self.eat('}') {
            return Err(Self::error_at(
                open,
                PatternErrorKind::MalformedRepeat {
                    reason: "missing '}'".into(),
                },
            ));
        }
        if let Some(max) = max
            && max < min
        {
            return Err(Self::error_at(
                open,
                PatternErrorKind::MalformedRepeat {
                    reason: "upper bound is smaller than lower bound".into(),
                },
            ));
        }
        Ok((min, max))
    }

    fn bound_number(&mut self, open: u32) -> Result<u32, PatternError> {
        let mut value: u64 = 0;
        let mut any = false;
        while let Some(c) = self.peek()
            && let Some(digit) = c.to_digit(10)
        {
            self.bump();
            any = true;
            value = value * 10 + u64::from(digit);
            if value > u64::from(REPEAT_LIMIT) {
                return Err(Self::error_at(
                    open,
                    PatternErrorKind::RepeatTooLarge {
                        limit: REPEAT_LIMIT,
                    },
                ));
            }
        }
        if !any {
            return Err(Self::error_at(
                open,
                PatternErrorKind::MalformedRepeat {
                    reason: "expected a decimal bound".into(),
                },
            ));
        }
        // Bounded above by REPEAT_LIMIT
        #[allow(clippy::cast_possible_truncation)]
        Ok(value as u32)
    }
}
