//! Regular-expression syntax tree.

/// Set of character ranges, possibly negated.
///
/// Ranges are inclusive `(start, end)` pairs. A negated set stores the ranges
/// as written; the complement against the full alphabet is taken at
/// NFA-construction time via [`CharSet::expanded_ranges`], which keeps the
/// parser alphabet-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
    negated: bool,
}

/// Last scalar value of the alphabet.
const ALPHABET_MAX: char = '\u{10FFFF}';

/// Step to the next Unicode scalar value, skipping the surrogate gap.
fn char_succ(c: char) -> Option<char> {
    let mut v = c as u32 + 1;
    if v == 0xD800 {
        v = 0xE000;
    }
    char::from_u32(v)
}

/// Step to the previous Unicode scalar value, skipping the surrogate gap.
fn char_pred(c: char) -> Option<char> {
    if c == '\0' {
        return None;
    }
    let mut v = c as u32 - 1;
    if v == 0xDFFF {
        v = 0xD7FF;
    }
    char::from_u32(v)
}

impl CharSet {
    /// Create a character set with the given ranges
    #[must_use]
    pub const fn new(ranges: Vec<(char, char)>, negated: bool) -> Self {
        Self { ranges, negated }
    }

    /// A set matching exactly one character
    #[must_use]
    pub fn single(c: char) -> Self {
        Self::new(vec![(c, c)], false)
    }

    /// The `.` atom: any character except a line break
    #[must_use]
    pub fn any_but_newline() -> Self {
        Self::new(vec![('\n', '\n')], true)
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    /// Check if a character matches this set, honoring negation
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        let inside = self
            .ranges
            .iter()
            .any(|(start, end)| c >= *start && c <= *end);
        inside != self.negated
    }

    /// Sort and merge the stored ranges into a canonical non-overlapping form.
    fn normalized(&self) -> Vec<(char, char)> {
        let mut sorted = self.ranges.clone();
        sorted.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            match merged.last_mut() {
                // Adjacent or overlapping ranges coalesce
                Some((_, prev_end)) if char_succ(*prev_end).is_none_or(|n| start <= n) => {
                    if end > *prev_end {
                        *prev_end = end;
                    }
                }
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    /// The concrete ranges this set denotes over the full alphabet.
    ///
    /// For a positive set this is the normalized range list; for a negated set
    /// it is the complement against `'\0'..=U+10FFFF`, with the surrogate gap
    /// excluded. This is the only place negation is expanded.
    #[must_use]
    pub fn expanded_ranges(&self) -> Vec<(char, char)> {
        let normalized = self.normalized();
        if !self.negated {
            return normalized;
        }

        let mut complement = Vec::new();
        let mut cursor = Some('\0');
        for (start, end) in normalized {
            if let Some(lo) = cursor
                && lo < start
                && let Some(hi) = char_pred(start)
            {
                complement.push((lo, hi));
            }
            cursor = char_succ(end);
        }
        if let Some(lo) = cursor {
            complement.push((lo, ALPHABET_MAX));
        }
        complement
    }
}

/// One regular-expression operator.
///
/// A closed tagged union rather than a trait hierarchy: the NFA builder is a
/// single exhaustive match, which the compiler checks for completeness. The
/// tree is owned by the parse result for one rule and discarded after NFA
/// construction; nothing is shared across rules.
///
/// Concatenation and alternation are n-ary. The parser builds their item
/// lists iteratively, so tree depth grows only with group nesting and stacked
/// repetition operators, both of which the parser bounds. That keeps the NFA
/// builder's recursion, and this type's recursive drop, shallow even for
/// patterns that are hundreds of kilobytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexNode {
    /// A single literal character
    Literal(char),
    /// A bracket expression `[...]` / `[^...]`, or the `.` atom
    Class(CharSet),
    /// Items in sequence
    Concat(Vec<RegexNode>),
    /// `|`-separated branches
    Alt(Vec<RegexNode>),
    /// Zero or more repetitions
    Star(Box<RegexNode>),
    /// One or more repetitions
    Plus(Box<RegexNode>),
    /// Zero or one occurrence
    Optional(Box<RegexNode>),
    /// Bounded repetition `{min}`, `{min,}`, or `{min,max}`
    Repeat {
        node: Box<RegexNode>,
        min: u32,
        max: Option<u32>,
    },
}
