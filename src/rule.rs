//! Rule descriptors, the action-tag registry, and the fluent rule-set builder.

use compact_str::CompactString;
use lasso::Rodeo;
use smallvec::SmallVec;

use crate::compile::{self, CompileOutput};
use crate::error::CompileError;

/// Name of the default start state.
///
/// Rules the outer script parser found without a start-state annotation belong
/// here, and the state is always present in the output even when no rule
/// declares it.
pub const INITIAL_STATE: &str = "YYINITIAL";

/// Interned action tag.
///
/// An opaque identifier correlating an accepting DFA state with the
/// user-supplied behavior to execute when that rule matches. The text behind a
/// tag lives in the [`ActionRegistry`] that interned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionTag(lasso::Spur);

/// Registry of action-tag names.
///
/// An explicit object rather than a process-wide table, so repeated or
/// parallel compiler invocations in one process never observe each other.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    names: Rodeo,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an action name, returning its tag. Re-interning the same name
    /// returns the same tag.
    pub fn intern(&mut self, name: &str) -> ActionTag {
        ActionTag(self.names.get_or_intern(name))
    }

    /// Resolve a tag back to its name.
    ///
    /// # Panics
    ///
    /// Panics if the tag was interned by a different registry.
    #[must_use]
    pub fn resolve(&self, tag: ActionTag) -> &str {
        self.names.resolve(&tag.0)
    }

    /// Look up a previously interned name without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ActionTag> {
        self.names.get(name).map(ActionTag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One lexer rule as extracted by the outer script parser.
///
/// `order` is the tie-break key for ambiguous matches: among rules matching
/// the same longest prefix, the one with the smallest `order` (declared
/// earliest) wins. Descriptors are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub start_state: CompactString,
    pub pattern: CompactString,
    pub action: ActionTag,
    pub order: u32,
}

impl RuleDescriptor {
    #[must_use]
    pub fn new(start_state: &str, pattern: &str, action: ActionTag, order: u32) -> Self {
        Self {
            start_state: CompactString::new(start_state),
            pattern: CompactString::new(pattern),
            action,
            order,
        }
    }
}

// Rule counts are extremely unlikely to exceed u32::MAX
#[allow(clippy::cast_possible_truncation)]
pub struct RuleSetBuilder {
    rules: SmallVec<[RuleDescriptor; 16]>,
    registry: ActionRegistry,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: SmallVec::new(),
            registry: ActionRegistry::new(),
        }
    }

    /// Append a rule under the given start state. Declaration order is
    /// assigned automatically: earlier calls win tie-breaks.
    #[must_use]
    pub fn rule(mut self, start_state: &str, pattern: &str, action: &str) -> Self {
        let tag = self.registry.intern(action);
        let order = u32::try_from(self.rules.len()).unwrap_or(0);
        self.rules
            .push(RuleDescriptor::new(start_state, pattern, tag, order));
        self
    }

    /// Append a rule under the default [`INITIAL_STATE`].
    #[must_use]
    pub fn rule_in_initial(self, pattern: &str, action: &str) -> Self {
        self.rule(INITIAL_STATE, pattern, action)
    }

    #[must_use]
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Run the full pipeline over the collected rules.
    ///
    /// Returns the compiled output together with the registry that owns the
    /// interned action names, so the caller can resolve tags in the emitted
    /// tables and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error only on an internal invariant violation; malformed
    /// patterns surface as diagnostics in the output instead.
    pub fn compile(self) -> Result<(CompileOutput, ActionRegistry), CompileError> {
        let output = compile::compile(&self.rules, &self.registry)?;
        Ok((output, self.registry))
    }
}
