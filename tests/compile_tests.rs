//! End-to-end tests for the rule-compilation pipeline

use relex::{Diagnostic, INITIAL_STATE, RuleSetBuilder};

#[test]
fn test_longest_match() {
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("a", "T1")
        .rule_in_initial("ab", "T2")
        .compile()
        .expect("compilation should succeed");

    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (len, accept) = table.scan_token("ab").expect("should match");
    assert_eq!(len, 2, "both characters must be consumed");
    assert_eq!(registry.resolve(accept.action), "T2");
}

#[test]
fn test_priority_tie_break() {
    // The canonical regression test for the tie-break rule: both patterns
    // match "if" at length 2, and the earlier declaration must win
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]+", "T1")
        .rule_in_initial("if", "T2")
        .compile()
        .expect("compilation should succeed");

    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (len, accept) = table.scan_token("if").expect("should match");
    assert_eq!(len, 2);
    assert_eq!(registry.resolve(accept.action), "T1");
}

#[test]
fn test_keyword_before_identifier() {
    // The conventional ordering: keyword first, identifier as fallback
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("if", "KW_IF")
        .rule_in_initial("[a-z]+", "IDENT")
        .compile()
        .expect("compilation should succeed");

    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (_, accept) = table.scan_token("if").unwrap();
    assert_eq!(registry.resolve(accept.action), "KW_IF");
    let (len, accept) = table.scan_token("iffy").unwrap();
    assert_eq!(len, 4, "longest match overrides the keyword");
    assert_eq!(registry.resolve(accept.action), "IDENT");
}

#[test]
fn test_start_state_isolation() {
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]+", "IDENT")
        .rule("COMMENT", "[^*]+", "COMMENT_TEXT")
        .compile()
        .expect("compilation should succeed");

    let initial = &output.automaton(INITIAL_STATE).unwrap().table;
    let comment = &output.automaton("COMMENT").unwrap().table;

    // The comment rule matches digits; the initial state's automaton must not
    assert!(initial.scan_token("123").is_none());
    let (_, accept) = comment.scan_token("123").unwrap();
    assert_eq!(registry.resolve(accept.action), "COMMENT_TEXT");

    // Re-running the same input against each automaton is idempotent
    for _ in 0..3 {
        let (len, accept) = comment.scan_token("some text").unwrap();
        assert_eq!(len, 9);
        assert_eq!(registry.resolve(accept.action), "COMMENT_TEXT");
        assert!(initial.scan_token("123").is_none());
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let build = || {
        RuleSetBuilder::new()
            .rule_in_initial("if|else|while", "KEYWORD")
            .rule_in_initial("[a-z_][a-z0-9_]*", "IDENT")
            .rule_in_initial("[0-9]+", "NUMBER")
            .rule("STRING", "[^\"\\\\]+", "CHARS")
            .compile()
            .expect("compilation should succeed")
            .0
    };

    let first = build();
    let second = build();
    assert_eq!(first.automata.len(), second.automata.len());
    for (a, b) in first.automata.iter().zip(&second.automata) {
        assert_eq!(a.start_state, b.start_state);
        assert_eq!(a.table.state_count(), b.table.state_count());
        assert_eq!(a.table.class_count(), b.table.class_count());
        assert_eq!(a.table.rows(), b.table.rows());
        assert_eq!(a.table.start(), b.table.start());
    }
}

#[test]
fn test_malformed_rule_reported_others_usable() {
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("a(", "BROKEN")
        .rule_in_initial("[0-9]+", "NUMBER")
        .rule_in_initial("[a-z]+", "IDENT")
        .compile()
        .expect("compilation should succeed");

    assert!(
        matches!(
            output.diagnostics.as_slice(),
            [Diagnostic::ParseError { pattern, .. }] if pattern == "a("
        ),
        "exactly the broken rule is reported: {:?}",
        output.diagnostics
    );

    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (len, accept) = table.scan_token("42").unwrap();
    assert_eq!(len, 2);
    assert_eq!(registry.resolve(accept.action), "NUMBER");
}

#[test]
fn test_infinite_match_diagnostic() {
    let (output, _) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]*", "T1")
        .compile()
        .expect("compilation should succeed");

    assert_eq!(
        output.diagnostics,
        vec![Diagnostic::PotentialInfiniteMatch {
            start_state: INITIAL_STATE.into(),
        }]
    );
}

#[test]
fn test_shadowed_rule_diagnostic() {
    let (output, _) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]+", "IDENT")
        .rule_in_initial("while", "KW_WHILE")
        .compile()
        .expect("compilation should succeed");

    assert_eq!(
        output.diagnostics,
        vec![Diagnostic::UnreachableRule {
            start_state: INITIAL_STATE.into(),
            order: 1,
            action: "KW_WHILE".into(),
        }]
    );
}

#[test]
fn test_very_long_literal_rule() {
    // A pattern of hundreds of kilobytes is valid input and must compile
    // without exhausting the stack
    let pattern = "a".repeat(200_000);
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial(&pattern, "LONG")
        .compile()
        .expect("compilation should succeed");

    assert!(output.diagnostics.is_empty());
    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (len, accept) = table.scan_token(&pattern).expect("should match");
    assert_eq!(len, 200_000);
    assert_eq!(registry.resolve(accept.action), "LONG");
}

#[test]
fn test_diagnostics_grouped_by_start_state() {
    // One finding in the default state, two in STRING; the accessor lets the
    // caller bucket the consolidated list per state
    let (output, _) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]*", "IDENT")
        .rule("STRING", "\\", "BROKEN")
        .compile()
        .expect("compilation should succeed");

    let in_initial: Vec<&Diagnostic> = output
        .diagnostics
        .iter()
        .filter(|d| d.start_state() == INITIAL_STATE)
        .collect();
    let in_string: Vec<&Diagnostic> = output
        .diagnostics
        .iter()
        .filter(|d| d.start_state() == "STRING")
        .collect();

    assert_eq!(in_initial.len() + in_string.len(), output.diagnostics.len());
    assert!(matches!(
        in_initial.as_slice(),
        [Diagnostic::PotentialInfiniteMatch { .. }]
    ));
    assert!(
        in_string
            .iter()
            .any(|d| matches!(d, Diagnostic::ParseError { .. }))
    );
    assert!(
        in_string
            .iter()
            .any(|d| matches!(d, Diagnostic::EmptyStartState { .. }))
    );
}

#[test]
fn test_empty_declared_start_state() {
    // A start state whose only rule fails to parse ends up empty
    let (output, _) = RuleSetBuilder::new()
        .rule_in_initial("[a-z]+", "IDENT")
        .rule("BROKEN_STATE", "+", "NEVER")
        .compile()
        .expect("compilation should succeed");

    assert!(output.automaton("BROKEN_STATE").is_some());
    assert!(
        output
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::EmptyStartState { name } if name == "BROKEN_STATE"))
    );
}

/// Drive the emitted table the way a generated lexer would: repeated
/// longest-match scans, collecting action names.
fn tokenize(input: &str) -> Vec<(String, String)> {
    let (output, registry) = RuleSetBuilder::new()
        .rule_in_initial("if", "KW_IF")
        .rule_in_initial("else", "KW_ELSE")
        .rule_in_initial("[a-z_][a-z0-9_]*", "IDENT")
        .rule_in_initial("[0-9]+", "NUMBER")
        .rule_in_initial("==|!=|<=|>=", "COMPARE")
        .rule_in_initial("[-+*/=<>(){};]", "PUNCT")
        .rule_in_initial("[ \t\n]+", "WS")
        .compile()
        .expect("compilation should succeed");

    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let mut tokens = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let (len, accept) = table.scan_token(rest).expect("no lexical errors expected");
        assert!(len > 0, "scanner must make progress");
        let action = registry.resolve(accept.action).to_string();
        if action != "WS" {
            tokens.push((action, rest[..len].to_string()));
        }
        rest = &rest[len..];
    }
    tokens
}

#[test]
fn test_tokenize_small_program() {
    let tokens = tokenize("if x1 == 42 { y = 7; } else { y = 0; }");
    let kinds: Vec<&str> = tokens.iter().map(|(kind, _)| kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "KW_IF", "IDENT", "COMPARE", "NUMBER", "PUNCT", "IDENT", "PUNCT", "NUMBER", "PUNCT",
            "PUNCT", "KW_ELSE", "PUNCT", "IDENT", "PUNCT", "NUMBER", "PUNCT", "PUNCT",
        ]
    );
    assert_eq!(tokens[1].1, "x1");
    assert_eq!(tokens[3].1, "42");
}

#[test]
fn test_low_level_compile_api() {
    use relex::{ActionRegistry, RuleDescriptor, compile};

    let mut registry = ActionRegistry::new();
    let number = registry.intern("NUMBER");
    let rules = vec![RuleDescriptor::new(INITIAL_STATE, "[0-9]+", number, 0)];

    let output = compile(&rules, &registry).expect("compilation should succeed");
    assert!(output.diagnostics.is_empty());
    let table = &output.automaton(INITIAL_STATE).unwrap().table;
    let (len, accept) = table.scan_token("9000").unwrap();
    assert_eq!(len, 4);
    assert_eq!(accept.action, number);
}
