use super::*;

fn tiny_tables() -> Tables {
    let mut symbols = Tables::builtin_symbols();
    symbols.push(SymbolInfo {
        name: "number".into(),
        kind: SymbolKind::Terminal,
        named: true,
        ubiquitous: false,
    });
    let number = Symbol(3);
    Tables {
        name: "tiny".into(),
        symbols,
        lex_states: vec![
            LexState {
                advances: vec![LexAdvance {
                    lo: b'0',
                    hi: b'9',
                    target: 1,
                }],
                default_advance: None,
                accepts: vec![],
            },
            LexState {
                advances: vec![LexAdvance {
                    lo: b'0',
                    hi: b'9',
                    target: 1,
                }],
                default_advance: None,
                accepts: vec![number],
            },
        ],
        lex_start: 0,
        parse_states: vec![
            ParseState {
                actions: vec![(number, Action::Shift { state: 1 })],
                gotos: vec![],
            },
            ParseState {
                actions: vec![(Symbol::END, Action::Accept)],
                gotos: vec![],
            },
        ],
        parse_start: 0,
    }
}

#[test]
fn json_round_trip() {
    let tables = tiny_tables();
    let json = tables.to_json();
    let back = Tables::from_json(&json).unwrap();
    assert_eq!(tables, back);
}

#[test]
fn json_rejects_garbage() {
    let err = Tables::from_json("{\"name\": 42}").unwrap_err();
    assert!(matches!(err, TablesError::Json(_)));
    assert!(err.to_string().contains("JSON parse error"));
}

#[test]
fn json_defaults_optional_fields() {
    // `ubiquitous`, `default_advance`, and `accepts` may be omitted.
    let json = r#"{
        "name": "empty",
        "symbols": [
            {"name": "end", "kind": "Terminal", "named": false},
            {"name": "error", "kind": "NonTerminal", "named": true},
            {"name": "DOCUMENT", "kind": "NonTerminal", "named": true}
        ],
        "lex_states": [{"advances": []}],
        "lex_start": 0,
        "parse_states": [{"actions": [], "gotos": []}],
        "parse_start": 0
    }"#;
    let tables = Tables::from_json(json).unwrap();
    assert!(!tables.symbols[0].ubiquitous);
    assert_eq!(tables.lex_states[0].default_advance, None);
    assert!(tables.lex_states[0].accepts.is_empty());
}

#[test]
fn action_lookup() {
    let tables = tiny_tables();
    let number = Symbol(3);
    assert_eq!(
        tables.state(0).action(number),
        Some(Action::Shift { state: 1 })
    );
    assert_eq!(tables.state(0).action(Symbol::END), None);
    assert_eq!(tables.state(1).action(Symbol::END), Some(Action::Accept));
}

#[test]
fn symbol_names() {
    let tables = tiny_tables();
    assert_eq!(tables.symbol_name(Symbol::END), "end");
    assert_eq!(tables.symbol_name(Symbol::ERROR), "error");
    assert_eq!(tables.symbol_name(Symbol::DOCUMENT), "DOCUMENT");
    assert_eq!(tables.symbol_name(Symbol(3)), "number");
}
