use std::sync::Arc;

use canopy_tablegen::{prod, t, Grammar, Pattern};

use crate::lexer::Lexer;
use crate::tests::grammars;
use crate::{Language, StringInput};

fn lex_names(language: &Arc<Language>, text: &str) -> Vec<(Vec<String>, String)> {
    let mut input = StringInput::with_chunk_size(text, 3);
    let mut lexer = Lexer::new(&mut input);
    let state = language.tables().parse_start;
    let mut fetches = Vec::new();
    loop {
        let fetch = lexer
            .fetch(language, state, language.no_lookahead())
            .unwrap();
        let trivia = fetch
            .trivia
            .iter()
            .map(|token| language.symbol_name(token.symbol).to_string())
            .collect();
        let name = language.symbol_name(fetch.token.symbol).to_string();
        let done = fetch.token.is_end();
        fetches.push((trivia, name));
        if done {
            return fetches;
        }
    }
}

#[test]
fn trivia_binds_to_the_following_token() {
    let language = grammars::arithmetic();
    let fetches = lex_names(&language, "12 + ab");
    assert_eq!(
        fetches,
        vec![
            (vec![], "number".into()),
            (vec!["ws".into()], "+".into()),
            (vec!["ws".into()], "variable".into()),
            (vec![], "end".into()),
        ]
    );
}

#[test]
fn comment_accumulates_with_surrounding_whitespace() {
    let language = grammars::arithmetic();
    let fetches = lex_names(&language, "1 # note\n2");
    assert_eq!(
        fetches,
        vec![
            (vec![], "number".into()),
            (
                vec!["ws".into(), "comment".into(), "ws".into()],
                "number".into()
            ),
            (vec![], "end".into()),
        ]
    );
}

#[test]
fn longest_match_wins() {
    let language = grammars::arithmetic();
    let mut input = StringInput::new("12345+");
    let mut lexer = Lexer::new(&mut input);
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    assert_eq!(language.symbol_name(fetch.token.symbol), "number");
    assert_eq!(fetch.token.start(), 0);
    assert_eq!(fetch.token.end(), 5);
}

#[test]
fn wildcard_token_accepts_at_end_of_input() {
    let language = grammars::arithmetic();
    let mut input = StringInput::new("# runs to eof");
    let mut lexer = Lexer::new(&mut input);
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    // The comment is ubiquitous: it lands in trivia, then END.
    assert_eq!(fetch.trivia.len(), 1);
    assert_eq!(language.symbol_name(fetch.trivia[0].symbol), "comment");
    assert_eq!(fetch.trivia[0].end(), "# runs to eof".len());
    assert!(fetch.token.is_end());
}

#[test]
fn unrecognized_byte_becomes_a_one_byte_error_token() {
    let language = grammars::arithmetic();
    let mut input = StringInput::new("@rest");
    let mut lexer = Lexer::new(&mut input);
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    assert!(fetch.token.is_lex_error());
    assert_eq!(fetch.token.start(), 0);
    assert_eq!(fetch.token.end(), 1);
    assert_eq!(fetch.token.hint, b'@');
}

#[test]
fn dfa_death_mid_token_reports_the_dying_byte() {
    let language = grammars::json();
    let mut input = StringInput::new("faX");
    let mut lexer = Lexer::new(&mut input);
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    assert!(fetch.token.is_lex_error());
    // `fa` walked down the `false` path; `X` killed it.
    assert_eq!(fetch.token.hint, b'X');
    assert_eq!(fetch.token.start(), 0);
}

#[test]
fn equal_length_match_prefers_the_lookahead_set() {
    // `let` is both a keyword and identifier-shaped. With only
    // `identifier` expected, the identifier interpretation wins.
    let mut g = Grammar::new("keywords");
    g.token("let", Pattern::literal("let"));
    g.token("identifier", Pattern::range(b'a', b'z').repeat1());
    g.rule("start", vec![prod(&[t("identifier")])]);
    let language = Arc::new(Language::new(g.compile().unwrap()).unwrap());

    let mut input = StringInput::new("let");
    let mut lexer = Lexer::new(&mut input);
    let state = language.tables().parse_start;
    let fetch = lexer
        .fetch(&language, state, language.valid_set(state))
        .unwrap();
    assert_eq!(language.symbol_name(fetch.token.symbol), "identifier");
}

#[test]
fn equal_length_match_falls_back_to_declaration_order() {
    let mut g = Grammar::new("keywords");
    g.token("let", Pattern::literal("let"));
    g.token("identifier", Pattern::range(b'a', b'z').repeat1());
    g.rule("start", vec![prod(&[t("let")]), prod(&[t("identifier")])]);
    let language = Arc::new(Language::new(g.compile().unwrap()).unwrap());

    let mut input = StringInput::new("let");
    let mut lexer = Lexer::new(&mut input);
    // No lookahead context: the earlier-declared `let` wins the tie.
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    assert_eq!(language.symbol_name(fetch.token.symbol), "let");
}

#[test]
fn seek_restarts_lexing_at_the_new_offset() {
    let language = grammars::arithmetic();
    let mut input = StringInput::new("111 222");
    let mut lexer = Lexer::new(&mut input);
    lexer.seek(4);
    let fetch = lexer
        .fetch(&language, 0, language.no_lookahead())
        .unwrap();
    assert_eq!(fetch.token.start(), 4);
    assert_eq!(fetch.token.end(), 7);
}
