//! Ubiquitous-token handling: newlines that are both statement
//! terminators and trivia, comments binding to the following token.

use indoc::indoc;

use super::{check, document_with, grammars, sexp};

#[test]
fn newline_used_as_a_grammar_symbol() {
    let language = grammars::javascript();
    let (doc, _spy) = document_with(&language, "fn()\n");

    assert_eq!(
        sexp(&doc),
        "(DOCUMENT (expression_statement (function_call (identifier))))"
    );
    check(&doc);
}

#[test]
fn newline_absorbed_as_trivia_when_the_expression_continues() {
    let language = grammars::javascript();
    let (doc, _spy) = document_with(&language, "fn()\n  .otherFn();");

    assert_eq!(
        sexp(&doc),
        "(DOCUMENT (expression_statement (function_call \
         (property_access (function_call (identifier)) (identifier)))))"
    );
    check(&doc);
}

#[test]
fn run_of_ubiquitous_tokens_lands_in_the_enclosing_node() {
    let text = indoc! {"
        fn()

        // This is a comment

        .otherFn();"};
    let language = grammars::javascript();
    let (doc, _spy) = document_with(&language, text);

    assert_eq!(
        sexp(&doc),
        "(DOCUMENT (expression_statement (function_call \
         (property_access (function_call (identifier)) (comment) (identifier)))))"
    );
    check(&doc);
}

#[test]
fn two_statements_split_by_a_promoted_newline() {
    let language = grammars::javascript();
    let (doc, _spy) = document_with(&language, "fn()\nother()\n");

    assert_eq!(
        sexp(&doc),
        "(DOCUMENT (expression_statement (function_call (identifier))) \
         (expression_statement (function_call (identifier))))"
    );
    check(&doc);
}
