//! Small real grammars for the scenario suites, compiled in-process.

use std::sync::Arc;

use canopy_tablegen::{prod, r, t, Grammar, Pattern};

use crate::Language;

/// JSON values: numbers, keywords, arrays. Enough surface for the error
/// recovery scenarios.
pub(crate) fn json() -> Arc<Language> {
    let mut g = Grammar::new("json");
    g.token("number", Pattern::range(b'0', b'9').repeat1());
    g.token("true", Pattern::literal("true"));
    g.token("false", Pattern::literal("false"));
    g.token("null", Pattern::literal("null"));
    g.anon_token("ws", Pattern::one_of(b" \t\r\n").repeat1());
    g.rule(
        "_value",
        vec![
            prod(&[t("number")]),
            prod(&[t("true")]),
            prod(&[t("false")]),
            prod(&[t("null")]),
            prod(&[r("array")]),
        ],
    );
    g.rule(
        "array",
        vec![
            prod(&[t("["), t("]")]),
            prod(&[t("["), r("_elements"), t("]")]),
        ],
    );
    g.rule(
        "_elements",
        vec![
            prod(&[r("_value")]),
            prod(&[r("_elements"), t(","), r("_value")]),
        ],
    );
    g.extra("ws");
    compile(g)
}

/// Stratified arithmetic: `^` loosest, then `+`, then `*`, with
/// parenthesized groups, `#` line comments, and whitespace trivia.
pub(crate) fn arithmetic() -> Arc<Language> {
    let mut g = Grammar::new("arithmetic");
    g.token("number", Pattern::range(b'0', b'9').repeat1());
    g.token("variable", Pattern::range(b'a', b'z').repeat1());
    g.token(
        "comment",
        Pattern::literal("#").then(Pattern::none_of(b"\n").repeat()),
    );
    g.anon_token("ws", Pattern::one_of(b" \t\n").repeat1());
    g.rule("expression", vec![prod(&[r("_expr")])]);
    g.rule("_expr", vec![prod(&[r("exponent")]), prod(&[r("_sum")])]);
    g.rule("exponent", vec![prod(&[r("_sum"), t("^"), r("_expr")])]);
    g.rule("_sum", vec![prod(&[r("sum")]), prod(&[r("_product")])]);
    g.rule("sum", vec![prod(&[r("_sum"), t("+"), r("_product")])]);
    g.rule("_product", vec![prod(&[r("product")]), prod(&[r("_atom")])]);
    g.rule("product", vec![prod(&[r("_product"), t("*"), r("_atom")])]);
    g.rule(
        "_atom",
        vec![
            prod(&[t("number")]),
            prod(&[t("variable")]),
            prod(&[r("group")]),
        ],
    );
    g.rule("group", vec![prod(&[t("("), r("_expr"), t(")")])]);
    g.extra("ws");
    g.extra("comment");
    compile(g)
}

/// A JavaScript sliver where newlines terminate statements but are also
/// ubiquitous — automatic semicolon insertion in grammar form.
pub(crate) fn javascript() -> Arc<Language> {
    let mut g = Grammar::new("javascript");
    g.token(
        "identifier",
        Pattern::Class(vec![(b'a', b'z'), (b'A', b'Z'), (b'_', b'_')]).repeat1(),
    );
    g.token(
        "comment",
        Pattern::literal("//").then(Pattern::none_of(b"\n").repeat()),
    );
    g.anon_token("ws", Pattern::one_of(b" \t").repeat1());
    g.anon_token("newline", Pattern::literal("\n"));
    g.rule(
        "_program",
        vec![
            prod(&[r("expression_statement")]),
            prod(&[r("_program"), r("expression_statement")]),
        ],
    );
    g.rule(
        "expression_statement",
        vec![
            prod(&[r("_expression"), t(";")]),
            prod(&[r("_expression"), t("newline")]),
        ],
    );
    g.rule(
        "_expression",
        vec![
            prod(&[r("function_call")]),
            prod(&[r("property_access")]),
            prod(&[t("identifier")]),
        ],
    );
    g.rule(
        "function_call",
        vec![prod(&[r("_expression"), t("("), t(")")])],
    );
    g.rule(
        "property_access",
        vec![prod(&[r("_expression"), t("."), t("identifier")])],
    );
    g.extra("ws");
    g.extra("newline");
    g.extra("comment");
    compile(g)
}

fn compile(grammar: Grammar) -> Arc<Language> {
    let tables = grammar.compile().expect("test grammar compiles");
    Arc::new(Language::new(tables).expect("generated tables are valid"))
}
