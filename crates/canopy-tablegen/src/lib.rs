//! Grammar-to-parse-table compiler.
//!
//! Turns a programmatic [`Grammar`] description into the
//! [`canopy_tables::Tables`] artifact the runtime consumes: a lexer DFA
//! built from token patterns and SLR(1) action/goto tables built from the
//! production rules.
//!
//! The runtime never depends on this crate; it exists so grammars can be
//! compiled in-process (primarily by test suites) instead of shipping
//! hand-written tables.

mod grammar;
mod lalr;
mod lexgen;


pub use grammar::{prod, prod_prec, r, t, Elem, Grammar, GrammarError, Pattern, Production};
