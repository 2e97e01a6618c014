//! Parse-table artifact for the canopy parser runtime.
//!
//! A grammar compiler emits a [`Tables`] value: symbol metadata, a lexer
//! DFA, and LR parse states. The runtime consumes it read-only; nothing in
//! this crate executes anything.
//!
//! Two encodings:
//! - **JSON** (`from_json`/`to_json`): the interchange format grammar
//!   compilers emit
//! - **Binary** (`from_binary`/`to_binary`): compact postcard encoding for
//!   embedding

mod tables;

pub use tables::{
    Action, LexAdvance, LexState, LexStateId, ParseState, ParseStateId, Symbol, SymbolInfo,
    SymbolKind, Tables, TablesError, ValidateError,
};
