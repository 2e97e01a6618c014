//! The parse-table data model and its codecs.

mod binary;
mod json;
mod types;
mod validate;

#[cfg(test)]
mod json_tests;

pub use json::TablesError;
pub use types::{
    Action, LexAdvance, LexState, LexStateId, ParseState, ParseStateId, Symbol, SymbolInfo,
    SymbolKind, Tables,
};
pub use validate::ValidateError;
