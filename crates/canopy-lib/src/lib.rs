//! Canopy: an incremental parser runtime.
//!
//! Given a grammar compiled to parse tables ([`canopy_tables::Tables`]),
//! this crate turns a textual document into a concrete syntax tree and
//! re-parses efficiently after localized edits, reusing previously built
//! subtrees. Parse errors never fail a parse; they become `ERROR` nodes
//! with correct positions and sizes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use canopy_lib::{Document, Language, StringInput};
//!
//! # fn tables() -> canopy_tables::Tables { unimplemented!() }
//! let language = Arc::new(Language::new(tables()).unwrap());
//! let mut doc = Document::new();
//! doc.set_language(language);
//! doc.set_input(Box::new(StringInput::new("[1, 2, 3]"))).unwrap();
//! let root = doc.root().unwrap();
//! println!("{}", root.to_sexp());
//!
//! // The reader must reflect the edit before `edit` is called.
//! doc.edit(1, 1, 2).unwrap();
//! ```

mod document;
mod edit;
mod error;
mod input;
mod language;
mod lexer;
mod parser;
mod tree;

mod invariants;

#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod input_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod tests;
#[cfg(test)]
mod tree_tests;

pub use document::Document;
pub use edit::InputEdit;
pub use error::Error;
pub use input::{Input, SpyInput, StringInput};
pub use language::Language;
pub use parser::{NoopTracer, ParseEvent, ParseTracer};
pub use tree::{Node, SyntaxTree};
