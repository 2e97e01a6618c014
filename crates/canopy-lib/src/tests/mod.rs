//! Scenario suites driving the whole runtime through real grammars
//! compiled by `canopy-tablegen`.

pub(crate) mod grammars;

mod js_trivia;

use std::sync::Arc;

use crate::{Document, Language, SpyInput};

/// Document over a spy reader with deliberately tiny 3-byte chunks;
/// the spy's record is cleared after the initial parse.
pub(crate) fn document_with(language: &Arc<Language>, text: &str) -> (Document, SpyInput) {
    let spy = SpyInput::new(text, 3);
    let mut doc = Document::new();
    doc.set_language(Arc::clone(language));
    doc.set_input(Box::new(spy.clone())).expect("initial parse");
    spy.clear();
    (doc, spy)
}

pub(crate) fn sexp(doc: &Document) -> String {
    doc.root().expect("document has a tree").to_sexp()
}

pub(crate) fn check(doc: &Document) {
    crate::invariants::check_tree(&doc.root().expect("document has a tree"));
}

/// Applies an insertion to both the spy text and the document.
pub(crate) fn insert_text(doc: &mut Document, spy: &SpyInput, position: usize, text: &str) {
    spy.insert(position, text);
    doc.edit(position, 0, text.len()).expect("edit");
}

/// Applies a deletion to both the spy text and the document.
pub(crate) fn delete_text(doc: &mut Document, spy: &SpyInput, position: usize, len: usize) {
    spy.delete(position, len);
    doc.edit(position, len, 0).expect("edit");
}
