use text_size::TextSize;

use crate::tests::{document_with, grammars};

#[test]
fn name_and_symbol_metadata() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[true]");
    let root = doc.root().unwrap();
    assert_eq!(root.name(), "DOCUMENT");
    let array = root.child(0).unwrap();
    assert_eq!(array.name(), "array");
    assert_eq!(array.child(0).unwrap().name(), "true");
}

#[test]
fn anonymous_tokens_are_hidden_from_child_access() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1, 2]");
    let array = doc.root().unwrap().child(0).unwrap();
    // `[`, `,`, `]` are invisible; only the numbers count.
    assert_eq!(array.child_count(), 2);
    assert_eq!(array.child(0).unwrap().name(), "number");
    assert_eq!(array.child(1).unwrap().name(), "number");
    assert!(array.child(2).is_none());
}

#[test]
fn positions_accumulate_from_the_root() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1, [22, 333]]");
    let root = doc.root().unwrap();
    let outer = root.child(0).unwrap();
    let inner = outer.child(1).unwrap();
    assert_eq!(inner.name(), "array");
    assert_eq!(inner.pos(), TextSize::new(4));
    let last = inner.child(1).unwrap();
    assert_eq!(last.pos(), TextSize::new(9));
    assert_eq!(last.size(), TextSize::new(3));
    assert_eq!(
        last.range(),
        text_size::TextRange::new(TextSize::new(9), TextSize::new(12))
    );
}

#[test]
fn retained_nodes_outlive_a_reparse() {
    let language = grammars::json();
    let (mut doc, spy) = document_with(&language, "[1, 2]");
    let old_array = doc.root().unwrap().child(0).unwrap();

    spy.insert(1, "0, ");
    doc.edit(1, 0, 3).unwrap();

    // The retained handle still describes the old tree.
    assert_eq!(old_array.child_count(), 2);
    assert_eq!(old_array.size(), TextSize::new(6));
    // The document moved on.
    assert_eq!(doc.root().unwrap().child(0).unwrap().child_count(), 3);
}

#[test]
fn find_for_pos_descends_to_the_deepest_node() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1, [22, 333]]");
    let root = doc.root().unwrap();

    assert_eq!(root.find_for_pos(TextSize::new(1)).name(), "number");
    assert_eq!(root.find_for_pos(TextSize::new(10)).name(), "number");
    // Position 4 is the inner `[`: hidden, so the inner array answers.
    assert_eq!(root.find_for_pos(TextSize::new(4)).name(), "array");
    assert_eq!(
        root.find_for_pos(TextSize::new(4)).pos(),
        TextSize::new(4)
    );
}

#[test]
fn sexp_of_nested_structures() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1, [2, [3]], null]");
    insta::assert_snapshot!(
        doc.root().unwrap().to_sexp(),
        @"(DOCUMENT (array (number) (array (number) (array (number))) (null)))"
    );
}

#[test]
fn error_nodes_print_their_detection_byte() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1, %%%]");
    let sexp = doc.root().unwrap().to_sexp();
    assert!(sexp.contains("(ERROR '%')"), "unexpected dump: {sexp}");
}

#[test]
fn clone_is_retain() {
    let language = grammars::json();
    let (doc, _spy) = document_with(&language, "[1]");
    let a = doc.root().unwrap();
    let b = a.clone();
    drop(a);
    // The clone keeps the subtree alive and identical.
    assert_eq!(b.name(), "DOCUMENT");
    assert_eq!(b.size(), TextSize::new(3));
}
