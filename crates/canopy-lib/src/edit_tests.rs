use text_size::TextSize;

use crate::edit::{self, InputEdit};
use crate::tests::{document_with, grammars};
use crate::tree::SyntaxTree;

fn tree_of(text: &str) -> SyntaxTree {
    let language = grammars::arithmetic();
    let (doc, _spy) = document_with(&language, text);
    doc.root().unwrap().data
}

fn edit(tree: &SyntaxTree, position: usize, deleted: usize, inserted: usize) -> SyntaxTree {
    edit::apply(
        tree,
        &InputEdit {
            position,
            deleted,
            inserted,
        },
    )
}

#[test]
fn insertion_grows_the_containing_token() {
    let root = tree_of("abc * 123");
    let edited = edit(&root, 1, 0, 3);

    assert_eq!(edited.size(), TextSize::new(12));
    assert!(edited.changed());

    let product = &edited.children()[0];
    assert!(product.changed());
    let variable = &product.children()[0];
    assert_eq!(variable.size(), TextSize::new(6));
    assert!(variable.changed());
}

#[test]
fn untouched_siblings_are_shared_not_copied() {
    let root = tree_of("abc * 123");
    let edited = edit(&root, 1, 0, 3);

    let old_product = &root.children()[0];
    let new_product = &edited.children()[0];
    // The `123` token (last child) is the same allocation in both trees.
    let old_number = old_product.children().last().unwrap();
    let new_number = new_product.children().last().unwrap();
    assert!(old_number.ptr_eq(new_number));
    assert!(!new_number.changed());
}

#[test]
fn insertion_at_a_token_end_extends_that_token() {
    let root = tree_of("abc * 123");
    let edited = edit(&root, 3, 0, 2);

    let product = &edited.children()[0];
    let variable = &product.children()[0];
    assert_eq!(variable.size(), TextSize::new(5));
    // The following whitespace is conservatively invalidated but not
    // grown.
    let ws = &product.children()[1];
    assert!(ws.changed());
    assert_eq!(ws.size(), TextSize::new(1));
}

#[test]
fn deletion_shrinks_every_overlapped_leaf() {
    let root = tree_of("123 * 456");
    // Delete "* " (offsets 4..6).
    let edited = edit(&root, 4, 2, 0);

    assert_eq!(edited.size(), TextSize::new(7));
    let product = &edited.children()[0];
    let children = product.children();
    // number, ws, *, ws, number
    assert_eq!(children[2].size(), TextSize::new(0));
    assert_eq!(children[3].size(), TextSize::new(0));
    assert_eq!(children[4].size(), TextSize::new(3));
    assert!(children[4].changed());
    assert!(!children[0].changed());
}

#[test]
fn edit_far_from_a_subtree_leaves_it_unmarked() {
    let root = tree_of("x ^ (100 + abc)");
    let edited = edit(&root, 14, 0, 4);

    let exponent = &edited.children()[0];
    assert!(exponent.changed());
    // `x` and `^` are untouched.
    assert!(!exponent.children()[0].changed());
    assert!(!exponent.children()[2].changed());
    // The group and the trailing paren are touched.
    let group = exponent.children().last().unwrap();
    assert!(group.changed());
    assert!(group.children().last().unwrap().changed());
}

#[test]
fn zero_length_edit_marks_without_resizing() {
    let root = tree_of("123 * 456");
    let edited = edit(&root, 2, 0, 0);

    assert_eq!(edited.size(), root.size());
    let product = &edited.children()[0];
    assert!(product.children()[0].changed());
    assert_eq!(product.children()[0].size(), TextSize::new(3));
    assert!(!product.children()[4].changed());
}
