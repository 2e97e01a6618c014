//! Tree invariant checks used by the test suites after every parse and
//! edit.

#![allow(dead_code)]

use text_size::TextSize;

use crate::tree::{Node, SyntaxTree};

/// Asserts the universal tree invariants below `root`:
/// - every non-ERROR interior node's size is the sum of its children's
/// - every node lies within the root's extent
/// - `find_for_pos` lands on a node containing the queried byte
pub(crate) fn check_tree(root: &Node) {
    let total = root.size();
    check_node(&root.data, TextSize::new(0), total);

    for pos in 0..u32::from(total) {
        let pos = TextSize::new(pos);
        let found = root.find_for_pos(pos);
        assert!(
            found.pos() <= pos && (pos < found.pos() + found.size() || found.size() == 0.into()),
            "find_for_pos({pos:?}) landed on {found:?}"
        );
    }
}

fn check_node(node: &SyntaxTree, position: TextSize, total: TextSize) {
    assert!(
        position + node.size() <= total,
        "node extends past the document: {position:?} + {:?} > {total:?}",
        node.size()
    );
    if node.children().is_empty() {
        return;
    }
    let sum: TextSize = node.children().iter().map(|c| c.size()).sum();
    if !node.is_error() {
        assert_eq!(
            node.size(),
            sum,
            "interior node size is not the sum of its children"
        );
    }
    let mut offset = position;
    for child in node.children() {
        check_node(child, offset, total);
        offset += child.size();
    }
}
