//! Edit application: copy-on-write spine rebuild over the stored tree.
//!
//! Only nodes touching the edited range are rebuilt (with adjusted sizes
//! and a `changed` mark); everything else is shared with the previous
//! tree. Boundary positions are affected inclusively on both ends, so an
//! insertion at a token's end extends that token and an insertion at a
//! token's start invalidates it too — the re-lexer decides what the bytes
//! actually are.

use std::sync::Arc;

use text_size::TextSize;

use crate::tree::{NodeData, SyntaxTree};

/// One edit to the document's byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdit {
    /// Byte offset of the edit.
    pub position: usize,
    /// Bytes removed at `position`.
    pub deleted: usize,
    /// Bytes inserted at `position`.
    pub inserted: usize,
}

impl InputEdit {
    fn old_end(&self) -> usize {
        self.position + self.deleted
    }
}

/// Applies `edit` to the stored tree, returning the rebuilt root.
pub(crate) fn apply(root: &SyntaxTree, edit: &InputEdit) -> SyntaxTree {
    let mut inserted_assigned = false;
    edit_node(root, 0, edit, &mut inserted_assigned)
}

fn touches(node_start: usize, node_end: usize, edit: &InputEdit) -> bool {
    node_end >= edit.position && node_start <= edit.old_end()
}

fn edit_node(
    node: &SyntaxTree,
    base: usize,
    edit: &InputEdit,
    inserted_assigned: &mut bool,
) -> SyntaxTree {
    let node_end = base + usize::from(node.size());

    if node.children().is_empty() || node.is_error() {
        return edit_leaf(node, base, node_end, edit, inserted_assigned);
    }

    let mut children = Vec::with_capacity(node.children().len());
    let mut child_base = base;
    for child in node.children() {
        let child_end = child_base + usize::from(child.size());
        if touches(child_base, child_end, edit) {
            children.push(edit_node(child, child_base, edit, inserted_assigned));
        } else {
            children.push(child.clone());
        }
        child_base = child_end;
    }

    let size = children.iter().map(|c| c.size()).sum();
    let data = &node.0;
    SyntaxTree(Arc::new(NodeData {
        symbol: data.symbol,
        size,
        named: data.named,
        extra: data.extra,
        changed: true,
        has_error: children.iter().any(|c| c.has_error()),
        fetch_state: data.fetch_state,
        hint: data.hint,
        children,
    }))
}

fn edit_leaf(
    node: &SyntaxTree,
    node_start: usize,
    node_end: usize,
    edit: &InputEdit,
    inserted_assigned: &mut bool,
) -> SyntaxTree {
    let overlap = edit
        .old_end()
        .min(node_end)
        .saturating_sub(edit.position.max(node_start));
    let mut new_size = usize::from(node.size()) - overlap;
    if !*inserted_assigned && edit.position >= node_start && edit.position <= node_end {
        new_size += edit.inserted;
        *inserted_assigned = true;
    }

    let data = &node.0;
    SyntaxTree(Arc::new(NodeData {
        symbol: data.symbol,
        size: TextSize::new(new_size as u32),
        named: data.named,
        extra: data.extra,
        changed: true,
        has_error: data.has_error,
        fetch_state: data.fetch_state,
        hint: data.hint,
        // An edited ERROR region is re-parsed from scratch; its retained
        // children would carry stale sizes.
        children: Vec::new(),
    }))
}
