//! The syntax tree: reference-counted, position-independent nodes.
//!
//! Node data is immutable and `Arc`-shared, so an incremental re-parse
//! splices whole subtrees from the previous tree into the new one without
//! copying. Nodes store only their *size*; absolute positions are computed
//! on the way down from the root by a positioned [`Node`] handle. Shifting
//! a reused subtree therefore costs nothing.
//!
//! Retain/release is `Arc`: cloning a handle retains the subtree,
//! dropping it releases.

use std::fmt::Write as _;
use std::sync::Arc;

use canopy_tables::{ParseStateId, Symbol};
use text_size::{TextRange, TextSize};

use crate::language::Language;

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) symbol: Symbol,
    /// Total byte extent of this subtree's text.
    pub(crate) size: TextSize,
    /// Visible in printed output and child access.
    pub(crate) named: bool,
    /// Entered the tree as trivia (a ubiquitous token bound to the
    /// following real token).
    pub(crate) extra: bool,
    /// Invalidated by an edit; never reused by the incremental driver.
    pub(crate) changed: bool,
    /// This node or a descendant is an ERROR node.
    pub(crate) has_error: bool,
    /// For leaves: the parse state in which this token's fetch began.
    /// The incremental driver reuses a subtree only when its first
    /// leaf's fetch state matches the current parse state.
    pub(crate) fetch_state: ParseStateId,
    /// For ERROR nodes: the byte at the detection point, shown in the
    /// printed form.
    pub(crate) hint: u8,
    pub(crate) children: Vec<SyntaxTree>,
}

/// A shared handle to immutable node data. Position-independent: the same
/// subtree may appear in an old and a new tree at different offsets.
#[derive(Debug, Clone)]
pub struct SyntaxTree(pub(crate) Arc<NodeData>);

impl SyntaxTree {
    pub(crate) fn leaf(
        symbol: Symbol,
        size: TextSize,
        named: bool,
        extra: bool,
        fetch_state: ParseStateId,
    ) -> SyntaxTree {
        SyntaxTree(Arc::new(NodeData {
            symbol,
            size,
            named,
            extra,
            changed: false,
            has_error: false,
            fetch_state,
            hint: 0,
            children: Vec::new(),
        }))
    }

    pub(crate) fn interior(symbol: Symbol, named: bool, children: Vec<SyntaxTree>) -> SyntaxTree {
        let size = children.iter().map(|c| c.size()).sum();
        let has_error = children.iter().any(|c| c.has_error());
        let fetch_state = children.first().map_or(0, |c| c.fetch_state());
        SyntaxTree(Arc::new(NodeData {
            symbol,
            size,
            named,
            extra: false,
            changed: false,
            has_error,
            fetch_state,
            hint: 0,
            children,
        }))
    }

    /// An ERROR node. Its size is the explicit span of skipped input, not
    /// the sum of its children (which exist for ownership only).
    pub(crate) fn error(children: Vec<SyntaxTree>, size: TextSize, hint: u8) -> SyntaxTree {
        SyntaxTree(Arc::new(NodeData {
            symbol: Symbol::ERROR,
            size,
            named: true,
            extra: false,
            changed: false,
            has_error: true,
            fetch_state: 0,
            hint,
            children,
        }))
    }

    pub(crate) fn document(children: Vec<SyntaxTree>) -> SyntaxTree {
        SyntaxTree::interior(Symbol::DOCUMENT, true, children)
    }

    /// Rebuilds this node with `trailing` appended (the accept-time fold
    /// of dangling trivia into the last real node).
    pub(crate) fn with_trailing(&self, trailing: Vec<SyntaxTree>) -> SyntaxTree {
        let mut children = self.0.children.clone();
        children.extend(trailing);
        let size = children.iter().map(|c| c.size()).sum();
        SyntaxTree(Arc::new(NodeData {
            symbol: self.0.symbol,
            size,
            named: self.0.named,
            extra: self.0.extra,
            changed: self.0.changed,
            has_error: children.iter().any(|c| c.has_error()),
            fetch_state: self.0.fetch_state,
            hint: self.0.hint,
            children,
        }))
    }

    pub fn symbol(&self) -> Symbol {
        self.0.symbol
    }

    pub fn size(&self) -> TextSize {
        self.0.size
    }

    pub(crate) fn named(&self) -> bool {
        self.0.named
    }

    pub(crate) fn extra(&self) -> bool {
        self.0.extra
    }

    pub(crate) fn changed(&self) -> bool {
        self.0.changed
    }

    pub(crate) fn has_error(&self) -> bool {
        self.0.has_error
    }

    pub fn is_error(&self) -> bool {
        self.0.symbol == Symbol::ERROR
    }

    pub(crate) fn fetch_state(&self) -> ParseStateId {
        self.0.fetch_state
    }

    pub(crate) fn hint(&self) -> u8 {
        self.0.hint
    }

    pub(crate) fn children(&self) -> &[SyntaxTree] {
        &self.0.children
    }

    /// Leftmost leaf (the node whose fetch state gates subtree reuse).
    pub(crate) fn first_leaf(&self) -> &SyntaxTree {
        let mut node = self;
        while let Some(first) = node.0.children.first() {
            node = first;
        }
        node
    }

    /// Two trees are the same if they share the allocation.
    #[allow(dead_code)] // exercised by the edit suites
    pub(crate) fn ptr_eq(&self, other: &SyntaxTree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A positioned, retained handle to a node: subtree data plus the absolute
/// offset computed while walking from the root.
#[derive(Clone)]
pub struct Node {
    pub(crate) data: SyntaxTree,
    pub(crate) position: TextSize,
    pub(crate) language: Arc<Language>,
}

impl Node {
    pub fn symbol(&self) -> Symbol {
        self.data.symbol()
    }

    /// The symbol's printable name; ERROR nodes report `"error"`.
    pub fn name(&self) -> &str {
        self.language.symbol_name(self.data.symbol())
    }

    /// Absolute byte position in the document.
    pub fn pos(&self) -> TextSize {
        self.position
    }

    /// Byte extent of this subtree's text.
    pub fn size(&self) -> TextSize {
        self.data.size()
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.position, self.data.size())
    }

    pub fn is_error(&self) -> bool {
        self.data.is_error()
    }

    /// Number of visible children. Anonymous productions are already
    /// flattened; anonymous tokens (punctuation, whitespace) are skipped.
    pub fn child_count(&self) -> usize {
        self.visible_children().count()
    }

    /// The i-th visible child, or `None` when out of range.
    pub fn child(&self, index: usize) -> Option<Node> {
        let (data, position) = self.visible_children().nth(index)?;
        Some(Node {
            data,
            position,
            language: Arc::clone(&self.language),
        })
    }

    fn visible_children(&self) -> impl Iterator<Item = (SyntaxTree, TextSize)> + '_ {
        let mut offset = self.position;
        self.data.children().iter().filter_map(move |child| {
            let position = offset;
            offset += child.size();
            child.named().then(|| (child.clone(), position))
        })
    }

    /// The deepest node whose extent contains byte `pos`. At boundaries
    /// between a zero-size node and its neighbor, the later sibling wins.
    pub fn find_for_pos(&self, pos: TextSize) -> Node {
        let mut current = self.clone();
        loop {
            let mut found: Option<(SyntaxTree, TextSize)> = None;
            for (child, child_pos) in current.visible_children() {
                let end = child_pos + child.size();
                let contains = if child.size() == TextSize::new(0) {
                    child_pos == pos
                } else {
                    child_pos <= pos && pos < end
                };
                if contains {
                    found = Some((child, child_pos));
                }
            }
            match found {
                Some((data, position)) => {
                    current = Node {
                        data,
                        position,
                        language: Arc::clone(&current.language),
                    };
                }
                None => return current,
            }
        }
    }

    /// S-expression dump: `(NAME child1 child2 ...)`; ERROR nodes print as
    /// `(ERROR 'c')` with the byte at the detection point.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(&mut out, &self.data, &self.language);
        out
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("pos", &self.position)
            .field("size", &self.data.size())
            .finish()
    }
}

fn write_sexp(out: &mut String, node: &SyntaxTree, language: &Language) {
    if node.is_error() {
        match node.hint() {
            0 => out.push_str("(ERROR)"),
            hint => {
                let _ = write!(out, "(ERROR '{}')", (hint as char).escape_default());
            }
        }
        return;
    }
    let _ = write!(out, "({}", language.symbol_name(node.symbol()));
    for child in node.children() {
        write_sexp_child(out, child, language);
    }
    out.push(')');
}

fn write_sexp_child(out: &mut String, node: &SyntaxTree, language: &Language) {
    if node.named() {
        out.push(' ');
        write_sexp(out, node, language);
    } else if !node.children().is_empty() {
        // Anonymous interiors are flattened at reduce time; print through
        // them if one ever survives.
        for child in node.children() {
            write_sexp_child(out, child, language);
        }
    }
}
