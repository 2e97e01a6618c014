//! The parser's stack machine.

use canopy_tables::{Action, ParseStateId, Symbol};
use text_size::TextRange;

use crate::error::Error;
use crate::input::Input;
use crate::language::Language;
use crate::lexer::{Lexer, Token};
use crate::tree::SyntaxTree;

use super::recovery::Recovered;
use super::reuse::ReuseCursor;
use super::trace::{ParseEvent, ParseTracer};

/// One stack entry: the state reached after pushing `node`, the node
/// itself, and its absolute start. Extra entries carry trivia; they never
/// change the state (their `state` repeats the entry below).
pub(super) struct StackEntry {
    pub state: ParseStateId,
    pub node: SyntaxTree,
    pub start: usize,
    pub extra: bool,
}

pub(super) enum Resolution {
    Shift(ParseStateId),
    Accept,
    Stuck,
}

enum Promoted {
    No,
    Yes,
    Finished(SyntaxTree),
}

pub(super) struct Parser<'a> {
    pub(super) language: &'a Language,
    pub(super) lexer: Lexer<'a>,
    pub(super) stack: Vec<StackEntry>,
    pub(super) cursor: Option<ReuseCursor>,
    pub(super) tracer: &'a mut dyn ParseTracer,
    /// End of consumed input; the next fetch starts here.
    pub(super) pos: usize,
    /// Last recovery restart, so a token that immediately fails again is
    /// skipped instead of retried forever.
    pub(super) last_restart: Option<(usize, Symbol)>,
}

/// Parses the document available through `input`. With an (edited) old
/// tree, unchanged subtrees are reused and only the rest is re-lexed.
pub(crate) fn parse(
    language: &Language,
    input: &mut dyn Input,
    old_tree: Option<SyntaxTree>,
    tracer: &mut dyn ParseTracer,
) -> Result<SyntaxTree, Error> {
    let mut parser = Parser {
        language,
        lexer: Lexer::new(input),
        stack: Vec::new(),
        cursor: old_tree.map(ReuseCursor::new),
        tracer,
        pos: 0,
        last_restart: None,
    };
    parser.run()
}

impl Parser<'_> {
    pub(super) fn state(&self) -> ParseStateId {
        self.stack
            .last()
            .map_or(self.language.tables().parse_start, |entry| entry.state)
    }

    fn run(&mut self) -> Result<SyntaxTree, Error> {
        loop {
            while self.try_reuse()? {}
            let state = self.state();
            self.lexer.seek(self.pos);
            let fetch = self
                .lexer
                .fetch(self.language, state, self.language.valid_set(state))?;
            self.push_trivia(&fetch.trivia);
            if let Some(root) = self.consume(fetch.token)? {
                return Ok(root);
            }
        }
    }

    /// Processes one lookahead to completion (shifted, recovered past, or
    /// the parse finished).
    pub(super) fn consume(&mut self, token: Token) -> Result<Option<SyntaxTree>, Error> {
        let mut token = token;
        if token.is_lex_error() {
            return match self.recover(token)? {
                Recovered::Done(root) => Ok(Some(root)),
                Recovered::Resume(next) => self.consume(next),
            };
        }
        loop {
            match self.resolve(token.symbol) {
                Resolution::Shift(target) => {
                    self.shift(token, target);
                    return Ok(None);
                }
                Resolution::Accept => {
                    self.tracer.event(ParseEvent::Accept);
                    return Ok(Some(self.finish_document()));
                }
                Resolution::Stuck => {
                    match self.promote()? {
                        Promoted::Yes => continue,
                        Promoted::Finished(root) => return Ok(Some(root)),
                        Promoted::No => {}
                    }
                    match self.recover(token)? {
                        Recovered::Done(root) => return Ok(Some(root)),
                        Recovered::Resume(next) => {
                            token = next;
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Performs pending reductions for `symbol` until it can be shifted
    /// (or the parse accepts or sticks).
    pub(super) fn resolve(&mut self, symbol: Symbol) -> Resolution {
        loop {
            let state = self.state();
            match self.language.tables().state(state).action(symbol) {
                Some(Action::Shift { state }) => return Resolution::Shift(state),
                Some(Action::Accept) => return Resolution::Accept,
                Some(Action::Reduce {
                    symbol: reduced,
                    child_count,
                    ..
                }) => self.reduce(reduced, child_count),
                None => return Resolution::Stuck,
            }
        }
    }

    fn shift(&mut self, token: Token, target: ParseStateId) {
        let node = SyntaxTree::leaf(
            token.symbol,
            token.range.len(),
            self.language.is_named(token.symbol),
            false,
            token.fetch_state,
        );
        self.tracer.event(ParseEvent::Shift {
            symbol: token.symbol,
            range: token.range,
        });
        self.stack.push(StackEntry {
            state: target,
            node,
            start: token.start(),
            extra: false,
        });
        self.pos = self.pos.max(token.end());
    }

    /// Pops `child_count` real entries (interior extras ride along;
    /// trailing extras go back on the stack), flattens anonymous
    /// non-terminal children, and pushes the new node via goto. A visible
    /// wrapper around a single visible non-terminal collapses to its
    /// child.
    fn reduce(&mut self, symbol: Symbol, child_count: u16) {
        let mut trailing = Vec::new();
        while self.stack.last().is_some_and(|entry| entry.extra) {
            trailing.push(self.stack.pop().expect("checked non-empty"));
        }
        trailing.reverse();

        let mut popped = Vec::new();
        let mut real = 0;
        while real < child_count {
            let entry = self.stack.pop().expect("reduce arity exceeds stack");
            if !entry.extra {
                real += 1;
            }
            popped.push(entry);
        }
        popped.reverse();

        let start = popped.first().map_or_else(
            || {
                // Empty production: a zero-size node at the exposed
                // stack boundary.
                self.stack
                    .last()
                    .map_or(0, |entry| entry.start + usize::from(entry.node.size()))
            },
            |entry| entry.start,
        );
        let children = flatten(
            self.language,
            popped.into_iter().map(|entry| entry.node).collect(),
        );

        let named = self.language.is_named(symbol);
        let node = if named && children.len() == 1 && collapses(self.language, &children[0]) {
            children.into_iter().next().expect("checked length")
        } else {
            SyntaxTree::interior(symbol, named, children)
        };

        self.tracer.event(ParseEvent::Reduce {
            symbol,
            child_count,
        });

        let exposed = self.state();
        let target = self
            .language
            .tables()
            .state(exposed)
            .goto(symbol)
            .expect("tables provide a goto for every reduction");
        self.stack.push(StackEntry {
            state: target,
            node,
            start,
            extra: false,
        });
        for entry in trailing {
            self.stack.push(StackEntry {
                state: target,
                ..entry
            });
        }
    }

    pub(super) fn push_trivia(&mut self, trivia: &[Token]) {
        for token in trivia {
            let node = SyntaxTree::leaf(
                token.symbol,
                token.range.len(),
                self.language.is_named(token.symbol),
                true,
                token.fetch_state,
            );
            self.stack.push(StackEntry {
                state: self.state(),
                node,
                start: token.start(),
                extra: true,
            });
            self.pos = self.pos.max(token.end());
        }
    }

    /// When the real lookahead has no action, a pending trivia token on
    /// top of the stack may be what the grammar wants (a newline acting as
    /// a statement terminator). The earliest actionable one is replayed as
    /// a real token; trivia after it are requeued.
    fn promote(&mut self) -> Result<Promoted, Error> {
        let run_start = self
            .stack
            .iter()
            .rposition(|entry| !entry.extra)
            .map_or(0, |idx| idx + 1);
        if run_start == self.stack.len() {
            return Ok(Promoted::No);
        }
        let state = self.state();
        let Some(found) = (run_start..self.stack.len()).find(|&idx| {
            let symbol = self.stack[idx].node.symbol();
            self.language.tables().state(state).action(symbol).is_some()
        }) else {
            return Ok(Promoted::No);
        };

        let mut removed = self.stack.split_off(found);
        let promoted = removed.remove(0);
        let start = promoted.start as u32;
        let token = Token {
            symbol: promoted.node.symbol(),
            range: TextRange::at(start.into(), promoted.node.size()),
            hint: 0,
            fetch_state: promoted.node.fetch_state(),
        };
        self.tracer.event(ParseEvent::Promote {
            symbol: token.symbol,
        });
        if let Some(root) = self.consume(token)? {
            return Ok(Promoted::Finished(root));
        }
        for entry in removed {
            self.stack.push(StackEntry {
                state: self.state(),
                ..entry
            });
        }
        Ok(Promoted::Yes)
    }

    /// Wraps whatever remains on the stack in the synthetic DOCUMENT node.
    /// Trailing trivia fold into the last real node, which is where a
    /// trailing comment belongs.
    pub(super) fn finish_document(&mut self) -> SyntaxTree {
        let entries = std::mem::take(&mut self.stack);
        let mut nodes = flatten(
            self.language,
            entries.into_iter().map(|entry| entry.node).collect(),
        );
        if let Some(last_real) = nodes.iter().rposition(|node| !node.extra()) {
            let foldable = self.language.is_nonterminal(nodes[last_real].symbol())
                && !nodes[last_real].is_error();
            if foldable && last_real + 1 < nodes.len() {
                let trailing: Vec<SyntaxTree> = nodes.drain(last_real + 1..).collect();
                nodes[last_real] = nodes[last_real].with_trailing(trailing);
            }
        }
        SyntaxTree::document(nodes)
    }
}

/// Splices the children of anonymous non-terminal nodes into the list.
fn flatten(language: &Language, nodes: Vec<SyntaxTree>) -> Vec<SyntaxTree> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !node.named() && language.is_nonterminal(node.symbol()) && !node.is_error() {
            out.extend(node.children().iter().cloned());
        } else {
            out.push(node);
        }
    }
    out
}

/// A reduce collapses to its sole child when the child is itself a
/// visible non-terminal; `(DOCUMENT (product …))` rather than
/// `(DOCUMENT (expression (product …)))`.
fn collapses(language: &Language, child: &SyntaxTree) -> bool {
    child.named() && language.is_nonterminal(child.symbol())
}
