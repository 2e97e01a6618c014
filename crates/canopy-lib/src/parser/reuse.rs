//! Subtree reuse during incremental re-parse.
//!
//! The cursor walks the previous (edited) tree left to right in lockstep
//! with the new parse. A subtree is spliced in whole when it is unchanged,
//! starts exactly at the parser's position, and its first leaf was fetched
//! in the parse state the parser is in now — the convergence condition.
//! Anything else is broken apart (the cursor descends) or abandoned to the
//! lexer. Trivia reuse is gated on the real token of its fetch group, so
//! an invalidated token drags its leading trivia back through the lexer
//! with it.

use canopy_tables::{ParseStateId, Symbol};
use text_size::TextRange;

use crate::error::Error;
use crate::tree::SyntaxTree;

use super::core::{Parser, Resolution, StackEntry};
use super::trace::ParseEvent;

struct Frame {
    node: SyntaxTree,
    child_idx: usize,
    /// Absolute start of the child at `child_idx`.
    child_base: usize,
}

/// Left-to-right traversal over the previous tree.
pub(crate) struct ReuseCursor {
    frames: Vec<Frame>,
}

impl ReuseCursor {
    pub(crate) fn new(root: SyntaxTree) -> ReuseCursor {
        ReuseCursor {
            frames: vec![Frame {
                node: root,
                child_idx: 0,
                child_base: 0,
            }],
        }
    }

    fn current(&self) -> Option<(&SyntaxTree, usize)> {
        let frame = self.frames.last()?;
        frame
            .node
            .children()
            .get(frame.child_idx)
            .map(|child| (child, frame.child_base))
    }

    /// Pops exhausted frames, advancing each parent past the child the
    /// frame covered.
    fn normalize(&mut self) {
        while let Some(frame) = self.frames.last() {
            if frame.child_idx < frame.node.children().len() {
                break;
            }
            self.frames.pop();
            if let Some(parent) = self.frames.last_mut() {
                let child = &parent.node.children()[parent.child_idx];
                parent.child_base += usize::from(child.size());
                parent.child_idx += 1;
            }
        }
    }

    fn advance(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some(child) = frame.node.children().get(frame.child_idx) {
                frame.child_base += usize::from(child.size());
                frame.child_idx += 1;
            }
        }
        self.normalize();
    }

    fn descend(&mut self) {
        let Some((child, base)) = self.current().map(|(child, base)| (child.clone(), base)) else {
            return;
        };
        if child.children().is_empty() {
            self.advance();
        } else {
            self.frames.push(Frame {
                node: child,
                child_idx: 0,
                child_base: base,
            });
        }
    }

    /// The next node starting exactly at `pos`, skipping everything the
    /// parse has overtaken and splitting nodes that straddle `pos`.
    fn candidate_at(&mut self, pos: usize) -> Option<(SyntaxTree, usize)> {
        loop {
            self.normalize();
            let (child, start) = self
                .current()
                .map(|(child, start)| (child.clone(), start))?;
            let size = usize::from(child.size());
            let end = start + size;
            if size == 0 || end <= pos {
                self.advance();
                continue;
            }
            if start < pos {
                // ERROR nodes may have gaps between their children (raw
                // skipped bytes own no node), so never walk into them.
                if child.children().is_empty() || child.is_error() {
                    self.advance();
                } else {
                    self.descend();
                }
                continue;
            }
            if start > pos {
                return None;
            }
            return Some((child, start));
        }
    }

    /// First leaf of the next non-extra node after the current candidate:
    /// the real token the current trivia is bound to.
    fn peek_next_real(&self) -> Option<SyntaxTree> {
        for frame in self.frames.iter().rev() {
            for child in frame.node.children().iter().skip(frame.child_idx + 1) {
                if child.extra() {
                    continue;
                }
                return Some(child.first_leaf().clone());
            }
        }
        None
    }
}

impl Parser<'_> {
    /// Tries to consume one node from the previous tree without touching
    /// the reader. Returns whether any progress was made (including
    /// breaking a candidate apart).
    pub(super) fn try_reuse(&mut self) -> Result<bool, Error> {
        let pos = self.pos;
        let candidate = match self.cursor.as_mut() {
            None => return Ok(false),
            Some(cursor) => cursor.candidate_at(pos),
        };
        let Some((node, start)) = candidate else {
            return Ok(false);
        };
        debug_assert_eq!(start, pos);

        if node.changed() || node.has_error() {
            return Ok(self.split_candidate(&node));
        }

        if node.extra() {
            let gate = self
                .cursor
                .as_ref()
                .expect("cursor checked above")
                .peek_next_real();
            let reusable = gate.is_some_and(|leaf| {
                !leaf.changed() && !leaf.has_error() && leaf.fetch_state() == self.state()
            });
            if !reusable {
                return Ok(false);
            }
            self.splice(node, start, None);
            return Ok(true);
        }

        if node.first_leaf().fetch_state() != self.state() {
            return Ok(self.split_candidate(&node));
        }

        if self.language.is_nonterminal(node.symbol()) {
            let lookahead = node.first_leaf().symbol();
            let Some(shift_state) = self.simulate_to_shift(lookahead) else {
                return Ok(self.split_candidate(&node));
            };
            let tables = self.language.tables();
            if tables.state(shift_state).goto(node.symbol()).is_none() {
                return Ok(self.split_candidate(&node));
            }
            // Committed: replay the reductions for real, then push whole.
            let resolution = self.resolve(lookahead);
            debug_assert!(matches!(resolution, Resolution::Shift(_)));
            let target = self
                .language
                .tables()
                .state(self.state())
                .goto(node.symbol())
                .expect("checked against the simulated stack");
            self.splice(node, start, Some(target));
            Ok(true)
        } else {
            if self.simulate_to_shift(node.symbol()).is_none() {
                return Ok(false);
            }
            match self.resolve(node.symbol()) {
                Resolution::Shift(target) => {
                    self.splice(node, start, Some(target));
                    Ok(true)
                }
                _ => unreachable!("simulation guaranteed a shift"),
            }
        }
    }

    /// Pushes a reused node onto the stack and moves the cursor past it.
    /// `target` is the post-push state; `None` keeps the current state
    /// (extra entries).
    fn splice(&mut self, node: SyntaxTree, start: usize, target: Option<ParseStateId>) {
        let size = usize::from(node.size());
        self.tracer.event(ParseEvent::Reuse {
            symbol: node.symbol(),
            range: TextRange::at((start as u32).into(), node.size()),
        });
        let extra = target.is_none();
        let state = target.unwrap_or_else(|| self.state());
        self.stack.push(StackEntry {
            state,
            node,
            start,
            extra,
        });
        self.pos = start + size;
        self.cursor
            .as_mut()
            .expect("splice only runs with a cursor")
            .advance();
    }

    /// Breaks an unusable candidate apart so its children get their own
    /// chance; leaves and ERROR nodes cannot be split and fall back to
    /// the lexer.
    fn split_candidate(&mut self, node: &SyntaxTree) -> bool {
        if node.children().is_empty() || node.is_error() {
            return false;
        }
        self.cursor
            .as_mut()
            .expect("split only runs with a cursor")
            .descend();
        true
    }

    /// Replays the pending reductions for `lookahead` on a shadow stack.
    /// Returns the state a shift would happen in, or `None` if the chain
    /// never reaches one — in which case the real stack stays untouched.
    fn simulate_to_shift(&self, lookahead: Symbol) -> Option<ParseStateId> {
        let tables = self.language.tables();
        let mut shadow: Vec<(ParseStateId, bool)> = self
            .stack
            .iter()
            .map(|entry| (entry.state, entry.extra))
            .collect();
        loop {
            let state = shadow.last().map_or(tables.parse_start, |entry| entry.0);
            match tables.state(state).action(lookahead) {
                Some(canopy_tables::Action::Shift { .. }) => return Some(state),
                Some(canopy_tables::Action::Reduce {
                    symbol,
                    child_count,
                    ..
                }) => {
                    let mut trailing = 0;
                    while shadow.last().is_some_and(|entry| entry.1) {
                        shadow.pop();
                        trailing += 1;
                    }
                    let mut real = 0;
                    while real < child_count {
                        let entry = shadow.pop()?;
                        if !entry.1 {
                            real += 1;
                        }
                    }
                    let exposed = shadow.last().map_or(tables.parse_start, |entry| entry.0);
                    let target = tables.state(exposed).goto(symbol)?;
                    shadow.push((target, false));
                    for _ in 0..trailing {
                        shadow.push((target, true));
                    }
                }
                Some(canopy_tables::Action::Accept) | None => return None,
            }
        }
    }
}
