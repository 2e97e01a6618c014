//! Error recovery: growing an ERROR node until the parse can restart.
//!
//! From the detection point the lexer scans forward (token by token where
//! something lexes, byte by byte where nothing does). Each candidate token
//! is tested against the stack, top entry first: if some goto target of an
//! entry's state has an action for the candidate, an ERROR node can stand
//! in for that missing non-terminal there and parsing resumes. Entries
//! unwound on the way, and everything skipped, become the ERROR node's
//! children; its size is the distance from the error start to the restart
//! point — zero when the offending token itself restarts the parse. End of
//! input always ends recovery.

use canopy_tables::{ParseStateId, Symbol};
use text_size::TextSize;

use crate::error::Error;
use crate::lexer::Token;
use crate::tree::SyntaxTree;

use super::core::{Parser, StackEntry};
use super::trace::ParseEvent;

pub(super) enum Recovered {
    /// Recovery ran to end of input; the parse is complete.
    Done(SyntaxTree),
    /// Parsing resumes with this token (an ERROR node is on the stack).
    Resume(Token),
}

impl Parser<'_> {
    pub(super) fn recover(&mut self, offending: Token) -> Result<Recovered, Error> {
        let hint = offending.hint;
        let mut error_start = offending.start();
        let mut skipped: Vec<SyntaxTree> = Vec::new();
        let mut candidate = offending;

        loop {
            if candidate.is_end() {
                let size = size_of(error_start, candidate.start());
                let node = SyntaxTree::error(skipped, size, hint);
                self.tracer.event(ParseEvent::Recover {
                    range: node_range(error_start, size),
                });
                self.stack.push(StackEntry {
                    state: self.state(),
                    node,
                    start: error_start,
                    extra: false,
                });
                self.pos = candidate.start();
                return Ok(Recovered::Done(self.finish_document()));
            }

            if !candidate.is_lex_error() {
                // A candidate that restarted the parse once and landed
                // right back here is skipped, not retried.
                let retrying = self.last_restart == Some((candidate.start(), candidate.symbol));
                if let Some((keep, restart_state)) =
                    (!retrying).then(|| self.find_restart(candidate.symbol)).flatten()
                {
                    self.last_restart = Some((candidate.start(), candidate.symbol));
                    let popped = self.stack.split_off(keep);
                    if let Some(first) = popped.first() {
                        error_start = error_start.min(first.start);
                    }
                    let mut children: Vec<SyntaxTree> =
                        popped.into_iter().map(|entry| entry.node).collect();
                    children.append(&mut skipped);
                    let size = size_of(error_start, candidate.start());
                    let node = SyntaxTree::error(children, size, hint);
                    self.tracer.event(ParseEvent::Recover {
                        range: node_range(error_start, size),
                    });
                    self.stack.push(StackEntry {
                        state: restart_state,
                        node,
                        start: error_start,
                        extra: false,
                    });
                    self.pos = candidate.start();
                    return Ok(Recovered::Resume(candidate));
                }
                // Rejected: the candidate joins the skipped region.
                skipped.push(SyntaxTree::leaf(
                    candidate.symbol,
                    candidate.range.len(),
                    self.language.is_named(candidate.symbol),
                    false,
                    candidate.fetch_state,
                ));
                self.pos = candidate.end();
            } else {
                // Nothing lexes here; swallow one byte and retry.
                self.pos = candidate.end();
            }

            self.lexer.seek(self.pos);
            let fetch =
                self.lexer
                    .fetch(self.language, self.state(), self.language.no_lookahead())?;
            for token in &fetch.trivia {
                skipped.push(SyntaxTree::leaf(
                    token.symbol,
                    token.range.len(),
                    self.language.is_named(token.symbol),
                    true,
                    token.fetch_state,
                ));
            }
            candidate = fetch.token;
        }
    }

    /// Scans stack entries top-down (the virtual bottom carries the start
    /// state). Returns how many entries to keep and the state the ERROR
    /// node is pushed in — a goto target in which `symbol` is actionable.
    fn find_restart(&self, symbol: Symbol) -> Option<(usize, ParseStateId)> {
        let tables = self.language.tables();
        for keep in (0..=self.stack.len()).rev() {
            let state = if keep == 0 {
                tables.parse_start
            } else {
                self.stack[keep - 1].state
            };
            for &(_, target) in &tables.state(state).gotos {
                if tables.state(target).action(symbol).is_some() {
                    return Some((keep, target));
                }
            }
        }
        None
    }
}

fn size_of(start: usize, end: usize) -> TextSize {
    TextSize::new((end - start) as u32)
}

fn node_range(start: usize, size: TextSize) -> text_size::TextRange {
    text_size::TextRange::at(TextSize::new(start as u32), size)
}
