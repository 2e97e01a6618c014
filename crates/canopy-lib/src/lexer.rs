//! Table-driven lexer: a positioned DFA executor over chunked input.
//!
//! One *fetch* is a run of ubiquitous tokens (accumulated as pending
//! trivia) followed by one real token. Within a token the DFA takes the
//! longest match that passed an accepting state; equal-length accepts are
//! tie-broken toward the parser's current lookahead set, then grammar
//! declaration order. Tokens whose DFA keeps a live edge at end of input
//! (wildcard tails such as line comments) accept whatever was consumed.

use canopy_tables::{LexState, ParseStateId, Symbol};
use text_size::TextRange;

use crate::error::Error;
use crate::input::Input;
use crate::language::{Language, SymbolSet};

/// A lexed terminal, or the end-of-input / unrecognized-byte sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    /// `Symbol::END` at end of input; `Symbol::ERROR` when no DFA path
    /// accepts.
    pub symbol: Symbol,
    pub range: TextRange,
    /// The byte at the detection point: where the DFA died for error
    /// tokens, the first byte otherwise. ERROR nodes print it.
    pub hint: u8,
    /// Parse state in which this fetch began; recorded on tree leaves to
    /// gate incremental reuse.
    pub fetch_state: ParseStateId,
}

impl Token {
    pub fn is_lex_error(&self) -> bool {
        self.symbol == Symbol::ERROR
    }

    pub fn is_end(&self) -> bool {
        self.symbol == Symbol::END
    }

    pub fn start(&self) -> usize {
        u32::from(self.range.start()) as usize
    }

    pub fn end(&self) -> usize {
        u32::from(self.range.end()) as usize
    }
}

/// A fetch: leading trivia plus the real token they bind to.
#[derive(Debug)]
pub(crate) struct Fetch {
    pub trivia: Vec<Token>,
    pub token: Token,
}

pub(crate) struct Lexer<'i> {
    input: &'i mut dyn Input,
    /// Bytes `buffer_start..buffer_start + buffer.len()` of the document.
    buffer: Vec<u8>,
    buffer_start: usize,
    /// End of input seen at the buffer's end.
    saw_end: bool,
    pos: usize,
}

impl<'i> Lexer<'i> {
    pub fn new(input: &'i mut dyn Input) -> Lexer<'i> {
        Lexer {
            input,
            buffer: Vec::new(),
            buffer_start: 0,
            saw_end: false,
            pos: 0,
        }
    }

    /// Repositions the lexer. Bytes still in the buffer are not re-read.
    pub fn seek(&mut self, pos: usize) {
        if pos < self.buffer_start || pos > self.buffer_start + self.buffer.len() {
            self.buffer.clear();
            self.buffer_start = pos;
            self.saw_end = false;
        }
        self.pos = pos;
    }

    fn byte_at(&mut self, pos: usize) -> Result<Option<u8>, Error> {
        if pos < self.buffer_start {
            self.buffer.clear();
            self.buffer_start = pos;
            self.saw_end = false;
        }
        loop {
            if let Some(&byte) = self.buffer.get(pos - self.buffer_start) {
                return Ok(Some(byte));
            }
            if self.saw_end {
                return Ok(None);
            }
            let read_at = self.buffer_start + self.buffer.len();
            let chunk = self.input.read(read_at)?;
            if chunk.is_empty() {
                self.saw_end = true;
            } else {
                self.buffer.extend_from_slice(chunk);
            }
        }
    }

    /// Lexes trivia until a real token (or end of input) is found.
    pub fn fetch(
        &mut self,
        language: &Language,
        fetch_state: ParseStateId,
        valid: &SymbolSet,
    ) -> Result<Fetch, Error> {
        let mut trivia = Vec::new();
        loop {
            let token = self.lex_one(language, fetch_state, valid)?;
            if !token.is_end()
                && !token.is_lex_error()
                && language.is_ubiquitous(token.symbol)
            {
                trivia.push(token);
                continue;
            }
            return Ok(Fetch { trivia, token });
        }
    }

    /// Runs the DFA once from the current position.
    fn lex_one(
        &mut self,
        language: &Language,
        fetch_state: ParseStateId,
        valid: &SymbolSet,
    ) -> Result<Token, Error> {
        let start = self.pos;
        let lex_states = &language.tables().lex_states;

        if self.byte_at(start)?.is_none() {
            return Ok(Token {
                symbol: Symbol::END,
                range: range_at(start, start),
                hint: 0,
                fetch_state,
            });
        }

        let mut state = language.tables().lex_start as usize;
        let mut cursor = start;
        let mut last_accept: Option<(usize, usize)> = None;
        loop {
            let lex_state = &lex_states[state];
            if !lex_state.accepts.is_empty() {
                last_accept = Some((cursor, state));
            }
            if lex_state.advances.is_empty() && lex_state.default_advance.is_none() {
                break;
            }
            let Some(byte) = self.byte_at(cursor)? else {
                break;
            };
            match advance(lex_state, byte) {
                Some(target) => {
                    state = target as usize;
                    cursor += 1;
                }
                None => break,
            }
        }

        match last_accept {
            Some((end, accept_state)) if end > start => {
                let accepts = &lex_states[accept_state].accepts;
                let symbol = accepts
                    .iter()
                    .copied()
                    .find(|&s| valid.contains(s))
                    .unwrap_or(accepts[0]);
                let hint = self.byte_at(start)?.unwrap_or(0);
                self.pos = end;
                Ok(Token {
                    symbol,
                    range: range_at(start, end),
                    hint,
                    fetch_state,
                })
            }
            _ => {
                // No accepting state was ever passed: a one-byte error
                // token carrying the byte the DFA died on.
                let died_at = self.byte_at(cursor)?.or(self.byte_at(start)?).unwrap_or(0);
                self.pos = start + 1;
                Ok(Token {
                    symbol: Symbol::ERROR,
                    range: range_at(start, start + 1),
                    hint: died_at,
                    fetch_state,
                })
            }
        }
    }
}

fn advance(state: &LexState, byte: u8) -> Option<u16> {
    state
        .advances
        .iter()
        .find(|advance| advance.lo <= byte && byte <= advance.hi)
        .map(|advance| advance.target)
        .or(state.default_advance)
}

fn range_at(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}
