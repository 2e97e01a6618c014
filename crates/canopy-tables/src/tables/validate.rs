//! Structural validation of an artifact before the runtime consumes it.
//!
//! The runtime indexes states and symbols without per-access bounds checks,
//! so every id in the artifact is verified up front.

use super::types::{Action, Symbol, SymbolKind, Tables};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidateError {
    #[error("symbol table has {0} entries, need at least the {min} builtins", min = Symbol::FIRST_GRAMMAR)]
    MissingBuiltins(usize),
    #[error("builtin symbol slot {slot} is {found:?}, expected {expected:?}")]
    BuiltinMismatch {
        slot: u16,
        expected: String,
        found: String,
    },
    #[error("lex state {state} transition targets out-of-range state {target}")]
    LexTargetOutOfRange { state: u16, target: u16 },
    #[error("lex state {state} accepts out-of-range symbol {symbol}")]
    LexSymbolOutOfRange { state: u16, symbol: u16 },
    #[error("lex state {state} accepts non-terminal symbol {symbol}")]
    LexAcceptsNonTerminal { state: u16, symbol: u16 },
    #[error("lex start state {0} out of range")]
    LexStartOutOfRange(u16),
    #[error("parse state {state} references out-of-range symbol {symbol}")]
    ParseSymbolOutOfRange { state: u16, symbol: u16 },
    #[error("parse state {state} targets out-of-range state {target}")]
    ParseTargetOutOfRange { state: u16, target: u16 },
    #[error("parse state {state} reduces by {arity} children for symbol {symbol}, which is a terminal")]
    ReduceToTerminal { state: u16, symbol: u16, arity: u16 },
    #[error("parse start state {0} out of range")]
    ParseStartOutOfRange(u16),
}

impl Tables {
    /// Bounds-check every state id, symbol id, and action target.
    pub fn validate(&self) -> Result<(), ValidateError> {
        self.validate_builtins()?;
        self.validate_lex()?;
        self.validate_parse()
    }

    fn validate_builtins(&self) -> Result<(), ValidateError> {
        let builtins = Tables::builtin_symbols();
        if self.symbols.len() < builtins.len() {
            return Err(ValidateError::MissingBuiltins(self.symbols.len()));
        }
        for (slot, expected) in builtins.iter().enumerate() {
            let found = &self.symbols[slot];
            if found.name != expected.name || found.kind != expected.kind {
                return Err(ValidateError::BuiltinMismatch {
                    slot: slot as u16,
                    expected: expected.name.clone(),
                    found: found.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_lex(&self) -> Result<(), ValidateError> {
        let state_count = self.lex_states.len() as u16;
        if self.lex_start >= state_count {
            return Err(ValidateError::LexStartOutOfRange(self.lex_start));
        }
        for (id, lex_state) in self.lex_states.iter().enumerate() {
            let state = id as u16;
            for advance in &lex_state.advances {
                if advance.target >= state_count {
                    return Err(ValidateError::LexTargetOutOfRange {
                        state,
                        target: advance.target,
                    });
                }
            }
            if let Some(target) = lex_state.default_advance {
                if target >= state_count {
                    return Err(ValidateError::LexTargetOutOfRange { state, target });
                }
            }
            for &symbol in &lex_state.accepts {
                let info = match self.symbols.get(symbol.index()) {
                    Some(info) => info,
                    None => {
                        return Err(ValidateError::LexSymbolOutOfRange {
                            state,
                            symbol: symbol.0,
                        });
                    }
                };
                if info.kind != SymbolKind::Terminal {
                    return Err(ValidateError::LexAcceptsNonTerminal {
                        state,
                        symbol: symbol.0,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_parse(&self) -> Result<(), ValidateError> {
        let state_count = self.parse_states.len() as u16;
        let symbol_count = self.symbols.len();
        if self.parse_start >= state_count {
            return Err(ValidateError::ParseStartOutOfRange(self.parse_start));
        }
        for (id, parse_state) in self.parse_states.iter().enumerate() {
            let state = id as u16;
            for &(symbol, action) in &parse_state.actions {
                if symbol.index() >= symbol_count {
                    return Err(ValidateError::ParseSymbolOutOfRange {
                        state,
                        symbol: symbol.0,
                    });
                }
                match action {
                    Action::Shift { state: target } => {
                        if target >= state_count {
                            return Err(ValidateError::ParseTargetOutOfRange { state, target });
                        }
                    }
                    Action::Reduce {
                        symbol: reduced,
                        child_count,
                        ..
                    } => {
                        let info = match self.symbols.get(reduced.index()) {
                            Some(info) => info,
                            None => {
                                return Err(ValidateError::ParseSymbolOutOfRange {
                                    state,
                                    symbol: reduced.0,
                                });
                            }
                        };
                        if info.kind != SymbolKind::NonTerminal {
                            return Err(ValidateError::ReduceToTerminal {
                                state,
                                symbol: reduced.0,
                                arity: child_count,
                            });
                        }
                    }
                    Action::Accept => {}
                }
            }
            for &(symbol, target) in &parse_state.gotos {
                if symbol.index() >= symbol_count {
                    return Err(ValidateError::ParseSymbolOutOfRange {
                        state,
                        symbol: symbol.0,
                    });
                }
                if target >= state_count {
                    return Err(ValidateError::ParseTargetOutOfRange { state, target });
                }
            }
        }
        Ok(())
    }
}
