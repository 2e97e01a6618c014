//! Runtime view of a parse-table artifact.
//!
//! Validates the artifact once, then precomputes what the hot paths need:
//! per-state lookahead sets and the ubiquitous-token set.

use canopy_tables::{ParseStateId, Symbol, SymbolInfo, SymbolKind, Tables, ValidateError};

/// Growable bitset over symbol ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SymbolSet {
    words: Vec<u64>,
}

impl SymbolSet {
    pub(crate) fn new(symbol_count: usize) -> SymbolSet {
        SymbolSet {
            words: vec![0; symbol_count.div_ceil(64)],
        }
    }

    pub(crate) fn insert(&mut self, symbol: Symbol) {
        let idx = symbol.index();
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    pub(crate) fn contains(&self, symbol: Symbol) -> bool {
        let idx = symbol.index();
        self.words
            .get(idx / 64)
            .is_some_and(|word| word & (1 << (idx % 64)) != 0)
    }
}

/// An installed grammar: the immutable artifact plus derived lookup
/// structures. Shareable across documents and threads.
#[derive(Debug)]
pub struct Language {
    tables: Tables,
    /// Per parse state: terminals with any action (the lexer's tie-break
    /// and trivia-vs-token arbiter).
    valid: Vec<SymbolSet>,
    ubiquitous: SymbolSet,
    /// Used when lexing without lookahead context (error recovery).
    empty: SymbolSet,
}

impl Language {
    pub fn new(tables: Tables) -> Result<Language, ValidateError> {
        tables.validate()?;
        let symbol_count = tables.symbol_count();
        let valid = tables
            .parse_states
            .iter()
            .map(|state| {
                let mut set = SymbolSet::new(symbol_count);
                for &(symbol, _) in &state.actions {
                    set.insert(symbol);
                }
                set
            })
            .collect();
        let mut ubiquitous = SymbolSet::new(symbol_count);
        for (idx, info) in tables.symbols.iter().enumerate() {
            if info.ubiquitous {
                ubiquitous.insert(Symbol(idx as u16));
            }
        }
        Ok(Language {
            empty: SymbolSet::new(symbol_count),
            tables,
            valid,
            ubiquitous,
        })
    }

    pub fn name(&self) -> &str {
        &self.tables.name
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub(crate) fn info(&self, symbol: Symbol) -> &SymbolInfo {
        self.tables.symbol(symbol)
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        self.tables.symbol_name(symbol)
    }

    pub(crate) fn is_named(&self, symbol: Symbol) -> bool {
        self.info(symbol).named
    }

    pub(crate) fn is_ubiquitous(&self, symbol: Symbol) -> bool {
        self.ubiquitous.contains(symbol)
    }

    pub(crate) fn is_nonterminal(&self, symbol: Symbol) -> bool {
        self.info(symbol).kind == SymbolKind::NonTerminal
    }

    pub(crate) fn valid_set(&self, state: ParseStateId) -> &SymbolSet {
        &self.valid[state as usize]
    }

    pub(crate) fn no_lookahead(&self) -> &SymbolSet {
        &self.empty
    }
}
