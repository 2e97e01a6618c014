//! Parse-table type definitions.

use serde::{Deserialize, Serialize};

/// Index into a grammar's symbol list.
///
/// The first three slots are reserved for builtins; grammar symbols start
/// at [`Symbol::FIRST_GRAMMAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub u16);

impl Symbol {
    /// End of input.
    pub const END: Symbol = Symbol(0);
    /// The synthetic error symbol; error nodes carry it.
    pub const ERROR: Symbol = Symbol(1);
    /// The synthetic root symbol wrapping every parse.
    pub const DOCUMENT: Symbol = Symbol(2);
    /// First symbol id available to grammar terminals and rules.
    pub const FIRST_GRAMMAR: u16 = 3;

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Terminal (token kind) vs. non-terminal (rule kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// Metadata for one symbol in the grammar's alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Human-readable name (`"number"`, `"["`, `"_value"`).
    pub name: String,
    pub kind: SymbolKind,
    /// Anonymous symbols (punctuation literals, rules whose name starts
    /// with `_`) are collapsed in printed output and child access.
    pub named: bool,
    /// Admissible between any two grammar tokens (whitespace, comments).
    /// Bound as leading trivia to the next non-ubiquitous token.
    #[serde(default)]
    pub ubiquitous: bool,
}

pub type LexStateId = u16;
pub type ParseStateId = u16;

/// One DFA transition, keyed by an inclusive byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexAdvance {
    pub lo: u8,
    pub hi: u8,
    pub target: LexStateId,
}

/// One lexer DFA state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LexState {
    /// Range-keyed transitions, checked in order.
    pub advances: Vec<LexAdvance>,
    /// Wildcard edge taken when no range matches. Tokens with unbounded
    /// tails (line comments) keep one of these live so they accept the
    /// longest prefix that passed an accepting state.
    #[serde(default)]
    pub default_advance: Option<LexStateId>,
    /// Terminals accepted in this state, in grammar declaration order.
    /// The runtime tie-breaks equal-length matches against the parser's
    /// current lookahead set.
    #[serde(default)]
    pub accepts: Vec<Symbol>,
}

/// A parse action, indexed by (state, lookahead terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Push the lookahead and move to `state`.
    Shift { state: ParseStateId },
    /// Pop `child_count` entries, build a `symbol` node, consult goto.
    Reduce {
        symbol: Symbol,
        child_count: u16,
        /// Resolves shift-reduce conflicts: a reduction with precedence
        /// above the default wins over the shift.
        precedence: i32,
    },
    /// The document is complete.
    Accept,
}

/// One LR parse state: actions keyed by terminal, gotos keyed by
/// non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParseState {
    pub actions: Vec<(Symbol, Action)>,
    pub gotos: Vec<(Symbol, ParseStateId)>,
}

impl ParseState {
    pub fn action(&self, symbol: Symbol) -> Option<Action> {
        self.actions
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, a)| *a)
    }

    pub fn goto(&self, symbol: Symbol) -> Option<ParseStateId> {
        self.gotos
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, target)| *target)
    }
}

/// The complete artifact: everything the runtime needs to lex and parse
/// one grammar. Immutable once built; shareable across documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    /// Grammar name (e.g. `"json"`, `"arithmetic"`).
    pub name: String,
    /// Symbol metadata. Slots 0..3 hold the builtins (end, error,
    /// DOCUMENT); see [`Tables::validate`].
    pub symbols: Vec<SymbolInfo>,
    pub lex_states: Vec<LexState>,
    pub lex_start: LexStateId,
    pub parse_states: Vec<ParseState>,
    pub parse_start: ParseStateId,
}

impl Tables {
    pub fn symbol(&self, symbol: Symbol) -> &SymbolInfo {
        &self.symbols[symbol.index()]
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        &self.symbols[symbol.index()].name
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn state(&self, id: ParseStateId) -> &ParseState {
        &self.parse_states[id as usize]
    }

    /// The builtin symbol slots every artifact carries.
    pub fn builtin_symbols() -> Vec<SymbolInfo> {
        vec![
            SymbolInfo {
                name: "end".into(),
                kind: SymbolKind::Terminal,
                named: false,
                ubiquitous: false,
            },
            SymbolInfo {
                name: "error".into(),
                kind: SymbolKind::NonTerminal,
                named: true,
                ubiquitous: false,
            },
            SymbolInfo {
                name: "DOCUMENT".into(),
                kind: SymbolKind::NonTerminal,
                named: true,
                ubiquitous: false,
            },
        ]
    }
}
