//! Programmatic grammar description.
//!
//! A [`Grammar`] is a list of token definitions plus an ordered map of
//! rules (the first rule is the start rule). String literals referenced
//! from productions that were never declared as tokens become anonymous
//! literal tokens automatically, the way grammar authors expect
//! punctuation to work.

use indexmap::IndexMap;

use canopy_tables::{Symbol, SymbolInfo, SymbolKind, Tables, ValidateError};

use crate::lalr;
use crate::lexgen;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar has no rules")]
    Empty,
    #[error("duplicate token `{0}`")]
    DuplicateToken(String),
    #[error("duplicate rule `{0}`")]
    DuplicateRule(String),
    #[error("production references undefined rule `{0}`")]
    UndefinedRule(String),
    #[error("extra `{0}` does not name a token")]
    UnknownExtra(String),
    #[error("token `{0}` has a pattern that matches the empty string")]
    EmptyablePattern(String),
    #[error("grammar too large: {0}")]
    TooLarge(String),
    #[error("generated tables failed validation: {0}")]
    Invalid(#[from] ValidateError),
}

/// A token recognition pattern, compiled to DFA states by `lexgen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Exact byte string.
    Literal(String),
    /// One byte from a set of inclusive ranges.
    Class(Vec<(u8, u8)>),
    Seq(Vec<Pattern>),
    Choice(Vec<Pattern>),
    /// Zero or more.
    Repeat(Box<Pattern>),
    /// One or more.
    Repeat1(Box<Pattern>),
    Optional(Box<Pattern>),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Pattern {
        Pattern::Literal(text.into())
    }

    /// One byte in the inclusive range `lo..=hi`.
    pub fn range(lo: u8, hi: u8) -> Pattern {
        Pattern::Class(vec![(lo, hi)])
    }

    /// One byte from `bytes`.
    pub fn one_of(bytes: &[u8]) -> Pattern {
        Pattern::Class(bytes.iter().map(|&b| (b, b)).collect())
    }

    /// One byte *not* in `bytes` (the complement ranges are computed).
    pub fn none_of(bytes: &[u8]) -> Pattern {
        let mut excluded = [false; 256];
        for &b in bytes {
            excluded[b as usize] = true;
        }
        let mut ranges = Vec::new();
        let mut run: Option<(u8, u8)> = None;
        for byte in 0..=255u8 {
            if excluded[byte as usize] {
                if let Some(range) = run.take() {
                    ranges.push(range);
                }
            } else {
                match &mut run {
                    Some((_, hi)) => *hi = byte,
                    None => run = Some((byte, byte)),
                }
            }
        }
        if let Some(range) = run {
            ranges.push(range);
        }
        Pattern::Class(ranges)
    }

    /// Any byte at all.
    pub fn any_byte() -> Pattern {
        Pattern::Class(vec![(0, 255)])
    }

    pub fn seq(parts: impl IntoIterator<Item = Pattern>) -> Pattern {
        Pattern::Seq(parts.into_iter().collect())
    }

    pub fn then(self, next: Pattern) -> Pattern {
        match self {
            Pattern::Seq(mut parts) => {
                parts.push(next);
                Pattern::Seq(parts)
            }
            first => Pattern::Seq(vec![first, next]),
        }
    }

    pub fn repeat(self) -> Pattern {
        Pattern::Repeat(Box::new(self))
    }

    pub fn repeat1(self) -> Pattern {
        Pattern::Repeat1(Box::new(self))
    }

    pub fn optional(self) -> Pattern {
        Pattern::Optional(Box::new(self))
    }

    /// Can this pattern match zero bytes? Such tokens would wedge the
    /// lexer and are rejected at compile time.
    pub(crate) fn matches_empty(&self) -> bool {
        match self {
            Pattern::Literal(text) => text.is_empty(),
            Pattern::Class(ranges) => ranges.is_empty(),
            Pattern::Seq(parts) => parts.iter().all(Pattern::matches_empty),
            Pattern::Choice(parts) => parts.iter().any(Pattern::matches_empty),
            Pattern::Repeat(_) | Pattern::Optional(_) => true,
            Pattern::Repeat1(inner) => inner.matches_empty(),
        }
    }
}

/// One element of a production: a token or a rule reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elem {
    Token(String),
    Rule(String),
}

/// Token reference for use in productions.
pub fn t(name: &str) -> Elem {
    Elem::Token(name.into())
}

/// Rule reference for use in productions.
pub fn r(name: &str) -> Elem {
    Elem::Rule(name.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub elems: Vec<Elem>,
    /// Reduce precedence; positive values win shift-reduce conflicts.
    pub precedence: i32,
}

/// A production with default precedence.
pub fn prod(elems: &[Elem]) -> Production {
    Production {
        elems: elems.to_vec(),
        precedence: 0,
    }
}

/// A production with explicit reduce precedence.
pub fn prod_prec(precedence: i32, elems: &[Elem]) -> Production {
    Production {
        elems: elems.to_vec(),
        precedence,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TokenDef {
    pub name: String,
    pub pattern: Pattern,
    pub named: bool,
}

/// A complete grammar description.
///
/// Rule names starting with `_` are anonymous: the runtime flattens their
/// nodes into the enclosing parent.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    tokens: Vec<TokenDef>,
    rules: IndexMap<String, Vec<Production>>,
    extras: Vec<String>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Grammar {
        Grammar {
            name: name.into(),
            tokens: Vec::new(),
            rules: IndexMap::new(),
            extras: Vec::new(),
        }
    }

    /// Declare a token. Declaration order is the lexer's tie-break order.
    pub fn token(&mut self, name: &str, pattern: Pattern) -> &mut Self {
        self.tokens.push(TokenDef {
            name: name.into(),
            pattern,
            named: true,
        });
        self
    }

    /// Declare an anonymous token (hidden in printed trees).
    pub fn anon_token(&mut self, name: &str, pattern: Pattern) -> &mut Self {
        self.tokens.push(TokenDef {
            name: name.into(),
            pattern,
            named: false,
        });
        self
    }

    /// Declare a rule. The first declared rule is the start rule.
    pub fn rule(&mut self, name: &str, productions: Vec<Production>) -> &mut Self {
        self.rules.insert(name.into(), productions);
        self
    }

    /// Mark a token as ubiquitous (admissible between any two grammar
    /// tokens; bound as leading trivia to the next real token).
    pub fn extra(&mut self, token_name: &str) -> &mut Self {
        self.extras.push(token_name.into());
        self
    }

    /// Compile to the runtime artifact.
    pub fn compile(&self) -> Result<Tables, GrammarError> {
        let compiled = self.assemble()?;
        compiled.validate()?;
        Ok(compiled)
    }

    fn assemble(&self) -> Result<Tables, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut tokens = self.tokens.clone();
        check_duplicates(&tokens, &self.rules)?;

        // Undeclared token references become anonymous literals.
        for productions in self.rules.values() {
            for production in productions {
                for elem in &production.elems {
                    if let Elem::Token(name) = elem {
                        if !tokens.iter().any(|def| &def.name == name) {
                            tokens.push(TokenDef {
                                name: name.clone(),
                                pattern: Pattern::Literal(name.clone()),
                                named: false,
                            });
                        }
                    }
                }
            }
        }

        for def in &tokens {
            if def.pattern.matches_empty() {
                return Err(GrammarError::EmptyablePattern(def.name.clone()));
            }
        }
        for extra in &self.extras {
            if !tokens.iter().any(|def| &def.name == extra) {
                return Err(GrammarError::UnknownExtra(extra.clone()));
            }
        }

        // Symbol layout: builtins, then terminals, then non-terminals.
        let mut symbols = Tables::builtin_symbols();
        let terminal_base = symbols.len() as u16;
        for def in &tokens {
            symbols.push(SymbolInfo {
                name: def.name.clone(),
                kind: SymbolKind::Terminal,
                named: def.named,
                ubiquitous: self.extras.contains(&def.name),
            });
        }
        let rule_base = symbols.len() as u16;
        for name in self.rules.keys() {
            symbols.push(SymbolInfo {
                name: name.clone(),
                kind: SymbolKind::NonTerminal,
                named: !name.starts_with('_'),
                ubiquitous: false,
            });
        }
        if symbols.len() > u16::MAX as usize {
            return Err(GrammarError::TooLarge(format!(
                "{} symbols",
                symbols.len()
            )));
        }

        let token_symbol = |name: &str| -> Symbol {
            let idx = tokens
                .iter()
                .position(|def| def.name == name)
                .expect("referenced tokens are declared or auto-injected");
            Symbol(terminal_base + idx as u16)
        };
        let rule_symbol = |name: &str| -> Option<Symbol> {
            self.rules
                .get_index_of(name)
                .map(|idx| Symbol(rule_base + idx as u16))
        };

        // Flatten productions into (lhs, rhs) pairs in declaration order.
        let mut prods = Vec::new();
        for (rule_idx, (_, productions)) in self.rules.iter().enumerate() {
            let lhs = Symbol(rule_base + rule_idx as u16);
            for production in productions {
                let mut rhs = Vec::with_capacity(production.elems.len());
                for elem in &production.elems {
                    match elem {
                        Elem::Token(name) => rhs.push(token_symbol(name)),
                        Elem::Rule(name) => {
                            let symbol = rule_symbol(name)
                                .ok_or_else(|| GrammarError::UndefinedRule(name.clone()))?;
                            rhs.push(symbol);
                        }
                    }
                }
                prods.push(lalr::Prod {
                    lhs,
                    rhs,
                    precedence: production.precedence,
                });
            }
        }

        let (lex_states, lex_start) = lexgen::build(&tokens, terminal_base)?;
        let start_symbol = Symbol(rule_base);
        let (parse_states, parse_start) =
            lalr::build(&symbols, &prods, start_symbol)?;

        Ok(Tables {
            name: self.name.clone(),
            symbols,
            lex_states,
            lex_start,
            parse_states,
            parse_start,
        })
    }
}

fn check_duplicates(
    tokens: &[TokenDef],
    rules: &IndexMap<String, Vec<Production>>,
) -> Result<(), GrammarError> {
    for (i, def) in tokens.iter().enumerate() {
        if tokens[..i].iter().any(|other| other.name == def.name) {
            return Err(GrammarError::DuplicateToken(def.name.clone()));
        }
        if rules.contains_key(&def.name) {
            return Err(GrammarError::DuplicateRule(def.name.clone()));
        }
    }
    Ok(())
}
