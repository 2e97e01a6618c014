//! SLR(1) table construction: LR(0) item sets, FIRST/FOLLOW, action and
//! goto tables.
//!
//! Conflict resolution:
//! - shift-reduce: shift wins unless the production carries positive
//!   reduce precedence
//! - reduce-reduce: higher precedence wins, then the earlier-declared
//!   production

use std::collections::{BTreeMap, BTreeSet, HashMap};

use canopy_tables::{Action, ParseState, ParseStateId, Symbol, SymbolInfo, SymbolKind};

use crate::grammar::GrammarError;

/// A flattened production.
#[derive(Debug, Clone)]
pub(crate) struct Prod {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub precedence: i32,
}

/// An LR(0) item: production index and dot position.
type Item = (u16, u16);
type ItemSet = BTreeSet<Item>;

struct Builder<'g> {
    symbols: &'g [SymbolInfo],
    /// Index 0 is the augmented production `DOCUMENT -> start`.
    prods: Vec<Prod>,
    /// Productions grouped by left-hand side.
    by_lhs: HashMap<Symbol, Vec<u16>>,
    nullable: BTreeSet<Symbol>,
    first: HashMap<Symbol, BTreeSet<Symbol>>,
    follow: HashMap<Symbol, BTreeSet<Symbol>>,
}

pub(crate) fn build(
    symbols: &[SymbolInfo],
    prods: &[Prod],
    start: Symbol,
) -> Result<(Vec<ParseState>, ParseStateId), GrammarError> {
    let mut all = Vec::with_capacity(prods.len() + 1);
    all.push(Prod {
        lhs: Symbol::DOCUMENT,
        rhs: vec![start],
        precedence: 0,
    });
    all.extend(prods.iter().cloned());
    if all.len() > u16::MAX as usize {
        return Err(GrammarError::TooLarge(format!("{} productions", all.len())));
    }

    let mut by_lhs: HashMap<Symbol, Vec<u16>> = HashMap::new();
    for (idx, prod) in all.iter().enumerate() {
        by_lhs.entry(prod.lhs).or_default().push(idx as u16);
    }

    let mut builder = Builder {
        symbols,
        prods: all,
        by_lhs,
        nullable: BTreeSet::new(),
        first: HashMap::new(),
        follow: HashMap::new(),
    };
    builder.compute_nullable();
    builder.compute_first();
    builder.compute_follow();
    builder.build_states()
}

impl Builder<'_> {
    fn is_terminal(&self, symbol: Symbol) -> bool {
        self.symbols[symbol.index()].kind == SymbolKind::Terminal
    }

    fn compute_nullable(&mut self) {
        loop {
            let mut changed = false;
            for prod in &self.prods {
                if self.nullable.contains(&prod.lhs) {
                    continue;
                }
                if prod.rhs.iter().all(|s| self.nullable.contains(s)) {
                    self.nullable.insert(prod.lhs);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn compute_first(&mut self) {
        loop {
            let mut changed = false;
            for prod in &self.prods {
                let mut addition = BTreeSet::new();
                for &symbol in &prod.rhs {
                    if self.is_terminal(symbol) {
                        addition.insert(symbol);
                        break;
                    }
                    if let Some(first) = self.first.get(&symbol) {
                        addition.extend(first.iter().copied());
                    }
                    if !self.nullable.contains(&symbol) {
                        break;
                    }
                }
                let entry = self.first.entry(prod.lhs).or_default();
                let before = entry.len();
                entry.extend(addition);
                changed |= entry.len() != before;
            }
            if !changed {
                break;
            }
        }
    }

    fn first_of_seq(&self, seq: &[Symbol]) -> (BTreeSet<Symbol>, bool) {
        let mut out = BTreeSet::new();
        for &symbol in seq {
            if self.is_terminal(symbol) {
                out.insert(symbol);
                return (out, false);
            }
            if let Some(first) = self.first.get(&symbol) {
                out.extend(first.iter().copied());
            }
            if !self.nullable.contains(&symbol) {
                return (out, false);
            }
        }
        (out, true)
    }

    fn compute_follow(&mut self) {
        self.follow
            .entry(Symbol::DOCUMENT)
            .or_default()
            .insert(Symbol::END);
        loop {
            let mut changed = false;
            for prod in &self.prods {
                for (idx, &symbol) in prod.rhs.iter().enumerate() {
                    if self.is_terminal(symbol) {
                        continue;
                    }
                    let (mut addition, rest_nullable) = self.first_of_seq(&prod.rhs[idx + 1..]);
                    if rest_nullable {
                        if let Some(lhs_follow) = self.follow.get(&prod.lhs) {
                            addition.extend(lhs_follow.iter().copied());
                        }
                    }
                    let entry = self.follow.entry(symbol).or_default();
                    let before = entry.len();
                    entry.extend(addition);
                    changed |= entry.len() != before;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn closure(&self, mut set: ItemSet) -> ItemSet {
        let mut work: Vec<Item> = set.iter().copied().collect();
        while let Some((prod_idx, dot)) = work.pop() {
            let prod = &self.prods[prod_idx as usize];
            let Some(&next) = prod.rhs.get(dot as usize) else {
                continue;
            };
            if self.is_terminal(next) {
                continue;
            }
            for &candidate in self.by_lhs.get(&next).into_iter().flatten() {
                if set.insert((candidate, 0)) {
                    work.push((candidate, 0));
                }
            }
        }
        set
    }

    fn build_states(&self) -> Result<(Vec<ParseState>, ParseStateId), GrammarError> {
        let start_set = self.closure(ItemSet::from([(0u16, 0u16)]));
        let mut sets: Vec<ItemSet> = vec![start_set.clone()];
        let mut index: HashMap<ItemSet, usize> = HashMap::from([(start_set, 0)]);
        let mut transitions: Vec<BTreeMap<Symbol, usize>> = vec![BTreeMap::new()];

        let mut work = vec![0usize];
        while let Some(state_id) = work.pop() {
            let set = sets[state_id].clone();
            let mut by_symbol: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
            for &(prod_idx, dot) in &set {
                let prod = &self.prods[prod_idx as usize];
                if let Some(&next) = prod.rhs.get(dot as usize) {
                    by_symbol
                        .entry(next)
                        .or_default()
                        .insert((prod_idx, dot + 1));
                }
            }
            for (symbol, kernel) in by_symbol {
                let closed = self.closure(kernel);
                let target = match index.get(&closed) {
                    Some(&id) => id,
                    None => {
                        let id = sets.len();
                        index.insert(closed.clone(), id);
                        sets.push(closed);
                        transitions.push(BTreeMap::new());
                        work.push(id);
                        id
                    }
                };
                transitions[state_id].insert(symbol, target);
            }
        }

        if sets.len() > u16::MAX as usize {
            return Err(GrammarError::TooLarge(format!("{} parse states", sets.len())));
        }

        let mut states = Vec::with_capacity(sets.len());
        for (set, state_transitions) in sets.iter().zip(&transitions) {
            let mut actions: BTreeMap<Symbol, (Action, u16)> = BTreeMap::new();
            let mut gotos = Vec::new();

            for (&symbol, &target) in state_transitions {
                if self.is_terminal(symbol) {
                    actions.insert(
                        symbol,
                        (
                            Action::Shift {
                                state: target as ParseStateId,
                            },
                            u16::MAX,
                        ),
                    );
                } else {
                    gotos.push((symbol, target as ParseStateId));
                }
            }

            for &(prod_idx, dot) in set {
                let prod = &self.prods[prod_idx as usize];
                if (dot as usize) < prod.rhs.len() {
                    continue;
                }
                if prod_idx == 0 {
                    actions.insert(Symbol::END, (Action::Accept, 0));
                    continue;
                }
                let reduce = Action::Reduce {
                    symbol: prod.lhs,
                    child_count: prod.rhs.len() as u16,
                    precedence: prod.precedence,
                };
                let Some(follow) = self.follow.get(&prod.lhs) else {
                    continue;
                };
                for &lookahead in follow {
                    match actions.get(&lookahead) {
                        None => {
                            actions.insert(lookahead, (reduce, prod_idx));
                        }
                        Some(&(Action::Shift { .. }, _)) => {
                            // Shift wins unless the reduction carries
                            // positive precedence.
                            if prod.precedence > 0 {
                                actions.insert(lookahead, (reduce, prod_idx));
                            }
                        }
                        Some(&(Action::Reduce { precedence, .. }, existing_idx)) => {
                            let wins = prod.precedence > precedence
                                || (prod.precedence == precedence && prod_idx < existing_idx);
                            if wins {
                                actions.insert(lookahead, (reduce, prod_idx));
                            }
                        }
                        Some(&(Action::Accept, _)) => {}
                    }
                }
            }

            states.push(ParseState {
                actions: actions
                    .into_iter()
                    .map(|(symbol, (action, _))| (symbol, action))
                    .collect(),
                gotos,
            });
        }

        Ok((states, 0))
    }
}
