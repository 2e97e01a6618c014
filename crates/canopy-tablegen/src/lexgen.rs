//! Lexer DFA construction: pattern → Thompson NFA → subset-construction
//! DFA with byte-range transitions.

use canopy_tables::{LexAdvance, LexState, LexStateId, Symbol};

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::grammar::{GrammarError, Pattern, TokenDef};

#[derive(Debug, Default)]
struct NfaState {
    eps: Vec<usize>,
    ranges: Vec<(u8, u8, usize)>,
    /// Token index accepted in this state.
    accept: Option<usize>,
}

#[derive(Debug, Default)]
struct Nfa {
    states: Vec<NfaState>,
}

impl Nfa {
    fn add(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn eps(&mut self, from: usize, to: usize) {
        self.states[from].eps.push(to);
    }

    fn range(&mut self, from: usize, lo: u8, hi: u8, to: usize) {
        self.states[from].ranges.push((lo, hi, to));
    }

    /// Thompson construction; returns the fragment's exit state.
    fn compile(&mut self, pattern: &Pattern, entry: usize) -> usize {
        match pattern {
            Pattern::Literal(text) => {
                let mut current = entry;
                for &byte in text.as_bytes() {
                    let next = self.add();
                    self.range(current, byte, byte, next);
                    current = next;
                }
                current
            }
            Pattern::Class(ranges) => {
                let exit = self.add();
                for &(lo, hi) in ranges {
                    self.range(entry, lo, hi, exit);
                }
                exit
            }
            Pattern::Seq(parts) => {
                let mut current = entry;
                for part in parts {
                    current = self.compile(part, current);
                }
                current
            }
            Pattern::Choice(parts) => {
                let exit = self.add();
                for part in parts {
                    let branch = self.add();
                    self.eps(entry, branch);
                    let branch_exit = self.compile(part, branch);
                    self.eps(branch_exit, exit);
                }
                exit
            }
            Pattern::Repeat(inner) => {
                let exit = self.compile(&Pattern::Repeat1((*inner).clone()), entry);
                self.eps(entry, exit);
                exit
            }
            Pattern::Repeat1(inner) => {
                let body = self.add();
                self.eps(entry, body);
                let body_exit = self.compile(inner, body);
                self.eps(body_exit, body);
                let exit = self.add();
                self.eps(body_exit, exit);
                exit
            }
            Pattern::Optional(inner) => {
                let exit = self.compile(inner, entry);
                self.eps(entry, exit);
                exit
            }
        }
    }
}

/// Builds the combined DFA for all tokens.
///
/// `terminal_base` is the artifact symbol id of token index 0; accept sets
/// come out in token declaration order so the runtime can tie-break.
pub(crate) fn build(
    tokens: &[TokenDef],
    terminal_base: u16,
) -> Result<(Vec<LexState>, LexStateId), GrammarError> {
    let mut nfa = Nfa::default();
    let start = nfa.add();
    for (token_idx, def) in tokens.iter().enumerate() {
        let entry = nfa.add();
        nfa.eps(start, entry);
        let exit = nfa.compile(&def.pattern, entry);
        nfa.states[exit].accept = Some(token_idx);
    }

    let mut dfa_states: Vec<LexState> = Vec::new();
    let mut dfa_sets: Vec<BTreeSet<usize>> = Vec::new();
    let mut index: HashMap<BTreeSet<usize>, usize> = HashMap::new();

    let start_set = eps_closure(&nfa, [start]);
    index.insert(start_set.clone(), 0);
    dfa_sets.push(start_set);
    dfa_states.push(LexState::default());

    let mut work = vec![0usize];
    while let Some(dfa_id) = work.pop() {
        let set = dfa_sets[dfa_id].clone();

        // Per-byte successor sets, then merged into ranges.
        let mut per_byte: Vec<Option<BTreeSet<usize>>> = vec![None; 256];
        for &nfa_id in &set {
            for &(lo, hi, to) in &nfa.states[nfa_id].ranges {
                for byte in lo..=hi {
                    per_byte[byte as usize]
                        .get_or_insert_with(BTreeSet::new)
                        .insert(to);
                }
            }
        }

        let mut advances = Vec::new();
        let mut run: Option<(u8, u8, usize)> = None;
        for byte in 0..256usize {
            let target = per_byte[byte].take().map(|targets| {
                let closed = eps_closure(&nfa, targets);
                match index.get(&closed) {
                    Some(&id) => id,
                    None => {
                        let id = dfa_sets.len();
                        index.insert(closed.clone(), id);
                        dfa_sets.push(closed);
                        dfa_states.push(LexState::default());
                        work.push(id);
                        id
                    }
                }
            });
            match (&mut run, target) {
                (Some((_, hi, to)), Some(target)) if *to == target => *hi = byte as u8,
                (current, target) => {
                    if let Some(done) = current.take() {
                        advances.push(done);
                    }
                    if let Some(to) = target {
                        *current = Some((byte as u8, byte as u8, to));
                    }
                }
            }
        }
        if let Some(done) = run {
            advances.push(done);
        }

        // A single target covering every byte becomes a wildcard edge.
        let (advances, default_advance) = match advances.as_slice() {
            [(0, 255, to)] => (Vec::new(), Some(*to)),
            _ => (
                advances
                    .iter()
                    .map(|&(lo, hi, to)| {
                        if to > u16::MAX as usize {
                            return Err(GrammarError::TooLarge(format!("{to} lex states")));
                        }
                        Ok(LexAdvance {
                            lo,
                            hi,
                            target: to as LexStateId,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None,
            ),
        };
        let default_advance = match default_advance {
            Some(to) if to > u16::MAX as usize => {
                return Err(GrammarError::TooLarge(format!("{to} lex states")));
            }
            other => other.map(|to| to as LexStateId),
        };

        let mut accept_tokens: Vec<usize> = set
            .iter()
            .filter_map(|&nfa_id| nfa.states[nfa_id].accept)
            .collect();
        accept_tokens.sort_unstable();
        accept_tokens.dedup();

        dfa_states[dfa_id] = LexState {
            advances,
            default_advance,
            accepts: accept_tokens
                .into_iter()
                .map(|idx| Symbol(terminal_base + idx as u16))
                .collect(),
        };
    }

    if dfa_states.len() > u16::MAX as usize {
        return Err(GrammarError::TooLarge(format!(
            "{} lex states",
            dfa_states.len()
        )));
    }
    Ok((dfa_states, 0))
}

fn eps_closure(nfa: &Nfa, seed: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
    let mut closed: BTreeSet<usize> = BTreeSet::new();
    let mut work: Vec<usize> = seed.into_iter().collect();
    while let Some(id) = work.pop() {
        if closed.insert(id) {
            work.extend(nfa.states[id].eps.iter().copied());
        }
    }
    closed
}
