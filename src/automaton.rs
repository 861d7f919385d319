//! Canonical LR(1) automaton: item-set construction and the shift/reduce
//! recognizer.
//!
//! `build` explores states breadth-first from the closure of
//! `[S' -> ·S, $]`. A state's identity is its sorted item set, so two
//! states with equal item sets are merged; successor symbols are visited in
//! a fixed order, which makes state numbering a pure function of rule
//! insertion order. Any cell of the action table that would receive two
//! actions aborts the whole build with a typed [`Conflict`] — there is no
//! LALR-style merging and no precedence-based disambiguation.

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec;
use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};

use crate::analysis::Analysis;
use crate::error::{BuildError, Conflict, ConflictKind};
use crate::grammar::{Grammar, Lookahead, NonTermId, Rule, RuleId, Symbol, Token};
use crate::terminal::Terminal;

pub type StateId = usize;

/// One LR(1) item: a rule, a dot position inside its body and a lookahead.
/// Equality, hashing and ordering are structural, which is what lets whole
/// item sets be deduplicated and canonically ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item<K> {
    rule: RuleId,
    dot: usize,
    lookahead: Lookahead<K>,
}

/// What the automaton does on one (state, token) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Goto(StateId),
    Reduce(RuleId),
    Accept,
}

#[derive(Debug, Clone, PartialEq)]
struct State<K: Eq + Hash + Clone + Ord> {
    items: BTreeSet<Item<K>>,
    actions: HashMap<Token<K>, Action>,
}

/// A fully built LR(1) automaton. Immutable once `build` returns; one
/// automaton serves unlimited `recognize` calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton<K: Eq + Hash + Clone + Ord> {
    /// rules of the private augmented grammar (the caller's grammar is
    /// never retained or mutated)
    rules: Vec<Rule<K>>,
    accept_rule: RuleId,
    states: Vec<State<K>>,
    analysis: Analysis<K>,
}

impl<K: Eq + Hash + Clone + Ord> Automaton<K> {
    /// Builds the canonical LR(1) automaton for `grammar`, or reports the
    /// first validation error or table conflict.
    pub fn build(grammar: &Grammar<K>) -> Result<Self, BuildError<K>> {
        grammar.validate()?;

        // analysis runs pre-augmentation: the fresh start occurs in no rule
        // body, so closure never asks about it, and the nullable/FIRST
        // diagnostics stay scoped to declared non-terminals
        let analysis = Analysis::of(grammar);
        let augmented = grammar.augmented();
        let accept_rule = augmented.rules_for(augmented.start())[0];

        let mut builder = Builder {
            grammar: &augmented,
            analysis: &analysis,
            accept_rule,
            states: Vec::new(),
            index: HashMap::new(),
        };
        builder.explore()?;

        Ok(Automaton {
            rules: augmented.rules().to_vec(),
            accept_rule,
            states: builder.states,
            analysis,
        })
    }

    /// Runs the shift/reduce driver over `input` plus the end marker.
    /// Total: every input, including symbols outside the grammar's
    /// alphabet, yields a plain accept/reject answer.
    pub fn recognize<I>(&self, input: I) -> bool
    where
        I: IntoIterator,
        I::Item: Terminal<Key = K>,
    {
        fn next_token<K, I>(input: &mut I) -> Token<K>
        where
            I: Iterator,
            I::Item: Terminal<Key = K>,
        {
            match input.next() {
                Some(t) => Token::Term(t.get_key()),
                None => Token::Eof,
            }
        }

        let mut input = input.into_iter();
        let mut stack: Vec<StateId> = vec![0];
        let mut token = next_token(&mut input);

        loop {
            let Some(&top) = stack.last() else {
                return false;
            };
            let Some(action) = self.states[top].actions.get(&token) else {
                return false;
            };
            match action {
                Action::Accept => return true,
                Action::Shift(target) => {
                    stack.push(*target);
                    token = next_token(&mut input);
                }
                Action::Reduce(rule) => {
                    let rule = &self.rules[*rule];
                    // state 0 must survive underneath the popped frames
                    if rule.body.len() >= stack.len() {
                        return false;
                    }
                    stack.truncate(stack.len() - rule.body.len());
                    let Some(&top) = stack.last() else {
                        return false;
                    };
                    match self.states[top].actions.get(&Token::NonTerm(rule.premise)) {
                        Some(Action::Goto(target)) => stack.push(*target),
                        // unreachable for a correctly built table
                        _ => return false,
                    }
                }
                // goto cells are keyed by non-terminals, which never come
                // off the input
                Action::Goto(_) => return false,
            }
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Declared non-terminals that can derive the empty string.
    pub fn nullable_set(&self) -> &HashSet<NonTermId> {
        self.analysis.nullable()
    }

    /// Sequence-FIRST with the end marker as implicit trailing lookahead.
    pub fn first(&self, symbols: &[Symbol<K>]) -> HashSet<Lookahead<K>> {
        self.analysis.first_of_seq(symbols, &Lookahead::Eof)
    }
}

struct Builder<'g, K: Eq + Hash + Clone + Ord> {
    grammar: &'g Grammar<K>,
    analysis: &'g Analysis<K>,
    accept_rule: RuleId,
    states: Vec<State<K>>,
    index: HashMap<BTreeSet<Item<K>>, StateId>,
}

impl<K: Eq + Hash + Clone + Ord> Builder<'_, K> {
    fn explore(&mut self) -> Result<(), Conflict<K>> {
        let start = Item {
            rule: self.accept_rule,
            dot: 0,
            lookahead: Lookahead::Eof,
        };
        let initial = self.closure(BTreeSet::from([start]));
        self.intern(initial);

        let mut queue: VecDeque<StateId> = VecDeque::from([0]);
        while let Some(id) = queue.pop_front() {
            for discovered in self.process_state(id)? {
                queue.push_back(discovered);
            }
        }
        Ok(())
    }

    /// Fills in the action row of one state and returns any states first
    /// discovered from it.
    fn process_state(&mut self, id: StateId) -> Result<Vec<StateId>, Conflict<K>> {
        // successor kernels per symbol; a BTreeMap so transition order (and
        // with it state numbering) never depends on hash iteration
        let mut moves: BTreeMap<Token<K>, BTreeSet<Item<K>>> = BTreeMap::new();
        let mut reduces: Vec<(Lookahead<K>, RuleId)> = Vec::new();

        for item in self.states[id].items.clone() {
            let body = &self.grammar.rule(item.rule).body;
            match body.get(item.dot) {
                None => reduces.push((item.lookahead, item.rule)),
                Some(sym) => {
                    let key = match sym {
                        Symbol::Term(k) => Token::Term(k.clone()),
                        Symbol::NonTerm(n) => Token::NonTerm(*n),
                    };
                    moves.entry(key).or_default().insert(Item {
                        dot: item.dot + 1,
                        ..item
                    });
                }
            }
        }

        let mut discovered = Vec::new();
        for (key, kernel) in moves {
            let closed = self.closure(kernel);
            let target = match self.index.get(&closed) {
                Some(&existing) => existing,
                None => {
                    let fresh = self.intern(closed);
                    discovered.push(fresh);
                    fresh
                }
            };
            let action = match key {
                Token::NonTerm(_) => Action::Goto(target),
                _ => Action::Shift(target),
            };
            self.set_action(id, key, action)?;
        }

        for (lookahead, rule) in reduces {
            let action = if rule == self.accept_rule && lookahead == Lookahead::Eof {
                Action::Accept
            } else {
                Action::Reduce(rule)
            };
            self.set_action(id, lookahead.into(), action)?;
        }

        Ok(discovered)
    }

    /// Closure of an item set: for every `[A -> α·Bβ, a]` add `[B -> ·γ, b]`
    /// for each rule of B and each `b ∈ FIRST*(β, a)`, until nothing new
    /// appears.
    fn closure(&self, kernel: BTreeSet<Item<K>>) -> BTreeSet<Item<K>> {
        let mut items = kernel;
        let mut queue: VecDeque<Item<K>> = items.iter().cloned().collect();

        while let Some(item) = queue.pop_front() {
            let body = &self.grammar.rule(item.rule).body;
            let Some(Symbol::NonTerm(next)) = body.get(item.dot) else {
                continue;
            };
            let tail = &body[item.dot + 1..];
            let lookaheads = self.analysis.first_of_seq(tail, &item.lookahead);
            for &rule in self.grammar.rules_for(*next) {
                for lookahead in &lookaheads {
                    let candidate = Item {
                        rule,
                        dot: 0,
                        lookahead: lookahead.clone(),
                    };
                    if items.insert(candidate.clone()) {
                        queue.push_back(candidate);
                    }
                }
            }
        }
        items
    }

    fn intern(&mut self, items: BTreeSet<Item<K>>) -> StateId {
        let id = self.states.len();
        self.index.insert(items.clone(), id);
        self.states.push(State {
            items,
            actions: HashMap::new(),
        });
        id
    }

    /// Items are a set, so the same (state, token, action) triple can never
    /// be proposed twice; any occupied cell is a genuine conflict.
    fn set_action(&mut self, state: StateId, key: Token<K>, action: Action) -> Result<(), Conflict<K>> {
        let actions = &mut self.states[state].actions;
        match actions.get(&key) {
            None => {
                actions.insert(key, action);
                Ok(())
            }
            Some(existing) => {
                let kind = match (existing, &action) {
                    (Action::Reduce(_) | Action::Accept, Action::Reduce(_) | Action::Accept) => {
                        ConflictKind::ReduceReduce
                    }
                    _ => ConflictKind::ShiftReduce,
                };
                Err(Conflict {
                    state,
                    symbol: key,
                    kind,
                })
            }
        }
    }
}
