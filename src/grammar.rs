//! Grammar model: the two disjoint alphabets, production rules and the
//! queries the table builder needs (rules by premise, augmentation).
//!
//! Non-terminals are the small copyable index [`NonTermId`]; terminals are
//! whatever key type `K` the caller's lexer produces. Keeping the two in
//! separate types makes the alphabets disjoint by construction.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};

use crate::error::GrammarError;

pub type NonTermId = usize;
pub type RuleId = usize;

/// One grammar symbol as it appears inside a rule body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol<K> {
    Term(K),
    NonTerm(NonTermId),
}

/// Transition alphabet of the automaton: terminals, non-terminals and the
/// synthetic end-of-input symbol ($).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token<K> {
    Eof,
    Term(K),
    NonTerm(NonTermId),
}

/// Lookahead domain of an LR(1) item: a real terminal or $.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookahead<K> {
    Eof,
    Term(K),
}

impl<K> From<Lookahead<K>> for Token<K> {
    fn from(lookahead: Lookahead<K>) -> Self {
        match lookahead {
            Lookahead::Eof => Token::Eof,
            Lookahead::Term(k) => Token::Term(k),
        }
    }
}

/// Rule bodies are shared into many LR(1) items, so they are
/// reference-counted slices rather than owned vectors.
pub type Body<K> = Rc<[Symbol<K>]>;

/// One production `premise -> body`; an empty body is an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule<K> {
    pub premise: NonTermId,
    pub body: Body<K>,
}

/// A context-free grammar: declared non-terminal ids, declared terminal
/// keys, a start symbol and the rule list in insertion order.
///
/// Insertion order is kept because it decides which automaton state gets
/// discovered first (and therefore state numbering), though never the
/// recognized language.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar<K: Eq + Hash + Clone> {
    non_terminals: HashSet<NonTermId>,
    terminals: HashSet<K>,
    start: NonTermId,
    rules: Vec<Rule<K>>,
    by_premise: HashMap<NonTermId, Vec<RuleId>>,
}

impl<K: Eq + Hash + Clone> Grammar<K> {
    pub fn new(
        non_terminals: impl IntoIterator<Item = NonTermId>,
        terminals: impl IntoIterator<Item = K>,
        start: NonTermId,
    ) -> Self {
        Grammar {
            non_terminals: non_terminals.into_iter().collect(),
            terminals: terminals.into_iter().collect(),
            start,
            rules: Vec::new(),
            by_premise: HashMap::new(),
        }
    }

    pub fn add_rule(&mut self, premise: NonTermId, body: impl Into<Body<K>>) {
        let id = self.rules.len();
        self.rules.push(Rule {
            premise,
            body: body.into(),
        });
        self.by_premise.entry(premise).or_default().push(id);
    }

    pub fn add_rules(&mut self, iter: impl IntoIterator<Item = (NonTermId, Body<K>)>) {
        for (premise, body) in iter {
            self.add_rule(premise, body);
        }
    }

    pub fn rules(&self) -> &[Rule<K>] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule<K> {
        &self.rules[id]
    }

    /// Ids of all rules whose premise is `premise`, in insertion order.
    pub fn rules_for(&self, premise: NonTermId) -> &[RuleId] {
        self.by_premise.get(&premise).map_or(&[], |v| v.as_slice())
    }

    pub fn non_terminals(&self) -> &HashSet<NonTermId> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &HashSet<K> {
        &self.terminals
    }

    pub fn start(&self) -> NonTermId {
        self.start
    }

    /// Eager well-formedness check: the start symbol, every premise and
    /// every body symbol must be declared.
    pub fn validate(&self) -> Result<(), GrammarError<K>> {
        if !self.non_terminals.contains(&self.start) {
            return Err(GrammarError::UndeclaredStart(self.start));
        }
        for rule in &self.rules {
            if !self.non_terminals.contains(&rule.premise) {
                return Err(GrammarError::UndeclaredPremise(rule.premise));
            }
            for sym in rule.body.iter() {
                match sym {
                    Symbol::NonTerm(id) if !self.non_terminals.contains(id) => {
                        return Err(GrammarError::UndeclaredNonTerm {
                            premise: rule.premise,
                            id: *id,
                        });
                    }
                    Symbol::Term(key) if !self.terminals.contains(key) => {
                        return Err(GrammarError::UndeclaredTerm {
                            premise: rule.premise,
                            key: key.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Returns the augmented variant: a fresh start symbol `S'` with the
    /// single rule `S' -> S`. The receiver is left untouched.
    pub fn augmented(&self) -> Grammar<K> {
        let fresh = self.fresh_non_terminal();
        let mut g = self.clone();
        g.non_terminals.insert(fresh);
        g.add_rule(fresh, [Symbol::NonTerm(self.start)].as_slice());
        g.start = fresh;
        g
    }

    /// An id guaranteed absent from the declared non-terminal set.
    fn fresh_non_terminal(&self) -> NonTermId {
        self.non_terminals.iter().max().map_or(0, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: usize = 0;
    const A: usize = 1;
    const B: usize = 2;

    fn body<K: Clone>(xs: &[Symbol<K>]) -> Body<K> {
        Rc::from(xs)
    }

    #[test]
    fn rules_are_indexed_by_premise() {
        // S → A B ;  A → A 'b' ;  B → 'b' A
        let mut g: Grammar<char> = Grammar::new([S, A, B], ['a', 'b', 'c'], S);
        g.add_rules([
            (S, body(&[Symbol::NonTerm(A), Symbol::NonTerm(B)])),
            (A, body(&[Symbol::NonTerm(A), Symbol::Term('b')])),
            (B, body(&[Symbol::Term('b'), Symbol::NonTerm(A)])),
        ]);

        assert_eq!(g.rules_for(A), &[1]);
        assert_eq!(g.rule(1).premise, A);
        assert_eq!(
            g.rule(1).body.as_ref(),
            &[Symbol::NonTerm(A), Symbol::Term('b')]
        );
        assert_eq!(g.rules_for(42), &[] as &[RuleId], "unknown premise");
        assert!(g.validate().is_ok());
    }

    #[test]
    fn validate_rejects_undeclared_symbols() {
        let mut g: Grammar<char> = Grammar::new([S], ['a'], S);
        g.add_rule(A, body(&[Symbol::Term('a')]));
        assert_eq!(g.validate(), Err(GrammarError::UndeclaredPremise(A)));

        let mut g: Grammar<char> = Grammar::new([S], ['a'], S);
        g.add_rule(S, body(&[Symbol::NonTerm(B)]));
        assert_eq!(
            g.validate(),
            Err(GrammarError::UndeclaredNonTerm { premise: S, id: B })
        );

        let mut g: Grammar<char> = Grammar::new([S], ['a'], S);
        g.add_rule(S, body(&[Symbol::Term('x')]));
        assert_eq!(
            g.validate(),
            Err(GrammarError::UndeclaredTerm {
                premise: S,
                key: 'x'
            })
        );

        let g: Grammar<char> = Grammar::new([A, B], ['a'], S);
        assert_eq!(g.validate(), Err(GrammarError::UndeclaredStart(S)));
    }

    #[test]
    fn augmentation_uses_a_fresh_symbol() {
        let mut g: Grammar<char> = Grammar::new([S, A], ['a'], S);
        g.add_rule(S, body(&[Symbol::NonTerm(A)]));
        g.add_rule(A, body(&[Symbol::Term('a')]));

        let aug = g.augmented();
        assert!(
            !g.non_terminals().contains(&aug.start()),
            "augmented start must not reuse a declared non-terminal"
        );
        assert_eq!(aug.rules_for(aug.start()).len(), 1);
        let accept = aug.rule(aug.rules_for(aug.start())[0]).clone();
        assert_eq!(accept.body.as_ref(), &[Symbol::NonTerm(S)]);

        // the caller's grammar is left untouched
        assert_eq!(g.start(), S);
        assert_eq!(g.rules().len(), 2);
        assert_eq!(g.non_terminals().len(), 2);
    }

    #[test]
    fn repeated_augmentation_stays_fresh() {
        let g: Grammar<char> = Grammar::new([S, A, B], ['a'], S);
        let once = g.augmented();
        let twice = once.augmented();
        assert_eq!(once.start(), B + 1);
        assert_eq!(twice.start(), B + 2);
        assert!(!once.non_terminals().contains(&twice.start()));
    }
}
