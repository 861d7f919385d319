//! Nullability and FIRST-set analysis.
//!
//! Both sets are computed by monotone fixpoint passes over the whole rule
//! list (repeat until no set grows) rather than per-symbol recursion, so
//! self-referential and mutually recursive grammars converge instead of
//! looping. The sequence-level query [`Analysis::first_of_seq`] is derived
//! from the two tables on demand; nothing per-sequence is stored.

use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};

use crate::grammar::{Grammar, Lookahead, NonTermId, Symbol};

/// Nullable set and FIRST table of a grammar, computed once and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<K: Eq + Hash + Clone> {
    nullable: HashSet<NonTermId>,
    first: HashMap<NonTermId, HashSet<K>>,
}

impl<K: Eq + Hash + Clone> Analysis<K> {
    pub fn of(grammar: &Grammar<K>) -> Self {
        let nullable = calculate_nullable(grammar);
        let first = calculate_first(grammar, &nullable);
        Analysis { nullable, first }
    }

    /// Non-terminals that can derive the empty string.
    pub fn nullable(&self) -> &HashSet<NonTermId> {
        &self.nullable
    }

    pub fn is_nullable(&self, id: NonTermId) -> bool {
        self.nullable.contains(&id)
    }

    /// FIRST of a symbol string followed by a trailing lookahead: walk the
    /// string left to right, a terminal ends the walk, a non-terminal
    /// contributes its FIRST set and ends the walk unless nullable; if the
    /// whole string is nullable the trailing lookahead shows through.
    pub fn first_of_seq(
        &self,
        symbols: &[Symbol<K>],
        trailing: &Lookahead<K>,
    ) -> HashSet<Lookahead<K>> {
        let mut out = HashSet::new();
        for sym in symbols {
            match sym {
                Symbol::Term(key) => {
                    out.insert(Lookahead::Term(key.clone()));
                    return out;
                }
                Symbol::NonTerm(id) => {
                    if let Some(set) = self.first.get(id) {
                        out.extend(set.iter().cloned().map(Lookahead::Term));
                    }
                    if !self.nullable.contains(id) {
                        return out;
                    }
                }
            }
        }
        out.insert(trailing.clone());
        out
    }
}

fn calculate_nullable<K: Eq + Hash + Clone>(grammar: &Grammar<K>) -> HashSet<NonTermId> {
    let mut nullable = HashSet::new();
    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            if nullable.contains(&rule.premise) {
                continue;
            }
            let body_nullable = rule.body.iter().all(|sym| match sym {
                Symbol::Term(_) => false,
                Symbol::NonTerm(id) => nullable.contains(id),
            });
            if body_nullable {
                nullable.insert(rule.premise);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

fn calculate_first<K: Eq + Hash + Clone>(
    grammar: &Grammar<K>,
    nullable: &HashSet<NonTermId>,
) -> HashMap<NonTermId, HashSet<K>> {
    let mut first: HashMap<NonTermId, HashSet<K>> = HashMap::new();
    for &id in grammar.non_terminals() {
        first.entry(id).or_default();
    }

    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            // gather into a buffer first; the premise's own set may be one
            // of the sets being read
            let mut gained: Vec<K> = Vec::new();
            for sym in rule.body.iter() {
                match sym {
                    Symbol::Term(key) => {
                        gained.push(key.clone());
                        break;
                    }
                    Symbol::NonTerm(id) => {
                        if let Some(set) = first.get(id) {
                            gained.extend(set.iter().cloned());
                        }
                        if !nullable.contains(id) {
                            break;
                        }
                    }
                }
            }
            let set = first.entry(rule.premise).or_default();
            for key in gained {
                changed |= set.insert(key);
            }
        }
        if !changed {
            break;
        }
    }

    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Body;
    use alloc::rc::Rc;

    fn body<K: Clone>(xs: &[Symbol<K>]) -> Body<K> {
        Rc::from(xs)
    }

    fn set<T: Eq + Hash + Clone>(xs: &[T]) -> HashSet<T> {
        xs.iter().cloned().collect()
    }

    const S: usize = 0;
    const C: usize = 1;
    const D: usize = 2;

    /// S → C D ;  C → ε | 'c' ;  D → ε | 'd'
    fn epsilon_grammar() -> Grammar<char> {
        let mut g = Grammar::new([S, C, D], ['c', 'd'], S);
        g.add_rules([
            (S, body(&[Symbol::NonTerm(C), Symbol::NonTerm(D)])),
            (C, body(&[])),
            (C, body(&[Symbol::Term('c')])),
            (D, body(&[])),
            (D, body(&[Symbol::Term('d')])),
        ]);
        g
    }

    #[test]
    fn nullable_fixpoint() {
        let analysis = Analysis::of(&epsilon_grammar());
        assert_eq!(analysis.nullable(), &set(&[S, C, D]));

        // S → C C ;  C → 'c' C | 'd'  — nothing derives ε
        let mut g: Grammar<char> = Grammar::new([S, C], ['c', 'd'], S);
        g.add_rules([
            (S, body(&[Symbol::NonTerm(C), Symbol::NonTerm(C)])),
            (C, body(&[Symbol::Term('c'), Symbol::NonTerm(C)])),
            (C, body(&[Symbol::Term('d')])),
        ]);
        let analysis = Analysis::of(&g);
        assert!(analysis.nullable().is_empty());
        assert!(!analysis.is_nullable(S));
    }

    #[test]
    fn first_with_nullable_prefixes() {
        let analysis = Analysis::of(&epsilon_grammar());
        let eof = Lookahead::Eof;

        // the trailing $ shows through every nullable symbol
        assert_eq!(
            analysis.first_of_seq(&[Symbol::NonTerm(S)], &eof),
            set(&[Lookahead::Term('c'), Lookahead::Term('d'), Lookahead::Eof]),
            "FIRST(S)"
        );
        assert_eq!(
            analysis.first_of_seq(&[Symbol::NonTerm(C)], &eof),
            set(&[Lookahead::Term('c'), Lookahead::Eof]),
            "FIRST(C)"
        );
        assert_eq!(
            analysis.first_of_seq(&[Symbol::NonTerm(D)], &eof),
            set(&[Lookahead::Term('d'), Lookahead::Eof]),
            "FIRST(D)"
        );
        assert_eq!(
            analysis.first_of_seq(&[], &eof),
            set(&[Lookahead::Eof]),
            "FIRST of the empty string is the trailing lookahead"
        );
        assert_eq!(
            analysis.first_of_seq(&[Symbol::Term('c')], &eof),
            set(&[Lookahead::Term('c')])
        );
    }

    #[test]
    fn first_of_sequence_stops_at_non_nullable() {
        const R: usize = 1;
        const T: usize = 2;

        // R → ε | 'a' ;  T → 'b' ;  S → R T S | 'a'
        let mut g: Grammar<char> = Grammar::new([S, R, T], ['a', 'b'], S);
        g.add_rules([
            (R, body(&[])),
            (R, body(&[Symbol::Term('a')])),
            (T, body(&[Symbol::Term('b')])),
            (
                S,
                body(&[Symbol::NonTerm(R), Symbol::NonTerm(T), Symbol::NonTerm(S)]),
            ),
            (S, body(&[Symbol::Term('a')])),
        ]);
        let analysis = Analysis::of(&g);

        // R is nullable so T's FIRST shows through; T is not, so neither
        // S's FIRST nor the trailing $ is ever reached
        assert_eq!(
            analysis.first_of_seq(
                &[Symbol::NonTerm(R), Symbol::NonTerm(T), Symbol::NonTerm(S)],
                &Lookahead::Eof
            ),
            set(&[Lookahead::Term('a'), Lookahead::Term('b')])
        );
    }

    #[test]
    fn first_converges_on_recursive_rules() {
        const A: usize = 1;
        const B: usize = 2;

        // mutual recursion: S → A ;  A → B | 'a' ;  B → A 'b'
        let mut g: Grammar<char> = Grammar::new([S, A, B], ['a', 'b'], S);
        g.add_rules([
            (S, body(&[Symbol::NonTerm(A)])),
            (A, body(&[Symbol::NonTerm(B)])),
            (A, body(&[Symbol::Term('a')])),
            (B, body(&[Symbol::NonTerm(A), Symbol::Term('b')])),
        ]);
        let analysis = Analysis::of(&g);

        assert_eq!(
            analysis.first_of_seq(&[Symbol::NonTerm(S)], &Lookahead::Eof),
            set(&[Lookahead::Term('a')])
        );
        assert_eq!(
            analysis.first_of_seq(&[Symbol::NonTerm(B)], &Lookahead::Eof),
            set(&[Lookahead::Term('a')])
        );
    }
}
