use crate::automaton::StateId;
use crate::grammar::{NonTermId, Token};

/// Why a grammar was rejected before table construction even started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError<K> {
    /// the start symbol is not a declared non-terminal
    UndeclaredStart(NonTermId),
    /// a rule's premise is not a declared non-terminal
    UndeclaredPremise(NonTermId),
    /// a rule body mentions an undeclared non-terminal
    UndeclaredNonTerm { premise: NonTermId, id: NonTermId },
    /// a rule body mentions a terminal outside the declared alphabet
    UndeclaredTerm { premise: NonTermId, key: K },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// A (state, symbol) cell that ended up with two incompatible actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<K> {
    pub state: StateId,
    pub symbol: Token<K>,
    pub kind: ConflictKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError<K> {
    InvalidGrammar(GrammarError<K>),
    Conflict(Conflict<K>),
}

impl<K> From<GrammarError<K>> for BuildError<K> {
    fn from(err: GrammarError<K>) -> Self {
        BuildError::InvalidGrammar(err)
    }
}

impl<K> From<Conflict<K>> for BuildError<K> {
    fn from(err: Conflict<K>) -> Self {
        BuildError::Conflict(err)
    }
}
