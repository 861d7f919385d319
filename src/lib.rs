#![no_std]
extern crate alloc;

pub mod analysis;
pub mod automaton;
pub mod error;
pub mod grammar;
pub mod terminal;

pub use analysis::Analysis;
pub use automaton::{Action, Automaton, StateId};
pub use error::{BuildError, Conflict, ConflictKind, GrammarError};
pub use grammar::{Body, Grammar, Lookahead, NonTermId, Rule, RuleId, Symbol, Token};
pub use terminal::Terminal;
