//! lrtable-core: table-driven LR shift/reduce automaton.
//!
//! Consumes an already-built parse table and a pre-split token sequence and
//! produces an accept/reject verdict with diagnostic context. Table
//! construction, tokenizing and file loading live elsewhere.
//!
//! # Public API
//!
//! - [`TableModel`] -- primary table, productions and optional override table
//! - [`Executor`] -- one run over one token sequence; [`run()`] for the common case
//! - [`Verdict`] / [`Rejection`] -- terminal outcomes
//! - [`InternalError`] -- table/data integrity failures (`Verdict::Fatal`)

/// Conventional end-of-input marker appended by callers.
pub const END_MARKER: &str = "$";

pub mod error;
pub mod executor;
pub mod stack;
pub mod table;
pub mod verdict;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::InternalError;
pub use executor::{run, Executor, Step, Trace, TraceStep, Transition};
pub use stack::{ParserStack, StackItem};
pub use table::{
    Action, ActionLookup, ActionSource, Cell, ConflictSite, ParseTable, Production, RuleId,
    ShiftReduce, StateId, Symbol, TableModel, DEFAULT_START_STATE,
};
pub use verdict::{Rejection, Verdict};
