use crate::table::{RuleId, StateId, Symbol};

/// Table/data integrity failures detected while running the automaton.
///
/// These never describe a bad input sentence: they mean the table, the
/// production list and the executor disagree, and the run cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// A `reduce` action names a production number that does not exist.
    #[error("production {rule} not found")]
    MissingProduction { rule: RuleId },

    /// No goto entry for the nonterminal produced by a reduction.
    #[error("no goto entry for '{symbol}' in state {state}")]
    MissingGoto { state: StateId, symbol: Symbol },

    /// A reduction needs more stack elements than are present.
    #[error("stack underflow reducing by rule {rule}: need {needed} elements, have {available}")]
    StackUnderflow {
        rule: RuleId,
        needed: usize,
        available: usize,
    },

    /// The cursor ran past the last token without reaching a verdict.
    #[error("input exhausted at position {position} without an end marker")]
    InputExhausted { position: usize },
}

impl InternalError {
    /// Stable machine-readable name for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            InternalError::MissingProduction { .. } => "missing_production",
            InternalError::MissingGoto { .. } => "missing_goto",
            InternalError::StackUnderflow { .. } => "stack_underflow",
            InternalError::InputExhausted { .. } => "input_exhausted",
        }
    }
}
