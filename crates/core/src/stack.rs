//! The run-time parser stack: states interleaved with grammar symbols.

use std::fmt;

use crate::table::{StateId, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackItem {
    State(StateId),
    Symbol(Symbol),
}

impl fmt::Display for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackItem::State(s) => write!(f, "{}", s),
            StackItem::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// Alternating state/symbol stack that always starts with a state.
///
/// Stored as the bottom state plus `(symbol, state)` pairs, so the flat
/// length is always odd and the top element is always a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserStack {
    bottom: StateId,
    pairs: Vec<(Symbol, StateId)>,
}

impl ParserStack {
    pub fn new(initial: StateId) -> Self {
        ParserStack {
            bottom: initial,
            pairs: Vec::new(),
        }
    }

    /// Push a symbol followed by the state it leads to.
    pub(crate) fn push_pair(&mut self, symbol: Symbol, state: StateId) {
        self.pairs.push((symbol, state));
    }

    /// Pop `count` symbol/state pairs. Returns `false`, leaving the stack
    /// untouched, when fewer than `count` pairs sit above the bottom state.
    pub(crate) fn pop_pairs(&mut self, count: usize) -> bool {
        if count > self.pairs.len() {
            return false;
        }
        self.pairs.truncate(self.pairs.len() - count);
        true
    }

    pub fn top_state(&self) -> &StateId {
        self.pairs.last().map(|(_, s)| s).unwrap_or(&self.bottom)
    }

    /// Flattened view: `[state, symbol, state, ..., state]`.
    pub fn items(&self) -> Vec<StackItem> {
        let mut items = Vec::with_capacity(self.len());
        items.push(StackItem::State(self.bottom.clone()));
        for (symbol, state) in &self.pairs {
            items.push(StackItem::Symbol(symbol.clone()));
            items.push(StackItem::State(state.clone()));
        }
        items
    }

    /// Number of flat elements (states plus symbols).
    pub fn len(&self) -> usize {
        1 + 2 * self.pairs.len()
    }

    /// Never true; the bottom state cannot be popped.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ParserStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bottom)?;
        for (symbol, state) in &self.pairs {
            write!(f, " {} {}", symbol, state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_keep_state_on_top() {
        let mut stack = ParserStack::new(StateId::from("1"));
        stack.push_pair("a".to_string(), StateId::from("2"));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top_state(), &StateId::from("2"));
        assert_eq!(stack.to_string(), "1 a 2");
        assert_eq!(
            stack.items(),
            vec![
                StackItem::State(StateId::from("1")),
                StackItem::Symbol("a".to_string()),
                StackItem::State(StateId::from("2")),
            ]
        );

        assert!(stack.pop_pairs(1));
        assert_eq!(stack.top_state(), &StateId::from("1"));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn pop_never_removes_bottom_state() {
        let mut stack = ParserStack::new(StateId::from("1"));
        stack.push_pair("a".to_string(), StateId::from("2"));
        assert!(!stack.pop_pairs(2));
        assert_eq!(stack.len(), 3);
        assert!(stack.pop_pairs(0));
        assert_eq!(stack.len(), 3);
    }
}
