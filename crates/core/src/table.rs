//! Immutable in-memory parse table model.
//!
//! A [`TableModel`] bundles the primary action/goto table, the numbered
//! production list and an optional sparse override table. It is built once
//! by a loader (see `lrtable-interchange`) and only ever read afterwards, so
//! a single model can back any number of concurrent executor runs.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::InternalError;

/// Grammar symbol (terminal or nonterminal) as it appears in table columns.
pub type Symbol = String;

/// State identifier used as a table row key.
///
/// States are opaque lookup keys; numeric destinations are normalized to
/// their decimal rendering so `2` and `"2"` name the same row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(String);

impl StateId {
    pub fn new(id: impl Into<String>) -> Self {
        StateId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for StateId {
    fn from(n: u64) -> Self {
        StateId(n.to_string())
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        StateId(s.to_string())
    }
}

/// Production number referenced by `reduce` actions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        RuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RuleId {
    fn from(n: u64) -> Self {
        RuleId(n.to_string())
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        RuleId(s.to_string())
    }
}

/// Payload of a merged shift/reduce cell. Exactly one shape is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftReduce {
    Shift { destination: StateId },
    Reduce { rule: RuleId },
}

/// A single action stored in a table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift { destination: StateId },
    Reduce { rule: RuleId },
    ShiftReduce(ShiftReduce),
    /// Nonterminal transition; only meaningful to `lookup_goto`.
    Goto { destination: StateId },
    Accept,
    /// A recognized action kind whose payload is missing or unusable.
    Malformed { action_type: String, detail: String },
    /// An action kind the executor does not know.
    Unknown { action_type: String },
}

impl Action {
    pub fn shift(destination: &str) -> Self {
        Action::Shift {
            destination: StateId::from(destination),
        }
    }

    pub fn reduce(rule: &str) -> Self {
        Action::Reduce {
            rule: RuleId::from(rule),
        }
    }

    pub fn goto(destination: &str) -> Self {
        Action::Goto {
            destination: StateId::from(destination),
        }
    }

    /// The wire name of this action's kind.
    pub fn kind(&self) -> &str {
        match self {
            Action::Shift { .. } => "shift",
            Action::Reduce { .. } => "reduce",
            Action::ShiftReduce(_) => "shift_reduce",
            Action::Goto { .. } => "goto",
            Action::Accept => "accept",
            Action::Malformed { action_type, .. } => action_type,
            Action::Unknown { action_type } => action_type,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift { destination } => write!(f, "s{}", destination),
            Action::Reduce { rule } => write!(f, "r{}", rule),
            Action::ShiftReduce(ShiftReduce::Shift { destination }) => {
                write!(f, "sr:s{}", destination)
            }
            Action::ShiftReduce(ShiftReduce::Reduce { rule }) => write!(f, "sr:r{}", rule),
            Action::Goto { destination } => write!(f, "g{}", destination),
            Action::Accept => write!(f, "acc"),
            Action::Malformed { action_type, .. } => write!(f, "malformed {}", action_type),
            Action::Unknown { action_type } => write!(f, "?{}", action_type),
        }
    }
}

/// Value found at `table[state][symbol]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Action(Action),
    /// Several admissible actions coexist; never applied automatically.
    Conflict(Vec<Action>),
}

/// Sparse two-level table: state -> symbol -> cell.
///
/// Used both for the primary table and for the override table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTable {
    rows: BTreeMap<StateId, BTreeMap<Symbol, Cell>>,
}

impl ParseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the cell at `(state, symbol)`.
    pub fn insert(&mut self, state: StateId, symbol: impl Into<Symbol>, cell: Cell) {
        self.rows.entry(state).or_default().insert(symbol.into(), cell);
    }

    /// Builder-style variant of [`ParseTable::insert`] for a single action.
    pub fn with(mut self, state: &str, symbol: &str, action: Action) -> Self {
        self.insert(StateId::from(state), symbol, Cell::Action(action));
        self
    }

    /// Builder-style variant of [`ParseTable::insert`] for a conflict cell.
    pub fn with_conflict(mut self, state: &str, symbol: &str, candidates: Vec<Action>) -> Self {
        self.insert(StateId::from(state), symbol, Cell::Conflict(candidates));
        self
    }

    pub fn get(&self, state: &StateId, symbol: &str) -> Option<&Cell> {
        self.rows.get(state)?.get(symbol)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateId> {
        self.rows.keys()
    }

    /// Iterate every populated cell in deterministic (state, symbol) order.
    pub fn cells(&self) -> impl Iterator<Item = (&StateId, &str, &Cell)> {
        self.rows.iter().flat_map(|(state, row)| {
            row.iter()
                .map(move |(symbol, cell)| (state, symbol.as_str(), cell))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A numbered grammar production `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: impl Into<Symbol>, rhs: &[&str]) -> Self {
        Production {
            lhs: lhs.into(),
            rhs: rhs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> ϵ", self.lhs)
        } else {
            write!(f, "{} -> {}", self.lhs, self.rhs.join(" "))
        }
    }
}

/// Which table answered an action lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Primary,
    Override,
}

/// Result of [`TableModel::lookup_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionLookup<'a> {
    Found {
        action: &'a Action,
        source: ActionSource,
    },
    /// The primary cell holds several candidates.
    Conflict { candidates: &'a [Action] },
    /// An override cell holds several candidates and cannot be applied.
    UnresolvedOverride { candidates: &'a [Action] },
    NotFound,
}

/// A primary-table cell marked as a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSite {
    pub state: StateId,
    pub symbol: Symbol,
    pub candidates: Vec<Action>,
}

/// The default start state of reference tables.
pub const DEFAULT_START_STATE: &str = "1";

/// Primary table, productions and optional override table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    table: ParseTable,
    productions: BTreeMap<RuleId, Production>,
    overrides: Option<ParseTable>,
    start_state: StateId,
}

impl TableModel {
    pub fn new(table: ParseTable, productions: BTreeMap<RuleId, Production>) -> Self {
        TableModel {
            table,
            productions,
            overrides: None,
            start_state: StateId::from(DEFAULT_START_STATE),
        }
    }

    /// Attach (or replace) the override table.
    pub fn with_overrides(mut self, overrides: ParseTable) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_start_state(mut self, start: impl Into<StateId>) -> Self {
        self.start_state = start.into();
        self
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn overrides(&self) -> Option<&ParseTable> {
        self.overrides.as_ref()
    }

    pub fn productions(&self) -> &BTreeMap<RuleId, Production> {
        &self.productions
    }

    pub fn start_state(&self) -> &StateId {
        &self.start_state
    }

    /// Resolve the action for `(state, token)`.
    ///
    /// With `use_override`, an override entry wins verbatim and skips the
    /// primary table's conflict marker entirely.
    pub fn lookup_action(
        &self,
        state: &StateId,
        token: &str,
        use_override: bool,
    ) -> ActionLookup<'_> {
        if use_override {
            if let Some(cell) = self.overrides.as_ref().and_then(|o| o.get(state, token)) {
                return match cell {
                    Cell::Action(action) => ActionLookup::Found {
                        action,
                        source: ActionSource::Override,
                    },
                    Cell::Conflict(candidates) => ActionLookup::UnresolvedOverride { candidates },
                };
            }
        }

        match self.table.get(state, token) {
            None => ActionLookup::NotFound,
            Some(Cell::Conflict(candidates)) => ActionLookup::Conflict { candidates },
            Some(Cell::Action(action)) => ActionLookup::Found {
                action,
                source: ActionSource::Primary,
            },
        }
    }

    /// Goto transition on `lhs` out of `state`, always from the primary table.
    pub fn lookup_goto(&self, state: &StateId, lhs: &str) -> Result<&StateId, InternalError> {
        match self.table.get(state, lhs) {
            Some(Cell::Action(Action::Goto { destination }))
            | Some(Cell::Action(Action::Shift { destination })) => Ok(destination),
            _ => Err(InternalError::MissingGoto {
                state: state.clone(),
                symbol: lhs.to_string(),
            }),
        }
    }

    pub fn lookup_production(&self, rule: &RuleId) -> Result<&Production, InternalError> {
        self.productions
            .get(rule)
            .ok_or_else(|| InternalError::MissingProduction { rule: rule.clone() })
    }

    /// Every conflict cell of the primary table, in (state, symbol) order.
    pub fn conflicts(&self) -> Vec<ConflictSite> {
        self.table
            .cells()
            .filter_map(|(state, symbol, cell)| match cell {
                Cell::Conflict(candidates) => Some(ConflictSite {
                    state: state.clone(),
                    symbol: symbol.to_string(),
                    candidates: candidates.clone(),
                }),
                Cell::Action(_) => None,
            })
            .collect()
    }
}
