//! Deserialization from parse-table JSON documents into the core model.
//!
//! A table document looks like
//!
//! ```json
//! {
//!   "parseTable": { "_table": { "1": { "id": { "type": "shift", "destination": 4 } } } },
//!   "productions": [ { "productionNumber": 3, "lhs": "T", "rhs": ["id"] } ]
//! }
//! ```
//!
//! A cell is a single action object or an array of them (a conflict).
//! Override documents are either a bare `{state: {symbol: cell}}` object or
//! a full table document whose `parseTable._table` is used.

use std::collections::BTreeMap;
use std::fmt;

use lrtable_core::{
    Action, Cell, ParseTable, Production, RuleId, ShiftReduce, StateId, TableModel,
};
use serde_json::Value;

/// Errors during table document deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterchangeError {
    /// The document is missing a required top-level field.
    MissingField { field: String },
    /// A table row is not an object of cells.
    InvalidRow { state: String, message: String },
    /// A cell cannot be read as an action or list of actions.
    InvalidCell {
        state: String,
        symbol: String,
        message: String,
    },
    /// A production entry is structurally invalid.
    InvalidProduction { index: usize, message: String },
    /// Two productions share a production number.
    DuplicateProduction { rule: String },
}

impl fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeError::MissingField { field } => {
                write!(f, "document missing required field: '{}'", field)
            }
            InterchangeError::InvalidRow { state, message } => {
                write!(f, "state '{}': {}", state, message)
            }
            InterchangeError::InvalidCell {
                state,
                symbol,
                message,
            } => {
                write!(f, "state '{}', symbol '{}': {}", state, symbol, message)
            }
            InterchangeError::InvalidProduction { index, message } => {
                write!(f, "production #{}: {}", index, message)
            }
            InterchangeError::DuplicateProduction { rule } => {
                write!(f, "duplicate production number {}", rule)
            }
        }
    }
}

impl std::error::Error for InterchangeError {}

/// Deserialize a full table document (table plus productions).
pub fn from_table_document(doc: &Value) -> Result<TableModel, InterchangeError> {
    let table = parse_table(table_object(doc)?)?;

    let productions_arr = doc
        .get("productions")
        .and_then(|p| p.as_array())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "productions".to_string(),
        })?;
    let productions = parse_productions(productions_arr)?;

    Ok(TableModel::new(table, productions))
}

/// Deserialize an override table.
pub fn overrides_from_value(doc: &Value) -> Result<ParseTable, InterchangeError> {
    if doc.get("parseTable").is_some() {
        return parse_table(table_object(doc)?);
    }
    let obj = doc
        .as_object()
        .ok_or_else(|| InterchangeError::InvalidRow {
            state: String::new(),
            message: "override document must be an object".to_string(),
        })?;
    parse_table(obj)
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn table_object(doc: &Value) -> Result<&serde_json::Map<String, Value>, InterchangeError> {
    doc.get("parseTable")
        .ok_or_else(|| InterchangeError::MissingField {
            field: "parseTable".to_string(),
        })?
        .get("_table")
        .and_then(|t| t.as_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "parseTable._table".to_string(),
        })
}

fn parse_table(rows: &serde_json::Map<String, Value>) -> Result<ParseTable, InterchangeError> {
    let mut table = ParseTable::new();
    for (state, row) in rows {
        let cells = row.as_object().ok_or_else(|| InterchangeError::InvalidRow {
            state: state.clone(),
            message: "row must be an object keyed by symbol".to_string(),
        })?;
        for (symbol, cell) in cells {
            let cell = parse_cell(cell).map_err(|message| InterchangeError::InvalidCell {
                state: state.clone(),
                symbol: symbol.clone(),
                message,
            })?;
            table.insert(StateId::new(state.as_str()), symbol.as_str(), cell);
        }
    }
    Ok(table)
}

fn parse_cell(cell: &Value) -> Result<Cell, String> {
    match cell {
        Value::Array(candidates) => {
            let actions = candidates
                .iter()
                .map(parse_action)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Cell::Conflict(actions))
        }
        _ => parse_action(cell).map(Cell::Action),
    }
}

/// Read a single action object.
///
/// A missing or unusable payload does not fail the load: it becomes
/// [`Action::Malformed`] and is only reported if a run reaches it.
pub fn parse_action(obj: &Value) -> Result<Action, String> {
    if !obj.is_object() {
        return Err("action must be an object".to_string());
    }
    let kind = obj
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| "action missing string 'type' field".to_string())?;

    let destination = obj.get("destination").map(id_value);
    let rule = obj.get("ruleNumber").map(id_value);

    let action = match kind {
        "accept" => Action::Accept,
        "shift" => match destination {
            Some(Some(d)) => Action::Shift {
                destination: StateId::new(d),
            },
            _ => malformed(kind, "missing or invalid 'destination'"),
        },
        "goto" => match destination {
            Some(Some(d)) => Action::Goto {
                destination: StateId::new(d),
            },
            _ => malformed(kind, "missing or invalid 'destination'"),
        },
        "reduce" => match rule {
            Some(Some(r)) => Action::Reduce {
                rule: RuleId::new(r),
            },
            _ => malformed(kind, "missing or invalid 'ruleNumber'"),
        },
        // `destination` takes precedence when both payloads are present.
        "shift_reduce" => match (destination, rule) {
            (Some(Some(d)), _) => Action::ShiftReduce(ShiftReduce::Shift {
                destination: StateId::new(d),
            }),
            (Some(None), _) => malformed(kind, "invalid 'destination'"),
            (None, Some(Some(r))) => Action::ShiftReduce(ShiftReduce::Reduce {
                rule: RuleId::new(r),
            }),
            (None, Some(None)) => malformed(kind, "invalid 'ruleNumber'"),
            (None, None) => malformed(kind, "neither 'destination' nor 'ruleNumber' present"),
        },
        other => Action::Unknown {
            action_type: other.to_string(),
        },
    };
    Ok(action)
}

fn malformed(kind: &str, detail: &str) -> Action {
    Action::Malformed {
        action_type: kind.to_string(),
        detail: detail.to_string(),
    }
}

/// State and rule ids are written as JSON integers or strings.
fn id_value(v: &Value) -> Option<String> {
    if let Some(n) = v.as_u64() {
        return Some(n.to_string());
    }
    if let Some(n) = v.as_i64() {
        return Some(n.to_string());
    }
    v.as_str().map(|s| s.to_string())
}

fn parse_productions(arr: &[Value]) -> Result<BTreeMap<RuleId, Production>, InterchangeError> {
    let mut productions = BTreeMap::new();

    for (index, p) in arr.iter().enumerate() {
        let invalid = |message: &str| InterchangeError::InvalidProduction {
            index,
            message: message.to_string(),
        };

        let number = p
            .get("productionNumber")
            .and_then(id_value)
            .ok_or_else(|| invalid("missing 'productionNumber'"))?;
        let lhs = p
            .get("lhs")
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid("missing 'lhs'"))?
            .to_string();
        let rhs = p
            .get("rhs")
            .and_then(|v| v.as_array())
            .ok_or_else(|| invalid("missing 'rhs' array"))?
            .iter()
            .map(|s| s.as_str().map(|s| s.to_string()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid("'rhs' entries must be strings"))?;

        let rule = RuleId::new(number);
        if productions.contains_key(&rule) {
            return Err(InterchangeError::DuplicateProduction {
                rule: rule.to_string(),
            });
        }
        productions.insert(rule, Production { lhs, rhs });
    }

    Ok(productions)
}
