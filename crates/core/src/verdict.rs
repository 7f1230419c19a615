//! Terminal outcomes of an automaton run.

use std::fmt;

use serde_json::json;

use crate::error::InternalError;
use crate::table::{StateId, Symbol};

/// Why a run rejected its input.
///
/// `SyntaxError` and `Conflict` are ordinary outcomes for a bad or ambiguous
/// sentence. `MalformedEntry` and `UnknownAction` point at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    SyntaxError {
        state: StateId,
        token: Symbol,
        position: usize,
    },
    Conflict {
        state: StateId,
        token: Symbol,
    },
    MalformedEntry {
        state: StateId,
        token: Symbol,
        action_type: String,
        detail: String,
    },
    UnknownAction {
        state: StateId,
        token: Symbol,
        action_type: String,
    },
}

impl Rejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::SyntaxError { .. } => "syntax_error",
            Rejection::Conflict { .. } => "conflict",
            Rejection::MalformedEntry { .. } => "malformed_entry",
            Rejection::UnknownAction { .. } => "unknown_action",
        }
    }

    /// True for rejections caused by the input rather than by the table.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Rejection::SyntaxError { .. } | Rejection::Conflict { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
    Fatal(InternalError),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// JSON rendering used by the `--output json` mode of the CLI.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Verdict::Accepted => json!({ "verdict": "accepted" }),
            Verdict::Rejected(r) => {
                let mut obj = json!({
                    "verdict": "rejected",
                    "reason": r.kind(),
                });
                match r {
                    Rejection::SyntaxError {
                        state,
                        token,
                        position,
                    } => {
                        obj["state"] = json!(state.as_str());
                        obj["token"] = json!(token);
                        obj["position"] = json!(position);
                    }
                    Rejection::Conflict { state, token } => {
                        obj["state"] = json!(state.as_str());
                        obj["token"] = json!(token);
                    }
                    Rejection::MalformedEntry {
                        state,
                        token,
                        action_type,
                        detail,
                    } => {
                        obj["state"] = json!(state.as_str());
                        obj["token"] = json!(token);
                        obj["action_type"] = json!(action_type);
                        obj["detail"] = json!(detail);
                    }
                    Rejection::UnknownAction {
                        state,
                        token,
                        action_type,
                    } => {
                        obj["state"] = json!(state.as_str());
                        obj["token"] = json!(token);
                        obj["action_type"] = json!(action_type);
                    }
                }
                obj
            }
            Verdict::Fatal(e) => json!({
                "verdict": "fatal",
                "kind": e.kind(),
                "detail": e.to_string(),
            }),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "Input Accepted"),
            Verdict::Rejected(Rejection::SyntaxError {
                state,
                token,
                position,
            }) => write!(
                f,
                "Syntax Error\nState: {}\nUnexpected token: {}\nPosition: {}",
                state, token, position
            ),
            Verdict::Rejected(Rejection::Conflict { state, token }) => {
                write!(f, "Error: conflict in state {} with token {}", state, token)
            }
            Verdict::Rejected(Rejection::MalformedEntry {
                state,
                token,
                action_type,
                detail,
            }) => write!(
                f,
                "Error: {} entry malformed (state {}, token {}): {}",
                action_type, state, token, detail
            ),
            Verdict::Rejected(Rejection::UnknownAction {
                state,
                token,
                action_type,
            }) => write!(
                f,
                "Unknown action type: {} (state {}, token {})",
                action_type, state, token
            ),
            Verdict::Fatal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_text_matches_reference_tool() {
        let v = Verdict::Rejected(Rejection::SyntaxError {
            state: StateId::from("4"),
            token: "id".to_string(),
            position: 1,
        });
        assert_eq!(
            v.to_string(),
            "Syntax Error\nState: 4\nUnexpected token: id\nPosition: 1"
        );
    }

    #[test]
    fn unknown_action_text_names_state_and_token() {
        let v = Verdict::Rejected(Rejection::UnknownAction {
            state: StateId::from("3"),
            token: "+".to_string(),
            action_type: "jump".to_string(),
        });
        assert_eq!(v.to_string(), "Unknown action type: jump (state 3, token +)");
    }

    #[test]
    fn json_carries_diagnostics() {
        let v = Verdict::Rejected(Rejection::Conflict {
            state: StateId::from("5"),
            token: "+".to_string(),
        });
        let j = v.to_json();
        assert_eq!(j["verdict"], "rejected");
        assert_eq!(j["reason"], "conflict");
        assert_eq!(j["state"], "5");
        assert_eq!(j["token"], "+");
    }

    #[test]
    fn fatal_json_names_kind() {
        let v = Verdict::Fatal(InternalError::InputExhausted { position: 3 });
        let j = v.to_json();
        assert_eq!(j["verdict"], "fatal");
        assert_eq!(j["kind"], "input_exhausted");
        assert!(!v.is_accepted());
    }

    #[test]
    fn input_errors_are_distinguished_from_table_errors() {
        let conflict = Rejection::Conflict {
            state: StateId::from("1"),
            token: "a".to_string(),
        };
        let unknown = Rejection::UnknownAction {
            state: StateId::from("1"),
            token: "a".to_string(),
            action_type: "goto".to_string(),
        };
        assert!(conflict.is_input_error());
        assert!(!unknown.is_input_error());
    }
}
