//! Table-driven shift/reduce automaton.
//!
//! An [`Executor`] owns one run's stack and token cursor and borrows the
//! shared, immutable [`TableModel`]. Each [`Executor::step`] resolves the
//! action for `(top state, lookahead)`, preferring the override table, and
//! applies it. The run ends at the first terminal [`Verdict`].

use std::fmt;

use log::{debug, trace};
use serde_json::json;

use crate::error::InternalError;
use crate::stack::{ParserStack, StackItem};
use crate::table::{
    Action, ActionLookup, ActionSource, RuleId, ShiftReduce, StateId, Symbol, TableModel,
};
use crate::verdict::{Rejection, Verdict};

const TARGET: &str = "lrtable::executor";

/// A fully applied, non-terminal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Shift {
        state: StateId,
        token: Symbol,
        destination: StateId,
        source: ActionSource,
    },
    Reduce {
        state: StateId,
        rule: RuleId,
        lhs: Symbol,
        popped: usize,
        goto: StateId,
        source: ActionSource,
    },
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (text, source) = match self {
            Transition::Shift {
                token,
                destination,
                source,
                ..
            } => (format!("shift '{}', go to state {}", token, destination), source),
            Transition::Reduce {
                rule,
                lhs,
                goto,
                source,
                ..
            } => (
                format!("reduce by rule {} ({}), go to state {}", rule, lhs, goto),
                source,
            ),
        };
        match source {
            ActionSource::Primary => write!(f, "{}", text),
            ActionSource::Override => write!(f, "{} [override]", text),
        }
    }
}

/// Outcome of a single [`Executor::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Transition),
    Halt(Verdict),
}

/// One row of a parsing history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub index: usize,
    pub state: StateId,
    pub lookahead: Option<Symbol>,
    pub position: usize,
    /// Stack contents before the step was applied.
    pub stack: Vec<StackItem>,
    pub action: String,
}

/// Step-by-step record of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.steps
            .iter()
            .map(|s| {
                json!({
                    "step": s.index,
                    "state": s.state.as_str(),
                    "lookahead": s.lookahead,
                    "position": s.position,
                    "stack": s.stack.iter().map(|i| i.to_string()).collect::<Vec<_>>(),
                    "action": s.action,
                })
            })
            .collect()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.steps {
            let stack: Vec<String> = s.stack.iter().map(|i| i.to_string()).collect();
            writeln!(
                f,
                "{:>4}  [{}]  {}  {}",
                s.index,
                stack.join(" "),
                s.lookahead.as_deref().unwrap_or("<none>"),
                s.action
            )?;
        }
        Ok(())
    }
}

/// A single run of the automaton over one token sequence.
pub struct Executor<'m> {
    model: &'m TableModel,
    tokens: &'m [Symbol],
    use_overrides: bool,
    stack: ParserStack,
    cursor: usize,
    verdict: Option<Verdict>,
}

impl<'m> Executor<'m> {
    /// Start a run at the model's start state with overrides enabled.
    ///
    /// `tokens` must already end with the end-of-input marker.
    pub fn new(model: &'m TableModel, tokens: &'m [Symbol]) -> Self {
        Executor {
            model,
            tokens,
            use_overrides: true,
            stack: ParserStack::new(model.start_state().clone()),
            cursor: 0,
            verdict: None,
        }
    }

    pub fn use_overrides(mut self, enabled: bool) -> Self {
        self.use_overrides = enabled;
        self
    }

    pub fn stack(&self) -> &ParserStack {
        &self.stack
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> &StateId {
        self.stack.top_state()
    }

    pub fn lookahead(&self) -> Option<&str> {
        self.tokens.get(self.cursor).map(String::as_str)
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Token stream with a `•` marker in front of the lookahead, or after
    /// it when the next action is `accept`.
    pub fn progress(&self) -> String {
        let mut parts: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        let mut at = self.cursor;
        if let Some(token) = self.lookahead() {
            let lookup = self
                .model
                .lookup_action(self.state(), token, self.use_overrides);
            if let ActionLookup::Found {
                action: Action::Accept,
                ..
            } = lookup
            {
                at += 1;
            }
        }
        parts.insert(at.min(parts.len()), "•");
        parts.join(" ")
    }

    /// Advance by one step. Once a verdict is reached it is returned again
    /// on every further call.
    pub fn step(&mut self) -> Step {
        if let Some(v) = &self.verdict {
            return Step::Halt(v.clone());
        }

        match self.apply() {
            Ok(transition) => Step::Continue(transition),
            Err(verdict) => {
                debug!(target: TARGET, "halt: {:?}", verdict);
                self.verdict = Some(verdict.clone());
                Step::Halt(verdict)
            }
        }
    }

    /// Step until a verdict is reached.
    pub fn run(mut self) -> Verdict {
        loop {
            if let Step::Halt(verdict) = self.step() {
                return verdict;
            }
        }
    }

    /// Like [`Executor::run`], also recording every step.
    pub fn run_traced(mut self) -> (Verdict, Trace) {
        let mut trace = Trace::default();
        loop {
            let state = self.state().clone();
            let lookahead = self.lookahead().map(str::to_string);
            let position = self.cursor;
            let stack = self.stack.items();

            let step = self.step();
            let action = match &step {
                Step::Continue(t) => t.to_string(),
                Step::Halt(Verdict::Accepted) => "accept".to_string(),
                Step::Halt(Verdict::Rejected(r)) => format!("reject: {}", r.kind()),
                Step::Halt(Verdict::Fatal(e)) => format!("fatal: {}", e.kind()),
            };
            trace.steps.push(TraceStep {
                index: trace.steps.len(),
                state,
                lookahead,
                position,
                stack,
                action,
            });

            if let Step::Halt(verdict) = step {
                return (verdict, trace);
            }
        }
    }

    /// Resolve and apply one action; `Err` carries the terminal verdict.
    fn apply(&mut self) -> Result<Transition, Verdict> {
        let model = self.model;
        let tokens = self.tokens;
        let state = self.stack.top_state().clone();
        let Some(token) = tokens.get(self.cursor) else {
            return Err(Verdict::Fatal(InternalError::InputExhausted {
                position: self.cursor,
            }));
        };

        trace!(target: TARGET, "state {} lookahead '{}' at {}", state, token, self.cursor);

        let (action, source) = match model.lookup_action(&state, token, self.use_overrides) {
            ActionLookup::Found { action, source } => (action, source),
            ActionLookup::NotFound => {
                return Err(Verdict::Rejected(Rejection::SyntaxError {
                    state,
                    token: token.clone(),
                    position: self.cursor,
                }));
            }
            ActionLookup::Conflict { .. } => {
                return Err(Verdict::Rejected(Rejection::Conflict {
                    state,
                    token: token.clone(),
                }));
            }
            ActionLookup::UnresolvedOverride { candidates } => {
                return Err(Verdict::Rejected(Rejection::MalformedEntry {
                    state,
                    token: token.clone(),
                    action_type: "override".to_string(),
                    detail: format!("override cell holds {} candidate actions", candidates.len()),
                }));
            }
        };

        match action {
            Action::Accept => Err(Verdict::Accepted),
            Action::Shift { destination }
            | Action::ShiftReduce(ShiftReduce::Shift { destination }) => {
                Ok(self.shift(state, token, destination, source))
            }
            Action::Reduce { rule } | Action::ShiftReduce(ShiftReduce::Reduce { rule }) => {
                self.reduce(state, rule, source).map_err(Verdict::Fatal)
            }
            Action::Malformed {
                action_type,
                detail,
            } => Err(Verdict::Rejected(Rejection::MalformedEntry {
                state,
                token: token.clone(),
                action_type: action_type.clone(),
                detail: detail.clone(),
            })),
            Action::Goto { .. } | Action::Unknown { .. } => {
                Err(Verdict::Rejected(Rejection::UnknownAction {
                    state,
                    token: token.clone(),
                    action_type: action.kind().to_string(),
                }))
            }
        }
    }

    fn shift(
        &mut self,
        state: StateId,
        token: &str,
        destination: &StateId,
        source: ActionSource,
    ) -> Transition {
        debug!(target: TARGET, "shift '{}', go to state {}", token, destination);
        self.stack.push_pair(token.to_string(), destination.clone());
        self.cursor += 1;
        Transition::Shift {
            state,
            token: token.to_string(),
            destination: destination.clone(),
            source,
        }
    }

    fn reduce(
        &mut self,
        state: StateId,
        rule: &RuleId,
        source: ActionSource,
    ) -> Result<Transition, InternalError> {
        let model = self.model;
        let production = model.lookup_production(rule)?;
        let arity = production.rhs.len();

        if !self.stack.pop_pairs(arity) {
            return Err(InternalError::StackUnderflow {
                rule: rule.clone(),
                needed: 2 * arity + 1,
                available: self.stack.len(),
            });
        }

        let exposed = self.stack.top_state().clone();
        let goto = model.lookup_goto(&exposed, &production.lhs)?.clone();
        debug!(
            target: TARGET,
            "reduce [{}], go to state {}", production, goto
        );
        self.stack.push_pair(production.lhs.clone(), goto.clone());

        Ok(Transition::Reduce {
            state,
            rule: rule.clone(),
            lhs: production.lhs.clone(),
            popped: 2 * arity,
            goto,
            source,
        })
    }
}

/// Run `tokens` against `model` to a verdict, honouring overrides.
pub fn run(model: &TableModel, tokens: &[Symbol]) -> Verdict {
    Executor::new(model, tokens).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ParseTable, Production};
    use std::collections::BTreeMap;

    fn toks(input: &str) -> Vec<Symbol> {
        input.split_whitespace().map(str::to_string).collect()
    }

    fn productions(list: &[(&str, &str, &[&str])]) -> BTreeMap<RuleId, Production> {
        list.iter()
            .map(|(id, lhs, rhs)| (RuleId::from(*id), Production::new(*lhs, rhs)))
            .collect()
    }

    /// E -> a, with the goto stored as a shift cell.
    fn single_reduce_model() -> TableModel {
        let table = ParseTable::new()
            .with("1", "a", Action::shift("2"))
            .with("2", "$", Action::reduce("0"))
            .with("1", "E", Action::shift("3"))
            .with("3", "$", Action::Accept);
        TableModel::new(table, productions(&[("0", "E", &["a"])]))
    }

    #[test]
    fn accept_on_end_marker_only() {
        let model = TableModel::new(
            ParseTable::new().with("1", "$", Action::Accept),
            BTreeMap::new(),
        );
        assert_eq!(run(&model, &toks("$")), Verdict::Accepted);
    }

    #[test]
    fn shift_then_accept() {
        let model = TableModel::new(
            ParseTable::new()
                .with("1", "a", Action::shift("2"))
                .with("2", "$", Action::Accept),
            BTreeMap::new(),
        );
        assert_eq!(run(&model, &toks("a $")), Verdict::Accepted);
    }

    #[test]
    fn missing_entry_is_syntax_error_with_position() {
        let model = TableModel::new(
            ParseTable::new().with("1", "a", Action::shift("2")),
            BTreeMap::new(),
        );
        assert_eq!(
            run(&model, &toks("b $")),
            Verdict::Rejected(Rejection::SyntaxError {
                state: StateId::from("1"),
                token: "b".to_string(),
                position: 0,
            })
        );
    }

    #[test]
    fn reduce_pops_rhs_and_follows_goto() {
        let model = single_reduce_model();
        let tokens = toks("a $");
        let mut exec = Executor::new(&model, &tokens);

        assert!(matches!(exec.step(), Step::Continue(Transition::Shift { .. })));
        assert_eq!(exec.stack().to_string(), "1 a 2");
        assert_eq!(exec.cursor(), 1);

        match exec.step() {
            Step::Continue(Transition::Reduce {
                popped, goto, lhs, ..
            }) => {
                assert_eq!(popped, 2);
                assert_eq!(goto, StateId::from("3"));
                assert_eq!(lhs, "E");
            }
            other => panic!("expected reduce, got {:?}", other),
        }
        assert_eq!(exec.stack().to_string(), "1 E 3");
        assert_eq!(exec.cursor(), 1);

        assert_eq!(exec.step(), Step::Halt(Verdict::Accepted));
        // Further steps repeat the verdict.
        assert_eq!(exec.step(), Step::Halt(Verdict::Accepted));
    }

    #[test]
    fn epsilon_reduction_pops_nothing() {
        let table = ParseTable::new()
            .with("1", "$", Action::reduce("1"))
            .with("1", "A", Action::goto("2"))
            .with("2", "$", Action::Accept);
        let model = TableModel::new(table, productions(&[("1", "A", &[])]));
        let tokens = toks("$");
        let mut exec = Executor::new(&model, &tokens);
        assert!(matches!(
            exec.step(),
            Step::Continue(Transition::Reduce { popped: 0, .. })
        ));
        assert_eq!(exec.stack().len(), 3);
        assert_eq!(exec.run(), Verdict::Accepted);
    }

    #[test]
    fn conflict_is_never_applied() {
        let model = TableModel::new(
            ParseTable::new().with_conflict(
                "1",
                "a",
                vec![Action::shift("2"), Action::reduce("0")],
            ),
            productions(&[("0", "E", &[])]),
        );
        assert_eq!(
            run(&model, &toks("a $")),
            Verdict::Rejected(Rejection::Conflict {
                state: StateId::from("1"),
                token: "a".to_string(),
            })
        );
    }

    #[test]
    fn override_resolves_conflict() {
        let model = TableModel::new(
            ParseTable::new()
                .with_conflict("1", "a", vec![Action::shift("2"), Action::reduce("0")])
                .with("5", "$", Action::Accept),
            productions(&[("0", "E", &[])]),
        )
        .with_overrides(ParseTable::new().with("1", "a", Action::shift("5")));
        let tokens = toks("a $");

        let mut exec = Executor::new(&model, &tokens);
        match exec.step() {
            Step::Continue(Transition::Shift {
                destination,
                source,
                ..
            }) => {
                assert_eq!(destination, StateId::from("5"));
                assert_eq!(source, ActionSource::Override);
            }
            other => panic!("expected override shift, got {:?}", other),
        }
        assert_eq!(exec.run(), Verdict::Accepted);

        let disabled = Executor::new(&model, &tokens).use_overrides(false).run();
        assert!(matches!(
            disabled,
            Verdict::Rejected(Rejection::Conflict { .. })
        ));
    }

    #[test]
    fn shift_reduce_payloads() {
        let table = ParseTable::new()
            .with(
                "1",
                "a",
                Action::ShiftReduce(ShiftReduce::Shift {
                    destination: StateId::from("2"),
                }),
            )
            .with(
                "2",
                "$",
                Action::ShiftReduce(ShiftReduce::Reduce {
                    rule: RuleId::from("0"),
                }),
            )
            .with("1", "E", Action::goto("3"))
            .with("3", "$", Action::Accept);
        let model = TableModel::new(table, productions(&[("0", "E", &["a"])]));
        assert_eq!(run(&model, &toks("a $")), Verdict::Accepted);
    }

    #[test]
    fn malformed_entry_is_reported() {
        let model = TableModel::new(
            ParseTable::new().with(
                "1",
                "a",
                Action::Malformed {
                    action_type: "shift_reduce".to_string(),
                    detail: "neither destination nor ruleNumber".to_string(),
                },
            ),
            BTreeMap::new(),
        );
        match run(&model, &toks("a $")) {
            Verdict::Rejected(Rejection::MalformedEntry { action_type, .. }) => {
                assert_eq!(action_type, "shift_reduce")
            }
            other => panic!("expected MalformedEntry, got {:?}", other),
        }
    }

    #[test]
    fn goto_and_unknown_kinds_in_action_position() {
        for action in [
            Action::goto("2"),
            Action::Unknown {
                action_type: "jump".to_string(),
            },
        ] {
            let expected = action.kind().to_string();
            let model =
                TableModel::new(ParseTable::new().with("1", "a", action), BTreeMap::new());
            match run(&model, &toks("a $")) {
                Verdict::Rejected(Rejection::UnknownAction { action_type, .. }) => {
                    assert_eq!(action_type, expected)
                }
                other => panic!("expected UnknownAction, got {:?}", other),
            }
        }
    }

    #[test]
    fn missing_production_is_fatal() {
        let model = TableModel::new(
            ParseTable::new().with("1", "$", Action::reduce("9")),
            BTreeMap::new(),
        );
        assert_eq!(
            run(&model, &toks("$")),
            Verdict::Fatal(InternalError::MissingProduction {
                rule: RuleId::from("9")
            })
        );
    }

    #[test]
    fn missing_goto_is_fatal() {
        let table = ParseTable::new()
            .with("1", "a", Action::shift("2"))
            .with("2", "$", Action::reduce("0"));
        let model = TableModel::new(table, productions(&[("0", "E", &["a"])]));
        match run(&model, &toks("a $")) {
            Verdict::Fatal(e) => assert_eq!(e.kind(), "missing_goto"),
            other => panic!("expected fatal, got {:?}", other),
        }
    }

    #[test]
    fn arity_mismatch_is_stack_underflow() {
        let model = TableModel::new(
            ParseTable::new().with("1", "$", Action::reduce("0")),
            productions(&[("0", "E", &["a", "b"])]),
        );
        assert_eq!(
            run(&model, &toks("$")),
            Verdict::Fatal(InternalError::StackUnderflow {
                rule: RuleId::from("0"),
                needed: 5,
                available: 1,
            })
        );
    }

    #[test]
    fn running_off_the_end_is_fatal() {
        let model = TableModel::new(
            ParseTable::new().with("1", "a", Action::shift("1")),
            BTreeMap::new(),
        );
        assert_eq!(
            run(&model, &toks("a a")),
            Verdict::Fatal(InternalError::InputExhausted { position: 2 })
        );
    }

    #[test]
    fn custom_start_state() {
        let model = TableModel::new(
            ParseTable::new().with("0", "$", Action::Accept),
            BTreeMap::new(),
        )
        .with_start_state("0");
        assert_eq!(run(&model, &toks("$")), Verdict::Accepted);
    }

    #[test]
    fn trace_records_every_step() {
        let model = single_reduce_model();
        let tokens = toks("a $");
        let (verdict, trace) = Executor::new(&model, &tokens).run_traced();
        assert_eq!(verdict, Verdict::Accepted);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.steps[0].action, "shift 'a', go to state 2");
        assert_eq!(trace.steps[1].position, 1);
        assert_eq!(trace.steps[1].stack.len(), 3);
        assert_eq!(trace.steps[2].action, "accept");
        assert_eq!(trace.to_json()[1]["state"], "2");
    }

    #[test]
    fn progress_marks_the_cursor() {
        let model = single_reduce_model();
        let tokens = toks("a $");
        let mut exec = Executor::new(&model, &tokens);
        assert_eq!(exec.progress(), "• a $");
        exec.step();
        assert_eq!(exec.progress(), "a • $");
        exec.step();
        // state 3 accepts on `$`
        assert_eq!(exec.progress(), "a $ •");
        assert_eq!(exec.step(), Step::Halt(Verdict::Accepted));
        assert_eq!(exec.progress(), "a $ •");
    }

    #[test]
    fn multi_candidate_override_is_malformed() {
        let model = TableModel::new(
            ParseTable::new()
                .with("1", "a", Action::shift("2"))
                .with("2", "$", Action::Accept),
            BTreeMap::new(),
        )
        .with_overrides(ParseTable::new().with_conflict(
            "1",
            "a",
            vec![Action::shift("2"), Action::reduce("0")],
        ));

        match run(&model, &toks("a $")) {
            Verdict::Rejected(Rejection::MalformedEntry {
                state,
                token,
                action_type,
                detail,
            }) => {
                assert_eq!(state, StateId::from("1"));
                assert_eq!(token, "a");
                assert_eq!(action_type, "override");
                assert_eq!(detail, "override cell holds 2 candidate actions");
            }
            other => panic!("expected MalformedEntry, got {:?}", other),
        }

        let tokens = toks("a $");
        let primary = Executor::new(&model, &tokens).use_overrides(false).run();
        assert_eq!(primary, Verdict::Accepted);
    }
}
