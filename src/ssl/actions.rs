//! SSL actions
//!
//! The procedure name is remembered in [`SslData`] when it is matched, so the
//! later declaration, body and scope callbacks can report which procedure
//! they belong to.

use super::rules::names;
use crate::engine::{ActionInput, ActionTable, Grammar, GrammarError, ParseState};
use serde::Serialize;

/// Something the actions observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SslEvent {
    /// A procedure name was matched
    ProcedureName {
        /// The name
        name: String,
    },
    /// A forward declaration `procedure p;` completed
    Declared {
        /// Procedure name
        procedure: String,
    },
    /// A procedure body completed
    Defined {
        /// Procedure name
        procedure: String,
    },
    /// `begin` of a procedure body
    ScopeBegin {
        /// Procedure name
        procedure: String,
    },
    /// `end` of a procedure body
    ScopeEnd {
        /// Procedure name
        procedure: String,
    },
}

/// Scratch data of one SSL run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SslData {
    /// Name of the procedure being parsed
    pub current_procedure: Option<String>,
    /// Open procedure scopes
    pub scope_depth: usize,
    /// Everything observed, in order
    pub events: Vec<SslEvent>,
}

impl SslData {
    fn procedure(&self) -> String {
        self.current_procedure.clone().unwrap_or_default()
    }

    /// Procedure names in the order they were matched
    pub fn procedure_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SslEvent::ProcedureName { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of events matching `pred`
    pub fn count(&self, pred: impl Fn(&SslEvent) -> bool) -> usize {
        self.events.iter().filter(|event| pred(event)).count()
    }
}

fn procedure_name(input: &ActionInput<'_>, state: &mut ParseState<SslData>) {
    let name = input.string().into_owned();
    log::debug!("{}: procedure {}", input.start, name);
    state.data.current_procedure = Some(name.clone());
    state.data.events.push(SslEvent::ProcedureName { name });
}

fn declared(input: &ActionInput<'_>, state: &mut ParseState<SslData>) {
    let procedure = state.data.procedure();
    log::debug!("{}: procedure {} declared", input.end, procedure);
    state.data.events.push(SslEvent::Declared { procedure });
}

fn defined(input: &ActionInput<'_>, state: &mut ParseState<SslData>) {
    let procedure = state.data.procedure();
    log::debug!("{}: procedure {} defined", input.end, procedure);
    state.data.events.push(SslEvent::Defined { procedure });
}

fn scope_begin(input: &ActionInput<'_>, state: &mut ParseState<SslData>) {
    let procedure = state.data.procedure();
    state.data.scope_depth += 1;
    log::debug!(
        "{}: enter scope of {} (depth {})",
        input.start,
        procedure,
        state.data.scope_depth
    );
    state.data.events.push(SslEvent::ScopeBegin { procedure });
}

fn scope_end(input: &ActionInput<'_>, state: &mut ParseState<SslData>) {
    let procedure = state.data.procedure();
    state.data.scope_depth = state.data.scope_depth.saturating_sub(1);
    log::debug!("{}: leave scope of {}", input.start, procedure);
    state.data.events.push(SslEvent::ScopeEnd { procedure });
}

/// Bind the SSL actions to `grammar`
pub fn actions(grammar: &Grammar) -> Result<ActionTable<SslData>, GrammarError> {
    let mut table = ActionTable::new();
    table
        .on(grammar, names::PROCEDURE_NAME, procedure_name)?
        .on(grammar, names::PROCEDURE_DECLARATION, declared)?
        .on(grammar, names::PROCEDURE_BODY, defined)?
        .on(grammar, names::SCOPE_BEGIN, scope_begin)?
        .on(grammar, names::SCOPE_END, scope_end)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Matcher, NoopObserver};
    use crate::ssl::rules::grammar;

    fn run(input: &str) -> ParseState<SslData> {
        let grammar = grammar().unwrap();
        let actions = actions(&grammar).unwrap();
        let mut state = ParseState::new("test");
        let mut observer = NoopObserver;
        let outcome = Matcher::new(&grammar, input.as_bytes(), &actions, &mut state, &mut observer)
            .run()
            .unwrap();
        assert!(outcome.consumed_all, "{input:?} should parse");
        state
    }

    #[test]
    fn test_declaration_is_tagged_with_name() {
        let state = run("procedure p;");
        assert_eq!(
            state.data.events,
            vec![
                SslEvent::ProcedureName {
                    name: "p".to_string()
                },
                SslEvent::Declared {
                    procedure: "p".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_body_events_in_order() {
        let state = run("procedure q begin variable b; end");
        let procedure = "q".to_string();
        assert_eq!(
            state.data.events,
            vec![
                SslEvent::ProcedureName {
                    name: procedure.clone()
                },
                SslEvent::ScopeBegin {
                    procedure: procedure.clone()
                },
                SslEvent::ScopeEnd {
                    procedure: procedure.clone()
                },
                SslEvent::Defined { procedure },
            ]
        );
        assert_eq!(state.data.scope_depth, 0);
    }

    #[test]
    fn test_inner_blocks_are_not_scopes() {
        let state = run("procedure p begin begin end if a then begin end end");
        assert_eq!(
            state.data.count(|e| matches!(e, SslEvent::ScopeBegin { .. })),
            1
        );
        assert_eq!(
            state.data.count(|e| matches!(e, SslEvent::ScopeEnd { .. })),
            1
        );
    }

    #[test]
    fn test_procedure_names() {
        let state = run("procedure a; procedure b begin end");
        assert_eq!(state.data.procedure_names(), vec!["a", "b"]);
        assert_eq!(state.data.current_procedure.as_deref(), Some("b"));
    }
}
