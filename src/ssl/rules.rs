//! SSL grammar
//!
//! Rule names mirror the structure of the language (`procedure::name`,
//! `variable::declaration::localEmpty`, ...) and are what actions, coverage
//! reports, traces and parse trees refer to.

use crate::engine::parser_dsl::*;
use crate::engine::{Grammar, GrammarError};
use crate::rules::Lexical;
use crate::{choice, seq};

/// Rule names bound by the SSL actions
pub mod names {
    /// Identifier after `procedure`
    pub const PROCEDURE_NAME: &str = "procedure::name";
    /// Forward declaration terminator
    pub const PROCEDURE_DECLARATION: &str = "procedure::declaration";
    /// Full `begin ... end` body
    pub const PROCEDURE_BODY: &str = "procedure::body";
    /// `begin` opening a procedure body
    pub const SCOPE_BEGIN: &str = "procedure::scope::begin";
    /// `end` closing a procedure body
    pub const SCOPE_END: &str = "procedure::scope::end";
    /// Identifier of a variable
    pub const VARIABLE_NAME: &str = "variable::name";
    /// Top-level rule
    pub const GLOBAL_SCOPE: &str = "GlobalScope";
}

/// Build the SSL grammar
pub fn grammar() -> Result<Grammar, GrammarError> {
    let mut b = GrammarBuilder::new();
    let lex = Lexical::define(&mut b);
    let blank = lex.blank;
    let blank_opt = lex.blank_opt;

    // general purpose
    let semicolon = b.rule("charSemicolon", ";");
    let string_begin = b.rule("stringBegin", "begin");
    let string_end = b.rule("stringEnd", "end");
    let string_import = b.rule("stringImport", "import");
    let increase_op = b.rule("operators::increase", "++");

    // variables
    let variable_string = b.rule("variable::string", "variable");
    let variable_name = b.rule(names::VARIABLE_NAME, Lexical::identifier());
    let assign = b.rule("variable::assign", choice![":=", "="]);
    let assign_constant = b.rule(
        "variable::assignConstant",
        seq![assign, blank_opt, class(CharClass::Digit)],
    );
    let local_empty = b.rule(
        "variable::declaration::localEmpty",
        seq![variable_string, blank, variable_name, blank_opt, semicolon],
    );
    let local_assign = b.rule(
        "variable::declaration::localAssign",
        seq![
            variable_string,
            blank,
            variable_name,
            blank_opt,
            assign_constant,
            blank_opt,
            semicolon
        ],
    );
    let import = b.rule(
        "variable::declaration::import",
        seq![string_import, blank, local_empty],
    );
    let declaration_global = b.rule(
        "variable::declaration::globalScope",
        choice![local_empty, local_assign, import],
    );
    let declaration_procedure = b.rule(
        "variable::declaration::procedureScope",
        choice![local_empty, local_assign],
    );
    let increase = b.rule(
        "variable::increase",
        seq![variable_name, increase_op, blank_opt, semicolon],
    );
    let variable_global = b.rule("variable::globalScope", declaration_global);
    let variable_procedure = b.rule(
        "variable::procedureScope",
        choice![declaration_procedure, increase],
    );

    // blocks
    let string_if = b.rule("block::stringIf", "if");
    let string_then = b.rule("block::stringThen", "then");
    let block_empty = b.rule(
        "block::empty",
        seq![string_begin, blank_opt, string_end],
    );
    let block_if_empty = b.rule(
        "block::ifEmpty",
        seq![
            string_if,
            seq![blank_opt, string_then].not_at(),
            until(string_then, any()),
            string_then,
            blank,
            block_empty
        ],
    );
    let block = b.rule("block", choice![block_empty, block_if_empty]);

    // procedures
    let procedure_string = b.rule("procedure::string", "procedure");
    let procedure_name = b.rule(names::PROCEDURE_NAME, Lexical::identifier());
    let head = b.rule(
        "procedure::head",
        seq![procedure_string, blank, procedure_name],
    );
    let arguments = b.rule("procedure::arguments", seq!["(", blank_opt, ")"]);
    let declaration = b.rule(names::PROCEDURE_DECLARATION, semicolon);
    let scope_begin = b.rule(names::SCOPE_BEGIN, string_begin);
    let scope_end = b.rule(names::SCOPE_END, string_end);
    let body = b.rule(
        names::PROCEDURE_BODY,
        seq![
            scope_begin,
            until(scope_end, choice![blank, variable_procedure, block]),
            scope_end
        ],
    );
    let check = b.rule(
        "procedure::check",
        seq![
            head,
            blank_opt,
            arguments.opt(),
            blank_opt,
            choice![declaration, body]
        ],
    );

    // starting point
    let global = b.rule(
        names::GLOBAL_SCOPE,
        seq![
            bof(),
            lex.bom,
            until(lex.blanks_eof, choice![blank, check, variable_global]),
            lex.blanks_eof
        ],
    );

    b.build(global)
}
