// ABOUTME: Control flow builtins: conditional branching and the primitive loop

use super::{expect_between, expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::eval::{eval, eval_unit};
use crate::value::{Unit, UnitRef};

/// `if cond then [else]`. The condition must reduce to a number; only the
/// selected branch is evaluated, with quote suppression lifted so `{ ... }`
/// bodies run.
pub fn builtin_if(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_between("if", call, 2, 3)?;
    let cond = eval(&args[0], env)?;
    let truth = cond
        .as_number()
        .ok_or_else(|| EvalError::expected("a numeric condition", cond.pos))?;

    if truth != 0 {
        eval_unit(&args[1], env, true)
    } else if let Some(alternative) = args.get(2) {
        eval_unit(alternative, env, true)
    } else {
        Ok(Unit::empty_list(call.pos))
    }
}

inventory::submit! {
    BuiltinDef {
        name: "if",
        description: "Evaluates one of two bodies depending on a numeric condition.\n\
Example: 'if (== 1 2) { 1 } { 2 }' will yield 2. The else body may be omitted.",
        is_macro: true,
        call: builtin_if,
    }
}

/// `__while cond body`: re-evaluates the condition before every iteration.
/// This is the only iteration primitive; user-land loops build on it.
pub fn builtin_while(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("__while", call, 2)?;
    loop {
        let cond = eval(&args[0], env)?;
        let truth = cond
            .as_number()
            .ok_or_else(|| EvalError::expected("a numeric condition", cond.pos))?;
        if truth == 0 {
            break;
        }
        eval_unit(&args[1], env, true)?;
    }
    Ok(Unit::empty_list(call.pos))
}

inventory::submit! {
    BuiltinDef {
        name: "__while",
        description: "Re-evaluates the body while the condition stays nonzero.",
        is_macro: true,
        call: builtin_while,
    }
}
