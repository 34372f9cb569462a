// ABOUTME: The quote family: q/quote and forced evaluation

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::eval::eval_unit;
use crate::value::UnitRef;
use std::rc::Rc;

/// Returns the single argument exactly as written. Registered as a macro so
/// the argument arrives unevaluated (subject only to `,` splicing).
pub fn builtin_quote(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("q", call, 1)?;
    Ok(Rc::clone(&args[0]))
}

inventory::submit! {
    BuiltinDef {
        name: "q",
        description: "Returns its argument unevaluated.",
        is_macro: true,
        call: builtin_quote,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "quote",
        description: "Returns its argument unevaluated.",
        is_macro: true,
        call: builtin_quote,
    }
}

/// Forces one level of evaluation, turning a `{ ... }` literal into a call.
pub fn builtin_eval(call: &UnitRef, env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("eval", call, 1)?;
    eval_unit(&args[0], env, true)
}

inventory::submit! {
    BuiltinDef {
        name: "eval",
        description: "Evaluates a Q expression.",
        is_macro: false,
        call: builtin_eval,
    }
}
