// ABOUTME: User-raised errors terminating interpretation of the current line

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Expr, UnitRef};

/// Raises an error whose message is the string form of the argument,
/// positioned at that argument.
pub fn builtin_err(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("err", call, 1)?;
    let message = match &args[0].expr {
        Expr::Str(s) if s.raw => s.text.clone(),
        other => format!("{}", other),
    };
    Err(EvalError::new(message, args[0].pos))
}

inventory::submit! {
    BuiltinDef {
        name: "err",
        description: "Terminates interpretation of the current line.\n\
Example: 'err \"Argument must be greater than 0.\"'.",
        is_macro: false,
        call: builtin_err,
    }
}
