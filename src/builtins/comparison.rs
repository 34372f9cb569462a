// ABOUTME: Structural equality and ordering builtins

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{structural_eq, Expr, Unit, UnitRef};
use paste::paste;

pub fn builtin_equal(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("==", call, 2)?;
    Ok(Unit::boolean(call.pos, structural_eq(&args[0], &args[1])))
}

pub fn builtin_not_equal(call: &UnitRef, _env: &EnvNodeRef) -> Result<UnitRef, EvalError> {
    let args = expect_exact("!=", call, 2)?;
    Ok(Unit::boolean(call.pos, !structural_eq(&args[0], &args[1])))
}

inventory::submit! {
    BuiltinDef {
        name: "==",
        description: "Compares two values structurally for equality.",
        is_macro: false,
        call: builtin_equal,
    }
}

inventory::submit! {
    BuiltinDef {
        name: "!=",
        description: "Compares two values structurally for inequality.",
        is_macro: false,
        call: builtin_not_equal,
    }
}

/// Strict-less comparison shared with `sorted`'s default comparator. Both
/// sides must be numbers, or both raw strings (compared lexicographically).
pub(crate) fn less_than(a: &UnitRef, b: &UnitRef) -> Result<bool, EvalError> {
    match (&a.expr, &b.expr) {
        (Expr::Number(x), Expr::Number(y)) => Ok(x < y),
        (Expr::Str(x), Expr::Str(y)) if x.raw && y.raw => Ok(x.text < y.text),
        _ => Err(EvalError::expected(
            "two numeric values or two raw strings",
            a.pos,
        )),
    }
}

macro_rules! ordering_operator {
    ($ident:ident, $name:literal, $desc:literal, $op:tt) => {
        paste! {
            pub fn [<builtin_ $ident>](
                call: &UnitRef,
                _env: &EnvNodeRef,
            ) -> Result<UnitRef, EvalError> {
                let args = expect_exact($name, call, 2)?;
                let holds = match (&args[0].expr, &args[1].expr) {
                    (Expr::Number(a), Expr::Number(b)) => a $op b,
                    (Expr::Str(a), Expr::Str(b)) if a.raw && b.raw => a.text $op b.text,
                    _ => {
                        return Err(EvalError::expected(
                            "two numeric values or two raw strings",
                            call.pos,
                        ))
                    }
                };
                Ok(Unit::boolean(call.pos, holds))
            }

            inventory::submit! {
                BuiltinDef {
                    name: $name,
                    description: $desc,
                    is_macro: false,
                    call: [<builtin_ $ident>],
                }
            }
        }
    };
}

ordering_operator!(less, "<", "Tests if the first argument orders before the second.", <);
ordering_operator!(greater, ">", "Tests if the first argument orders after the second.", >);
ordering_operator!(less_or_equal, "<=", "Tests if the first argument does not order after the second.", <=);
ordering_operator!(greater_or_equal, ">=", "Tests if the first argument does not order before the second.", >=);
