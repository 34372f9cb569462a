// ABOUTME: N-ary arithmetic and bitwise builtins folding left over numeric arguments

use super::{expect_at_least, numeric_or_error, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Unit, UnitRef};
use paste::paste;

/// Defines an n-ary operator that folds from the first argument. Each fold
/// step sees the offending argument so division errors can point at it.
macro_rules! arithmetic_operator {
    ($ident:ident, $name:literal, $desc:literal, $fold:expr) => {
        paste! {
            pub fn [<builtin_ $ident>](
                call: &UnitRef,
                _env: &EnvNodeRef,
            ) -> Result<UnitRef, EvalError> {
                let args = expect_at_least($name, call, 1)?;
                let mut acc = numeric_or_error(&args[0])?;
                for arg in &args[1..] {
                    let rhs = numeric_or_error(arg)?;
                    let step: fn(i64, i64, &UnitRef) -> Result<i64, EvalError> = $fold;
                    acc = step(acc, rhs, arg)?;
                }
                Ok(Unit::number(call.pos, acc))
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

arithmetic_operator!(add, "+", "Adds numbers.", |a, b, _arg| Ok(a.wrapping_add(b)));
arithmetic_operator!(sub, "-", "Subtracts numbers.", |a, b, _arg| Ok(
    a.wrapping_sub(b)
));
arithmetic_operator!(mul, "*", "Multiplies numbers.", |a, b, _arg| Ok(
    a.wrapping_mul(b)
));

arithmetic_operator!(div, "/", "Divides numbers.", |a, b, arg| {
    if b == 0 {
        return Err(EvalError::new("Division by zero.", arg.pos));
    }
    a.checked_div(b)
        .ok_or_else(|| EvalError::new("Arithmetic overflow.", arg.pos))
});

arithmetic_operator!(modulo, "%", "Modulo.", |a, b, arg| {
    if b == 0 {
        return Err(EvalError::new("Modulo by zero.", arg.pos));
    }
    a.checked_rem(b)
        .ok_or_else(|| EvalError::new("Arithmetic overflow.", arg.pos))
});

arithmetic_operator!(bit_and, "&", "Binary and.", |a, b, _arg| Ok(a & b));
arithmetic_operator!(bit_or, "|", "Binary or.", |a, b, _arg| Ok(a | b));
arithmetic_operator!(bit_xor, "^", "Binary xor.", |a, b, _arg| Ok(a ^ b));
arithmetic_operator!(shl, "<<", "Shift left.", |a, b, _arg| Ok(
    a.wrapping_shl(b as u32)
));
arithmetic_operator!(shr, ">>", "Shift right.", |a, b, _arg| Ok(
    a.wrapping_shr(b as u32)
));
