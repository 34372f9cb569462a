// ABOUTME: Type predicate builtins answering 0/1

use super::{expect_exact, BuiltinDef};
use crate::env::EnvNodeRef;
use crate::error::EvalError;
use crate::value::{Expr, Unit, UnitRef};
use paste::paste;

macro_rules! type_predicate {
    ($ident:ident, $name:literal, $desc:literal, $test:expr) => {
        paste! {
            pub fn [<builtin_ $ident>](
                call: &UnitRef,
                _env: &EnvNodeRef,
            ) -> Result<UnitRef, EvalError> {
                let args = expect_exact($name, call, 1)?;
                let test: fn(&UnitRef) -> bool = $test;
                Ok(Unit::boolean(call.pos, test(&args[0])))
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

type_predicate!(
    is_atom,
    "atom?",
    "Tests whether the argument is a number, a symbol, or a raw string.",
    |u| matches!(u.expr, Expr::Number(_) | Expr::Str(_))
);

type_predicate!(
    is_list,
    "list?",
    "Tests whether the argument is a list of either flavor.",
    |u| matches!(u.expr, Expr::List(_) | Expr::Quoted(_))
);

type_predicate!(
    is_numeric,
    "numeric?",
    "Tests whether the argument is a number.",
    |u| matches!(u.expr, Expr::Number(_))
);

type_predicate!(
    is_map,
    "map?",
    "Tests whether the argument is a map.",
    |u| matches!(u.expr, Expr::Map(_))
);

type_predicate!(
    is_function,
    "function?",
    "Tests whether the argument is a function.",
    |u| matches!(u.expr, Expr::Fn(_))
);

type_predicate!(
    is_raw,
    "raw?",
    "Tests whether the argument is a raw string.",
    |u| u.is_raw_str()
);

type_predicate!(
    is_null,
    "null?",
    "Tests whether the argument is the empty list.",
    |u| u.children().is_some_and(|c| c.is_empty())
);
